//! Hook List Module
//!
//! Ordered callback lists used for item expiration hooks and table lifecycle hooks.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

/// A registered callback receiving a reference to the subject of the transition.
pub type Hook<T> = Arc<dyn Fn(&T) + Send + Sync>;

// == Hook List ==
/// Ordered list of callbacks, invoked in append order.
///
/// Supports both disciplines callers rely on: `set` replaces the whole list with a
/// single hook, `add` accumulates. Invocation works on a snapshot taken under the
/// list lock, so hooks run with no lock held and may mutate the list themselves.
pub struct HookList<T: ?Sized> {
    hooks: RwLock<Vec<Hook<T>>>,
}

impl<T: ?Sized> HookList<T> {
    // == Constructor ==
    /// Creates an empty hook list.
    pub fn new() -> Self {
        Self {
            hooks: RwLock::new(Vec::new()),
        }
    }

    // == Set ==
    /// Replaces every registered hook with `hook`.
    pub fn set<F>(&self, hook: F)
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let mut hooks = self.hooks.write();
        hooks.clear();
        hooks.push(Arc::new(hook));
    }

    // == Add ==
    /// Appends `hook`; it fires after every hook registered before it.
    pub fn add<F>(&self, hook: F)
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.hooks.write().push(Arc::new(hook));
    }

    // == Clear ==
    /// Removes all hooks.
    pub fn clear(&self) {
        self.hooks.write().clear();
    }

    /// Returns the number of registered hooks.
    pub fn len(&self) -> usize {
        self.hooks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.read().is_empty()
    }

    // == Invoke ==
    /// Calls every hook with `arg`, in append order.
    ///
    /// Returns the number of hooks that ran.
    pub fn invoke(&self, arg: &T) -> usize {
        let snapshot: Vec<Hook<T>> = self.hooks.read().clone();
        for hook in &snapshot {
            hook(arg);
        }
        snapshot.len()
    }
}

impl<T: ?Sized> Default for HookList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> fmt::Debug for HookList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookList").field("len", &self.len()).finish()
    }
}
