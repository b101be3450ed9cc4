//! Cache Item Module
//!
//! Defines a single stored entry with its inactivity lifespan, access tracking and
//! expiration hooks.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::cache::hooks::HookList;

/// Access bookkeeping, guarded by the item's own lock.
#[derive(Debug, Clone, Copy)]
struct AccessState {
    accessed_on: Instant,
    accessed_at: DateTime<Utc>,
    access_count: u64,
}

// == Cache Item ==
/// A single cache entry.
///
/// Key, value, lifespan and creation time are write-once. The last access time and
/// access counter sit behind a per-item lock so that keeping one item alive never
/// contends with the owning table.
pub struct CacheItem<K, V> {
    key: K,
    value: V,
    /// Permitted inactivity; zero means the item never expires
    life_span: Duration,
    created_on: Instant,
    created_at: DateTime<Utc>,
    access: RwLock<AccessState>,
    expire_hooks: HookList<K>,
    /// Set once the item has been claimed for removal by a delete or an expiry sweep
    removing: AtomicBool,
}

impl<K, V> CacheItem<K, V> {
    // == Constructor ==
    /// Creates a new item whose inactivity clock starts now.
    ///
    /// # Arguments
    /// * `key` - The key the item is stored under
    /// * `life_span` - Inactivity allowed before expiry, `Duration::ZERO` for never
    /// * `value` - The stored value
    pub fn new(key: K, life_span: Duration, value: V) -> Self {
        let now = Instant::now();
        let wall = Utc::now();

        Self {
            key,
            value,
            life_span,
            created_on: now,
            created_at: wall,
            access: RwLock::new(AccessState {
                accessed_on: now,
                accessed_at: wall,
                access_count: 0,
            }),
            expire_hooks: HookList::new(),
            removing: AtomicBool::new(false),
        }
    }

    // == Keep Alive ==
    /// Resets the inactivity clock and counts one access.
    pub fn keep_alive(&self) {
        let mut access = self.access.write();
        access.accessed_on = Instant::now();
        access.accessed_at = Utc::now();
        access.access_count += 1;
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    /// Consumes the item, returning its value.
    pub fn into_value(self) -> V {
        self.value
    }

    pub fn life_span(&self) -> Duration {
        self.life_span
    }

    /// Returns true if the item is exempt from expiration.
    pub fn is_immortal(&self) -> bool {
        self.life_span.is_zero()
    }

    /// Monotonic creation time.
    pub fn created_on(&self) -> Instant {
        self.created_on
    }

    /// Wall-clock creation time.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Monotonic time of the last access.
    pub fn accessed_on(&self) -> Instant {
        self.access.read().accessed_on
    }

    /// Wall-clock time of the last access.
    pub fn accessed_at(&self) -> DateTime<Utc> {
        self.access.read().accessed_at
    }

    pub fn access_count(&self) -> u64 {
        self.access.read().access_count
    }

    // == Time Remaining ==
    /// Returns the lifetime left at `now`, or None if the item never expires.
    ///
    /// An item whose inactivity has reached its lifespan has `Some(Duration::ZERO)`.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        if self.is_immortal() {
            return None;
        }
        let idle = now.saturating_duration_since(self.accessed_on());
        Some(self.life_span.saturating_sub(idle))
    }

    // == Is Expired ==
    /// Checks whether the item's inactivity at `now` has reached its lifespan.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        self.remaining(now).is_some_and(|left| left.is_zero())
    }

    // == Expire Hooks ==
    /// Replaces all expire hooks with `hook`.
    pub fn set_expire_hook<F>(&self, hook: F)
    where
        F: Fn(&K) + Send + Sync + 'static,
    {
        self.expire_hooks.set(hook);
    }

    /// Appends an expire hook; all hooks fire in append order when the item is removed.
    pub fn add_expire_hook<F>(&self, hook: F)
    where
        F: Fn(&K) + Send + Sync + 'static,
    {
        self.expire_hooks.add(hook);
    }

    pub fn remove_expire_hooks(&self) {
        self.expire_hooks.clear();
    }

    /// Runs the expire hooks with the item's key.
    pub(crate) fn fire_expire_hooks(&self) -> usize {
        self.expire_hooks.invoke(&self.key)
    }

    /// Claims the item for removal. Only the first caller gets true.
    pub(crate) fn begin_removal(&self) -> bool {
        !self.removing.swap(true, Ordering::AcqRel)
    }

    pub(crate) fn is_removing(&self) -> bool {
        self.removing.load(Ordering::Acquire)
    }
}

impl<K: fmt::Debug, V> fmt::Debug for CacheItem<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheItem")
            .field("key", &self.key)
            .field("life_span", &self.life_span)
            .field("created_at", &self.created_at)
            .field("access_count", &self.access_count())
            .finish_non_exhaustive()
    }
}
