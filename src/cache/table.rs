//! Cache Table Module
//!
//! Named key/value table with inactivity-based expiration, lifecycle hooks and an
//! optional data loader for misses.

use std::any::Any;
use std::borrow::Borrow;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt::{self, Debug};
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Mutex, RwLock};
use tracing::{debug, trace};

use crate::cache::hooks::HookList;
use crate::cache::ranking::{self, CacheItemPair};
use crate::cache::stats::{CacheStats, StatsCounters};
use crate::cache::CacheItem;
use crate::error::{CacheError, Result};
use crate::logging::Logger;
use crate::tasks::ExpirationTimer;

/// Bounds every table key satisfies.
pub trait CacheKey: Eq + Hash + Clone + Debug + Send + Sync + 'static {}

impl<T> CacheKey for T where T: Eq + Hash + Clone + Debug + Send + Sync + 'static {}

/// Fallback invoked by [`CacheTable::value_with`] on a miss.
///
/// Receives the missing key and the caller's extra arguments. Returning `None` means
/// the key cannot be loaded.
pub type DataLoader<K, V> =
    Arc<dyn Fn(&K, &[&dyn Any]) -> Option<CacheItem<K, V>> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Removal {
    Deleted,
    Expired,
}

// == Cache Table ==
/// A named cache table.
///
/// Cloning yields another handle to the same table. Reads take the entry map's shared
/// lock, structural changes its exclusive lock, and no hook ever runs while either is
/// held, so hooks may call back into the table.
pub struct CacheTable<K, V> {
    inner: Arc<TableInner<K, V>>,
}

struct TableInner<K, V> {
    name: String,
    items: RwLock<HashMap<K, Arc<CacheItem<K, V>>>>,
    /// Lock order: `timer` before `items`
    timer: Mutex<ExpirationTimer>,
    loader: RwLock<Option<DataLoader<K, V>>>,
    added_hooks: HookList<CacheItem<K, V>>,
    deleting_hooks: HookList<CacheItem<K, V>>,
    logger: RwLock<Option<Arc<dyn Logger>>>,
    stats: StatsCounters,
}

impl<K: CacheKey, V: Send + Sync + 'static> CacheTable<K, V> {
    // == Constructor ==
    /// Creates an empty table with a disarmed expiration scheduler.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(TableInner {
                name: name.into(),
                items: RwLock::new(HashMap::new()),
                timer: Mutex::new(ExpirationTimer::new()),
                loader: RwLock::new(None),
                added_hooks: HookList::new(),
                deleting_hooks: HookList::new(),
                logger: RwLock::new(None),
                stats: StatsCounters::default(),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Returns the number of entries.
    pub fn count(&self) -> usize {
        self.inner.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.items.read().is_empty()
    }

    // == Exists ==
    /// Membership test. Does not count as an access.
    pub fn exists<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.items.read().contains_key(key)
    }

    // == Add ==
    /// Stores `value` under `key`, replacing any existing entry.
    ///
    /// Fires the added hooks with the new item, then re-evaluates the expiration
    /// schedule if this item could expire before the currently scheduled sweep.
    ///
    /// # Arguments
    /// * `key` - The key to store under
    /// * `life_span` - Inactivity allowed before expiry, `Duration::ZERO` for never
    /// * `value` - The value to store
    pub fn add(&self, key: K, life_span: Duration, value: V) -> Arc<CacheItem<K, V>> {
        let item = Arc::new(CacheItem::new(key.clone(), life_span, value));
        self.inner.items.write().insert(key, Arc::clone(&item));
        self.inner.after_add(&item);
        item
    }

    // == Not Found Add ==
    /// Stores `value` only if `key` is absent.
    ///
    /// The existence check and the insert happen under one exclusive lock, so among
    /// concurrent calls for the same key exactly one returns true.
    pub fn not_found_add(&self, key: K, life_span: Duration, value: V) -> bool {
        let item = {
            let mut items = self.inner.items.write();
            match items.entry(key) {
                Entry::Occupied(_) => return false,
                Entry::Vacant(slot) => {
                    let item = Arc::new(CacheItem::new(slot.key().clone(), life_span, value));
                    slot.insert(Arc::clone(&item));
                    item
                }
            }
        };
        self.inner.after_add(&item);
        true
    }

    // == Value ==
    /// Looks up `key`, counting the lookup as an access.
    ///
    /// On a miss the data loader, if any, is asked for the key with no extra arguments.
    pub fn value(&self, key: &K) -> Result<Arc<CacheItem<K, V>>> {
        self.value_with(key, &[])
    }

    /// Looks up `key`, passing `args` to the data loader on a miss.
    ///
    /// A loaded item is stored with a plain [`add`](Self::add): concurrent misses for
    /// the same key may each run the loader, and the last insert wins.
    ///
    /// # Errors
    /// - `KeyNotFound` if the key is absent and no loader is configured
    /// - `KeyNotFoundOrNotLoadable` if the loader returned `None`
    pub fn value_with(&self, key: &K, args: &[&dyn Any]) -> Result<Arc<CacheItem<K, V>>> {
        let found = self.inner.items.read().get(key).cloned();
        if let Some(item) = found {
            item.keep_alive();
            self.inner.stats.record_hit();
            return Ok(item);
        }
        self.inner.stats.record_miss();

        let loader = self.inner.loader.read().clone();
        let Some(loader) = loader else {
            return Err(CacheError::KeyNotFound);
        };

        match loader(key, args) {
            Some(loaded) => {
                self.inner.stats.record_load();
                self.inner.log(format!(
                    "Loaded item with key {:?} into table {}",
                    key, self.inner.name
                ));
                let life_span = loaded.life_span();
                Ok(self.add(key.clone(), life_span, loaded.into_value()))
            }
            None => Err(CacheError::KeyNotFoundOrNotLoadable),
        }
    }

    // == Delete ==
    /// Removes `key`, returning the removed item.
    ///
    /// The deleting hooks and then the item's expire hooks run before the entry is
    /// unlinked, each exactly once.
    pub fn delete<Q>(&self, key: &Q) -> Result<Arc<CacheItem<K, V>>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let item = self
            .inner
            .items
            .read()
            .get(key)
            .cloned()
            .ok_or(CacheError::KeyNotFound)?;
        self.inner.remove_entry(&item, Removal::Deleted)?;
        Ok(item)
    }

    // == Flush ==
    /// Drops every entry and disarms the scheduler.
    ///
    /// No deleting or expire hooks run.
    pub fn flush(&self) {
        {
            let mut timer = self.inner.timer.lock();
            self.inner.items.write().clear();
            timer.disarm();
        }
        self.inner.log(format!("Flushing table {}", self.inner.name));
    }

    // == Most Accessed ==
    /// Returns up to `count` items ordered by descending access count.
    pub fn most_accessed(&self, count: usize) -> Vec<Arc<CacheItem<K, V>>> {
        let items = self.inner.items.read();
        let pairs = items
            .iter()
            .map(|(key, item)| CacheItemPair::new(key, item.access_count()))
            .collect();

        ranking::rank(pairs, count)
            .into_iter()
            .filter_map(|pair| items.get(pair.key).cloned())
            .collect()
    }

    /// Returns up to `count` (key, access count) pairs, most accessed first.
    pub fn access_ranking(&self, count: usize) -> Vec<CacheItemPair<K>> {
        let pairs = self
            .inner
            .items
            .read()
            .iter()
            .map(|(key, item)| CacheItemPair::new(key.clone(), item.access_count()))
            .collect();
        ranking::rank(pairs, count)
    }

    // == For Each ==
    /// Visits a snapshot of the entries. `visit` may call back into the table.
    pub fn for_each<F>(&self, mut visit: F)
    where
        F: FnMut(&K, &Arc<CacheItem<K, V>>),
    {
        let snapshot: Vec<Arc<CacheItem<K, V>>> =
            self.inner.items.read().values().cloned().collect();
        for item in &snapshot {
            visit(item.key(), item);
        }
    }

    // == Data Loader ==
    pub fn set_data_loader<F>(&self, loader: F)
    where
        F: Fn(&K, &[&dyn Any]) -> Option<CacheItem<K, V>> + Send + Sync + 'static,
    {
        *self.inner.loader.write() = Some(Arc::new(loader));
    }

    pub fn clear_data_loader(&self) {
        *self.inner.loader.write() = None;
    }

    // == Added Hooks ==
    /// Replaces all added hooks with `hook`.
    pub fn set_added_hook<F>(&self, hook: F)
    where
        F: Fn(&CacheItem<K, V>) + Send + Sync + 'static,
    {
        self.inner.added_hooks.set(hook);
    }

    pub fn add_added_hook<F>(&self, hook: F)
    where
        F: Fn(&CacheItem<K, V>) + Send + Sync + 'static,
    {
        self.inner.added_hooks.add(hook);
    }

    pub fn remove_added_hooks(&self) {
        self.inner.added_hooks.clear();
    }

    // == Deleting Hooks ==
    /// Replaces all deleting hooks with `hook`.
    pub fn set_deleting_hook<F>(&self, hook: F)
    where
        F: Fn(&CacheItem<K, V>) + Send + Sync + 'static,
    {
        self.inner.deleting_hooks.set(hook);
    }

    pub fn add_deleting_hook<F>(&self, hook: F)
    where
        F: Fn(&CacheItem<K, V>) + Send + Sync + 'static,
    {
        self.inner.deleting_hooks.add(hook);
    }

    pub fn remove_deleting_hooks(&self) {
        self.inner.deleting_hooks.clear();
    }

    // == Logger ==
    /// Sends this table's trace lines to `logger` in addition to `tracing`.
    pub fn set_logger<L>(&self, logger: L)
    where
        L: Logger + 'static,
    {
        *self.inner.logger.write() = Some(Arc::new(logger));
    }

    pub fn clear_logger(&self) {
        *self.inner.logger.write() = None;
    }

    // == Stats ==
    pub fn stats(&self) -> CacheStats {
        self.inner.stats.snapshot(self.count())
    }

    /// The interval the expiration timer was last armed with, None when disarmed.
    pub fn scheduled_interval(&self) -> Option<Duration> {
        self.inner.timer.lock().interval()
    }
}

impl<K: CacheKey, V: Send + Sync + 'static> TableInner<K, V> {
    fn log(&self, line: String) {
        debug!(table = %self.name, "{}", line);
        let logger = self.logger.read().clone();
        if let Some(logger) = logger {
            logger.log(&line);
        }
    }

    fn after_add(self: &Arc<Self>, item: &Arc<CacheItem<K, V>>) {
        self.log(format!(
            "Adding item with key {:?} and lifespan of {:?} to table {}",
            item.key(),
            item.life_span(),
            self.name
        ));

        self.added_hooks.invoke(item);

        if item.is_immortal() {
            return;
        }
        let scheduled = self.timer.lock().interval();
        if scheduled.map_or(true, |interval| item.life_span() < interval) {
            self.expiration_check();
        }
    }

    // == Remove Entry ==
    /// Removes `item` if it is still the entry stored under its key.
    ///
    /// The item is claimed first so that racing deletes and sweeps fire its hooks once.
    fn remove_entry(&self, item: &Arc<CacheItem<K, V>>, cause: Removal) -> Result<()> {
        let is_current = self
            .items
            .read()
            .get(item.key())
            .is_some_and(|current| Arc::ptr_eq(current, item));
        if !is_current || !item.begin_removal() {
            return Err(CacheError::KeyNotFound);
        }

        self.deleting_hooks.invoke(item);
        item.fire_expire_hooks();

        {
            let mut items = self.items.write();
            // A hook may have stored a new item under the same key
            if items
                .get(item.key())
                .is_some_and(|current| Arc::ptr_eq(current, item))
            {
                items.remove(item.key());
            }
        }

        match cause {
            Removal::Deleted => self.stats.record_deletion(),
            Removal::Expired => self.stats.record_expiration(),
        }
        self.log(format!(
            "Deleting item with key {:?} created on {} and hit {} times from table {}",
            item.key(),
            item.created_at(),
            item.access_count(),
            self.name
        ));
        Ok(())
    }

    // == Expiration Check ==
    /// Deletes every expired entry, then aims the timer at the nearest remaining expiry.
    fn expiration_check(self: &Arc<Self>) {
        self.timer.lock().cancel();

        let now = Instant::now();
        let expired: Vec<Arc<CacheItem<K, V>>> = self
            .items
            .read()
            .values()
            .filter(|item| !item.is_removing() && item.is_expired_at(now))
            .cloned()
            .collect();

        for item in &expired {
            // Skip items kept alive since the scan
            if item.is_expired_at(Instant::now()) {
                // A concurrent delete already claimed it
                if let Err(err) = self.remove_entry(item, Removal::Expired) {
                    trace!("Expiry of {:?} in table {} skipped: {}", item.key(), self.name, err);
                }
            }
        }

        let mut timer = self.timer.lock();
        let now = Instant::now();
        // Items claimed by an in-flight removal are about to be unlinked
        let next = self
            .items
            .read()
            .values()
            .filter(|item| !item.is_removing())
            .filter_map(|item| item.remaining(now))
            .min();

        match next {
            Some(after) => {
                let table = Arc::downgrade(self);
                timer.arm(after, move || {
                    if let Some(table) = table.upgrade() {
                        table.expiration_check();
                    }
                });
            }
            None => timer.disarm(),
        }
    }
}

impl<K, V> Clone for CacheTable<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V> Debug for CacheTable<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheTable")
            .field("name", &self.inner.name)
            .field("count", &self.inner.items.read().len())
            .finish_non_exhaustive()
    }
}
