//! Table Registry Module
//!
//! Maps cache names to tables, creating each table on first use.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::OnceLock;

use parking_lot::RwLock;
use tracing::debug;

use crate::cache::{CacheKey, CacheTable};

type RegistryKey = (String, TypeId);

// == Registry ==
/// Lazily populated name → table mapping behind a single lock.
///
/// Tables are keyed by name and by their key/value types, so the same name used with
/// different types yields distinct tables. Tables are never removed.
#[derive(Default)]
pub struct Registry {
    tables: RwLock<HashMap<RegistryKey, Box<dyn Any + Send + Sync>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    // == Table ==
    /// Returns the table registered under `name`, creating it if needed.
    pub fn table<K, V>(&self, name: &str) -> CacheTable<K, V>
    where
        K: CacheKey,
        V: Send + Sync + 'static,
    {
        let key = (name.to_string(), TypeId::of::<CacheTable<K, V>>());

        if let Some(table) = self.lookup::<K, V>(&key) {
            return table;
        }

        let mut tables = self.tables.write();
        // Another caller may have created it between the two locks
        if let Some(table) = tables
            .get(&key)
            .and_then(|entry| entry.downcast_ref::<CacheTable<K, V>>())
        {
            return table.clone();
        }

        debug!("Creating cache table {}", name);
        let table = CacheTable::new(name);
        tables.insert(key, Box::new(table.clone()));
        table
    }

    /// Returns the number of registered tables.
    pub fn len(&self) -> usize {
        self.tables.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.read().is_empty()
    }

    fn lookup<K, V>(&self, key: &RegistryKey) -> Option<CacheTable<K, V>>
    where
        K: CacheKey,
        V: Send + Sync + 'static,
    {
        self.tables
            .read()
            .get(key)
            .and_then(|entry| entry.downcast_ref::<CacheTable<K, V>>())
            .cloned()
    }
}

// == Global Registry ==
static GLOBAL: OnceLock<Registry> = OnceLock::new();

/// Returns the process-wide table named `name`, creating it on first use.
///
/// The global registry is created on first access and lives for the process.
///
/// # Example
/// ```
/// use std::time::Duration;
///
/// let table = expiring_cache::cache::<String, u32>("doc-example");
/// table.add("answer".to_string(), Duration::ZERO, 42);
///
/// let same = expiring_cache::cache::<String, u32>("doc-example");
/// assert_eq!(*same.value(&"answer".to_string()).unwrap().value(), 42);
/// ```
pub fn cache<K, V>(name: &str) -> CacheTable<K, V>
where
    K: CacheKey,
    V: Send + Sync + 'static,
{
    GLOBAL.get_or_init(Registry::new).table(name)
}
