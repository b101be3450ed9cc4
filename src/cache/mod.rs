//! Cache Module
//!
//! Provides named in-process cache tables whose entries expire after a period of
//! inactivity.

mod hooks;
mod item;
mod ranking;
mod stats;
mod table;


// Re-export public types
pub use hooks::{Hook, HookList};
pub use item::CacheItem;
pub use ranking::{rank, CacheItemPair};
pub use stats::CacheStats;
pub use table::{CacheKey, CacheTable, DataLoader};
