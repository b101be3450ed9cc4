//! Expiring Cache - An embeddable in-process key/value cache
//!
//! Values live in named tables and are removed once they go unused for their
//! lifespan. Tables fire hooks on add, delete and expiry, and can load missing
//! values on demand.

pub mod cache;
pub mod config;
pub mod error;
pub mod logging;
pub mod registry;
pub mod tasks;

pub use cache::{CacheItem, CacheItemPair, CacheStats, CacheTable};
pub use config::Config;
pub use error::{CacheError, Result};
pub use logging::{Logger, TracingLogger};
pub use registry::{cache, Registry};
