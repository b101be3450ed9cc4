//! Access Ranking Module
//!
//! Read-only (key, access count) projection used for most-accessed queries.

use serde::Serialize;

// == Cache Item Pair ==
/// A key paired with the access count observed when the ranking was taken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheItemPair<K> {
    pub key: K,
    pub access_count: u64,
}

impl<K> CacheItemPair<K> {
    pub fn new(key: K, access_count: u64) -> Self {
        Self { key, access_count }
    }
}

// == Rank ==
/// Orders pairs by descending access count and keeps at most `limit` of them.
///
/// The sort is stable, so equal counts keep the order in which they were supplied.
pub fn rank<K>(mut pairs: Vec<CacheItemPair<K>>, limit: usize) -> Vec<CacheItemPair<K>> {
    pairs.sort_by(|a, b| b.access_count.cmp(&a.access_count));
    pairs.truncate(limit);
    pairs
}
