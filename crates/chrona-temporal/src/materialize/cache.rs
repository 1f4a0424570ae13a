//! Materialization cache: LRU over `(entity, snapshot number)`.

use std::sync::Arc;

use chrona_core::models::TripleSet;
use moka::policy::EvictionPolicy;
use moka::sync::Cache;
use oxrdf::NamedNode;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    entity: NamedNode,
    snapshot: u32,
}

/// Bounded LRU cache of materialized entity states.
///
/// One cache belongs to one log version; reloading the log replaces the
/// cache instead of clearing it, so in-flight queries keep a consistent view.
/// Concurrent population of the same key may compute the state twice, the
/// last insert wins and both values are identical.
pub struct MaterializationCache {
    inner: Cache<CacheKey, Arc<TripleSet>>,
    log_version: u64,
}

impl MaterializationCache {
    pub fn new(max_entries: u64, log_version: u64) -> Self {
        let inner = Cache::builder()
            .max_capacity(max_entries)
            .eviction_policy(EvictionPolicy::lru())
            .build();
        Self { inner, log_version }
    }

    pub fn get(&self, entity: &NamedNode, snapshot: u32) -> Option<Arc<TripleSet>> {
        self.inner.get(&CacheKey {
            entity: entity.clone(),
            snapshot,
        })
    }

    pub fn insert(&self, entity: NamedNode, snapshot: u32, state: Arc<TripleSet>) {
        self.inner.insert(CacheKey { entity, snapshot }, state);
    }

    /// Log version this cache was built for.
    pub fn log_version(&self) -> u64 {
        self.log_version
    }

    /// Approximate count; pending evictions may not be reflected yet.
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }

    /// Flush pending maintenance so `entry_count` is exact.
    pub fn sync(&self) {
        self.inner.run_pending_tasks();
    }
}
