//! Engine-lifetime work counters.

use std::sync::atomic::{AtomicU64, Ordering};

use chrona_core::models::MaterializationStats;

/// Counters survive log reloads; the cache does not, so the cached entry
/// count is read from whichever cache is active when stats are taken.
#[derive(Debug, Default)]
pub struct StatsRecorder {
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    snapshots_replayed: AtomicU64,
    intervals_evaluated: AtomicU64,
}

impl StatsRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_replayed(&self, diffs: u64) {
        self.snapshots_replayed.fetch_add(diffs, Ordering::Relaxed);
    }

    pub fn record_interval(&self) {
        self.intervals_evaluated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self, cached_entries: u64) -> MaterializationStats {
        MaterializationStats {
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            snapshots_replayed: self.snapshots_replayed.load(Ordering::Relaxed),
            intervals_evaluated: self.intervals_evaluated.load(Ordering::Relaxed),
            cached_entries,
        }
    }
}
