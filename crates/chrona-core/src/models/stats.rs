use serde::{Deserialize, Serialize};

/// Counters describing how much reconstruction work the engine has done.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterializationStats {
    pub cache_hits: u64,
    pub cache_misses: u64,
    /// Diffs applied during replay, forward or backward.
    pub snapshots_replayed: u64,
    pub intervals_evaluated: u64,
    pub cached_entries: u64,
}

impl MaterializationStats {
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.cache_hits + self.cache_misses;
        if lookups == 0 {
            0.0
        } else {
            self.cache_hits as f64 / lookups as f64
        }
    }
}
