//! Temporal engine configuration.

use serde::{Deserialize, Serialize};

/// What to do when a candidate entity has no snapshot covering part of an
/// evaluated time range (the range starts before the entity was created).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoveragePolicy {
    /// Fail the evaluation with `NoProvenanceAtTime`.
    FailFast,
    /// Treat the entity as contributing no triples over the gap and report
    /// it in the slice's `uncovered` list.
    GapAsEmpty,
}

/// How deltas between two instants are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeltaStrategy {
    /// Materialize both instants and take set differences.
    Baseline,
    /// Compose the recorded diffs between the two instants.
    Composed,
    /// Compose when few snapshots separate the instants, otherwise baseline.
    Auto,
}

/// Which end of the snapshot chain replay starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplayDirection {
    /// Undo diffs starting from the live graph.
    Backward,
    /// Redo diffs starting from snapshot 1's initial triples.
    Forward,
    /// Pick whichever end is fewer snapshots away.
    Auto,
}

/// Configuration for materialization, deltas and across-time evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemporalConfig {
    // Materialization cache
    pub cache_max_entries: u64,

    // Evaluation
    pub coverage_policy: CoveragePolicy,
    pub parallel_materialization: bool,

    // Deltas
    pub delta_strategy: DeltaStrategy,
    pub delta_compose_max_snapshots: usize,

    // Replay
    pub replay_direction: ReplayDirection,

    // Related-entity expansion, `None` = follow until no new entities appear
    pub related_max_depth: Option<usize>,
}

impl Default for TemporalConfig {
    fn default() -> Self {
        Self {
            cache_max_entries: 10_000,
            coverage_policy: CoveragePolicy::GapAsEmpty,
            parallel_materialization: true,
            delta_strategy: DeltaStrategy::Auto,
            delta_compose_max_snapshots: 8,
            replay_direction: ReplayDirection::Backward,
            related_max_depth: None,
        }
    }
}
