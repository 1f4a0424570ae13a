use std::sync::Arc;

use super::{SnapshotMetadata, TimeInterval, TripleSet};

/// One reconstructed version of an entity.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityVersion {
    pub snapshot: u32,
    pub interval: TimeInterval,
    pub metadata: SnapshotMetadata,
    pub state: Arc<TripleSet>,
}

/// Snapshot descriptor without a materialized state.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotSummary {
    pub snapshot: u32,
    pub interval: TimeInterval,
    pub metadata: SnapshotMetadata,
}

/// Versions overlapping a time window, plus the descriptors of every other
/// snapshot of the entity.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionWindow {
    pub versions: Vec<EntityVersion>,
    pub others: Vec<SnapshotSummary>,
}
