/// Failures while applying recorded diffs to a materialized state.
///
/// Replay is strict in both directions: a triple may only be removed if it
/// is present and only be added if it is absent. Any other outcome means the
/// log and the live graph disagree, and the materialization is abandoned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReplayError {
    #[error("replay of {entity} snapshot {snapshot}: {missing} triple(s) to remove are absent")]
    MissingRemoval {
        entity: String,
        snapshot: u32,
        missing: usize,
    },

    #[error("replay of {entity} snapshot {snapshot}: {present} triple(s) to add are already present")]
    ConflictingInsertion {
        entity: String,
        snapshot: u32,
        present: usize,
    },

    #[error("snapshot {snapshot} of {entity} inserts and deletes the same triple(s)")]
    OverlappingDiff { entity: String, snapshot: u32 },

    #[error("no initial triples recorded for {entity}")]
    MissingInitialState { entity: String },

    #[error("replayed state of {entity} differs from live graph: {missing} missing, {unexpected} unexpected")]
    LiveStateMismatch {
        entity: String,
        missing: usize,
        unexpected: usize,
    },
}
