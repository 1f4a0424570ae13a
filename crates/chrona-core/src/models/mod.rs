mod change_log;
mod delta;
mod history;
mod interval;
mod materialized;
mod rdf;
mod snapshot;
mod stats;

pub use change_log::{ChangeLog, EntityChanges, Modification};
pub use delta::Delta;
pub use history::{EntityVersion, SnapshotSummary, VersionWindow};
pub use interval::TimeInterval;
pub use materialized::{MaterializedState, TemporalSlice};
pub use rdf::{
    sorted_triples, subject_iri, PatternTerm, ResultSet, Solution, TriplePattern, TripleSet,
};
pub use snapshot::{SnapshotMetadata, SnapshotRecord, UpdateDiff};
pub use stats::MaterializationStats;
