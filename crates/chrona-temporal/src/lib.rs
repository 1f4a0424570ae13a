//! # chrona-temporal
//!
//! Temporal reconstruction and query engine for provenance-tracked RDF
//! graphs. Loads a provenance log, materializes entity states at past
//! instants by replaying recorded diffs against the live graph, computes
//! deltas between instants, and evaluates triple-pattern queries across time.

pub mod cancel;
pub mod engine;
pub mod materialize;
pub mod provenance;
pub mod query;
pub mod stats;

pub use cancel::CancellationFlag;
pub use engine::TemporalEngine;
pub use provenance::{ProvenanceLoader, ProvenanceLog};
pub use query::across_time::AcrossTime;
