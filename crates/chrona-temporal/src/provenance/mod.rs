//! Provenance model: snapshot chains, loading from RDF, and update diffs.

pub mod loader;
pub mod log;
pub mod update_query;
pub mod validation;
pub mod vocabulary;

pub use loader::ProvenanceLoader;
pub use log::{ProvenanceLog, ProvenanceLogBuilder};
pub use update_query::{parse_update, render_update, UpdateSyntaxError};
pub use vocabulary::ProvenanceVocabulary;
