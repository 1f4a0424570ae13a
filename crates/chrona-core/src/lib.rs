//! Shared vocabulary of the chrona workspace: RDF aliases, time intervals,
//! snapshot records, deltas, query results, the error taxonomy, configuration,
//! and the traits through which the engine reaches its external collaborators.

pub mod config;
pub mod errors;
pub mod models;
pub mod observability;
pub mod traits;

pub use config::ChronaConfig;
pub use errors::{ChronaError, ChronaResult};
