mod chrona_error;
mod provenance_error;
mod replay_error;
mod temporal_error;

pub use chrona_error::{ChronaError, ChronaResult, ErrorKind};
pub use provenance_error::ProvenanceError;
pub use replay_error::ReplayError;
pub use temporal_error::TemporalError;
