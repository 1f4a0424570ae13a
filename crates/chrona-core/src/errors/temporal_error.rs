use chrono::{DateTime, Utc};

/// Temporal lookup and query precondition errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemporalError {
    #[error("entity not tracked: {entity}")]
    EntityNotFound { entity: String },

    #[error("no provenance for {entity} at {at}")]
    NoProvenanceAtTime { entity: String, at: DateTime<Utc> },

    #[error("invalid time range: {from} is after {to}")]
    InvalidTimeRange {
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    },

    #[error("empty time range: [{start}, {end})")]
    EmptyTimeRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("evaluation cancelled")]
    Cancelled,
}
