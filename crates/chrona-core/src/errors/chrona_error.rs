use super::{ProvenanceError, ReplayError, TemporalError};

/// Top-level error type for the chrona workspace.
/// All subsystem errors convert into this via `From` impls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChronaError {
    #[error("provenance error: {0}")]
    Provenance(#[from] ProvenanceError),

    #[error("temporal error: {0}")]
    Temporal(#[from] TemporalError),

    #[error("replay error: {0}")]
    Replay(#[from] ReplayError),

    #[error("live graph access failed: {0}")]
    GraphAccess(String),

    #[error("pattern matching failed: {0}")]
    PatternMatch(String),

    #[error("config error: {0}")]
    ConfigError(String),
}

/// Stable discriminant for callers that branch on the failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ProvenanceParse,
    ProvenanceInvariant,
    EntityNotFound,
    NoProvenanceAtTime,
    InvalidTimeRange,
    EmptyTimeRange,
    Replay,
    Cancelled,
    GraphAccess,
    PatternMatch,
    Config,
}

impl ChronaError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Provenance(ProvenanceError::Parse { .. }) => ErrorKind::ProvenanceParse,
            Self::Provenance(ProvenanceError::Invariant { .. }) => ErrorKind::ProvenanceInvariant,
            Self::Temporal(TemporalError::EntityNotFound { .. }) => ErrorKind::EntityNotFound,
            Self::Temporal(TemporalError::NoProvenanceAtTime { .. }) => {
                ErrorKind::NoProvenanceAtTime
            }
            Self::Temporal(TemporalError::InvalidTimeRange { .. }) => ErrorKind::InvalidTimeRange,
            Self::Temporal(TemporalError::EmptyTimeRange { .. }) => ErrorKind::EmptyTimeRange,
            Self::Temporal(TemporalError::Cancelled) => ErrorKind::Cancelled,
            Self::Replay(_) => ErrorKind::Replay,
            Self::GraphAccess(_) => ErrorKind::GraphAccess,
            Self::PatternMatch(_) => ErrorKind::PatternMatch,
            Self::ConfigError(_) => ErrorKind::Config,
        }
    }

    /// Precondition violations the caller can fix by asking a different
    /// question. Everything else reflects bad data or a failed collaborator.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::EntityNotFound
                | ErrorKind::NoProvenanceAtTime
                | ErrorKind::InvalidTimeRange
                | ErrorKind::EmptyTimeRange
                | ErrorKind::Cancelled
        )
    }
}

/// Convenience type alias.
pub type ChronaResult<T> = Result<T, ChronaError>;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn kinds_are_distinct_per_variant() {
        let at = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let errors: Vec<ChronaError> = vec![
            ProvenanceError::parse("s", "bad").into(),
            ProvenanceError::invariant("e", "gap").into(),
            TemporalError::EntityNotFound { entity: "e".into() }.into(),
            TemporalError::NoProvenanceAtTime {
                entity: "e".into(),
                at,
            }
            .into(),
            TemporalError::InvalidTimeRange { from: at, to: at }.into(),
            TemporalError::EmptyTimeRange { start: at, end: at }.into(),
            ReplayError::MissingInitialState { entity: "e".into() }.into(),
        ];
        let kinds: std::collections::HashSet<ErrorKind> =
            errors.iter().map(ChronaError::kind).collect();
        assert_eq!(kinds.len(), errors.len());
    }

    #[test]
    fn only_preconditions_are_recoverable() {
        let at = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let missing: ChronaError = TemporalError::NoProvenanceAtTime {
            entity: "e".into(),
            at,
        }
        .into();
        assert!(missing.is_recoverable());

        let parse: ChronaError = ProvenanceError::parse("s", "bad").into();
        assert!(!parse.is_recoverable());

        let replay: ChronaError = ReplayError::OverlappingDiff {
            entity: "e".into(),
            snapshot: 2,
        }
        .into();
        assert!(!replay.is_recoverable());
    }

    #[test]
    fn messages_are_lowercase_and_specific() {
        let err: ChronaError = TemporalError::EntityNotFound {
            entity: "http://ex.org/E1".into(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "temporal error: entity not tracked: http://ex.org/E1"
        );
    }
}
