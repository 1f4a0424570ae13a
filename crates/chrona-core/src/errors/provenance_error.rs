/// Errors raised while loading or validating a provenance log.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProvenanceError {
    /// A snapshot record is malformed: missing or unparseable fields,
    /// conflicting values, or an update diff that cannot be decoded.
    #[error("malformed provenance record {subject}: {reason}")]
    Parse { subject: String, reason: String },

    /// An entity's snapshot chain breaks ordering, contiguity, or the
    /// single-open-snapshot rule.
    #[error("provenance invariant violated for {entity}: {reason}")]
    Invariant { entity: String, reason: String },
}

impl ProvenanceError {
    pub fn parse(subject: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Parse {
            subject: subject.into(),
            reason: reason.into(),
        }
    }

    pub fn invariant(entity: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invariant {
            entity: entity.into(),
            reason: reason.into(),
        }
    }
}
