//! Predicate IRIs read by the loader.

use chrona_core::config::ProvenanceConfig;
use chrona_core::errors::{ChronaError, ChronaResult};
use oxrdf::NamedNode;

/// PROV-O namespace. Predicates in it describe snapshots, not entity
/// content, and are never followed when expanding related entities.
pub const PROV_NAMESPACE: &str = "http://www.w3.org/ns/prov#";

/// Resolved vocabulary, one IRI per recognised snapshot property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvenanceVocabulary {
    pub specialization_of: NamedNode,
    pub generated_at_time: NamedNode,
    pub invalidated_at_time: NamedNode,
    pub was_attributed_to: NamedNode,
    pub had_primary_source: NamedNode,
    pub description: NamedNode,
    pub has_update_query: NamedNode,
}

impl ProvenanceVocabulary {
    pub fn from_config(config: &ProvenanceConfig) -> ChronaResult<Self> {
        Ok(Self {
            specialization_of: iri(&config.specialization_of)?,
            generated_at_time: iri(&config.generated_at_time)?,
            invalidated_at_time: iri(&config.invalidated_at_time)?,
            was_attributed_to: iri(&config.was_attributed_to)?,
            had_primary_source: iri(&config.had_primary_source)?,
            description: iri(&config.description)?,
            has_update_query: iri(&config.has_update_query)?,
        })
    }
}

impl Default for ProvenanceVocabulary {
    fn default() -> Self {
        let config = ProvenanceConfig::default();
        Self {
            specialization_of: NamedNode::new_unchecked(config.specialization_of),
            generated_at_time: NamedNode::new_unchecked(config.generated_at_time),
            invalidated_at_time: NamedNode::new_unchecked(config.invalidated_at_time),
            was_attributed_to: NamedNode::new_unchecked(config.was_attributed_to),
            had_primary_source: NamedNode::new_unchecked(config.had_primary_source),
            description: NamedNode::new_unchecked(config.description),
            has_update_query: NamedNode::new_unchecked(config.has_update_query),
        }
    }
}

fn iri(value: &str) -> ChronaResult<NamedNode> {
    NamedNode::new(value)
        .map_err(|e| ChronaError::ConfigError(format!("invalid vocabulary IRI {value}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_config_defaults() {
        let from_config = ProvenanceVocabulary::from_config(&ProvenanceConfig::default()).unwrap();
        assert_eq!(from_config, ProvenanceVocabulary::default());
    }

    #[test]
    fn relative_iri_is_a_config_error() {
        let config = ProvenanceConfig {
            generated_at_time: "generatedAtTime".to_string(),
            ..ProvenanceConfig::default()
        };
        let err = ProvenanceVocabulary::from_config(&config).unwrap_err();
        assert!(matches!(err, ChronaError::ConfigError(_)));
    }
}
