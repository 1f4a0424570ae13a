//! Provenance vocabulary and load-time validation settings.

use serde::{Deserialize, Serialize};

/// How `load` reacts to an entity whose snapshot chain breaks an invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvariantPolicy {
    /// Fail the whole load.
    Reject,
    /// Drop the entity from the log and remember why; lookups on it fail
    /// with the recorded error while every other entity stays usable.
    Quarantine,
}

/// Predicate IRIs the loader reads. They are data, so logs written against
/// a different namespace can be loaded without code changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvenanceConfig {
    pub specialization_of: String,
    pub generated_at_time: String,
    pub invalidated_at_time: String,
    pub was_attributed_to: String,
    pub had_primary_source: String,
    pub description: String,
    pub has_update_query: String,

    pub invariant_policy: InvariantPolicy,
}

impl Default for ProvenanceConfig {
    fn default() -> Self {
        Self {
            specialization_of: "http://www.w3.org/ns/prov#specializationOf".to_string(),
            generated_at_time: "http://www.w3.org/ns/prov#generatedAtTime".to_string(),
            invalidated_at_time: "http://www.w3.org/ns/prov#invalidatedAtTime".to_string(),
            was_attributed_to: "http://www.w3.org/ns/prov#wasAttributedTo".to_string(),
            had_primary_source: "http://www.w3.org/ns/prov#hadPrimarySource".to_string(),
            description: "http://purl.org/dc/terms/description".to_string(),
            has_update_query: "https://w3id.org/oc/ontology/hasUpdateQuery".to_string(),
            invariant_policy: InvariantPolicy::Reject,
        }
    }
}
