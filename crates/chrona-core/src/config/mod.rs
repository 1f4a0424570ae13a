pub mod observability_config;
pub mod provenance_config;
pub mod temporal_config;

use serde::{Deserialize, Serialize};

pub use observability_config::ObservabilityConfig;
pub use provenance_config::{InvariantPolicy, ProvenanceConfig};
pub use temporal_config::{CoveragePolicy, DeltaStrategy, ReplayDirection, TemporalConfig};

/// Top-level configuration aggregating all subsystem configs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ChronaConfig {
    pub temporal: TemporalConfig,
    pub provenance: ProvenanceConfig,
    pub observability: ObservabilityConfig,
}

impl ChronaConfig {
    /// Load config from a TOML string, falling back to defaults for missing fields.
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }
}
