//! Tracing initialisation.

use tracing_subscriber::EnvFilter;

use crate::config::ObservabilityConfig;

/// Install a global fmt subscriber. `RUST_LOG` wins over the configured
/// level. Returns `false` if a subscriber was already installed.
pub fn init_tracing(config: &ObservabilityConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.is_ok()
}
