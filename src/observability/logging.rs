//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the global tracing subscriber
//! - Resolve the log filter from `RUST_LOG`, falling back to config
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - Environment wins over config so operators can raise verbosity ad hoc

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;

/// Build the filter: `RUST_LOG` if set, else `proxy_mux=<level>,tower_http=<level>`.
pub fn env_filter(config: &ObservabilityConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "proxy_mux={level},tower_http={level}",
            level = config.log_level
        )
        .into()
    })
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init(config: &ObservabilityConfig) -> Result<(), tracing_subscriber::util::TryInitError> {
    tracing_subscriber::registry()
        .with(env_filter(config))
        .with(tracing_subscriber::fmt::layer())
        .try_init()
}
