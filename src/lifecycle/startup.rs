//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Build the mux from configuration
//! - Refuse to serve when no fallback handler is set
//!
//! # Design Decisions
//! - Fail fast: any startup error is returned to `main`
//! - The self-check runs once, before the listener is bound

use std::path::Path;
use thiserror::Error;

use crate::config::loader::{load_config, ConfigError};
use crate::config::NodeConfig;
use crate::mux::{MisconfiguredDispatcherError, ProxyMux};
use crate::routing::{build_mux, BuildError};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to build mux: {0}")]
    Build(#[from] BuildError),

    #[error("refusing to serve: {0}")]
    NotReady(#[from] MisconfiguredDispatcherError),
}

/// Load the config file, or use defaults when no path is given.
///
/// Runs before logging is initialised, so it does not log.
pub fn load(path: Option<&Path>) -> Result<NodeConfig, StartupError> {
    match path {
        Some(path) => Ok(load_config(path)?),
        None => Ok(NodeConfig::default()),
    }
}

/// Verify the mux can answer every request.
pub fn self_check(mux: &ProxyMux) -> Result<(), MisconfiguredDispatcherError> {
    mux.ensure_ready().inspect_err(|_| {
        tracing::error!(
            routes = mux.routes().len(),
            "No fallback handler registered; configure [fallback] before serving"
        );
    })
}

/// Build the mux and run the self-check.
pub fn prepare(config: &NodeConfig) -> Result<ProxyMux, StartupError> {
    let mux = build_mux(config)?;
    self_check(&mux)?;
    Ok(mux)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FallbackConfig;

    #[test]
    fn test_prepare_requires_fallback() {
        let err = prepare(&NodeConfig::default()).unwrap_err();
        assert!(matches!(err, StartupError::NotReady(_)));
        assert_eq!(
            err.to_string(),
            "refusing to serve: no route matched <startup check> and no fallback handler is set"
        );
    }

    #[test]
    fn test_prepare_with_fallback() {
        let mut config = NodeConfig::default();
        config.fallback = Some(FallbackConfig::Static {
            status: 502,
            body: String::new(),
        });
        let mux = prepare(&config).unwrap();
        assert!(mux.has_fallback());
    }

    #[test]
    fn test_load_defaults_without_path() {
        let config = load(None).unwrap();
        assert!(config.routes.is_empty());
    }

    #[test]
    fn test_load_from_path_without_subscriber() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[listener]\nbind_address = \"127.0.0.1:9000\"").unwrap();

        // No subscriber is installed yet when `main` calls this.
        let config = tracing::subscriber::with_default(
            tracing::subscriber::NoSubscriber::default(),
            || load(Some(file.path())),
        )
        .unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
    }
}
