//! Config-driven route and fallback registration.
//!
//! # Data Flow
//! ```text
//! NodeConfig (validated)
//!     → ProxyMux::with_serving(cluster, serving)
//!     → static_route.rs (one StaticRoute per [[routes]] entry)
//!     → static_route.rs (ClusterInfo at cluster_info_path, if set)
//!     → fallback.rs (redirect or static fallback)
//!     → ProxyMux ready for startup self-check
//! ```
//!
//! # Design Decisions
//! - Registration order follows the config file
//! - A missing `[fallback]` is not an error here; the self-check decides

pub mod fallback;
pub mod static_route;

use std::sync::Arc;
use thiserror::Error;

use crate::config::NodeConfig;
use crate::mux::{DuplicateRouteError, ProxyMux};

pub use fallback::RedirectFallback;
pub use static_route::{ClusterInfo, StaticRoute};

/// Errors raised while turning configuration into a mux.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    DuplicateRoute(#[from] DuplicateRouteError),

    #[error("invalid fallback upstream {upstream:?}: {source}")]
    InvalidUpstream {
        upstream: String,
        #[source]
        source: url::ParseError,
    },
}

/// Build a mux with every route and the fallback from `config` registered.
pub fn build_mux(config: &NodeConfig) -> Result<ProxyMux, BuildError> {
    let mux = ProxyMux::with_serving(config.cluster.clone(), config.serving.clone());

    for route in &config.routes {
        mux.register_route(route.pattern.clone(), StaticRoute::from_config(route))?;
    }

    if let Some(path) = &config.observability.cluster_info_path {
        mux.register_route(path.clone(), ClusterInfo::new(mux.cluster().clone()))?;
    }

    if let Some(fallback) = &config.fallback {
        mux.set_shared_fallback(fallback::from_config(fallback)?);
    }

    tracing::info!(
        routes = mux.routes().len(),
        has_fallback = mux.has_fallback(),
        cluster = %config.cluster.name(),
        role = %config.cluster.role(),
        "Mux built"
    );

    Ok(mux)
}
