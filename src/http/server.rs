//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Mount the mux as the single Axum service
//! - Wire up middleware (tracing, timeout, request ID)
//! - Bind server to listener
//! - Serve until shutdown is signalled

use axum::Router;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::NodeConfig;
use crate::http::request::{UuidRequestId, X_REQUEST_ID};
use crate::lifecycle::shutdown::wait_for_signal;
use crate::mux::ProxyMux;

/// HTTP front end for a [`ProxyMux`].
pub struct HttpServer {
    router: Router,
    config: NodeConfig,
    mux: ProxyMux,
}

impl HttpServer {
    pub fn new(config: NodeConfig, mux: ProxyMux) -> Self {
        let router = Self::build_router(&config, mux.clone());
        Self {
            router,
            config,
            mux,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &NodeConfig, mux: ProxyMux) -> Router {
        // Last layer added runs first.
        Router::new()
            .fallback_service(mux)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, UuidRequestId))
    }

    /// The fully layered router, for embedding or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            routes = self.mux.routes().len(),
            cluster = %self.mux.cluster().name(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(wait_for_signal(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn mux(&self) -> &ProxyMux {
        &self.mux
    }
}
