//! Cluster-aware HTTP request multiplexer.
//!
//! Requests whose full target (path plus query) exactly matches a registered
//! route are served locally; everything else goes to a single fallback
//! handler, typically the hand-off to a proxy tier.

pub mod cluster;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod mux;
pub mod observability;
pub mod routing;

pub use cluster::{ClusterDescriptor, ClusterRole, LoadPolicy};
pub use config::NodeConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use mux::{
    handler_fn, middleware_fn, DuplicateRouteError, Handler, Middleware,
    MisconfiguredDispatcherError, Next, ProxyMux,
};
