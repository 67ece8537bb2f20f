//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for a node.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::cluster::ClusterDescriptor;
use crate::mux::ServingInfo;

/// Root configuration for a node.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct NodeConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Ports and interface this node advertises.
    pub serving: ServingInfo,

    /// Cluster role and load-balancing policy.
    pub cluster: ClusterDescriptor,

    /// Exact-target routes served locally.
    pub routes: Vec<RouteConfig>,

    /// Handler for every request no route matches.
    pub fallback: Option<FallbackConfig>,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// A locally served route with a fixed response.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Exact request target, query string included (e.g. "/health").
    pub pattern: String,

    /// Response status code.
    #[serde(default = "default_route_status")]
    pub status: u16,

    /// Response content type.
    #[serde(default = "default_content_type")]
    pub content_type: String,

    /// Response body.
    #[serde(default)]
    pub body: String,
}

fn default_route_status() -> u16 {
    200
}

fn default_content_type() -> String {
    "text/plain; charset=utf-8".to_string()
}

/// Fallback handler configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FallbackConfig {
    /// Send the client to `upstream` with the original request target appended.
    Redirect {
        upstream: String,
        #[serde(default = "default_redirect_status")]
        status: u16,
    },
    /// Answer every unmatched request with a fixed response.
    Static {
        #[serde(default = "default_static_status")]
        status: u16,
        #[serde(default)]
        body: String,
    },
}

fn default_redirect_status() -> u16 {
    307
}

fn default_static_status() -> u16 {
    502
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Total request timeout in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,

    /// Exact target that reports the cluster descriptor as JSON.
    pub cluster_info_path: Option<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
            cluster_info_path: None,
        }
    }
}
