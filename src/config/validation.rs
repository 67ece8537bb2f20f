//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Detect duplicate route patterns before any registration happens
//! - Validate value ranges (timeouts > 0, status codes valid)
//! - Check cluster identity and fallback upstream
//! - Check listener and metrics addresses parse as socket addresses
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: NodeConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use axum::http::StatusCode;
use std::collections::HashSet;
use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

use crate::config::schema::{FallbackConfig, NodeConfig};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("route pattern {0:?} must start with '/'")]
    InvalidPattern(String),

    #[error("route pattern {0:?} is declared more than once")]
    DuplicatePattern(String),

    #[error("{context}: invalid status code {status}")]
    InvalidStatus { context: String, status: u16 },

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroTimeout,

    #[error("cluster is enabled but {0} is empty")]
    MissingClusterField(&'static str),

    #[error("fallback upstream {upstream:?} is not an absolute http(s) URL")]
    InvalidUpstream { upstream: String },

    #[error("observability.cluster_info_path {0:?} collides with a configured route")]
    ClusterInfoCollision(String),

    #[error("{field}: {address:?} is not a socket address")]
    InvalidAddress { field: &'static str, address: String },
}

pub fn validate_config(config: &NodeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address(&mut errors, "listener.bind_address", &config.listener.bind_address);
    check_address(
        &mut errors,
        "observability.metrics_address",
        &config.observability.metrics_address,
    );

    let mut seen = HashSet::new();
    for route in &config.routes {
        if !route.pattern.starts_with('/') {
            errors.push(ValidationError::InvalidPattern(route.pattern.clone()));
        }
        if !seen.insert(route.pattern.as_str()) {
            errors.push(ValidationError::DuplicatePattern(route.pattern.clone()));
        }
        check_status(&mut errors, format!("route {}", route.pattern), route.status);
    }

    if let Some(path) = &config.observability.cluster_info_path {
        if !path.starts_with('/') {
            errors.push(ValidationError::InvalidPattern(path.clone()));
        }
        if seen.contains(path.as_str()) {
            errors.push(ValidationError::ClusterInfoCollision(path.clone()));
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if config.cluster.enabled() {
        if config.cluster.name().is_empty() {
            errors.push(ValidationError::MissingClusterField("cluster.name"));
        }
        if config.cluster.cluster_id().is_empty() {
            errors.push(ValidationError::MissingClusterField("cluster.cluster_id"));
        }
    }

    match &config.fallback {
        Some(FallbackConfig::Redirect { upstream, status }) => {
            let valid = Url::parse(upstream)
                .map(|u| matches!(u.scheme(), "http" | "https") && u.has_host())
                .unwrap_or(false);
            if !valid {
                errors.push(ValidationError::InvalidUpstream {
                    upstream: upstream.clone(),
                });
            }
            check_status(&mut errors, "fallback".to_string(), *status);
        }
        Some(FallbackConfig::Static { status, .. }) => {
            check_status(&mut errors, "fallback".to_string(), *status);
        }
        None => {}
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_status(errors: &mut Vec<ValidationError>, context: String, status: u16) {
    if StatusCode::from_u16(status).is_err() {
        errors.push(ValidationError::InvalidStatus { context, status });
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, address: &str) {
    if address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            address: address.to_string(),
        });
    }
}
