//! Fallback handlers built from configuration.
//!
//! # Responsibilities
//! - Redirect unmatched requests to the upstream tier
//! - Or answer them with a fixed response
//!
//! # Design Decisions
//! - Redirect keeps the full original target (path and query)
//! - No connection is made to the upstream from this node

use axum::body::Body;
use axum::http::{header, HeaderValue, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use futures_util::future::{self, BoxFuture, FutureExt};
use std::sync::Arc;
use url::Url;

use crate::config::FallbackConfig;
use crate::mux::{request_target, Handler, SharedHandler};
use crate::routing::static_route::StaticRoute;
use crate::routing::BuildError;

/// Redirects every request to `upstream` + original request target.
#[derive(Debug, Clone)]
pub struct RedirectFallback {
    /// Upstream origin without a trailing slash.
    upstream: String,
    status: StatusCode,
}

impl RedirectFallback {
    pub fn new(upstream: &Url, status: StatusCode) -> Self {
        Self {
            upstream: upstream.as_str().trim_end_matches('/').to_string(),
            status,
        }
    }

    fn response(&self, req: &Request<Body>) -> Response {
        let location = format!("{}{}", self.upstream, request_target(req.uri()));
        match HeaderValue::from_str(&location) {
            Ok(value) => (self.status, [(header::LOCATION, value)]).into_response(),
            Err(_) => {
                tracing::warn!(location = %location, "Redirect target is not a valid header value");
                (StatusCode::BAD_REQUEST, "Invalid request target").into_response()
            }
        }
    }
}

impl Handler for RedirectFallback {
    fn call(&self, req: Request<Body>) -> BoxFuture<'static, Response> {
        future::ready(self.response(&req)).boxed()
    }
}

/// Build the configured fallback handler.
///
/// Values are expected to have passed validation; an unusable upstream URL is
/// still reported rather than assumed away.
pub fn from_config(config: &FallbackConfig) -> Result<SharedHandler, BuildError> {
    let handler: SharedHandler = match config {
        FallbackConfig::Redirect { upstream, status } => {
            let url = Url::parse(upstream).map_err(|source| BuildError::InvalidUpstream {
                upstream: upstream.clone(),
                source,
            })?;
            let status = StatusCode::from_u16(*status).unwrap_or(StatusCode::TEMPORARY_REDIRECT);
            Arc::new(RedirectFallback::new(&url, status))
        }
        FallbackConfig::Static { status, body } => {
            let status = StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY);
            Arc::new(StaticRoute::new(
                status,
                HeaderValue::from_static("text/plain; charset=utf-8"),
                body.clone(),
            ))
        }
    };
    Ok(handler)
}
