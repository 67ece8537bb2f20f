//! Fixed-response handlers.
//!
//! # Responsibilities
//! - Serve configured routes with a fixed status, content type and body
//! - Report the cluster descriptor as JSON
//!
//! # Design Decisions
//! - Body is shared (`Bytes`) so each response is a cheap clone

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderValue, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use futures_util::future::{self, BoxFuture, FutureExt};
use std::sync::Arc;

use crate::cluster::ClusterDescriptor;
use crate::config::RouteConfig;
use crate::mux::Handler;

/// Answers every request with the same response.
#[derive(Debug, Clone)]
pub struct StaticRoute {
    status: StatusCode,
    content_type: HeaderValue,
    body: Bytes,
}

impl StaticRoute {
    pub fn new(status: StatusCode, content_type: HeaderValue, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            content_type,
            body: body.into(),
        }
    }

    /// Build from a route entry. Invalid values fall back to 200 and `text/plain`.
    pub fn from_config(config: &RouteConfig) -> Self {
        let status = StatusCode::from_u16(config.status).unwrap_or(StatusCode::OK);
        let content_type = HeaderValue::from_str(&config.content_type)
            .unwrap_or_else(|_| HeaderValue::from_static("text/plain; charset=utf-8"));
        Self::new(status, content_type, config.body.clone())
    }

    fn response(&self) -> Response {
        (
            self.status,
            [(header::CONTENT_TYPE, self.content_type.clone())],
            self.body.clone(),
        )
            .into_response()
    }
}

impl Handler for StaticRoute {
    fn call(&self, _req: Request<Body>) -> BoxFuture<'static, Response> {
        future::ready(self.response()).boxed()
    }
}

/// Serves the node's cluster descriptor as JSON.
#[derive(Debug, Clone)]
pub struct ClusterInfo {
    cluster: Arc<ClusterDescriptor>,
}

impl ClusterInfo {
    pub fn new(cluster: Arc<ClusterDescriptor>) -> Self {
        Self { cluster }
    }
}

impl Handler for ClusterInfo {
    fn call(&self, _req: Request<Body>) -> BoxFuture<'static, Response> {
        future::ready(axum::Json(self.cluster.as_ref().clone()).into_response()).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::ClusterRole;

    fn req() -> Request<Body> {
        Request::builder().uri("/").body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_static_route_from_config() {
        let route = StaticRoute::from_config(&RouteConfig {
            pattern: "/health".into(),
            status: 200,
            content_type: "application/json".into(),
            body: r#"{"status":"ok"}"#.into(),
        });

        let res = route.call(req()).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers()[header::CONTENT_TYPE], "application/json");
        let body = axum::body::to_bytes(res.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], br#"{"status":"ok"}"#);
    }

    #[tokio::test]
    async fn test_cluster_info_json() {
        let cluster = ClusterDescriptor::builder()
            .enabled(true)
            .role(ClusterRole::Master)
            .name("edge")
            .cluster_id("c-01")
            .build();
        let handler = ClusterInfo::new(Arc::new(cluster));

        let res = handler.call(req()).await;
        let body = axum::body::to_bytes(res.into_body(), 4096).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["role"], "master");
        assert_eq!(value["name"], "edge");
        assert_eq!(value["load_policy"], "round_robin");
        assert_eq!(value["is_master_handler"], false);
    }
}
