//! The request dispatcher.
//!
//! # Responsibilities
//! - Own the route table, middleware chain and fallback slot
//! - Decide per request between an exact route and the fallback
//! - Report a missing fallback as a typed error instead of exiting
//!
//! # Design Decisions
//! - Lookup key is the full request target (path plus query)
//! - Every shared slot is an atomically swapped snapshot; dispatch takes no locks
//! - Cluster descriptor is carried, never consulted

use arc_swap::{ArcSwap, ArcSwapOption};
use axum::body::Body;
use axum::http::{Request, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use futures_util::future::{BoxFuture, FutureExt};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;
use tower::Service;

use crate::cluster::ClusterDescriptor;
use crate::mux::error::{DuplicateRouteError, MisconfiguredDispatcherError};
use crate::mux::handler::{handler_fn, Handler, SharedHandler};
use crate::mux::middleware::{MiddlewareChain, SharedMiddleware};
use crate::mux::table::RouteTable;
use crate::observability::metrics;

/// Serving details carried alongside the cluster descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServingInfo {
    /// Plain-HTTP port the node is reachable on.
    pub insecure_bind_port: Option<u16>,
    /// TLS port the node is reachable on.
    pub secure_bind_port: Option<u16>,
    /// Address of the local network interface.
    pub local_net_if_addr: Option<String>,
}

/// How a request was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Route,
    Fallback,
    Misconfigured,
}

impl DispatchOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchOutcome::Route => "route",
            DispatchOutcome::Fallback => "fallback",
            DispatchOutcome::Misconfigured => "misconfigured",
        }
    }
}

/// Cluster-aware request multiplexer.
///
/// Cloning is cheap and every clone shares the same table, chain and slot.
#[derive(Clone)]
pub struct ProxyMux {
    inner: Arc<MuxInner>,
}

struct MuxInner {
    cluster: Arc<ClusterDescriptor>,
    serving: ServingInfo,
    routes: RouteTable,
    middleware: ArcSwap<MiddlewareChain>,
    fallback: ArcSwapOption<SharedHandler>,
}

impl ProxyMux {
    /// Create an empty mux bound to `cluster`.
    pub fn new(cluster: impl Into<Arc<ClusterDescriptor>>) -> Self {
        Self::with_serving(cluster, ServingInfo::default())
    }

    pub fn with_serving(cluster: impl Into<Arc<ClusterDescriptor>>, serving: ServingInfo) -> Self {
        Self {
            inner: Arc::new(MuxInner {
                cluster: cluster.into(),
                serving,
                routes: RouteTable::new(),
                middleware: ArcSwap::from_pointee(MiddlewareChain::new()),
                fallback: ArcSwapOption::empty(),
            }),
        }
    }

    pub fn cluster(&self) -> &Arc<ClusterDescriptor> {
        &self.inner.cluster
    }

    pub fn serving(&self) -> &ServingInfo {
        &self.inner.serving
    }

    /// Append steps to the middleware chain.
    pub fn register_middleware<I>(&self, steps: I)
    where
        I: IntoIterator<Item = SharedMiddleware>,
    {
        let steps: Vec<SharedMiddleware> = steps.into_iter().collect();
        if steps.is_empty() {
            return;
        }
        let added = steps.len();
        self.inner.middleware.rcu(|chain| {
            let mut next = MiddlewareChain::clone(chain);
            next.extend(steps.iter().cloned());
            next
        });
        tracing::debug!(added, "Middleware registered");
    }

    /// Snapshot of the registered middleware chain.
    pub fn middleware(&self) -> Arc<MiddlewareChain> {
        self.inner.middleware.load_full()
    }

    /// Bind an exact request target to `handler`.
    pub fn register_route<H: Handler>(
        &self,
        pattern: impl Into<String>,
        handler: H,
    ) -> Result<(), DuplicateRouteError> {
        self.register_shared_route(pattern, Arc::new(handler))
    }

    /// Bind an exact request target to an async closure.
    pub fn register_route_fn<F, Fut, R>(
        &self,
        pattern: impl Into<String>,
        f: F,
    ) -> Result<(), DuplicateRouteError>
    where
        F: Fn(Request<Body>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        self.register_route(pattern, handler_fn(f))
    }

    pub fn register_shared_route(
        &self,
        pattern: impl Into<String>,
        handler: SharedHandler,
    ) -> Result<(), DuplicateRouteError> {
        let pattern = pattern.into();
        match self.inner.routes.insert(pattern.clone(), handler) {
            Ok(()) => {
                tracing::info!(pattern = %pattern, "Route registered");
                metrics::record_route_registered();
                Ok(())
            }
            Err(e) => {
                tracing::warn!(pattern = %pattern, "Duplicate route registration rejected");
                Err(e)
            }
        }
    }

    /// Replace the fallback handler. The last call wins.
    pub fn set_fallback_handler<H: Handler>(&self, handler: H) {
        self.set_shared_fallback(Arc::new(handler));
    }

    pub fn set_shared_fallback(&self, handler: SharedHandler) {
        let replaced = self.inner.fallback.swap(Some(Arc::new(handler))).is_some();
        tracing::info!(replaced, "Fallback handler set");
    }

    pub fn has_fallback(&self) -> bool {
        self.inner.fallback.load().is_some()
    }

    /// Registered route patterns, sorted.
    pub fn routes(&self) -> Vec<String> {
        self.inner.routes.patterns()
    }

    /// Startup self-check: the mux can only answer every request once a
    /// fallback is set.
    pub fn ensure_ready(&self) -> Result<(), MisconfiguredDispatcherError> {
        if self.has_fallback() {
            Ok(())
        } else {
            Err(MisconfiguredDispatcherError { target: None })
        }
    }

    /// Route `req` to its exact-match handler, else to the fallback.
    ///
    /// The selected handler's response is returned untouched. A miss with no
    /// fallback set is reported to the caller; nothing is written for it.
    pub async fn dispatch(&self, req: Request<Body>) -> Result<Response, MisconfiguredDispatcherError> {
        let start = Instant::now();
        let target = request_target(req.uri());

        let (endpoint, outcome) = match self.inner.routes.get(&target) {
            Some(handler) => {
                tracing::debug!(request_target = %target, "Route matched");
                (handler, DispatchOutcome::Route)
            }
            None => match self.fallback() {
                Some(fallback) => {
                    tracing::debug!(request_target = %target, "Delegating to fallback handler");
                    (fallback, DispatchOutcome::Fallback)
                }
                None => {
                    tracing::error!(
                        request_target = %target,
                        "No route matched and no fallback handler is set"
                    );
                    metrics::record_dispatch(DispatchOutcome::Misconfigured.as_str(), start);
                    return Err(MisconfiguredDispatcherError {
                        target: Some(target),
                    });
                }
            },
        };

        let chain = self.inner.middleware.load_full();
        let response = chain.run(endpoint, req).await;
        metrics::record_dispatch(outcome.as_str(), start);
        Ok(response)
    }

    /// Dispatch, degrading a missing fallback to a 500 for this request only.
    pub async fn serve(&self, req: Request<Body>) -> Response {
        match self.dispatch(req).await {
            Ok(response) => response,
            Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
        }
    }

    fn fallback(&self) -> Option<SharedHandler> {
        self.inner.fallback.load_full().map(|slot| SharedHandler::clone(&slot))
    }
}

impl std::fmt::Debug for ProxyMux {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyMux")
            .field("cluster", &self.inner.cluster)
            .field("routes", &self.inner.routes)
            .field("middleware", &self.inner.middleware.load().len())
            .field("has_fallback", &self.has_fallback())
            .finish()
    }
}

/// Lookup key for a request: path plus query, or the whole URI when the
/// target has no path (authority-form `CONNECT`).
pub fn request_target(uri: &Uri) -> String {
    match uri.path_and_query() {
        Some(pq) => pq.as_str().to_string(),
        None => uri.to_string(),
    }
}

impl Handler for ProxyMux {
    fn call(&self, req: Request<Body>) -> BoxFuture<'static, Response> {
        let mux = self.clone();
        async move { mux.serve(req).await }.boxed()
    }
}

impl Service<Request<Body>> for ProxyMux {
    type Response = Response;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Response, Infallible>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let mux = self.clone();
        async move { Ok(mux.serve(req).await) }.boxed()
    }
}
