//! Middleware chain.
//!
//! # Responsibilities
//! - Hold request-processing steps in registration order
//! - Wrap route and fallback delegation alike
//!
//! # Design Decisions
//! - Append-only; duplicates permitted
//! - First registered step is outermost
//! - A step short-circuits by returning without calling `next`

use axum::body::Body;
use axum::http::Request;
use axum::response::{IntoResponse, Response};
use futures_util::future::{BoxFuture, FutureExt};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::mux::handler::SharedHandler;

/// A single request-processing step.
pub trait Middleware: Send + Sync + 'static {
    fn handle(&self, req: Request<Body>, next: Next) -> BoxFuture<'static, Response>;

    /// Box this step for registration.
    fn shared(self) -> SharedMiddleware
    where
        Self: Sized,
    {
        Arc::new(self)
    }
}

pub type SharedMiddleware = Arc<dyn Middleware>;

/// The remainder of the chain, ending in the selected handler.
pub struct Next {
    chain: Arc<MiddlewareChain>,
    index: usize,
    endpoint: SharedHandler,
}

impl Next {
    /// Hand the request to the next step, or to the handler once the chain is exhausted.
    pub fn run(mut self, req: Request<Body>) -> BoxFuture<'static, Response> {
        match self.chain.steps.get(self.index).cloned() {
            Some(step) => {
                self.index += 1;
                step.handle(req, self)
            }
            None => self.endpoint.call(req),
        }
    }
}

/// Ordered sequence of registered steps.
#[derive(Clone, Default)]
pub struct MiddlewareChain {
    steps: Vec<SharedMiddleware>,
}

impl MiddlewareChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub(crate) fn extend<I>(&mut self, steps: I)
    where
        I: IntoIterator<Item = SharedMiddleware>,
    {
        self.steps.extend(steps);
    }

    /// Run `req` through every step and then `endpoint`.
    pub(crate) fn run(
        self: Arc<Self>,
        endpoint: SharedHandler,
        req: Request<Body>,
    ) -> BoxFuture<'static, Response> {
        // Skip building a `Next` on the common empty-chain path.
        if self.steps.is_empty() {
            return endpoint.call(req);
        }
        Next {
            chain: self,
            index: 0,
            endpoint,
        }
        .run(req)
    }
}

impl fmt::Debug for MiddlewareChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareChain")
            .field("len", &self.steps.len())
            .finish()
    }
}

/// Middleware built from an async closure. See [`middleware_fn`].
#[derive(Clone)]
pub struct MiddlewareFn<F> {
    f: F,
}

/// Wrap an async closure taking the request and the rest of the chain.
pub fn middleware_fn<F, Fut, R>(f: F) -> MiddlewareFn<F>
where
    F: Fn(Request<Body>, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse,
{
    MiddlewareFn { f }
}

impl<F, Fut, R> Middleware for MiddlewareFn<F>
where
    F: Fn(Request<Body>, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse,
{
    fn handle(&self, req: Request<Body>, next: Next) -> BoxFuture<'static, Response> {
        let fut = (self.f)(req, next);
        async move { fut.await.into_response() }.boxed()
    }
}
