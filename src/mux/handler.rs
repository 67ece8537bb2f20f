//! The handler capability shared by routes, the fallback and the mux itself.

use axum::body::Body;
use axum::http::Request;
use axum::response::{IntoResponse, Response};
use futures_util::future::{BoxFuture, FutureExt};
use std::future::Future;
use std::sync::Arc;

/// Processes a request and produces exactly one response.
///
/// Failures are expressed in the response itself; callers of a handler never
/// see an error value from it.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, req: Request<Body>) -> BoxFuture<'static, Response>;
}

/// A handler shared between the route table snapshots and in-flight requests.
pub type SharedHandler = Arc<dyn Handler>;

impl<H: Handler + ?Sized> Handler for Arc<H> {
    fn call(&self, req: Request<Body>) -> BoxFuture<'static, Response> {
        (**self).call(req)
    }
}

/// Handler built from an async closure. See [`handler_fn`].
#[derive(Clone)]
pub struct HandlerFn<F> {
    f: F,
}

/// Wrap an async closure as a [`Handler`].
///
/// ```ignore
/// mux.register_route("/ping", handler_fn(|_req| async { "pong" }))?;
/// ```
pub fn handler_fn<F, Fut, R>(f: F) -> HandlerFn<F>
where
    F: Fn(Request<Body>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse,
{
    HandlerFn { f }
}

impl<F, Fut, R> Handler for HandlerFn<F>
where
    F: Fn(Request<Body>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse,
{
    fn call(&self, req: Request<Body>) -> BoxFuture<'static, Response> {
        let fut = (self.f)(req);
        async move { fut.await.into_response() }.boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_handler_fn_converts_into_response() {
        let handler = handler_fn(|req: Request<Body>| async move {
            (StatusCode::ACCEPTED, req.uri().path().to_string())
        });

        let req = Request::builder().uri("/echo").body(Body::empty()).unwrap();
        let res = handler.call(req).await;
        assert_eq!(res.status(), StatusCode::ACCEPTED);

        let body = axum::body::to_bytes(res.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"/echo");
    }
}
