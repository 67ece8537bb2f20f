//! Shared utilities for integration tests.

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use proxy_mux::{handler_fn, HttpServer, NodeConfig, ProxyMux, Shutdown};

/// A handler that answers with `name` and counts its invocations.
#[allow(dead_code)]
pub fn counting(name: &'static str) -> (impl proxy_mux::Handler, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let handler = handler_fn(move |_req: Request<Body>| {
        counter.fetch_add(1, Ordering::SeqCst);
        async move { name }
    });
    (handler, hits)
}

#[allow(dead_code)]
pub fn request(target: &str) -> Request<Body> {
    Request::builder().uri(target).body(Body::empty()).unwrap()
}

#[allow(dead_code)]
pub async fn body_string(res: Response) -> String {
    let bytes = axum::body::to_bytes(res.into_body(), 64 * 1024).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Serve `mux` on an ephemeral local port.
#[allow(dead_code)]
pub async fn start_server(config: NodeConfig, mux: ProxyMux) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, mux);
    let rx = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    // Give the accept loop a moment to start.
    tokio::time::sleep(Duration::from_millis(50)).await;
    (addr, shutdown)
}
