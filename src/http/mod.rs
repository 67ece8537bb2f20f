//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, tower-http layers)
//!     → request.rs (assign and propagate request ID)
//!     → ProxyMux (route table or fallback)
//!     → Send to client
//! ```

pub mod request;
pub mod server;

pub use request::{UuidRequestId, X_REQUEST_ID};
pub use server::HttpServer;
