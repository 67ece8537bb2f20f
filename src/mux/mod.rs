//! Request dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request
//!     → dispatcher.rs (compute request target: path + query)
//!     → table.rs (exact lookup in current snapshot)
//!         hit  → middleware.rs chain → route handler
//!         miss → middleware.rs chain → fallback handler
//!         miss, no fallback → MisconfiguredDispatcherError
//!
//! Registration (bootstrap, rare):
//!     register_route → clone snapshot → insert → atomic swap
//!     register_middleware → append to chain → atomic swap
//!     set_fallback_handler → atomic swap (last writer wins)
//! ```
//!
//! # Design Decisions
//! - Exact matching only; anything else is the fallback's business
//! - Registration errors are returned, never panics
//! - Misconfiguration fails the single request, not the process

pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod middleware;
pub mod table;

pub use dispatcher::{request_target, DispatchOutcome, ProxyMux, ServingInfo};
pub use error::{DuplicateRouteError, MisconfiguredDispatcherError};
pub use handler::{handler_fn, Handler, SharedHandler};
pub use middleware::{middleware_fn, Middleware, MiddlewareChain, Next, SharedMiddleware};
pub use table::RouteTable;
