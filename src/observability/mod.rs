//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatcher and server produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (dispatch counters, latency histogram, route gauge)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured fields, not formatted strings
//! - Metrics are cheap and recorded even when no exporter is installed

pub mod logging;
pub mod metrics;
