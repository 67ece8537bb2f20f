//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Build mux → Self-check → Start listener
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Drain connections → Exit
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then mux, then listener
//! - A mux without a fallback never starts serving

pub mod shutdown;
pub mod startup;

pub use shutdown::Shutdown;
