//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → NodeConfig (validated, immutable)
//!     → routing::build_mux registers routes and fallback
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; routes are not hot-reloaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::FallbackConfig;
pub use schema::ListenerConfig;
pub use schema::NodeConfig;
pub use schema::ObservabilityConfig;
pub use schema::RouteConfig;
pub use schema::TimeoutConfig;
