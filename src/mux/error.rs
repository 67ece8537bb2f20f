//! Dispatcher error definitions.

use thiserror::Error;

/// A route pattern was registered twice.
///
/// The first registration stays bound to the pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("http: multiple registrations for {pattern}")]
pub struct DuplicateRouteError {
    pub pattern: String,
}

/// A request matched no route and no fallback handler is set.
///
/// This is a bootstrap defect, not a per-request fault. `target` is `None`
/// when the startup self-check found the fallback slot empty.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "no route matched {} and no fallback handler is set",
    .target.as_deref().unwrap_or("<startup check>")
)]
pub struct MisconfiguredDispatcherError {
    pub target: Option<String>,
}
