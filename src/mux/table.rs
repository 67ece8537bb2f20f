//! Exact-target route table.
//!
//! # Design Decisions
//! - Lookups read an immutable snapshot; no lock on the request path
//! - Writers clone the snapshot, insert, then swap, all under one mutex
//! - Duplicate check and insert happen under that same mutex

use arc_swap::ArcSwap;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::mux::error::DuplicateRouteError;
use crate::mux::handler::SharedHandler;

type Snapshot = HashMap<String, SharedHandler>;

pub struct RouteTable {
    snapshot: ArcSwap<Snapshot>,
    write_lock: Mutex<()>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self {
            snapshot: ArcSwap::from_pointee(HashMap::new()),
            write_lock: Mutex::new(()),
        }
    }

    /// Bind `pattern` to `handler`, rejecting a pattern that is already bound.
    pub fn insert(
        &self,
        pattern: impl Into<String>,
        handler: SharedHandler,
    ) -> Result<(), DuplicateRouteError> {
        let pattern = pattern.into();
        // The guard protects no data; a panicked writer left the snapshot intact.
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let current = self.snapshot.load();
        if current.contains_key(&pattern) {
            return Err(DuplicateRouteError { pattern });
        }

        let mut next = Snapshot::clone(&current);
        next.insert(pattern, handler);
        self.snapshot.store(Arc::new(next));
        Ok(())
    }

    pub fn get(&self, target: &str) -> Option<SharedHandler> {
        self.snapshot.load().get(target).cloned()
    }

    pub fn len(&self) -> usize {
        self.snapshot.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.load().is_empty()
    }

    /// Registered patterns, sorted.
    pub fn patterns(&self) -> Vec<String> {
        let mut patterns: Vec<String> = self.snapshot.load().keys().cloned().collect();
        patterns.sort();
        patterns
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RouteTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteTable")
            .field("patterns", &self.patterns())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mux::handler::handler_fn;
    use axum::body::Body;
    use axum::http::Request;

    fn named(name: &'static str) -> SharedHandler {
        Arc::new(handler_fn(move |_req: Request<Body>| async move { name }))
    }

    async fn call(handler: SharedHandler) -> String {
        let req = Request::builder().uri("/").body(Body::empty()).unwrap();
        let res = handler.call(req).await;
        let bytes = axum::body::to_bytes(res.into_body(), 1024).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let table = RouteTable::new();
        assert!(table.is_empty());

        table.insert("/health", named("health")).unwrap();
        assert_eq!(table.len(), 1);
        assert!(table.get("/health?x=1").is_none());

        let handler = table.get("/health").unwrap();
        assert_eq!(call(handler).await, "health");
    }

    #[tokio::test]
    async fn test_duplicate_keeps_original() {
        let table = RouteTable::new();
        table.insert("/a", named("first")).unwrap();

        let err = table.insert("/a", named("second")).unwrap_err();
        assert_eq!(err.pattern, "/a");
        assert_eq!(err.to_string(), "http: multiple registrations for /a");

        assert_eq!(table.len(), 1);
        assert_eq!(call(table.get("/a").unwrap()).await, "first");
    }

    #[test]
    fn test_patterns_sorted() {
        let table = RouteTable::new();
        table.insert("/b", named("b")).unwrap();
        table.insert("/a?x=1", named("a")).unwrap();
        table.insert("/a", named("a")).unwrap();
        assert_eq!(table.patterns(), vec!["/a", "/a?x=1", "/b"]);
    }

    #[test]
    fn test_old_snapshot_unaffected_by_insert() {
        let table = RouteTable::new();
        table.insert("/a", named("a")).unwrap();

        let before = table.snapshot.load_full();
        table.insert("/b", named("b")).unwrap();

        assert_eq!(before.len(), 1);
        assert_eq!(table.len(), 2);
    }
}
