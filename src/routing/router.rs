//! Route registration and lookup.
//!
//! # Responsibilities
//! - Collect (pattern, dispatch) pairs during startup
//! - Reject duplicate and malformed patterns
//! - Freeze the table into an immutable `ComposedRouter`
//! - Resolve a request path to the most specific registered pattern
//!
//! # Design Decisions
//! - Immutable after `compose()` (thread-safe without locks)
//! - O(1) exact lookup via HashMap
//! - O(n) subtree scan, longest pattern first (acceptable for typical route counts)
//! - Explicit not-found `Status` rather than silent default
//! - No trailing-slash redirect: `/a` does not reach a lone `/a/` subtree

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;

use crate::routing::dispatch::{Dispatch, Reply, SharedDispatch};
use crate::routing::matcher::{MatchKind, Pattern};
use crate::routing::RouteError;
use crate::status::Status;

/// One registered route.
#[derive(Clone)]
pub struct RouteEntry {
    pub pattern: Pattern,
    pub dispatch: SharedDispatch,
}

impl std::fmt::Debug for RouteEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteEntry")
            .field("pattern", &self.pattern)
            .finish_non_exhaustive()
    }
}

/// Pattern that served a request, attached to the response extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedPattern(pub String);

/// Builder collecting routes before the host starts serving.
#[derive(Debug, Default)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `dispatch` under `pattern`. The first registration owns the pattern.
    pub fn register<D: Dispatch>(
        &mut self,
        pattern: &str,
        dispatch: D,
    ) -> Result<&mut Self, RouteError> {
        self.register_shared(pattern, Arc::new(dispatch))
    }

    /// Register an already shared dispatch capability.
    pub fn register_shared(
        &mut self,
        pattern: &str,
        dispatch: SharedDispatch,
    ) -> Result<&mut Self, RouteError> {
        let pattern = Pattern::parse(pattern)?;
        if self.contains(pattern.as_str()) {
            return Err(RouteError::DuplicatePattern(pattern.as_str().to_string()));
        }
        tracing::debug!(pattern = %pattern, kind = ?pattern.kind(), "Route registered");
        self.entries.push(RouteEntry { pattern, dispatch });
        Ok(self)
    }

    pub fn contains(&self, pattern: &str) -> bool {
        self.entries.iter().any(|e| e.pattern.as_str() == pattern)
    }

    /// Registered patterns, in registration order.
    pub fn patterns(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.pattern.to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Freeze the table into a single dispatch surface.
    pub fn compose(self) -> ComposedRouter {
        let mut exact = HashMap::new();
        let mut subtrees = Vec::new();
        let mut patterns = Vec::with_capacity(self.entries.len());

        for entry in self.entries {
            patterns.push(entry.pattern.to_string());
            match entry.pattern.kind() {
                MatchKind::Exact => {
                    exact.insert(entry.pattern.to_string(), entry);
                }
                MatchKind::Subtree => subtrees.push(entry),
            }
        }

        // Stable sort keeps registration order among equal lengths.
        subtrees.sort_by(|a, b| b.pattern.specificity().cmp(&a.pattern.specificity()));

        ComposedRouter {
            exact,
            subtrees,
            patterns,
        }
    }
}

/// Immutable dispatch surface produced by [`RouteTable::compose`].
#[derive(Debug)]
pub struct ComposedRouter {
    exact: HashMap<String, RouteEntry>,
    subtrees: Vec<RouteEntry>,
    patterns: Vec<String>,
}

impl ComposedRouter {
    /// Find the route serving `path`: exact match first, then the longest subtree.
    pub fn resolve(&self, path: &str) -> Option<&RouteEntry> {
        if let Some(entry) = self.exact.get(path) {
            return Some(entry);
        }
        self.subtrees.iter().find(|e| e.pattern.matches(path))
    }

    /// Dispatch a request to its route, or answer not-found.
    pub async fn dispatch(&self, request: Request<Body>) -> (Option<MatchedPattern>, Reply) {
        let path = request.uri().path().to_string();
        match self.resolve(&path) {
            Some(entry) => {
                let matched = MatchedPattern(entry.pattern.to_string());
                let reply = entry.dispatch.dispatch(request).await;
                (Some(matched), reply)
            }
            None => {
                tracing::debug!(path = %path, "No route matched");
                let status = Status::not_found(format!("no route for {}", path));
                (None, Reply::failed(status))
            }
        }
    }

    /// Every registered pattern, in registration order.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &'static str) -> impl Dispatch {
        move |_req: Request<Body>| async move { Reply::ok(name) }
    }

    fn request(path: &str) -> Request<Body> {
        Request::builder().uri(path).body(Body::empty()).unwrap()
    }

    async fn body_of(router: &ComposedRouter, path: &str) -> Option<String> {
        let (matched, reply) = router.dispatch(request(path)).await;
        matched.map(|_| String::from_utf8(reply.payload.to_vec()).unwrap())
    }

    #[test]
    fn duplicate_pattern_rejected() {
        let mut table = RouteTable::new();
        table.register("/a", named("first")).unwrap();
        table.register("/b", named("b")).unwrap();
        let err = table.register("/a", named("second")).unwrap_err();
        assert_eq!(err, RouteError::DuplicatePattern("/a".into()));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn duplicate_rejected_regardless_of_order() {
        for others in [vec![], vec!["/x", "/y/"], vec!["/z/", "/"]] {
            let mut table = RouteTable::new();
            for p in &others {
                table.register(p, named("other")).unwrap();
            }
            table.register("/a", named("a")).unwrap();
            assert!(matches!(
                table.register("/a", named("a")),
                Err(RouteError::DuplicatePattern(_))
            ));
        }
    }

    #[test]
    fn invalid_pattern_rejected() {
        let mut table = RouteTable::new();
        assert!(matches!(
            table.register("health", named("h")),
            Err(RouteError::InvalidPattern(_))
        ));
        assert!(table.is_empty());
    }

    #[tokio::test]
    async fn exact_preferred_over_subtree() {
        let mut table = RouteTable::new();
        table.register("/debug/", named("subtree")).unwrap();
        table.register("/debug/cmdline", named("exact")).unwrap();
        let router = table.compose();

        assert_eq!(body_of(&router, "/debug/cmdline").await.as_deref(), Some("exact"));
        assert_eq!(body_of(&router, "/debug/other").await.as_deref(), Some("subtree"));
    }

    #[tokio::test]
    async fn longest_subtree_wins() {
        let mut table = RouteTable::new();
        table.register("/", named("root")).unwrap();
        table.register("/api/", named("api")).unwrap();
        table.register("/api/v1/", named("v1")).unwrap();
        let router = table.compose();

        assert_eq!(body_of(&router, "/api/v1/users").await.as_deref(), Some("v1"));
        assert_eq!(body_of(&router, "/api/v2").await.as_deref(), Some("api"));
        assert_eq!(body_of(&router, "/elsewhere").await.as_deref(), Some("root"));
    }

    #[tokio::test]
    async fn unknown_path_is_not_found() {
        let mut table = RouteTable::new();
        table.register("/a", named("a")).unwrap();
        let router = table.compose();

        let (matched, reply) = router.dispatch(request("/b")).await;
        assert!(matched.is_none());
        assert_eq!(reply.status.code(), crate::status::Code::NOT_FOUND);
        assert!(reply.payload.is_empty());
    }

    #[tokio::test]
    async fn subtree_root_without_slash_is_not_found() {
        let mut table = RouteTable::new();
        table.register("/a/", named("a")).unwrap();
        let router = table.compose();

        let (matched, reply) = router.dispatch(request("/a")).await;
        assert!(matched.is_none());
        assert_eq!(reply.status.code(), crate::status::Code::NOT_FOUND);
        assert_eq!(body_of(&router, "/a/").await.as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn composition_is_deterministic() {
        let patterns = ["/", "/a", "/a/", "/a/b/", "/c"];
        let build = || {
            let mut table = RouteTable::new();
            for p in patterns {
                table.register(p, move |_req: Request<Body>| async move { Reply::ok(p) }).unwrap();
            }
            table.compose()
        };
        let first = build();
        let second = build();
        assert_eq!(first.patterns(), second.patterns());

        for path in ["/", "/a", "/a/", "/a/b/c", "/a/x", "/c", "/c/d", "/zzz"] {
            assert_eq!(body_of(&first, path).await, body_of(&second, path).await, "path {}", path);
        }
    }
}
