//! Process introspection endpoints.
//!
//! Registered as ordinary routes so they share the response writer and
//! metrics decorator with business handlers.

pub mod handlers;

use std::sync::Arc;
use std::time::Instant;

use crate::config::Environment;
use crate::lifecycle::Lifecycle;
use crate::routing::{RouteError, RouteTable};

pub const INDEX_PATTERN: &str = "/debug/process/";
pub const CMDLINE_PATTERN: &str = "/debug/process/cmdline";
pub const RUNTIME_PATTERN: &str = "/debug/process/runtime";

/// Register the introspection routes. Must run after every other route so the
/// index lists the whole surface.
pub fn register(
    routes: &mut RouteTable,
    lifecycle: &Lifecycle,
    environment: Environment,
    started: Instant,
) -> Result<(), RouteError> {
    let mut patterns = routes.patterns();
    patterns.extend([INDEX_PATTERN, CMDLINE_PATTERN, RUNTIME_PATTERN].map(String::from));

    routes
        .register(INDEX_PATTERN, handlers::index(Arc::new(patterns)))?
        .register(CMDLINE_PATTERN, handlers::cmdline())?
        .register(
            RUNTIME_PATTERN,
            handlers::runtime(lifecycle.clone(), environment, started),
        )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::Reply;
    use axum::body::Body;
    use axum::http::Request;

    fn request(path: &str) -> Request<Body> {
        Request::builder().uri(path).body(Body::empty()).unwrap()
    }

    fn surface() -> crate::routing::ComposedRouter {
        let mut routes = RouteTable::new();
        routes
            .register("/activity", |_r: Request<Body>| async { Reply::ok("a") })
            .unwrap();
        register(&mut routes, &Lifecycle::new(), Environment::Test, Instant::now()).unwrap();
        routes.compose()
    }

    #[tokio::test]
    async fn index_lists_every_pattern() {
        let (_, reply) = surface().dispatch(request("/debug/process/")).await;
        let json: serde_json::Value = serde_json::from_slice(&reply.payload).unwrap();
        let patterns: Vec<&str> = json["patterns"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p.as_str().unwrap())
            .collect();
        assert_eq!(patterns, ["/activity", INDEX_PATTERN, CMDLINE_PATTERN, RUNTIME_PATTERN]);
    }

    #[tokio::test]
    async fn unknown_debug_path_falls_back_to_index() {
        let (matched, _) = surface().dispatch(request("/debug/process/heap")).await;
        assert_eq!(matched.unwrap().0, INDEX_PATTERN);
    }

    #[tokio::test]
    async fn runtime_reports_state_and_environment() {
        let (_, reply) = surface().dispatch(request(RUNTIME_PATTERN)).await;
        assert!(reply.status.is_ok());
        let json: serde_json::Value = serde_json::from_slice(&reply.payload).unwrap();
        assert_eq!(json["environment"], "test");
        assert_eq!(json["state"], "starting");
        assert!(json["cpus"].as_u64().unwrap() >= 1);
    }

    #[tokio::test]
    async fn cmdline_is_nul_separated() {
        let (_, reply) = surface().dispatch(request(CMDLINE_PATTERN)).await;
        let expected = std::env::args().collect::<Vec<_>>().join("\0");
        assert_eq!(reply.payload, expected.as_bytes());
    }

    #[test]
    fn registering_twice_is_a_duplicate() {
        let mut routes = RouteTable::new();
        let lifecycle = Lifecycle::new();
        register(&mut routes, &lifecycle, Environment::Debug, Instant::now()).unwrap();
        assert!(matches!(
            register(&mut routes, &lifecycle, Environment::Debug, Instant::now()),
            Err(RouteError::DuplicatePattern(_))
        ));
    }
}
