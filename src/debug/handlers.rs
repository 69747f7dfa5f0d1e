//! Introspection handlers.
//!
//! # Responsibilities
//! - List every pattern on the composed surface
//! - Report the process command line
//! - Report version, platform, uptime and lifecycle state

use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::http::Request;
use serde::Serialize;

use crate::config::Environment;
use crate::lifecycle::{Lifecycle, LifecycleState};
use crate::routing::{Dispatch, Reply};

#[derive(Debug, Serialize)]
pub struct RuntimeInfo {
    pub version: &'static str,
    pub os: &'static str,
    pub arch: &'static str,
    pub cpus: usize,
    pub environment: Environment,
    pub uptime_secs: u64,
    pub state: LifecycleState,
}

#[derive(Debug, Serialize)]
pub struct PatternIndex<'a> {
    pub patterns: &'a [String],
}

pub fn available_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// JSON list of every pattern on the composed surface.
pub fn index(patterns: Arc<Vec<String>>) -> impl Dispatch {
    move |_request: Request<Body>| {
        let reply = Reply::json(&PatternIndex {
            patterns: patterns.as_slice(),
        });
        async move { reply }
    }
}

/// Process arguments separated by NUL bytes.
pub fn cmdline() -> impl Dispatch {
    |_request: Request<Body>| async {
        let args: Vec<String> = std::env::args().collect();
        Reply::ok(args.join("\0")).with_content_type("text/plain; charset=utf-8")
    }
}

/// Version, platform and lifecycle summary.
pub fn runtime(lifecycle: Lifecycle, environment: Environment, started: Instant) -> impl Dispatch {
    move |_request: Request<Body>| {
        let info = RuntimeInfo {
            version: env!("CARGO_PKG_VERSION"),
            os: std::env::consts::OS,
            arch: std::env::consts::ARCH,
            cpus: available_cpus(),
            environment,
            uptime_secs: started.elapsed().as_secs(),
            state: lifecycle.current(),
        };
        async move { Reply::json(&info) }
    }
}
