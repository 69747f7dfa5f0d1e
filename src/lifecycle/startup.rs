//! Startup orchestration.
//!
//! # Responsibilities
//! - Add the host's own routes (liveness, introspection) to the business routes
//! - Freeze the table into one immutable dispatch surface
//!
//! # Design Decisions
//! - Fail fast: any composition error is fatal and happens before binding
//! - Business routes are registered first and own their patterns
//! - Introspection registers last so its index sees the whole surface

use std::time::Instant;

use crate::config::HostConfig;
use crate::debug;
use crate::health;
use crate::lifecycle::state::Lifecycle;
use crate::routing::{ComposedRouter, RouteError, RouteTable};

/// Compose business routes with the host's liveness and debug routes.
pub fn compose_surface(
    config: &HostConfig,
    lifecycle: &Lifecycle,
    mut routes: RouteTable,
    started: Instant,
) -> Result<ComposedRouter, RouteError> {
    routes.register(
        health::LIVENESS_PATTERN,
        health::liveness_handler(lifecycle.clone()),
    )?;

    if config.debug.enabled {
        debug::register(&mut routes, lifecycle, config.runtime.environment, started)?;
    }

    let surface = routes.compose();
    tracing::info!(routes = surface.patterns().len(), "Routes composed");
    Ok(surface)
}
