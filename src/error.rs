//! Host error taxonomy.
//!
//! Startup errors (`Config`, `Route`, `Listener`, `Metrics`) abort the
//! process before serving. Per-request failures travel as a `Status` and
//! never appear here; a shutdown timeout is logged, not returned.

use crate::config::ConfigError;
use crate::net::listener::ListenerError;
use crate::routing::RouteError;

#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Route(#[from] RouteError),

    #[error(transparent)]
    Listener(#[from] ListenerError),

    #[error("failed to install metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),
}

impl HostError {
    /// True if the listener could not be bound.
    pub fn is_bind(&self) -> bool {
        matches!(self, HostError::Listener(ListenerError::Bind { .. }))
    }
}
