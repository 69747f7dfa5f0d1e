//! Shutdown coordination for the host.

use std::time::{Duration, Instant};

use tokio::task::JoinSet;

use crate::lifecycle::state::{Lifecycle, LifecycleState, LifecycleWatch};

/// Trigger for graceful shutdown.
///
/// Every clone drives the same lifecycle cell, so the first `trigger` wins and
/// later ones are no-ops.
#[derive(Debug, Clone)]
pub struct Shutdown {
    lifecycle: Lifecycle,
}

impl Shutdown {
    pub fn new(lifecycle: Lifecycle) -> Self {
        Self { lifecycle }
    }

    /// Request shutdown. Returns true if this call started it.
    pub fn trigger(&self) -> bool {
        self.lifecycle.request_stop()
    }

    /// Subscribe to lifecycle changes (stop requested, stopped).
    pub fn subscribe(&self) -> LifecycleWatch {
        self.lifecycle.subscribe()
    }

    /// Wait until the host has fully stopped.
    pub async fn completed(&self) {
        self.lifecycle.reached(LifecycleState::Stopped).await
    }
}

/// Grace period elapsed with connections still open. Logged, never fatal.
#[derive(Debug, Clone, thiserror::Error)]
#[error("shutdown grace period of {grace:?} elapsed with {remaining} connection(s) still open")]
pub struct ShutdownTimeout {
    pub grace: Duration,
    pub remaining: usize,
}

/// Outcome of a completed shutdown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShutdownReport {
    /// All connections finished on their own within the grace period.
    pub drained: bool,
    /// Connections closed forcibly when the grace period elapsed.
    pub forced_connections: usize,
    pub elapsed: Duration,
}

/// Wait for connection tasks to finish, aborting whatever is left after `grace`.
pub async fn drain_connections(connections: &mut JoinSet<()>, grace: Duration) -> ShutdownReport {
    let started = Instant::now();
    tracing::info!(
        open_connections = connections.len(),
        grace_secs = grace.as_secs_f64(),
        "Draining connections"
    );

    let drained = tokio::time::timeout(grace, async {
        while let Some(joined) = connections.join_next().await {
            log_join_error(joined);
        }
    })
    .await
    .is_ok();

    let mut forced_connections = 0;
    if !drained {
        let timeout = ShutdownTimeout {
            grace,
            remaining: connections.len(),
        };
        tracing::warn!(error = %timeout, "Forcing remaining connections closed");
        forced_connections = connections.len();
        connections.abort_all();
        while connections.join_next().await.is_some() {}
    }

    ShutdownReport {
        drained,
        forced_connections,
        elapsed: started.elapsed(),
    }
}

pub(crate) fn log_join_error(joined: Result<(), tokio::task::JoinError>) {
    if let Err(e) = joined {
        if e.is_panic() {
            tracing::error!(error = %e, "Connection task panicked");
        }
    }
}
