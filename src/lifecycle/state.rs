//! Host lifecycle state machine.
//!
//! # States
//! - Starting: routes composed, listener not yet serving
//! - Serving: accepting connections; the only state where liveness is OK
//! - Stopping: no new connections, in-flight work finishing
//! - Stopped: shutdown complete, process may exit
//!
//! # State Transitions
//! ```text
//! Starting → Serving:  listener bound and accept loop running
//! Serving  → Stopping: interrupt (exactly once; later requests are no-ops)
//! Starting → Stopping: interrupt before serving began
//! Stopping → Stopped:  connections drained or grace period elapsed
//! ```
//!
//! # Design Decisions
//! - Single cell behind a watch channel: transitions are compare-and-set
//!   under the channel lock, observers wake without polling
//! - States are ordered so observers can wait for "at least" a state

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;

/// Lifecycle state of the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    Starting,
    Serving,
    Stopping,
    Stopped,
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LifecycleState::Starting => "starting",
            LifecycleState::Serving => "serving",
            LifecycleState::Stopping => "stopping",
            LifecycleState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Shared handle to the lifecycle state. Cloning shares the same cell.
#[derive(Debug, Clone)]
pub struct Lifecycle {
    tx: Arc<watch::Sender<LifecycleState>>,
}

impl Lifecycle {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(LifecycleState::Starting);
        Self { tx: Arc::new(tx) }
    }

    pub fn current(&self) -> LifecycleState {
        *self.tx.borrow()
    }

    pub fn is_serving(&self) -> bool {
        self.current() == LifecycleState::Serving
    }

    /// Starting → Serving. Returns false if a stop was already requested.
    pub fn mark_serving(&self) -> bool {
        self.transition(|s| s == LifecycleState::Starting, LifecycleState::Serving)
    }

    /// Starting|Serving → Stopping. Returns true only for the call that made the move.
    pub fn request_stop(&self) -> bool {
        self.transition(
            |s| matches!(s, LifecycleState::Starting | LifecycleState::Serving),
            LifecycleState::Stopping,
        )
    }

    /// Any → Stopped. Returns false if already stopped.
    pub fn mark_stopped(&self) -> bool {
        self.transition(|s| s != LifecycleState::Stopped, LifecycleState::Stopped)
    }

    fn transition(&self, allowed: impl Fn(LifecycleState) -> bool, to: LifecycleState) -> bool {
        let mut from = None;
        let changed = self.tx.send_if_modified(|state| {
            if allowed(*state) {
                from = Some(*state);
                *state = to;
                true
            } else {
                false
            }
        });
        if let Some(from) = from {
            tracing::debug!(from = %from, to = %to, "Lifecycle transition");
        }
        changed
    }

    pub fn subscribe(&self) -> LifecycleWatch {
        LifecycleWatch {
            rx: self.tx.subscribe(),
        }
    }

    /// Wait until the state is at least `target`.
    pub async fn reached(&self, target: LifecycleState) {
        self.subscribe().reached(target).await
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiver side used by tasks that react to lifecycle changes.
#[derive(Debug, Clone)]
pub struct LifecycleWatch {
    rx: watch::Receiver<LifecycleState>,
}

impl LifecycleWatch {
    /// Wait until the state is at least `target`.
    pub async fn reached(&mut self, target: LifecycleState) {
        // The sender lives in every Lifecycle clone; Err only means the host is gone.
        let _ = self.rx.wait_for(|state| *state >= target).await;
    }

    /// Wait until a stop has been requested.
    pub async fn stopping(&mut self) {
        self.reached(LifecycleState::Stopping).await
    }

    pub fn current(&self) -> LifecycleState {
        *self.rx.borrow()
    }
}
