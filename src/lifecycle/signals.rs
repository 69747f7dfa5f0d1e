//! OS signal handling.
//!
//! # Responsibilities
//! - Register interrupt handlers (SIGINT, and SIGTERM on unix)
//! - Translate the first interrupt into a shutdown request
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe, no polling)
//! - Repeated interrupts while stopping are logged and ignored

use tokio::task::JoinHandle;

use crate::lifecycle::shutdown::Shutdown;

/// Spawn the interrupt watcher. It is the only task that requests shutdown
/// in a running process.
pub fn spawn_signal_watcher(shutdown: Shutdown) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let signal = match wait_for_interrupt().await {
                Ok(signal) => signal,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to install signal handler");
                    return;
                }
            };
            if shutdown.trigger() {
                tracing::info!(signal, "Shutdown signal received");
            } else {
                tracing::info!(signal, "Shutdown already in progress, ignoring signal");
            }
        }
    })
}

#[cfg(unix)]
async fn wait_for_interrupt() -> std::io::Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        res = tokio::signal::ctrl_c() => res.map(|()| "SIGINT"),
        _ = terminate.recv() => Ok("SIGTERM"),
    }
}

#[cfg(not(unix))]
async fn wait_for_interrupt() -> std::io::Result<&'static str> {
    tokio::signal::ctrl_c().await.map(|()| "ctrl-c")
}
