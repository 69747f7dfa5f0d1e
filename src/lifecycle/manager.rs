//! Lifecycle manager: owns the listener and drives the host state machine.
//!
//! # Responsibilities
//! - Compose the dispatch surface before anything is bound
//! - Bind the listener (Starting) and run the accept loop (Serving)
//! - Serve each connection on its own task with read/write/idle limits
//! - On stop: close the listener, drain connections, force-close after the
//!   grace period (Stopping), then report completion (Stopped)
//! - A connection accepted but still silent when the stop arrives gets one
//!   read timeout to start its request before it is closed

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::Router;
use hyper::body::Incoming;
use hyper::Request;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnectionBuilder;
use tokio::net::TcpStream;
use tokio::task::JoinSet;
use tower::ServiceExt;

use crate::config::{ConfigError, HostConfig, ValidationError};
use crate::error::HostError;
use crate::http::response::ResponseWriter;
use crate::http::server::{build_app, connection_builder};
use crate::lifecycle::shutdown::{drain_connections, log_join_error, Shutdown, ShutdownReport};
use crate::lifecycle::signals::spawn_signal_watcher;
use crate::lifecycle::startup::compose_surface;
use crate::lifecycle::state::{Lifecycle, LifecycleState, LifecycleWatch};
use crate::net::connection::{ConnectionActivity, ConnectionGuard, ConnectionTracker};
use crate::net::listener::{ConnectionPermit, Listener, ListenerError};
use crate::observability::metrics;
use crate::routing::RouteTable;

/// Pause after a failed accept (e.g. file descriptor exhaustion).
const ACCEPT_BACKOFF: Duration = Duration::from_millis(50);

/// Owns the host configuration and lifecycle.
#[derive(Debug)]
pub struct LifecycleManager {
    config: HostConfig,
    lifecycle: Lifecycle,
    writer: ResponseWriter,
    started: Instant,
}

impl LifecycleManager {
    /// Create a manager in the `Starting` state.
    pub fn new(config: HostConfig) -> Self {
        Self {
            config,
            lifecycle: Lifecycle::new(),
            writer: ResponseWriter::tracing(),
            started: Instant::now(),
        }
    }

    /// Replace the response writer (and with it the log sink).
    pub fn with_writer(mut self, writer: ResponseWriter) -> Self {
        self.writer = writer;
        self
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle.clone()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        self.lifecycle.current()
    }

    /// Handle that requests shutdown, as an interrupt would.
    pub fn shutdown(&self) -> Shutdown {
        Shutdown::new(self.lifecycle.clone())
    }

    /// Compose business routes with the host routes into the served application.
    pub fn compose(&self, routes: RouteTable) -> Result<Router, HostError> {
        let surface = compose_surface(&self.config, &self.lifecycle, routes, self.started)?;
        Ok(build_app(&self.config, surface, self.writer.clone()))
    }

    /// Bind the configured address. Failure leaves the host in `Starting`.
    pub async fn bind(&self) -> Result<Listener, HostError> {
        Listener::bind(&self.config.listener).await.map_err(|e| {
            tracing::error!(error = %e, "Bind failed");
            HostError::from(e)
        })
    }

    /// Compose, bind, then install the metrics exporter if enabled.
    ///
    /// Every step that can fail runs before the next one opens a port, so a
    /// failed startup leaves nothing bound.
    pub async fn prepare(&self, routes: RouteTable) -> Result<(Listener, Router), HostError> {
        let app = self.compose(routes)?;
        let listener = self.bind().await?;

        let observability = &self.config.observability;
        if observability.metrics_enabled {
            let addr: SocketAddr = observability.metrics_address.parse().map_err(|_| {
                ConfigError::Validation(vec![ValidationError::InvalidAddress {
                    field: "observability.metrics_address",
                    value: observability.metrics_address.clone(),
                }])
            })?;
            metrics::init_metrics(addr)?;
        }
        Ok((listener, app))
    }

    /// Start, watch for interrupts and serve until stopped.
    pub async fn run(self, routes: RouteTable) -> Result<ShutdownReport, HostError> {
        let (listener, app) = self.prepare(routes).await?;
        let watcher = spawn_signal_watcher(self.shutdown());
        let report = self.serve(listener, app).await;
        watcher.abort();
        report
    }

    /// Serve `app` on `listener` until a stop is requested, then drain.
    ///
    /// Returns once the host reached `Stopped`.
    pub async fn serve(self, listener: Listener, app: Router) -> Result<ShutdownReport, HostError> {
        let addr = listener.local_addr().map_err(ListenerError::Accept)?;

        if !self.lifecycle.mark_serving() {
            tracing::warn!("Stop requested before serving began");
            drop(listener);
            self.lifecycle.mark_stopped();
            return Ok(ShutdownReport {
                drained: true,
                ..ShutdownReport::default()
            });
        }

        tracing::info!(
            address = %addr,
            startup_ms = self.started.elapsed().as_millis() as u64,
            "Serving"
        );

        let timeouts = &self.config.timeouts;
        let context = Arc::new(ConnectionContext {
            builder: connection_builder(timeouts),
            app,
            read_timeout: timeouts.read(),
            idle_timeout: timeouts.idle(),
        });
        let tracker = ConnectionTracker::new();
        let mut connections = JoinSet::new();
        let mut stop = self.lifecycle.subscribe();

        loop {
            tokio::select! {
                biased;

                _ = stop.stopping() => break,

                Some(joined) = connections.join_next(), if !connections.is_empty() => {
                    log_join_error(joined);
                }

                accepted = listener.accept() => match accepted {
                    Ok((stream, peer, permit)) => {
                        let guard = tracker.track();
                        tracing::trace!(connection_id = %guard.id(), peer = %peer, "Serving connection");
                        connections.spawn(serve_connection(
                            Arc::clone(&context),
                            stream,
                            peer,
                            permit,
                            guard,
                            self.lifecycle.subscribe(),
                        ));
                    }
                    Err(ListenerError::Closed) => {
                        tracing::error!("Connection limiter closed, stopping");
                        self.lifecycle.request_stop();
                        break;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Accept failed");
                        tokio::time::sleep(ACCEPT_BACKOFF).await;
                    }
                },
            }
        }

        // No connection is accepted past this point.
        drop(listener);
        tracing::info!(
            address = %addr,
            open_connections = tracker.active_count(),
            "Listener closed"
        );

        let report = drain_connections(&mut connections, timeouts.shutdown_grace()).await;
        self.lifecycle.mark_stopped();
        tracing::info!(
            drained = report.drained,
            forced_connections = report.forced_connections,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Shutdown complete"
        );
        Ok(report)
    }
}

/// Shared by every connection task.
struct ConnectionContext {
    builder: ConnectionBuilder<TokioExecutor>,
    app: Router,
    read_timeout: Duration,
    idle_timeout: Duration,
}

async fn serve_connection(
    context: Arc<ConnectionContext>,
    stream: TcpStream,
    peer: SocketAddr,
    _permit: ConnectionPermit,
    guard: ConnectionGuard,
    mut stop: LifecycleWatch,
) {
    let activity = ConnectionActivity::new();
    let service = {
        let activity = Arc::clone(&activity);
        let app = context.app.clone();
        hyper::service::service_fn(move |request: Request<Incoming>| {
            let in_flight = activity.begin_request();
            let app = app.clone();
            async move {
                let response = app.oneshot(request).await;
                drop(in_flight);
                response
            }
        })
    };

    let connection = context
        .builder
        .serve_connection(TokioIo::new(stream), service);
    tokio::pin!(connection);

    let idle_timeout = context.idle_timeout;
    let mut stop_requested = false;
    let mut first_request_deadline = tokio::time::Instant::now();
    let mut closing = false;
    loop {
        let idle_deadline = activity.idle_deadline(idle_timeout);
        tokio::select! {
            result = connection.as_mut() => {
                if let Err(e) = result {
                    tracing::debug!(connection_id = %guard.id(), peer = %peer, error = %e, "Connection error");
                }
                break;
            }
            _ = stop.stopping(), if !stop_requested && !closing => {
                stop_requested = true;
                if activity.has_served() {
                    // In-flight requests finish; keep-alive is disabled.
                    closing = true;
                    connection.as_mut().graceful_shutdown();
                } else {
                    // Accepted but silent: give the client one read timeout to send its request.
                    first_request_deadline = tokio::time::Instant::now() + context.read_timeout;
                    tracing::debug!(connection_id = %guard.id(), peer = %peer, "Awaiting first request before close");
                }
            }
            _ = activity.first_request(), if stop_requested && !closing => {
                closing = true;
                connection.as_mut().graceful_shutdown();
            }
            _ = tokio::time::sleep_until(first_request_deadline), if stop_requested && !closing => {
                tracing::debug!(connection_id = %guard.id(), peer = %peer, "No request before read timeout, closing");
                closing = true;
                connection.as_mut().graceful_shutdown();
            }
            _ = tokio::time::sleep_until(idle_deadline), if !closing => {
                if activity.is_idle(idle_timeout) {
                    tracing::debug!(connection_id = %guard.id(), peer = %peer, "Closing idle connection");
                    closing = true;
                    connection.as_mut().graceful_shutdown();
                }
            }
        }
    }
}
