//! HTTP application setup.
//!
//! # Responsibilities
//! - Wrap the composed dispatch surface in an Axum Router
//! - Write every reply through the response writer
//! - Wire up middleware (timeouts, request ID, access log, metrics)
//! - Build the per-connection HTTP/1.1 + HTTP/2 protocol settings

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware,
    response::Response,
    Router,
};
use hyper_util::rt::{TokioExecutor, TokioTimer};
use hyper_util::server::conn::auto::Builder as ConnectionBuilder;
use tower_http::{
    timeout::{RequestBodyTimeoutLayer, TimeoutLayer},
    trace::TraceLayer,
};

use crate::config::{HostConfig, TimeoutConfig};
use crate::http::request::with_request_id;
use crate::http::response::ResponseWriter;
use crate::observability::metrics;
use crate::routing::ComposedRouter;

/// Application state injected into the dispatch handler.
#[derive(Clone)]
pub struct AppState {
    pub surface: Arc<ComposedRouter>,
    pub writer: ResponseWriter,
}

/// Build the Axum router serving `surface` with all middleware layers.
#[allow(deprecated)]
pub fn build_app(config: &HostConfig, surface: ComposedRouter, writer: ResponseWriter) -> Router {
    let state = AppState {
        surface: Arc::new(surface),
        writer,
    };

    let mut router = Router::new()
        .fallback(dispatch_handler)
        .with_state(state)
        .layer(TimeoutLayer::new(config.timeouts.write()))
        .layer(RequestBodyTimeoutLayer::new(config.timeouts.read()));

    if config.observability.metrics_enabled {
        router = router.layer(middleware::from_fn(metrics::track_requests));
    }
    if config.observability.access_log {
        router = router.layer(TraceLayer::new_for_http());
    }

    with_request_id(router)
}

/// Route the request through the composed surface and write its reply.
async fn dispatch_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let (matched, reply) = state.surface.dispatch(request).await;
    let mut response = state.writer.write(reply);
    if let Some(matched) = matched {
        response.extensions_mut().insert(matched);
    }
    response
}

/// Protocol settings applied to every accepted connection.
pub fn connection_builder(timeouts: &TimeoutConfig) -> ConnectionBuilder<TokioExecutor> {
    let mut builder = ConnectionBuilder::new(TokioExecutor::new());
    builder
        .http1()
        .timer(TokioTimer::new())
        .header_read_timeout(timeouts.read())
        .keep_alive(true);
    builder
        .http2()
        .timer(TokioTimer::new())
        .keep_alive_interval(timeouts.idle())
        .keep_alive_timeout(timeouts.read());
    builder
}
