//! Response writing and log hand-off.
//!
//! # Responsibilities
//! - Turn a `Reply` (payload + Status) into exactly one HTTP response
//! - Offer the outcome to an optional `LogSink`
//!
//! # Design Decisions
//! - Write-once by construction: the reply is consumed, one response returned
//! - OK writes the payload unmodified with 200
//! - Failure writes an empty body; the diagnostic goes to the sink only
//! - The sink is a collaborator passed in, never a global logger

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, HeaderValue, Response};

use crate::routing::Reply;
use crate::status::Status;

/// What the writer offers to a [`LogSink`] for one response.
#[derive(Debug, Clone, Copy)]
pub struct LogEntry<'a> {
    pub status: &'a Status,
    pub payload: &'a [u8],
    pub detail: Option<&'a serde_json::Value>,
}

/// Destination for per-response outcome records.
pub trait LogSink: Send + Sync {
    fn record(&self, entry: &LogEntry<'_>);
}

/// Sink that emits `tracing` events: failures at WARN, successes at TRACE.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn record(&self, entry: &LogEntry<'_>) {
        if entry.status.is_ok() {
            tracing::trace!(bytes = entry.payload.len(), "Request succeeded");
            return;
        }
        match entry.detail {
            Some(detail) => tracing::warn!(
                code = %entry.status.code(),
                message = entry.status.message(),
                detail = %detail,
                "Request failed"
            ),
            None => tracing::warn!(
                code = %entry.status.code(),
                message = entry.status.message(),
                "Request failed"
            ),
        }
    }
}

/// Write `payload` with `status`, forwarding the outcome to `sink` when given.
pub fn write_response(
    payload: impl Into<axum::body::Bytes>,
    status: &Status,
    sink: Option<&dyn LogSink>,
) -> Response<Body> {
    let payload = payload.into();
    if let Some(sink) = sink {
        sink.record(&LogEntry {
            status,
            payload: &payload,
            detail: None,
        });
    }
    build(payload, status, None)
}

fn build(payload: axum::body::Bytes, status: &Status, content_type: Option<&'static str>) -> Response<Body> {
    let body = if status.is_ok() {
        Body::from(payload)
    } else {
        Body::empty()
    };
    let mut response = Response::new(body);
    *response.status_mut() = status.http_status();
    if status.is_ok() {
        if let Some(content_type) = content_type {
            response
                .headers_mut()
                .insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
        }
    }
    response
}

/// Writes replies for the composed router with a fixed sink.
#[derive(Clone, Default)]
pub struct ResponseWriter {
    sink: Option<Arc<dyn LogSink>>,
}

impl ResponseWriter {
    pub fn new(sink: Option<Arc<dyn LogSink>>) -> Self {
        Self { sink }
    }

    /// Writer that logs through `tracing`.
    pub fn tracing() -> Self {
        Self::new(Some(Arc::new(TracingSink)))
    }

    /// Consume `reply` and produce its response.
    pub fn write(&self, reply: Reply) -> Response<Body> {
        let Reply {
            payload,
            status,
            detail,
            content_type,
        } = reply;
        if let Some(sink) = &self.sink {
            sink.record(&LogEntry {
                status: &status,
                payload: &payload,
                detail: detail.as_ref(),
            });
        }
        build(payload, &status, content_type)
    }
}

impl std::fmt::Debug for ResponseWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseWriter")
            .field("sink", &self.sink.is_some())
            .finish()
    }
}
