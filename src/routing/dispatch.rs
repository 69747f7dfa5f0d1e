//! The dispatch capability: request in, payload plus [`Status`] out.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::http::Request;

use crate::status::Status;

/// Outcome of a dispatch: the payload, its status and an optional error detail.
#[derive(Debug, Clone, Default)]
pub struct Reply {
    pub payload: Bytes,
    pub status: Status,
    /// Structured error payload offered to the log sink, never to the client.
    pub detail: Option<serde_json::Value>,
    pub content_type: Option<&'static str>,
}

impl Reply {
    /// Successful reply carrying `payload`.
    pub fn ok(payload: impl Into<Bytes>) -> Self {
        Self {
            payload: payload.into(),
            status: Status::ok(),
            detail: None,
            content_type: None,
        }
    }

    /// Successful JSON reply.
    pub fn json<T: serde::Serialize>(value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(bytes) => Self::ok(bytes).with_content_type("application/json"),
            Err(e) => Self::failed(Status::internal(format!("serialize reply: {}", e))),
        }
    }

    /// Failed reply with an empty payload.
    pub fn failed(status: Status) -> Self {
        Self {
            payload: Bytes::new(),
            status,
            detail: None,
            content_type: None,
        }
    }

    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.detail = Some(detail);
        self
    }

    pub fn with_content_type(mut self, content_type: &'static str) -> Self {
        self.content_type = Some(content_type);
        self
    }
}

impl From<Status> for Reply {
    fn from(status: Status) -> Self {
        if status.is_ok() {
            Self::ok(Bytes::new())
        } else {
            Self::failed(status)
        }
    }
}

/// Boxed future returned by [`Dispatch::dispatch`].
pub type DispatchFuture = Pin<Box<dyn Future<Output = Reply> + Send + 'static>>;

/// A unit of request handling registered under a route pattern.
///
/// Implemented for any `Fn(Request<Body>) -> impl Future<Output = Reply>`.
pub trait Dispatch: Send + Sync + 'static {
    fn dispatch(&self, request: Request<Body>) -> DispatchFuture;
}

impl<F, Fut> Dispatch for F
where
    F: Fn(Request<Body>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Reply> + Send + 'static,
{
    fn dispatch(&self, request: Request<Body>) -> DispatchFuture {
        Box::pin(self(request))
    }
}

/// Shared handle to a registered dispatch capability.
pub type SharedDispatch = Arc<dyn Dispatch>;
