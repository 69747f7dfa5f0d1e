//! Request identification.
//!
//! # Responsibilities
//! - Assign a unique request ID (UUID v4) when the client sent none
//! - Echo the request ID on the response
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - A client-supplied `x-request-id` is kept as is

use axum::http::HeaderName;
use axum::Router;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Wrap `router` so every request and response carries `x-request-id`.
pub fn with_request_id(router: Router) -> Router {
    // Layers run outside-in: set must wrap propagate.
    router
        .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
        .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
}
