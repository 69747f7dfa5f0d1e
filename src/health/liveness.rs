//! Liveness probe.
//!
//! # Responsibilities
//! - Report whether the host is serving
//! - Answer `"up"` through the response writer while serving
//!
//! # Design Decisions
//! - Constant-time check, no external dependency
//! - Any lifecycle state other than Serving is a failure

use axum::body::Body;
use axum::http::Request;

use crate::lifecycle::{Lifecycle, LifecycleState};
use crate::routing::{Dispatch, Reply};
use crate::status::Status;

/// Route pattern of the liveness probe.
pub const LIVENESS_PATTERN: &str = "/health/liveness";

/// Body written when the host is live.
pub const LIVENESS_BODY: &str = "up";

/// Liveness status for the current lifecycle state.
pub fn check(lifecycle: &Lifecycle) -> Status {
    match lifecycle.current() {
        LifecycleState::Serving => Status::ok(),
        state => Status::unavailable(format!("host is {}", state)),
    }
}

/// Dispatch capability for [`LIVENESS_PATTERN`].
pub fn liveness_handler(lifecycle: Lifecycle) -> impl Dispatch {
    move |_request: Request<Body>| {
        let status = check(&lifecycle);
        async move {
            if status.is_ok() {
                Reply::ok(LIVENESS_BODY)
            } else {
                Reply::failed(status)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::Code;

    fn request() -> Request<Body> {
        Request::builder()
            .uri(LIVENESS_PATTERN)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn ok_only_while_serving() {
        let lifecycle = Lifecycle::new();
        let handler = liveness_handler(lifecycle.clone());

        let reply = handler.dispatch(request()).await;
        assert_eq!(reply.status.code(), Code::UNAVAILABLE);
        assert!(reply.payload.is_empty());

        lifecycle.mark_serving();
        let reply = handler.dispatch(request()).await;
        assert!(reply.status.is_ok());
        assert_eq!(&reply.payload[..], b"up");

        lifecycle.request_stop();
        let reply = handler.dispatch(request()).await;
        assert!(!reply.status.is_ok());
        assert!(reply.payload.is_empty());

        lifecycle.mark_stopped();
        assert!(!check(&lifecycle).is_ok());
    }
}
