//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! Accepted connection (net)
//!     → server.rs (hyper connection settings, Axum app)
//!     → request.rs (assign/propagate request ID)
//!     → [routing surface selects dispatch] → Reply
//!     → response.rs (Reply → one HTTP response, LogSink hand-off)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{with_request_id, X_REQUEST_ID};
pub use response::{write_response, LogEntry, LogSink, ResponseWriter, TracingSink};
pub use server::{build_app, connection_builder, AppState};
