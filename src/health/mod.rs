//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! GET /health/liveness
//!     → liveness.rs (read lifecycle state)
//!     → Status ok | unavailable
//!     → http::response ("up" | empty non-2xx)
//! ```
//!
//! # Design Decisions
//! - Health reflects the host lifecycle only, never business dependencies
//! - Served through the same dispatch path as every other route

pub mod liveness;

pub use liveness::{check, liveness_handler, LIVENESS_BODY, LIVENESS_PATTERN};
