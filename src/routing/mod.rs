//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Registration (at startup):
//!     (pattern, dispatch) pairs
//!     → matcher.rs (validate, classify exact/subtree)
//!     → router.rs RouteTable (reject duplicates)
//!     → compose() → immutable ComposedRouter
//!
//! Incoming Request (path)
//!     → router.rs (exact lookup, then longest subtree)
//!     → dispatch.rs (invoke capability → Reply)
//!     → or NotFound Status
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - Deterministic: same registrations always route the same way
//! - First registration owns a pattern; duplicates are a startup error

pub mod dispatch;
pub mod matcher;
pub mod router;

pub use dispatch::{Dispatch, DispatchFuture, Reply, SharedDispatch};
pub use matcher::{MatchKind, Pattern};
pub use router::{ComposedRouter, MatchedPattern, RouteEntry, RouteTable};

/// Route registration failures. Both are fatal at startup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    #[error("duplicate route pattern: {0}")]
    DuplicatePattern(String),

    #[error("invalid route pattern {0:?}: must start with '/' and contain no whitespace")]
    InvalidPattern(String),
}
