//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Business routes + liveness + debug → ComposedRouter (fail fast)
//!
//! Manager (manager.rs):
//!     Bind → Serving → accept loop → one task per connection
//!
//! Signals (signals.rs):
//!     SIGINT/SIGTERM → Shutdown::trigger (first one only)
//!
//! Shutdown (shutdown.rs):
//!     Stop accepting → Drain connections → Force-close after grace → Stopped
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then routes, then listener
//! - Ordered shutdown: stop accept, drain, close
//! - Shutdown has timeout: forced close after deadline
//! - State (state.rs) is the only thing shared between the signal watcher
//!   and the accept loop

pub mod manager;
pub mod shutdown;
pub mod signals;
pub mod startup;
pub mod state;

pub use manager::LifecycleManager;
pub use shutdown::{Shutdown, ShutdownReport, ShutdownTimeout};
pub use state::{Lifecycle, LifecycleState, LifecycleWatch};
