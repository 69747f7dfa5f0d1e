//! Handler host library.
//!
//! Hosts independently-owned HTTP handlers behind one listener and shuts down
//! on interrupt without dropping in-flight requests.

pub mod config;
pub mod debug;
pub mod error;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod routing;
pub mod status;

pub use config::HostConfig;
pub use error::HostError;
pub use lifecycle::{LifecycleManager, Shutdown};
pub use routing::{Dispatch, Reply, RouteTable};
pub use status::{Code, Status};
