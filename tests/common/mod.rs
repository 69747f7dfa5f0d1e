//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use tokio::task::JoinHandle;

use handler_host::config::HostConfig;
use handler_host::lifecycle::{Lifecycle, LifecycleState, ShutdownReport};
use handler_host::routing::{Dispatch, Reply};
use handler_host::{HostError, LifecycleManager, RouteTable, Shutdown};

/// A host serving on an ephemeral loopback port.
pub struct TestHost {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub lifecycle: Lifecycle,
    pub handle: JoinHandle<Result<ShutdownReport, HostError>>,
}

#[allow(dead_code)]
impl TestHost {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Trigger shutdown and wait for the report.
    pub async fn stop(self) -> ShutdownReport {
        self.shutdown.trigger();
        self.handle.await.unwrap().unwrap()
    }
}

pub fn test_config() -> HostConfig {
    let mut config = HostConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.observability.access_log = false;
    config
}

/// Start a host with `routes`, letting `configure` adjust the config first.
pub async fn start_host<F>(routes: RouteTable, configure: F) -> TestHost
where
    F: FnOnce(&mut HostConfig),
{
    let mut config = test_config();
    configure(&mut config);

    let manager = LifecycleManager::new(config);
    let app = manager.compose(routes).unwrap();
    let listener = manager.bind().await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = manager.shutdown();
    let lifecycle = manager.lifecycle();

    let handle = tokio::spawn(manager.serve(listener, app));
    tokio::time::timeout(Duration::from_secs(5), lifecycle.reached(LifecycleState::Serving))
        .await
        .expect("host never reached Serving");

    TestHost {
        addr,
        shutdown,
        lifecycle,
        handle,
    }
}

/// Handler that answers `body` after `delay`.
#[allow(dead_code)]
pub fn slow_handler(delay: Duration, body: &'static str) -> impl Dispatch {
    move |_request: Request<Body>| async move {
        tokio::time::sleep(delay).await;
        Reply::ok(body)
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
