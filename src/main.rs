//! Handler host (v1)
//!
//! Hosts HTTP handlers behind one listener with graceful shutdown.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────────┐
//!                     │                  HANDLER HOST                     │
//!                     │                                                   │
//!   Client Request    │  ┌─────────┐    ┌─────────┐    ┌──────────────┐  │
//!   ──────────────────┼─▶│   net   │───▶│  http   │───▶│   routing    │  │
//!                     │  │listener │    │ server  │    │   surface    │  │
//!                     │  └─────────┘    └─────────┘    └──────┬───────┘  │
//!                     │                                       │          │
//!                     │                                       ▼          │
//!   Client Response   │  ┌─────────┐                   ┌──────────────┐  │
//!   ◀─────────────────┼──│response │◀── Reply/Status ──│   dispatch   │  │
//!                     │  │ writer  │                   │ (handlers)   │  │
//!                     │  └─────────┘                   └──────────────┘  │
//!                     │                                                   │
//!                     │  ┌─────────────────────────────────────────────┐ │
//!                     │  │           Cross-Cutting Concerns             │ │
//!                     │  │  config · health · debug · observability ·   │ │
//!                     │  │  lifecycle (startup/signals/shutdown)        │ │
//!                     │  └─────────────────────────────────────────────┘ │
//!                     └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;

use handler_host::config::{load_config, validate_config, ConfigError, HostConfig};
use handler_host::debug::handlers::available_cpus;
use handler_host::observability::logging;
use handler_host::{LifecycleManager, RouteTable};

#[derive(Parser)]
#[command(name = "handler-host")]
#[command(about = "Hosts HTTP handlers behind one listener with graceful shutdown", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let started = Instant::now();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => HostConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
        validate_config(&config).map_err(ConfigError::Validation)?;
    }

    logging::init_logging(&config.observability, config.runtime.environment);
    tracing::info!("handler-host v{} starting", env!("CARGO_PKG_VERSION"));
    display_runtime(&config);

    // Business handlers are registered here by the embedding service.
    let routes = RouteTable::new();

    let manager = LifecycleManager::new(config);
    let report = manager.run(routes).await.map_err(|e| {
        tracing::error!(error = %e, "Host failed");
        e
    })?;

    tracing::info!(
        uptime_secs = started.elapsed().as_secs(),
        drained = report.drained,
        "Exiting"
    );
    Ok(())
}

fn display_runtime(config: &HostConfig) {
    tracing::info!(
        address = %config.listener.bind_address,
        version = env!("CARGO_PKG_VERSION"),
        os = std::env::consts::OS,
        arch = std::env::consts::ARCH,
        cpus = available_cpus(),
        environment = %config.runtime.environment,
        read_timeout_secs = config.timeouts.read_secs,
        write_timeout_secs = config.timeouts.write_secs,
        idle_timeout_secs = config.timeouts.idle_secs,
        shutdown_grace_secs = config.timeouts.shutdown_grace_secs,
        "Runtime"
    );
}
