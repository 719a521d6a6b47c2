//! Federation director.
//!
//! # Architecture Overview
//!
//! ```text
//!     Origin / Cache                     Client
//!     advertisements                     object request
//!          │                                  │
//!          ▼                                  ▼
//!   ┌─────────────┐   ┌─────────────┐   ┌──────────────┐
//!   │ AdRecorder  │──▶│ AdRegistry  │◀──│ PathResolver │──▶ 307 to cache/origin
//!   └─────────────┘   │ (namespace  │   └──────────────┘
//!                     │   index)    │
//!                     └──────▲──────┘
//!                            │ drop stale associations
//!                   ┌────────┴─────────┐
//!                   │ExpirationSweeper │
//!                   └──────────────────┘
//!
//!   Cross-cutting: config (TOML + hot reload), observability, lifecycle
//! ```
//!
//! Usage: `federation-director [config.toml]`. Without an argument the path
//! is taken from `DIRECTOR_CONFIG`; without either, defaults are used.

use std::path::PathBuf;

use tokio::net::TcpListener;
use tokio::sync::mpsc;

use federation_director::config::loader::load_config;
use federation_director::config::watcher::ConfigWatcher;
use federation_director::config::DirectorConfig;
use federation_director::http::HttpServer;
use federation_director::lifecycle::{signals::shutdown_signal, Shutdown};
use federation_director::observability::{logging, metrics};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("DIRECTOR_CONFIG").ok())
        .map(PathBuf::from);

    let config = match &config_path {
        Some(path) => load_config(path)?,
        None => DirectorConfig::default(),
    };

    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "federation-director starting");

    tracing::info!(
        config_path = ?config_path,
        bind_address = %config.listener.bind_address,
        index = ?config.registry.index,
        ttl_secs = config.registry.advertisement_ttl_secs,
        sweep_interval_secs = config.registry.sweep_interval_secs,
        admin_enabled = config.admin.enabled,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics exporter");
                }
            }
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    // The watcher must stay alive for reloads to keep arriving.
    let (_watcher, config_updates) = match &config_path {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            (Some(watcher.run()?), updates)
        }
        None => {
            let (_tx, updates) = mpsc::unbounded_channel();
            (None, updates)
        }
    };

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown.trigger();
    });

    let server = HttpServer::new(config);
    server.run(listener, config_updates, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
