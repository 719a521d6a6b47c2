//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with all director handlers
//! - Wire up middleware (tracing, limits, timeouts, request ID)
//! - Own the background tasks tied to the server lifetime
//!   (expiration sweeper, config applier)
//! - Serve until the shutdown broadcast fires

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::admin::admin_router;
use crate::config::DirectorConfig;
use crate::http::handlers;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::registry::{AdRecorder, AdRegistry, ExpirationSweeper, PathResolver};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<AdRegistry>,
    pub recorder: AdRecorder,
    pub resolver: PathResolver,
    pub config: Arc<ArcSwap<DirectorConfig>>,
}

impl AppState {
    pub fn new(config: DirectorConfig) -> Self {
        let registry = Arc::new(AdRegistry::new(config.registry.index));
        Self {
            recorder: AdRecorder::new(registry.clone()),
            resolver: PathResolver::new(registry.clone()),
            registry,
            config: Arc::new(ArcSwap::from_pointee(config)),
        }
    }
}

/// Build the Axum router with all middleware layers.
///
/// Layer settings and the admin mount are read once; later reloads only
/// affect values read per request (admin key) or per cycle (sweeper).
#[allow(deprecated)]
pub fn build_router(state: AppState) -> Router {
    let config = state.config.load_full();

    let api = Router::new()
        .route("/api/v1.0/director/registerOrigin", post(handlers::register_origin))
        .route("/api/v1.0/director/registerCache", post(handlers::register_cache))
        .route("/api/v1.0/director/advertise", post(handlers::advertise))
        .route("/api/v1.0/director/namespace/{*path}", get(handlers::get_namespace))
        .route("/api/v1.0/director/object/{*path}", get(handlers::redirect_to_cache))
        .route("/api/v1.0/director/origin/{*path}", get(handlers::redirect_to_origin))
        .route("/health", get(handlers::health))
        .layer(RequestBodyLimitLayer::new(config.security.max_body_size));

    let app = if config.admin.enabled {
        api.merge(admin_router(state.clone()))
    } else {
        api
    };

    app.with_state(state)
        .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
        .layer(GlobalConcurrencyLimitLayer::new(config.listener.max_connections))
        .layer(propagate_request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(set_request_id_layer())
}

/// HTTP server for the federation director.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: DirectorConfig) -> Self {
        let state = AppState::new(config);
        let router = build_router(state.clone());
        Self { router, state }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Config updates arriving on `config_updates` are applied live.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<DirectorConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            index = self.state.registry.index_name(),
            "HTTP server starting"
        );

        let sweeper =
            ExpirationSweeper::new(self.state.registry.clone(), self.state.config.clone());
        tokio::spawn(sweeper.run(shutdown.resubscribe()));

        let live_config = self.state.config.clone();
        tokio::spawn(async move {
            while let Some(new_config) = config_updates.recv().await {
                apply_config_update(&live_config, new_config);
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server received shutdown signal");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Swap in a reloaded config, warning about settings that only take
/// effect on restart.
fn apply_config_update(live: &ArcSwap<DirectorConfig>, new_config: DirectorConfig) {
    let current = live.load();
    if current.registry.index != new_config.registry.index {
        tracing::warn!(
            current = ?current.registry.index,
            requested = ?new_config.registry.index,
            "Index kind change requires a restart"
        );
    }
    if current.listener != new_config.listener
        || current.admin.enabled != new_config.admin.enabled
    {
        tracing::warn!("Listener and admin mount changes require a restart");
    }

    tracing::info!(
        ttl_secs = new_config.registry.advertisement_ttl_secs,
        sweep_interval_secs = new_config.registry.sweep_interval_secs,
        "Configuration reloaded"
    );
    live.store(Arc::new(new_config));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IndexKind;

    #[test]
    fn test_state_uses_configured_index() {
        let mut config = DirectorConfig::default();
        config.registry.index = IndexKind::Linear;
        let server = HttpServer::new(config);
        assert_eq!(server.state().registry.index_name(), "linear");
    }

    #[test]
    fn test_apply_config_update() {
        let live = ArcSwap::from_pointee(DirectorConfig::default());

        let mut updated = DirectorConfig::default();
        updated.registry.advertisement_ttl_secs = 30;
        updated.registry.sweep_interval_secs = 10;
        apply_config_update(&live, updated.clone());

        assert_eq!(**live.load(), updated);
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let (_tx, config_updates) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let server = HttpServer::new(DirectorConfig::default());
        let handle = tokio::spawn(server.run(listener, config_updates, shutdown_rx));

        tokio::time::sleep(Duration::from_millis(50)).await;
        shutdown_tx.send(()).unwrap();

        let result = tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("server did not stop")
            .unwrap();
        assert!(result.is_ok());
    }
}
