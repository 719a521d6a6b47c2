use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::http::server::AppState;
use crate::registry::store::NamespaceView;

#[derive(Debug, Serialize, Deserialize)]
pub struct SystemStatus {
    pub version: String,
    pub status: String,
    pub index: String,
    pub namespaces: usize,
    pub servers: usize,
    pub associations: usize,
    pub advertisement_ttl_secs: u64,
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    let stats = state.registry.stats();
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "operational".to_string(),
        index: state.registry.index_name().to_string(),
        namespaces: stats.namespaces,
        servers: stats.servers,
        associations: stats.associations,
        advertisement_ttl_secs: state.config.load().registry.advertisement_ttl_secs,
    })
}

/// Every namespace with its live associations, sorted by path.
pub async fn get_namespaces(State(state): State<AppState>) -> Json<Vec<NamespaceView>> {
    Json(state.registry.namespaces())
}
