//! Metrics collection and exposition.
//!
//! # Metrics
//! - `director_advertisements_total` (counter): advertisements by server type, outcome
//! - `director_resolutions_total` (counter): path lookups by outcome (hit, miss)
//! - `director_expired_associations_total` (counter): associations removed by the sweeper
//! - `director_namespaces`, `director_servers`, `director_associations` (gauges): registry size

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::registry::store::RegistryStats;
use crate::registry::types::ServerType;

/// Install the Prometheus recorder and its HTTP listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_advertisement(server_type: ServerType, outcome: &'static str) {
    counter!(
        "director_advertisements_total",
        "server_type" => server_type.as_str(),
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_resolution(outcome: &'static str) {
    counter!("director_resolutions_total", "outcome" => outcome).increment(1);
}

pub fn record_expired(count: usize) {
    counter!("director_expired_associations_total").increment(count as u64);
}

pub fn record_registry_size(stats: &RegistryStats) {
    gauge!("director_namespaces").set(stats.namespaces as f64);
    gauge!("director_servers").set(stats.servers as f64);
    gauge!("director_associations").set(stats.associations as f64);
}
