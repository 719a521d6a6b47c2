//! Advertisement expiration.
//!
//! # Responsibilities
//! - Periodically drop associations older than the advertisement TTL
//! - Log every removal for operators
//!
//! # Design Decisions
//! - Interval and TTL are re-read from the live config each cycle
//! - Removal happens under the registry write lock; logging after it is released

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use arc_swap::ArcSwap;
use tokio::sync::broadcast;
use tokio::time;

use crate::config::DirectorConfig;
use crate::observability::metrics;
use crate::registry::store::{AdRegistry, SweepReport};

pub struct ExpirationSweeper {
    registry: Arc<AdRegistry>,
    config: Arc<ArcSwap<DirectorConfig>>,
}

impl ExpirationSweeper {
    pub fn new(registry: Arc<AdRegistry>, config: Arc<ArcSwap<DirectorConfig>>) -> Self {
        Self { registry, config }
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        {
            let config = self.config.load();
            tracing::info!(
                interval_secs = config.registry.sweep_interval_secs,
                ttl_secs = config.registry.advertisement_ttl_secs,
                "Expiration sweeper starting"
            );
        }

        loop {
            let interval = Duration::from_secs(self.config.load().registry.sweep_interval_secs);
            tokio::select! {
                _ = time::sleep(interval) => {
                    self.sweep_once(SystemTime::now());
                }
                _ = shutdown.recv() => {
                    tracing::info!("Expiration sweeper received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// Run one expiration pass as of `now`.
    pub fn sweep_once(&self, now: SystemTime) -> SweepReport {
        let ttl = Duration::from_secs(self.config.load().registry.advertisement_ttl_secs);
        let report = self.registry.remove_stale_associations(ttl, now);

        for expired in &report.expired {
            tracing::info!(
                namespace = %expired.namespace,
                server = %expired.server,
                age_secs = expired.age.as_secs(),
                "Advertisement expired"
            );
        }
        for path in &report.purged_namespaces {
            tracing::info!(namespace = %path, "Namespace has no remaining servers, removed");
        }
        for name in &report.dropped_servers {
            tracing::debug!(server = %name, "Server no longer advertises any namespace");
        }

        if !report.is_empty() {
            metrics::record_expired(report.expired.len());
            metrics::record_registry_size(&self.registry.stats());
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::types::{NamespaceAd, ServerAd, ServerType};
    use std::time::UNIX_EPOCH;
    use url::Url;

    fn setup(ttl_secs: u64) -> (Arc<AdRegistry>, ExpirationSweeper) {
        let mut config = DirectorConfig::default();
        config.registry.advertisement_ttl_secs = ttl_secs;
        config.registry.sweep_interval_secs = 1;

        let registry = Arc::new(AdRegistry::default());
        let config = Arc::new(ArcSwap::from_pointee(config));
        let sweeper = ExpirationSweeper::new(registry.clone(), config);
        (registry, sweeper)
    }

    fn cache(name: &str) -> ServerAd {
        ServerAd::new(name, ServerType::Cache, Url::parse("https://cache.example.org").unwrap())
    }

    #[test]
    fn test_sweep_once_expires_and_purges() {
        let (registry, sweeper) = setup(60);
        let t0 = UNIX_EPOCH + Duration::from_secs(1_000);

        registry.record_associations_at(&cache("cache1"), &[NamespaceAd::new("/chtc")], t0);
        let t1 = t0 + Duration::from_secs(50);
        registry.record_associations_at(&cache("cache2"), &[NamespaceAd::new("/osg")], t1);

        let report = sweeper.sweep_once(t0 + Duration::from_secs(90));
        assert_eq!(report.expired.len(), 1);
        assert_eq!(report.purged_namespaces, vec!["/chtc".to_string()]);
        assert_eq!(report.dropped_servers, vec!["cache1".to_string()]);

        assert!(registry.snapshot_for_path("/chtc").is_none());
        assert!(registry.snapshot_for_path("/osg").is_some());
    }

    #[test]
    fn test_sweep_uses_reloaded_ttl() {
        let (registry, sweeper) = setup(600);
        let t0 = UNIX_EPOCH + Duration::from_secs(1_000);
        registry.record_associations_at(&cache("cache1"), &[NamespaceAd::new("/chtc")], t0);

        assert!(sweeper.sweep_once(t0 + Duration::from_secs(120)).is_empty());

        let mut shorter = DirectorConfig::default();
        shorter.registry.advertisement_ttl_secs = 60;
        sweeper.config.store(Arc::new(shorter));

        assert_eq!(sweeper.sweep_once(t0 + Duration::from_secs(120)).expired.len(), 1);
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let (_registry, sweeper) = setup(60);
        let (tx, rx) = broadcast::channel(1);

        let handle = tokio::spawn(sweeper.run(rx));
        tokio::time::sleep(Duration::from_millis(50)).await;
        tx.send(()).unwrap();

        time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("sweeper did not stop")
            .unwrap();
    }

    #[tokio::test]
    async fn test_run_sweeps_periodically() {
        let (registry, sweeper) = setup(1);
        let stale = SystemTime::now() - Duration::from_secs(30);
        registry.record_associations_at(&cache("cache1"), &[NamespaceAd::new("/chtc")], stale);

        let (tx, rx) = broadcast::channel(1);
        let handle = tokio::spawn(sweeper.run(rx));

        tokio::time::sleep(Duration::from_millis(1_500)).await;
        assert_eq!(registry.stats().namespaces, 0);

        tx.send(()).unwrap();
        handle.await.unwrap();
    }
}
