//! Advertisement validation and ingestion.
//!
//! # Responsibilities
//! - Reject malformed advertisements before touching the registry
//! - Apply accepted advertisements as one batch
//!
//! # Design Decisions
//! - All-or-nothing: one bad namespace rejects the whole advertisement
//! - Validation runs before the registry write lock is taken
//! - Namespaces missing from a re-advertisement are left to expire

use std::sync::Arc;
use std::time::SystemTime;

use crate::observability::metrics;
use crate::registry::store::AdRegistry;
use crate::registry::types::{AdvertisementError, AdvertisementResult, NamespaceAd, ServerAd};

/// Check an advertisement without applying it.
pub fn validate_ad(server: &ServerAd, namespaces: &[NamespaceAd]) -> AdvertisementResult<()> {
    if server.name.trim().is_empty() {
        return Err(AdvertisementError::EmptyServerName);
    }
    if namespaces.is_empty() {
        return Err(AdvertisementError::NoNamespaces(server.name.clone()));
    }
    for namespace in namespaces {
        if namespace.path.is_empty() {
            return Err(AdvertisementError::EmptyNamespacePath);
        }
        if !namespace.path.starts_with('/') {
            return Err(AdvertisementError::RelativeNamespacePath(namespace.path.clone()));
        }
    }
    Ok(())
}

/// Validates advertisements and records them in the registry.
#[derive(Debug, Clone)]
pub struct AdRecorder {
    registry: Arc<AdRegistry>,
}

impl AdRecorder {
    pub fn new(registry: Arc<AdRegistry>) -> Self {
        Self { registry }
    }

    /// Record that `server` currently serves `namespaces`.
    ///
    /// Returns the number of namespaces recorded.
    pub fn record_ad(
        &self,
        server: &ServerAd,
        namespaces: &[NamespaceAd],
    ) -> AdvertisementResult<usize> {
        self.record_ad_at(server, namespaces, SystemTime::now())
    }

    /// Like [`record_ad`](Self::record_ad) with an explicit timestamp.
    pub fn record_ad_at(
        &self,
        server: &ServerAd,
        namespaces: &[NamespaceAd],
        now: SystemTime,
    ) -> AdvertisementResult<usize> {
        if let Err(e) = validate_ad(server, namespaces) {
            tracing::warn!(
                server = %server.name,
                server_type = %server.server_type,
                error = %e,
                "Rejected advertisement"
            );
            metrics::record_advertisement(server.server_type, "rejected");
            return Err(e);
        }

        let (recorded, stats) = self.registry.apply_advertisement(server, namespaces, now);

        tracing::debug!(
            server = %server.name,
            server_type = %server.server_type,
            namespaces = recorded,
            "Advertisement recorded"
        );
        metrics::record_advertisement(server.server_type, "accepted");
        metrics::record_registry_size(&stats);
        Ok(recorded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::types::ServerType;
    use url::Url;

    fn origin(name: &str) -> ServerAd {
        ServerAd::new(name, ServerType::Origin, Url::parse("https://wisc.edu").unwrap())
    }

    #[test]
    fn test_validation_rules() {
        let ns = [NamespaceAd::new("/chtc")];

        assert_eq!(validate_ad(&origin("origin1"), &ns), Ok(()));
        assert_eq!(validate_ad(&origin("  "), &ns), Err(AdvertisementError::EmptyServerName));
        assert_eq!(
            validate_ad(&origin("origin1"), &[]),
            Err(AdvertisementError::NoNamespaces("origin1".into()))
        );
        assert_eq!(
            validate_ad(&origin("origin1"), &[NamespaceAd::new("")]),
            Err(AdvertisementError::EmptyNamespacePath)
        );
        assert_eq!(
            validate_ad(&origin("origin1"), &[NamespaceAd::new("chtc")]),
            Err(AdvertisementError::RelativeNamespacePath("chtc".into()))
        );
    }

    #[test]
    fn test_rejection_leaves_registry_untouched() {
        let registry = Arc::new(AdRegistry::default());
        let recorder = AdRecorder::new(registry.clone());

        recorder.record_ad(&origin("origin1"), &[NamespaceAd::new("/osg")]).unwrap();

        let result = recorder.record_ad(
            &origin("origin2"),
            &[NamespaceAd::new("/chtc"), NamespaceAd::new("relative")],
        );
        assert!(result.is_err());

        let stats = registry.stats();
        assert_eq!(stats.namespaces, 1);
        assert_eq!(stats.servers, 1);
        assert!(registry.snapshot_for_path("/chtc").is_none());
        assert!(registry.snapshot_for_path("/osg").is_some());
    }

    #[test]
    fn test_readvertisement_does_not_touch_unlisted_namespaces() {
        let registry = Arc::new(AdRegistry::default());
        let recorder = AdRecorder::new(registry.clone());
        let t0 = SystemTime::UNIX_EPOCH;
        let t1 = t0 + std::time::Duration::from_secs(30);

        let both = [NamespaceAd::new("/a"), NamespaceAd::new("/b")];
        recorder.record_ad_at(&origin("origin1"), &both, t0).unwrap();
        let recorded = recorder
            .record_ad_at(&origin("origin1"), &[NamespaceAd::new("/a")], t1)
            .unwrap();

        assert_eq!(recorded, 1);
        assert_eq!(registry.last_seen("/a", "origin1"), Some(t1));
        assert_eq!(registry.last_seen("/b", "origin1"), Some(t0));
    }
}
