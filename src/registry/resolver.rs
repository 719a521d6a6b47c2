//! Request path resolution.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::observability::metrics;
use crate::registry::store::AdRegistry;
use crate::registry::types::{NamespaceAd, ServerAd, ServerType};

/// Namespace and grouped servers for a request path.
///
/// A miss is the default value: an empty namespace path and no servers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub namespace: NamespaceAd,
    pub origins: Vec<ServerAd>,
    pub caches: Vec<ServerAd>,
}

impl Resolution {
    /// True if some namespace covered the path.
    pub fn is_found(&self) -> bool {
        !self.namespace.path.is_empty()
    }

    /// Servers of the given type.
    pub fn servers(&self, server_type: ServerType) -> &[ServerAd] {
        match server_type {
            ServerType::Origin => &self.origins,
            ServerType::Cache => &self.caches,
        }
    }

    pub fn into_parts(self) -> (NamespaceAd, Vec<ServerAd>, Vec<ServerAd>) {
        (self.namespace, self.origins, self.caches)
    }
}

/// Resolves request paths against the registry.
#[derive(Debug, Clone)]
pub struct PathResolver {
    registry: Arc<AdRegistry>,
}

impl PathResolver {
    pub fn new(registry: Arc<AdRegistry>) -> Self {
        Self { registry }
    }

    /// Find the namespace covering `path` and split its servers by type.
    ///
    /// Within each group servers keep the order they first advertised in.
    pub fn get_ads_for_path(&self, path: &str) -> Resolution {
        let Some(snapshot) = self.registry.snapshot_for_path(path) else {
            tracing::debug!(path = %path, "No namespace matches path");
            metrics::record_resolution("miss");
            return Resolution::default();
        };

        let (origins, caches): (Vec<ServerAd>, Vec<ServerAd>) = snapshot
            .servers
            .into_iter()
            .partition(|server| server.server_type == ServerType::Origin);

        tracing::debug!(
            path = %path,
            namespace = %snapshot.namespace.path,
            origins = origins.len(),
            caches = caches.len(),
            "Resolved path"
        );
        metrics::record_resolution("hit");

        Resolution {
            namespace: snapshot.namespace,
            origins,
            caches,
        }
    }
}
