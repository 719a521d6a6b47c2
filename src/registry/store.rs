//! The in-memory advertisement registry.
//!
//! # Responsibilities
//! - Own namespace entries and the server records they reference
//! - Apply advertisements under a single write lock acquisition
//! - Hand out owned snapshots for resolution
//! - Age out stale associations
//!
//! # Design Decisions
//! - One `RwLock` around the whole index: lookups run in parallel, writers
//!   serialize and block readers only for the map mutation
//! - Server records are keyed by name so every namespace sees the latest
//!   url/auth_url pair after a re-advertisement
//! - A namespace whose last association expires is purged in the same sweep
//! - Nothing is logged while the lock is held

use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::Serialize;
use url::Url;

use crate::config::IndexKind;
use crate::registry::index::{build_index, NamespaceIndex};
use crate::registry::types::{NamespaceAd, ServerAd, ServerType};

/// Thread-safe registry of namespaces and the servers advertising them.
#[derive(Debug)]
pub struct AdRegistry {
    inner: RwLock<RegistryInner>,
}

#[derive(Debug)]
struct RegistryInner {
    index: Box<dyn NamespaceIndex>,
    servers: HashMap<String, ServerAd>,
    /// Live associations across all namespaces.
    associations: usize,
}

impl RegistryInner {
    fn stats(&self) -> RegistryStats {
        RegistryStats {
            namespaces: self.index.len(),
            servers: self.servers.len(),
            associations: self.associations,
        }
    }
}

/// Owned copy of a matched namespace and its servers.
#[derive(Debug, Clone, PartialEq)]
pub struct NamespaceSnapshot {
    pub namespace: NamespaceAd,
    /// Servers in association order.
    pub servers: Vec<ServerAd>,
}

/// An association removed by a sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpiredAssociation {
    pub namespace: String,
    pub server: String,
    pub age: Duration,
}

/// Everything a sweep removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub expired: Vec<ExpiredAssociation>,
    /// Namespaces left without any association.
    pub purged_namespaces: Vec<String>,
    /// Servers no longer referenced by any namespace.
    pub dropped_servers: Vec<String>,
}

impl SweepReport {
    pub fn is_empty(&self) -> bool {
        self.expired.is_empty()
            && self.purged_namespaces.is_empty()
            && self.dropped_servers.is_empty()
    }
}

/// Registry size counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RegistryStats {
    pub namespaces: usize,
    pub servers: usize,
    pub associations: usize,
}

/// Admin view of one namespace.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceView {
    pub path: String,
    pub require_token: bool,
    pub issuer: Option<Url>,
    pub servers: Vec<AssociationView>,
}

/// Admin view of one association.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssociationView {
    pub name: String,
    #[serde(rename = "type")]
    pub server_type: ServerType,
    pub url: Url,
    /// Seconds since the Unix epoch.
    pub last_seen: u64,
}

impl Default for AdRegistry {
    fn default() -> Self {
        Self::new(IndexKind::default())
    }
}

impl AdRegistry {
    /// Create an empty registry backed by the given index strategy.
    pub fn new(kind: IndexKind) -> Self {
        Self::with_index(build_index(kind))
    }

    pub fn with_index(index: Box<dyn NamespaceIndex>) -> Self {
        Self {
            inner: RwLock::new(RegistryInner {
                index,
                servers: HashMap::new(),
                associations: 0,
            }),
        }
    }

    // Every mutation is a single map operation, so the data is consistent
    // even if a holder panicked.
    fn read(&self) -> RwLockReadGuard<'_, RegistryInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RegistryInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Name of the active index strategy.
    pub fn index_name(&self) -> &'static str {
        self.read().index.name()
    }

    /// Create or refresh a single (server, namespace) association.
    pub fn record_association(&self, server: &ServerAd, namespace: &NamespaceAd) -> bool {
        self.record_associations(server, std::slice::from_ref(namespace)) == 1
    }

    /// Create or refresh the associations for one advertisement.
    ///
    /// Returns how many namespaces were recorded.
    pub fn record_associations(&self, server: &ServerAd, namespaces: &[NamespaceAd]) -> usize {
        self.record_associations_at(server, namespaces, SystemTime::now())
    }

    /// Like [`record_associations`](Self::record_associations) with an explicit timestamp.
    ///
    /// Namespace metadata is overwritten with the submitted values. Paths that
    /// are not absolute are skipped.
    pub fn record_associations_at(
        &self,
        server: &ServerAd,
        namespaces: &[NamespaceAd],
        now: SystemTime,
    ) -> usize {
        self.apply_advertisement(server, namespaces, now).0
    }

    /// Record an advertisement and return the recorded namespace count with
    /// the registry size taken under the same write lock.
    pub fn apply_advertisement(
        &self,
        server: &ServerAd,
        namespaces: &[NamespaceAd],
        now: SystemTime,
    ) -> (usize, RegistryStats) {
        let mut skipped = Vec::new();
        let mut recorded = 0;

        let stats = {
            let mut inner = self.write();
            for namespace in namespaces {
                let Some(entry) = inner.index.entry(namespace) else {
                    skipped.push(namespace.path.as_str());
                    continue;
                };
                entry.ad.clone_from(namespace);
                let added = entry.touch(&server.name, now);
                if added {
                    inner.associations += 1;
                }
                recorded += 1;
            }
            if recorded > 0 {
                inner.servers.insert(server.name.clone(), server.clone());
            }
            inner.stats()
        };

        for path in skipped {
            tracing::warn!(
                server = %server.name,
                namespace = %path,
                "Skipping namespace with non-absolute path"
            );
        }
        (recorded, stats)
    }

    /// Copy out the namespace that best covers `path`, with its servers.
    pub fn snapshot_for_path(&self, path: &str) -> Option<NamespaceSnapshot> {
        let inner = self.read();
        let entry = inner.index.longest_match(path)?;
        let servers = entry
            .associations
            .iter()
            .filter_map(|assoc| inner.servers.get(&assoc.server).cloned())
            .collect();

        Some(NamespaceSnapshot {
            namespace: entry.ad.clone(),
            servers,
        })
    }

    /// Remove associations not refreshed within `ttl` of `now`.
    ///
    /// Namespaces left without associations are removed, as are servers that
    /// no longer serve any namespace.
    pub fn remove_stale_associations(&self, ttl: Duration, now: SystemTime) -> SweepReport {
        let mut report = SweepReport::default();
        let mut live: HashSet<String> = HashSet::new();

        let mut guard = self.write();
        let RegistryInner {
            index,
            servers,
            associations,
        } = &mut *guard;

        index.retain(&mut |entry| {
            let namespace = &entry.ad.path;
            entry.associations.retain(|assoc| {
                let age = now.duration_since(assoc.last_seen).unwrap_or_default();
                if age > ttl {
                    report.expired.push(ExpiredAssociation {
                        namespace: namespace.clone(),
                        server: assoc.server.clone(),
                        age,
                    });
                    false
                } else {
                    live.insert(assoc.server.clone());
                    true
                }
            });

            if entry.associations.is_empty() {
                report.purged_namespaces.push(entry.ad.path.clone());
                false
            } else {
                true
            }
        });

        *associations -= report.expired.len();

        servers.retain(|name, _| {
            let keep = live.contains(name);
            if !keep {
                report.dropped_servers.push(name.clone());
            }
            keep
        });

        drop(guard);
        report
    }

    /// Last time `server` advertised the namespace stored at exactly `path`.
    pub fn last_seen(&self, path: &str, server: &str) -> Option<SystemTime> {
        let inner = self.read();
        inner
            .index
            .get(path)?
            .associations
            .iter()
            .find(|assoc| assoc.server == server)
            .map(|assoc| assoc.last_seen)
    }

    /// Number of associations stored for the namespace at exactly `path`.
    pub fn association_count(&self, path: &str) -> usize {
        self.read()
            .index
            .get(path)
            .map_or(0, |entry| entry.associations.len())
    }

    /// Current server record for `name`.
    pub fn server(&self, name: &str) -> Option<ServerAd> {
        self.read().servers.get(name).cloned()
    }

    pub fn stats(&self) -> RegistryStats {
        self.read().stats()
    }

    /// Owned listing of every namespace, ordered by path.
    pub fn namespaces(&self) -> Vec<NamespaceView> {
        let inner = self.read();
        inner
            .index
            .entries()
            .into_iter()
            .map(|entry| NamespaceView {
                path: entry.ad.path.clone(),
                require_token: entry.ad.require_token,
                issuer: entry.ad.issuer.clone(),
                servers: entry
                    .associations
                    .iter()
                    .filter_map(|assoc| {
                        let server = inner.servers.get(&assoc.server)?;
                        Some(AssociationView {
                            name: server.name.clone(),
                            server_type: server.server_type,
                            url: server.url.clone(),
                            last_seen: assoc
                                .last_seen
                                .duration_since(UNIX_EPOCH)
                                .unwrap_or_default()
                                .as_secs(),
                        })
                    })
                    .collect(),
            })
            .collect()
    }
}
