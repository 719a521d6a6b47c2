//! Namespace index abstraction.
//!
//! # Responsibilities
//! - Store namespace entries keyed by their exact path
//! - Find the entry that best covers a request path
//! - Support in-place pruning for the expiration sweeper
//!
//! # Implementations
//! - `SegmentTrie` (default): walks one node per path segment, so lookup cost
//!   depends on path depth rather than namespace count
//! - `LinearScan`: checks every key with `matches_prefix`. Simple baseline,
//!   fine for small federations

use std::collections::BTreeMap;
use std::fmt;
use std::time::SystemTime;

use crate::config::IndexKind;
use crate::registry::matcher::matches_prefix;
use crate::registry::trie::SegmentTrie;
use crate::registry::types::NamespaceAd;

/// A (namespace, server) edge with its freshness stamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Association {
    /// Name of the advertising server.
    pub server: String,
    /// When the server last advertised this namespace.
    pub last_seen: SystemTime,
}

/// A namespace and the servers currently associated with it.
#[derive(Debug, Clone)]
pub struct NamespaceEntry {
    pub ad: NamespaceAd,
    /// Associations in first-advertised order.
    pub associations: Vec<Association>,
}

impl NamespaceEntry {
    pub fn new(ad: NamespaceAd) -> Self {
        Self {
            ad,
            associations: Vec::new(),
        }
    }

    pub fn path(&self) -> &str {
        &self.ad.path
    }

    /// Create or refresh the association for `server`.
    ///
    /// Returns true if the association is new. Refreshing keeps the
    /// association's position so resolution order stays stable.
    pub fn touch(&mut self, server: &str, now: SystemTime) -> bool {
        match self.associations.iter_mut().find(|a| a.server == server) {
            Some(existing) => {
                existing.last_seen = now;
                false
            }
            None => {
                self.associations.push(Association {
                    server: server.to_string(),
                    last_seen: now,
                });
                true
            }
        }
    }
}

/// Storage and lookup strategy for namespace entries.
pub trait NamespaceIndex: Send + Sync + fmt::Debug {
    /// Short name used in logs and the admin API.
    fn name(&self) -> &'static str;

    /// Returns the entry stored under `ad.path`, inserting a fresh one built
    /// from `ad` if none exists. Existing metadata is left untouched.
    ///
    /// Returns `None` if the path is not absolute and cannot be indexed.
    fn entry(&mut self, ad: &NamespaceAd) -> Option<&mut NamespaceEntry>;

    /// Exact lookup by stored path.
    fn get(&self, path: &str) -> Option<&NamespaceEntry>;

    /// The entry with the longest key matching `path`.
    fn longest_match(&self, path: &str) -> Option<&NamespaceEntry>;

    /// Visits every entry mutably and drops those for which `keep` returns false.
    fn retain(&mut self, keep: &mut dyn FnMut(&mut NamespaceEntry) -> bool);

    /// All entries ordered by path.
    fn entries(&self) -> Vec<&NamespaceEntry>;

    /// Number of stored namespaces.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Build the index selected in configuration.
pub fn build_index(kind: IndexKind) -> Box<dyn NamespaceIndex> {
    match kind {
        IndexKind::Trie => Box::new(SegmentTrie::new()),
        IndexKind::Linear => Box::new(LinearScan::new()),
    }
}

/// Flat map of namespaces, scanned in full on every lookup.
#[derive(Debug, Default)]
pub struct LinearScan {
    entries: BTreeMap<String, NamespaceEntry>,
}

impl LinearScan {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NamespaceIndex for LinearScan {
    fn name(&self) -> &'static str {
        "linear"
    }

    fn entry(&mut self, ad: &NamespaceAd) -> Option<&mut NamespaceEntry> {
        if !ad.path.starts_with('/') {
            return None;
        }
        Some(
            self.entries
                .entry(ad.path.clone())
                .or_insert_with(|| NamespaceEntry::new(ad.clone())),
        )
    }

    fn get(&self, path: &str) -> Option<&NamespaceEntry> {
        self.entries.get(path)
    }

    fn longest_match(&self, path: &str) -> Option<&NamespaceEntry> {
        self.entries
            .iter()
            .filter(|(key, _)| matches_prefix(key, path))
            .max_by_key(|(key, _)| key.len())
            .map(|(_, entry)| entry)
    }

    fn retain(&mut self, keep: &mut dyn FnMut(&mut NamespaceEntry) -> bool) {
        self.entries.retain(|_, entry| keep(entry));
    }

    fn entries(&self) -> Vec<&NamespaceEntry> {
        self.entries.values().collect()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_touch_refreshes_in_place() {
        let t0 = SystemTime::UNIX_EPOCH;
        let t1 = t0 + Duration::from_secs(10);

        let mut entry = NamespaceEntry::new(NamespaceAd::new("/chtc"));
        assert!(entry.touch("origin1", t0));
        assert!(entry.touch("cache1", t0));
        assert!(!entry.touch("origin1", t1));

        assert_eq!(entry.associations.len(), 2);
        assert_eq!(entry.associations[0].server, "origin1");
        assert_eq!(entry.associations[0].last_seen, t1);
    }

    #[test]
    fn test_linear_scan_lookup() {
        let mut index = LinearScan::new();
        for path in ["/chtc", "/chtc/PUBLIC", "/chtc/PUBLIC2/"] {
            index.entry(&NamespaceAd::new(path)).unwrap();
        }
        assert!(index.entry(&NamespaceAd::new("relative")).is_none());
        assert_eq!(index.len(), 3);

        let hit = |p: &str| index.longest_match(p).map(|e| e.path().to_string());
        assert_eq!(hit("/chtc/PUBLI").as_deref(), Some("/chtc"));
        assert_eq!(hit("/chtc/PUBLIC2").as_deref(), Some("/chtc/PUBLIC2/"));
        assert_eq!(hit("/osg"), None);
    }

    #[test]
    fn test_linear_scan_retain() {
        let mut index = LinearScan::new();
        index.entry(&NamespaceAd::new("/a")).unwrap();
        index.entry(&NamespaceAd::new("/b")).unwrap();

        index.retain(&mut |entry| entry.path() != "/a");
        assert!(index.get("/a").is_none());
        assert!(index.get("/b").is_some());
        assert_eq!(index.entries().len(), 1);
    }
}
