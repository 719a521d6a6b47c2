//! Segment-indexed prefix tree over namespace paths.

use std::collections::HashMap;

use crate::registry::index::{NamespaceEntry, NamespaceIndex};
use crate::registry::matcher::{key_segments, path_segments};
use crate::registry::types::NamespaceAd;

/// Trie keyed by path segment.
///
/// Supports:
/// - O(d) insert and exact lookup, where d is the key depth
/// - O(d) longest-prefix lookup, where d is the request path depth
///
/// Each node holds up to two namespaces: the key ending at that node without a
/// trailing slash (`/chtc`) and the key ending with one (`/chtc/`). Both cover
/// the same request paths; the trailing-slash key is longer and wins.
#[derive(Debug, Default)]
pub struct SegmentTrie {
    root: TrieNode,
    len: usize,
}

#[derive(Debug, Default)]
struct TrieNode {
    children: HashMap<String, TrieNode>,
    exact: Option<NamespaceEntry>,
    dir: Option<NamespaceEntry>,
}

impl TrieNode {
    fn descend(&self, segments: &[&str]) -> Option<&TrieNode> {
        let mut node = self;
        for segment in segments {
            node = node.children.get(*segment)?;
        }
        Some(node)
    }

    /// The most specific namespace stored at this node.
    fn best(&self) -> Option<&NamespaceEntry> {
        self.dir.as_ref().or(self.exact.as_ref())
    }

    fn is_vacant(&self) -> bool {
        self.exact.is_none() && self.dir.is_none() && self.children.is_empty()
    }

    fn retain(&mut self, keep: &mut dyn FnMut(&mut NamespaceEntry) -> bool) -> usize {
        let mut removed = 0;
        for slot in [&mut self.exact, &mut self.dir] {
            let drop_entry = slot.as_mut().is_some_and(|entry| !keep(entry));
            if drop_entry {
                *slot = None;
                removed += 1;
            }
        }

        self.children.retain(|_, child| {
            removed += child.retain(&mut *keep);
            !child.is_vacant()
        });
        removed
    }

    fn collect<'a>(&'a self, out: &mut Vec<&'a NamespaceEntry>) {
        out.extend(self.exact.iter());
        out.extend(self.dir.iter());
        for child in self.children.values() {
            child.collect(out);
        }
    }
}

impl SegmentTrie {
    /// Creates an empty trie.
    pub fn new() -> Self {
        Self::default()
    }
}

impl NamespaceIndex for SegmentTrie {
    fn name(&self) -> &'static str {
        "trie"
    }

    fn entry(&mut self, ad: &NamespaceAd) -> Option<&mut NamespaceEntry> {
        let (segments, trailing) = key_segments(&ad.path)?;

        let mut node = &mut self.root;
        for segment in segments {
            node = node.children.entry(segment.to_string()).or_default();
        }

        let slot = if trailing { &mut node.dir } else { &mut node.exact };
        if slot.is_none() {
            self.len += 1;
        }
        Some(slot.get_or_insert_with(|| NamespaceEntry::new(ad.clone())))
    }

    fn get(&self, path: &str) -> Option<&NamespaceEntry> {
        let (segments, trailing) = key_segments(path)?;
        let node = self.root.descend(&segments)?;
        if trailing {
            node.dir.as_ref()
        } else {
            node.exact.as_ref()
        }
    }

    fn longest_match(&self, path: &str) -> Option<&NamespaceEntry> {
        let segments = path_segments(path)?;

        let mut node = &self.root;
        let mut best = node.best();
        for segment in segments {
            match node.children.get(segment) {
                Some(child) => {
                    node = child;
                    if let Some(entry) = node.best() {
                        best = Some(entry);
                    }
                }
                None => break,
            }
        }
        best
    }

    fn retain(&mut self, keep: &mut dyn FnMut(&mut NamespaceEntry) -> bool) {
        let removed = self.root.retain(keep);
        self.len -= removed;
    }

    fn entries(&self) -> Vec<&NamespaceEntry> {
        let mut out = Vec::with_capacity(self.len);
        self.root.collect(&mut out);
        out.sort_by(|a, b| a.path().cmp(b.path()));
        out
    }

    fn len(&self) -> usize {
        self.len
    }
}
