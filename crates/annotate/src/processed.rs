//! Identity-keyed record of text nodes that must not be scanned again.
//!
//! Entries hold [`WeakNodeRef`]s, so membership never keeps a removed node
//! alive. The key is the node's allocation address; a live weak handle keeps
//! that allocation reserved, so a key cannot be reused by a different node
//! while its entry exists.

use std::collections::HashMap;

use crate::dom::{NodeRef, WeakNodeRef};

#[derive(Debug, Default)]
pub struct ProcessedSet {
    entries: HashMap<usize, WeakNodeRef>,
}

impl ProcessedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when the node was already recorded.
    pub fn insert(&mut self, node: &NodeRef) -> bool {
        self.entries.insert(node.id(), node.downgrade()).is_none()
    }

    pub fn contains(&self, node: &NodeRef) -> bool {
        self.entries
            .get(&node.id())
            .and_then(WeakNodeRef::upgrade)
            .is_some_and(|recorded| recorded == *node)
    }

    pub fn remove(&mut self, node: &NodeRef) -> bool {
        self.entries.remove(&node.id()).is_some()
    }

    /// Drop entries whose node has been freed or is no longer attached under
    /// a parent. Returns how many were dropped.
    pub fn prune(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, weak| {
            weak.upgrade()
                .is_some_and(|node| node.parent().is_some())
        });
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
