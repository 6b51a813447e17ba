//! Orphan set
//!
//! Elements with no parent, kept outside the tree with their subtrees
//! intact until they are reattached or deleted. Keyed by `(kind, id)`;
//! iteration follows insertion order.

use crate::compat::orphan_filter_for;
use crate::element::Element;
use crate::id::ElementKey;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// First-class collection of detached elements
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Element>", into = "Vec<Element>")]
pub struct OrphanSet {
    entries: IndexMap<ElementKey, Element>,
}

impl OrphanSet {
    /// Empty set
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an orphan, replacing any entry with the same key
    ///
    /// Parent references are cleared: an orphan has no parent.
    pub fn insert(&mut self, mut element: Element) -> Option<Element> {
        element.clear_parent();
        self.entries.insert(element.key(), element)
    }

    /// Remove and return an orphan
    pub fn remove(&mut self, key: &ElementKey) -> Option<Element> {
        self.entries.shift_remove(key)
    }

    /// Orphan by key
    #[must_use]
    pub fn get(&self, key: &ElementKey) -> Option<&Element> {
        self.entries.get(key)
    }

    /// Mutable orphan by key
    #[must_use]
    pub fn get_mut(&mut self, key: &ElementKey) -> Option<&mut Element> {
        self.entries.get_mut(key)
    }

    /// Whether `key` is an orphan root
    #[inline]
    #[must_use]
    pub fn contains(&self, key: &ElementKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of orphan roots
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// No orphans
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Orphans in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Element> {
        self.entries.values()
    }

    /// Mutable orphans in insertion order
    ///
    /// Callers must not change an orphan's id.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.entries.values_mut()
    }

    /// Orphan keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &ElementKey> {
        self.entries.keys()
    }

    /// Keep only orphans whose key is in `keep`
    pub fn retain_keys(&mut self, keep: &[ElementKey]) {
        self.entries.retain(|key, _| keep.contains(key));
    }

    /// Orphans that may be attached while editing a node of `node_type`
    #[must_use]
    pub fn filter_for_node(&self, node_type: &str) -> Vec<&Element> {
        let accepted = orphan_filter_for(node_type);
        self.iter()
            .filter(|element| accepted.contains(&element.kind()))
            .collect()
    }

    /// Every key held by the set, including keys nested in orphan subtrees
    #[must_use]
    pub fn all_keys(&self) -> Vec<ElementKey> {
        self.iter().flat_map(Element::subtree_keys).collect()
    }
}

impl From<Vec<Element>> for OrphanSet {
    fn from(elements: Vec<Element>) -> Self {
        let mut set = Self::new();
        for element in elements {
            set.insert(element);
        }
        set
    }
}

impl From<OrphanSet> for Vec<Element> {
    fn from(set: OrphanSet) -> Self {
        set.entries.into_values().collect()
    }
}

impl FromIterator<Element> for OrphanSet {
    fn from_iter<I: IntoIterator<Item = Element>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}
