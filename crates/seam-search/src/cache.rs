//! Keyed locator storage.
//!
//! [`LocatorCache`] maps an ordered [`BoundaryPairKey`] to exactly one
//! locator. Entries are built lazily on first request and live as long as
//! the cache; there is no eviction. Iteration follows insertion order, so
//! every process walks its locators in the same sequence.

use indexmap::map::Entry;
use indexmap::IndexMap;
use seam_core::BoundaryPairKey;

/// At-most-one locator per boundary pair, constructed on demand.
///
/// Keys are directional: `(A, B)` and `(B, A)` are separate entries.
#[derive(Debug)]
pub struct LocatorCache<L> {
    entries: IndexMap<BoundaryPairKey, L>,
}

impl<L> Default for LocatorCache<L> {
    fn default() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }
}

impl<L> LocatorCache<L> {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the locator for `key`, building it with `factory` on a miss.
    ///
    /// `factory` runs at most once per key over the cache's lifetime.
    pub fn get_or_insert_with(&mut self, key: BoundaryPairKey, factory: impl FnOnce() -> L) -> &mut L {
        match self.entries.entry(key) {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(e) => e.insert(factory()),
        }
    }

    /// The locator for `key`, if one was built.
    pub fn get(&self, key: &BoundaryPairKey) -> Option<&L> {
        self.entries.get(key)
    }

    /// Mutable locator for `key`, if one was built.
    pub fn get_mut(&mut self, key: &BoundaryPairKey) -> Option<&mut L> {
        self.entries.get_mut(key)
    }

    /// Whether a locator exists for `key`.
    pub fn contains(&self, key: &BoundaryPairKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of cached locators.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds nothing.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &BoundaryPairKey> {
        self.entries.keys()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&BoundaryPairKey, &L)> {
        self.entries.iter()
    }

    /// Mutable locators in insertion order.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut L> {
        self.entries.values_mut()
    }
}
