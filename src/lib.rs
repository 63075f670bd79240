//! An in-memory ordered key-value index over byte-string keys, with two
//! interchangeable engines behind a common [`Index`] contract:
//!
//! - [`art::ArtTree`]: an Adaptive Radix Tree. Path-compressed, with a
//!   bounded inline prefix per node and a capacity-adaptive node family
//!   (4/16/48/256-way fan-out) that grows and shrinks with occupancy.
//! - [`radix::RadixTree`]: a plain radix tree, without bounded prefixes or
//!   node-capacity tiers — simpler, and a useful point of comparison.
//!
//! Both are single-threaded structures; concurrent access needs external
//! synchronization (a `Mutex`/`RwLock` around the whole tree), the same way
//! a `BTreeMap` does. Neither engine allocates a background thread, opens a
//! file, or otherwise performs I/O — every operation is a pure in-memory
//! mutation, so there is nothing here to log or configure.
//!
//! Internal invariant violations (a malformed node reached through a path
//! that should be unreachable) panic rather than return a `Result`: the
//! five core operations never fail on well-formed input, so a `Result`
//! return type would only ever carry a bug report, which a panic already
//! does.

pub mod art;
pub mod radix;
mod util;

#[cfg(test)]
mod proptests;

pub use art::ArtTree;
pub use radix::RadixTree;

/// The ordered associative index contract both engines implement: insert,
/// point lookup, delete, size, and a full snapshot.
pub trait Index<V> {
    /// Insert `key` with `value`. If `key` is already present, its value is
    /// replaced; this does not change `len()`. Re-inserting is always safe,
    /// including with an empty key.
    fn insert(&mut self, key: &[u8], value: V);

    /// Look up `key`, returning its value if present.
    fn search(&self, key: &[u8]) -> Option<&V>;

    /// Remove `key`. Returns `true` if it was present. Deleting an absent
    /// key is a no-op, not an error.
    fn delete(&mut self, key: &[u8]) -> bool;

    /// Number of distinct keys currently stored.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every (key, value) pair currently stored. Order is unspecified.
    fn dump(&self) -> Vec<(Vec<u8>, V)>
    where
        V: Clone;
}

impl<V> Index<V> for ArtTree<V> {
    fn insert(&mut self, key: &[u8], value: V) {
        ArtTree::insert(self, key, value)
    }

    fn search(&self, key: &[u8]) -> Option<&V> {
        ArtTree::search(self, key)
    }

    fn delete(&mut self, key: &[u8]) -> bool {
        ArtTree::delete(self, key)
    }

    fn len(&self) -> usize {
        ArtTree::len(self)
    }

    fn dump(&self) -> Vec<(Vec<u8>, V)>
    where
        V: Clone,
    {
        ArtTree::dump(self)
    }
}

impl<V> Index<V> for RadixTree<V> {
    fn insert(&mut self, key: &[u8], value: V) {
        RadixTree::insert(self, key, value)
    }

    fn search(&self, key: &[u8]) -> Option<&V> {
        RadixTree::search(self, key)
    }

    fn delete(&mut self, key: &[u8]) -> bool {
        RadixTree::delete(self, key)
    }

    fn len(&self) -> usize {
        RadixTree::len(self)
    }

    fn dump(&self) -> Vec<(Vec<u8>, V)>
    where
        V: Clone,
    {
        RadixTree::dump(self)
    }
}
