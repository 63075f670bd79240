//! Adaptive Radix Tree: the core engine.
//!
//! A `Node::Leaf` stores a complete key; every other node is an inner node
//! indexing children by a single byte, optionally preceded by a compressed
//! path prefix shared by every key under it (path compression) and created
//! lazily only where two keys actually diverge (lazy expansion).

mod node;

use crate::util::common_prefix_len;
use node::{NodeKind, Node, PrefixBlock, MAX_PREFIX};

/// An in-memory ordered key-value index backed by an Adaptive Radix Tree.
///
/// Keys are arbitrary byte strings; values are an unconstrained generic
/// type. There is no `Result` in this API: every operation is total over
/// its inputs (see the crate-level docs for the error-handling rationale).
pub struct ArtTree<V> {
    root: Option<Box<Node<V>>>,
    size: usize,
}

impl<V> Default for ArtTree<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> ArtTree<V> {
    pub fn new() -> Self {
        ArtTree { root: None, size: 0 }
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Make a key self-delimiting: escape every embedded 0x00 byte as
    /// `0x00 0x01`, then append a `0x00 0x00` terminator.
    ///
    /// A plain "append one 0x00" sentinel (append iff the key has no
    /// embedded 0x00) fails invariant 5 for keys that do embed one: e.g.
    /// `[0]` and `[0, 1]` both contain a 0x00 already, so neither gets a
    /// sentinel appended, and `[0]` is then a proper prefix of `[0, 1]`.
    /// The escape-then-terminate scheme here has no such case: every
    /// embedded 0x00 in the escaped span is immediately followed by 0x01,
    /// so the two-byte run `0x00 0x00` appears exactly once in any stored
    /// key — at its own terminator — which makes one stored key a proper
    /// prefix of another's impossible.
    fn stored_key(key: &[u8]) -> Vec<u8> {
        let mut owned = Vec::with_capacity(key.len() + 2);
        for &b in key {
            owned.push(b);
            if b == 0u8 {
                owned.push(1u8);
            }
        }
        owned.push(0u8);
        owned.push(0u8);
        owned
    }

    /// Compare `key[depth..]` against `node`'s prefix, returning the number
    /// of leading bytes that match (at most `node.prefix().len`).
    ///
    /// Pessimistic mode (`prefix.len <= MAX_PREFIX`) compares against the
    /// fully-inlined bytes. Optimistic mode compares the inlined head first,
    /// then falls back to the leftmost descendant leaf's stored key for the
    /// un-inlined tail — that leaf need not be the eventual match, it only
    /// has to agree with every other descendant on this shared span.
    fn mismatch(node: &Node<V>, key: &[u8], depth: usize) -> usize {
        let prefix = node.prefix();
        let plen = prefix.len;
        let inline = prefix.inline();

        let head = inline.len().min(plen);
        let key_tail = if depth <= key.len() { &key[depth..] } else { &[] };
        let mut i = common_prefix_len(key_tail, inline);
        if i < head {
            return i;
        }
        if plen <= MAX_PREFIX {
            return plen;
        }

        let leaf_key = node.leftmost_leaf().leaf_key();
        while i < plen {
            let kb = key.get(depth + i);
            let lb = leaf_key.get(depth + i);
            match (kb, lb) {
                (Some(&a), Some(&b)) if a == b => i += 1,
                _ => return i,
            }
        }
        plen
    }

    pub fn insert(&mut self, key: &[u8], value: V) {
        let skey = Self::stored_key(key);
        let root = self.root.take();
        let (new_root, inserted) = match root {
            None => (Box::new(Node::new_leaf(skey, value)), true),
            Some(r) => Self::insert_node(r, &skey, 0, value),
        };
        self.root = Some(new_root);
        if inserted {
            self.size += 1;
        }
    }

    fn insert_node(
        mut node: Box<Node<V>>,
        key: &[u8],
        depth: usize,
        value: V,
    ) -> (Box<Node<V>>, bool) {
        if node.is_leaf() {
            let existing = node.leaf_key().to_vec();
            if existing == key {
                if let Node::Leaf { value: v, .. } = &mut *node {
                    *v = value;
                }
                return (node, false);
            }

            // Lazy expansion: split into a fresh N4 at the point the two
            // keys diverge.
            let common = common_prefix_len(&existing[depth..], &key[depth..]);
            let split = depth + common;
            let pivot_old = *existing
                .get(split)
                .expect("ART invariant violated: one stored key is a proper prefix of another");
            let pivot_new = *key
                .get(split)
                .expect("ART invariant violated: one stored key is a proper prefix of another");

            let mut parent = Node::new_n4();
            parent.set_prefix(&key[depth..split]);
            parent.add_child(pivot_old, node);
            parent.add_child(pivot_new, Box::new(Node::new_leaf(key.to_vec(), value)));
            return (Box::new(parent), true);
        }

        let prefix_len = node.prefix().len;
        let m = Self::mismatch(&node, key, depth);

        if m < prefix_len {
            // The key diverges partway through this node's prefix: split
            // the prefix, inserting a new N4 above both the old node (now
            // holding only the remaining tail of its prefix) and a new leaf.
            let (pivot_old, old_remaining): (u8, Vec<u8>) = if prefix_len <= MAX_PREFIX {
                let inline = node.prefix().inline();
                (inline[m], inline[m + 1..prefix_len].to_vec())
            } else {
                let leaf_key = node.leftmost_leaf().leaf_key().to_vec();
                (
                    leaf_key[depth + m],
                    leaf_key[depth + m + 1..depth + prefix_len].to_vec(),
                )
            };
            node.set_prefix(&old_remaining);

            let pivot_new = *key.get(depth + m).expect(
                "ART invariant violated: one stored key is a proper prefix of another",
            );
            let mut parent = Node::new_n4();
            parent.set_prefix(&key[depth..depth + m]);
            parent.add_child(pivot_old, node);
            parent.add_child(pivot_new, Box::new(Node::new_leaf(key.to_vec(), value)));
            return (Box::new(parent), true);
        }

        // Prefix fully matched; descend one byte further.
        let next_depth = depth + prefix_len;
        let byte = *key.get(next_depth).expect(
            "ART invariant violated: key terminates inside an inner node's prefix",
        );

        if node.find_child(byte).is_some() {
            let child = node.remove_child(byte);
            let (new_child, inserted) = Self::insert_node(child, key, next_depth + 1, value);
            node.add_child(byte, new_child);
            (node, inserted)
        } else {
            let leaf = Box::new(Node::new_leaf(key.to_vec(), value));
            node.add_child_grow(byte, leaf);
            (node, true)
        }
    }

    pub fn search(&self, key: &[u8]) -> Option<&V> {
        let skey = Self::stored_key(key);
        let mut node = self.root.as_deref()?;
        let mut depth = 0;
        loop {
            if let Node::Leaf { key: lk, value } = node {
                return if lk.as_slice() == skey.as_slice() {
                    Some(value)
                } else {
                    None
                };
            }

            let prefix_len = node.prefix().len;
            if Self::mismatch(node, &skey, depth) < prefix_len {
                return None;
            }
            let next_depth = depth + prefix_len;
            let byte = *skey.get(next_depth)?;
            node = node.find_child(byte)?;
            depth = next_depth + 1;
        }
    }

    pub fn contains(&self, key: &[u8]) -> bool {
        self.search(key).is_some()
    }

    pub fn delete(&mut self, key: &[u8]) -> bool {
        let skey = Self::stored_key(key);
        let Some(root) = self.root.take() else {
            return false;
        };
        let (new_root, removed) = Self::delete_node(root, &skey, 0);
        self.root = new_root;
        if removed.is_some() {
            self.size -= 1;
            true
        } else {
            false
        }
    }

    fn delete_node(
        mut node: Box<Node<V>>,
        key: &[u8],
        depth: usize,
    ) -> (Option<Box<Node<V>>>, Option<V>) {
        if node.is_leaf() {
            if node.leaf_key() == key {
                let Node::Leaf { value, .. } = *node else {
                    unreachable!()
                };
                return (None, Some(value));
            }
            return (Some(node), None);
        }

        let prefix = node.prefix().clone();
        if Self::mismatch(&node, key, depth) < prefix.len {
            return (Some(node), None);
        }
        let next_depth = depth + prefix.len;
        let Some(&byte) = key.get(next_depth) else {
            return (Some(node), None);
        };
        if node.find_child(byte).is_none() {
            return (Some(node), None);
        }

        let child = node.remove_child(byte);
        let (new_child, removed) = Self::delete_node(child, key, next_depth + 1);
        if let Some(c) = new_child {
            node.add_child(byte, c);
        }
        if removed.is_none() {
            return (Some(node), None);
        }

        let size = node.size();
        if size == 0 {
            // Only possible if the sole remaining child vanished entirely;
            // this node has nothing left to offer.
            return (None, removed);
        }
        if size == 1 {
            let (pivot, only_child) = node
                .drain_sorted()
                .into_iter()
                .next()
                .expect("size() == 1 but drain_sorted produced nothing");
            if only_child.is_leaf() {
                return (Some(only_child), removed);
            }
            let merged = PrefixBlock::merged(&prefix, pivot, only_child.prefix());
            let mut replacement = only_child;
            replacement.set_prefix_block(merged);
            return (Some(replacement), removed);
        }
        if size < node.min_size() {
            node.shrink();
        }
        (Some(node), removed)
    }

    /// Snapshot every (stored key, value) pair. Stored keys include the
    /// terminating sentinel byte appended by `stored_key`; order is
    /// unspecified (see the crate-level Non-goals).
    pub fn dump(&self) -> Vec<(Vec<u8>, V)>
    where
        V: Clone,
    {
        let mut out = Vec::new();
        if let Some(root) = &self.root {
            Self::collect(root, &mut out);
        }
        out
    }

    fn collect(node: &Node<V>, out: &mut Vec<(Vec<u8>, V)>)
    where
        V: Clone,
    {
        match node {
            Node::Leaf { key, value } => out.push((key.clone(), value.clone())),
            Node::N4 { children, .. } | Node::N16 { children, .. } => {
                for c in children {
                    Self::collect(c, out);
                }
            }
            Node::N48 { children, .. } => {
                for c in children.iter().flatten() {
                    Self::collect(c, out);
                }
            }
            Node::N256 { children, .. } => {
                for c in children.iter().flatten() {
                    Self::collect(c, out);
                }
            }
        }
    }

    /// Walk the tree and report every invariant violation found (node size
    /// bounds, key ordering within N4/N16, N48 map/children consistency).
    /// Not part of the core contract; exists for tests and debugging, the
    /// way a hand-rolled dump or assertion sweep would in a crate with no
    /// logging layer to report through.
    pub fn debug_integrity(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if let Some(root) = &self.root {
            if !root.is_leaf() && root.size() < 2 {
                issues.push(format!(
                    "root is an inner node with size {} (<2, should have collapsed)",
                    root.size()
                ));
            }
            Self::check_node(root, &mut issues);
        }
        issues
    }

    fn check_node(node: &Node<V>, issues: &mut Vec<String>) {
        match node {
            Node::Leaf { .. } => {}
            Node::N4 { keys, children, .. } | Node::N16 { keys, children, .. } => {
                let n = children.len();
                if n > node.max_size() {
                    issues.push(format!("{:?} has {} children (> max)", node.kind(), n));
                }
                for w in keys[..n].windows(2) {
                    if w[0] >= w[1] {
                        issues.push(format!("{:?} keys not strictly ascending", node.kind()));
                    }
                }
                for c in children {
                    Self::check_node(c, issues);
                }
            }
            Node::N48 {
                child_index,
                children,
                ..
            } => {
                let mut mapped = 0usize;
                for b in 0..256usize {
                    let i = child_index[b];
                    if i != 0 {
                        mapped += 1;
                        if children.get((i - 1) as usize).map_or(true, |c| c.is_none()) {
                            issues.push("N48 map entry points at an empty slot".to_string());
                        }
                    }
                }
                if mapped != node.size() {
                    issues.push(format!(
                        "N48 map population {mapped} disagrees with size {}",
                        node.size()
                    ));
                }
                for c in children.iter().flatten() {
                    Self::check_node(c, issues);
                }
            }
            Node::N256 { children, size, .. } => {
                let count = children.iter().filter(|c| c.is_some()).count();
                if count != *size as usize {
                    issues.push(format!(
                        "N256 populated-slot count {count} disagrees with size {size}"
                    ));
                }
                for c in children.iter().flatten() {
                    Self::check_node(c, issues);
                }
            }
        }

        // Every inner node must carry at least two children: a single-child
        // node is collapsed during delete, regardless of what the capacity
        // table's nominal min_size for its own kind says (that threshold
        // governs when to shrink to a smaller kind, not this invariant).
        if !node.is_leaf() {
            let min_required = if node.kind() == NodeKind::N4 {
                2
            } else {
                node.min_size()
            };
            if node.size() < min_required {
                issues.push(format!(
                    "{:?} has size {} (< {min_required})",
                    node.kind(),
                    node.size()
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_get_basic() {
        let mut t = ArtTree::new();
        t.insert(b"hello", 1);
        t.insert(b"help", 2);
        t.insert(b"world", 3);
        assert_eq!(t.search(b"hello"), Some(&1));
        assert_eq!(t.search(b"help"), Some(&2));
        assert_eq!(t.search(b"world"), Some(&3));
        assert_eq!(t.search(b"nope"), None);
        assert_eq!(t.len(), 3);
        assert!(t.debug_integrity().is_empty());
    }

    #[test]
    fn insert_updates_value() {
        let mut t = ArtTree::new();
        t.insert(b"key", 1);
        t.insert(b"key", 2);
        assert_eq!(t.search(b"key"), Some(&2));
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn empty_key_is_valid() {
        let mut t = ArtTree::new();
        t.insert(b"", 42);
        assert_eq!(t.search(b""), Some(&42));
        t.insert(b"a", 1);
        assert_eq!(t.search(b""), Some(&42));
        assert_eq!(t.search(b"a"), Some(&1));
    }

    #[test]
    fn prefix_sharing_grows_and_shrinks() {
        let mut t = ArtTree::new();
        let keys: Vec<Vec<u8>> = (0..20)
            .map(|i| format!("shared-prefix-{i:03}").into_bytes())
            .collect();
        for (i, k) in keys.iter().enumerate() {
            t.insert(k, i);
        }
        assert!(t.debug_integrity().is_empty());
        for (i, k) in keys.iter().enumerate() {
            assert_eq!(t.search(k), Some(&i));
        }
        for k in &keys {
            assert!(t.delete(k));
        }
        assert!(t.is_empty());
        assert!(t.root.is_none());
    }

    #[test]
    fn delete_collapses_to_leaf() {
        let mut t = ArtTree::new();
        t.insert(b"roman", 1);
        t.insert(b"romane", 2);
        assert!(t.delete(b"romane"));
        assert_eq!(t.search(b"roman"), Some(&1));
        assert_eq!(t.len(), 1);
        assert!(t.debug_integrity().is_empty());
    }

    #[test]
    fn delete_last_key_empties_tree() {
        let mut t = ArtTree::new();
        t.insert(b"only", 1);
        assert!(t.delete(b"only"));
        assert!(t.is_empty());
        assert_eq!(t.search(b"only"), None);
        assert!(!t.delete(b"only"));
    }

    #[test]
    fn delete_absent_key_is_noop() {
        let mut t = ArtTree::new();
        t.insert(b"a", 1);
        assert!(!t.delete(b"b"));
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn grows_through_every_node_kind() {
        let mut t = ArtTree::new();
        for b in 0u8..=255 {
            t.insert(&[b'x', b], b as i32);
        }
        assert_eq!(t.len(), 256);
        for b in 0u8..=255 {
            assert_eq!(t.search(&[b'x', b]), Some(&(b as i32)));
        }
        assert!(t.debug_integrity().is_empty());
        for b in 0u8..=255 {
            assert!(t.delete(&[b'x', b]));
        }
        assert!(t.is_empty());
    }

    #[test]
    fn dump_returns_every_entry() {
        let mut t = ArtTree::new();
        let entries = [("a", 1), ("ab", 2), ("abc", 3), ("b", 4)];
        for (k, v) in entries {
            t.insert(k.as_bytes(), v);
        }
        let mut dumped = t.dump();
        dumped.sort();
        let mut expected: Vec<_> = entries
            .iter()
            .map(|(k, v)| (ArtTree::<i32>::stored_key(k.as_bytes()), *v))
            .collect();
        expected.sort();
        assert_eq!(dumped, expected);
    }

    #[test]
    fn embedded_nul_key_round_trips() {
        let mut t = ArtTree::new();
        t.insert(b"a\0b", 1);
        t.insert(b"a\0c", 2);
        assert_eq!(t.search(b"a\0b"), Some(&1));
        assert_eq!(t.search(b"a\0c"), Some(&2));
    }

    /// A proper-prefix collision under the naive "append 0x00 iff absent"
    /// scheme: both `[0]` and `[0, 1]` already contain a 0x00 byte, so
    /// neither would get a sentinel appended, leaving `[0]` a proper prefix
    /// of `[0, 1]`. The escape-then-terminate scheme must not panic or
    /// confuse the two.
    #[test]
    fn embedded_nul_prefix_collision_does_not_panic() {
        let mut t = ArtTree::new();
        t.insert(&[0u8], 1);
        t.insert(&[0u8, 1u8], 2);
        assert_eq!(t.search(&[0u8]), Some(&1));
        assert_eq!(t.search(&[0u8, 1u8]), Some(&2));
        assert_eq!(t.len(), 2);
        assert!(t.debug_integrity().is_empty());
        assert!(t.delete(&[0u8]));
        assert_eq!(t.search(&[0u8, 1u8]), Some(&2));
        assert!(t.delete(&[0u8, 1u8]));
        assert!(t.is_empty());
    }

    /// 10,000 random byte strings: insert all, verify every one is findable
    /// and the tree stays structurally sound, then delete all and confirm
    /// the tree empties out cleanly.
    #[test]
    fn stress_random_byte_strings() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(0xA27_17EE);
        let mut keys: Vec<Vec<u8>> = Vec::with_capacity(10_000);
        let mut seen = std::collections::HashSet::new();
        while keys.len() < 10_000 {
            let len = rng.gen_range(0..32);
            let key: Vec<u8> = (0..len).map(|_| rng.gen()).collect();
            if seen.insert(key.clone()) {
                keys.push(key);
            }
        }

        let mut t = ArtTree::new();
        for (i, k) in keys.iter().enumerate() {
            t.insert(k, i);
        }
        assert_eq!(t.len(), keys.len());
        assert!(t.debug_integrity().is_empty());
        for (i, k) in keys.iter().enumerate() {
            assert_eq!(t.search(k), Some(&i));
        }

        for k in &keys {
            assert!(t.delete(k));
        }
        assert!(t.is_empty());
        assert!(t.debug_integrity().is_empty());
    }
}
