//! ART node family: the tagged five-variant node used by the Adaptive
//! Radix Tree, and the bounded inline prefix block every inner node
//! carries.
//!
//! The five variants share a conceptual shape (prefix block + size +
//! child-index) but differ in how they index children by a one-byte
//! partial key, so each gets its own memory layout instead of one node
//! struct with a generic index. Grow/shrink allocate a fresh node of the
//! target kind and transfer ownership of the child pointers; the old node
//! is dropped.

/// Inline prefix capacity. Full prefixes longer than this switch the node
/// to optimistic matching (see `crate::art::mod` prefix-matching docs).
pub(crate) const MAX_PREFIX: usize = 8;

pub(crate) const MIN_N4: usize = 0;
pub(crate) const MAX_N4: usize = 4;
pub(crate) const MIN_N16: usize = 5;
pub(crate) const MAX_N16: usize = 16;
pub(crate) const MIN_N48: usize = 17;
pub(crate) const MAX_N48: usize = 48;
pub(crate) const MIN_N256: usize = 49;
pub(crate) const MAX_N256: usize = 256;

/// The kind of a node, used for dispatch and for reporting in
/// `debug_integrity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Leaf,
    N4,
    N16,
    N48,
    N256,
}

/// A compressed path prefix: the first `min(prefix_len, MAX_PREFIX)` bytes
/// inline, plus the true total length. When `prefix_len > MAX_PREFIX` the
/// tail is only recoverable from a descendant leaf's stored key (optimistic
/// mode); see invariant I6.
#[derive(Clone, Default)]
pub(crate) struct PrefixBlock {
    pub(crate) bytes: [u8; MAX_PREFIX],
    pub(crate) len: usize,
}

impl PrefixBlock {
    fn set(&mut self, full: &[u8]) {
        self.len = full.len();
        self.bytes = [0u8; MAX_PREFIX];
        crate::util::bounded_copy(&mut self.bytes, full);
    }

    #[inline]
    pub(crate) fn inline(&self) -> &[u8] {
        &self.bytes[..self.len.min(MAX_PREFIX)]
    }

    /// Build the merged prefix block for `parent.prefix || pivot ||
    /// child.prefix` (spec section 4.5, N4 collapse), keeping the inline
    /// copy bounded to `MAX_PREFIX` while recording the true total length.
    pub(crate) fn merged(parent: &PrefixBlock, pivot: u8, child: &PrefixBlock) -> PrefixBlock {
        let total_len = parent.len + 1 + child.len;
        let mut bytes = [0u8; MAX_PREFIX];
        let mut pos = 0;

        let p = parent.inline();
        let take_p = p.len().min(MAX_PREFIX - pos);
        bytes[pos..pos + take_p].copy_from_slice(&p[..take_p]);
        pos += take_p;

        if pos < MAX_PREFIX {
            bytes[pos] = pivot;
            pos += 1;
        }

        if pos < MAX_PREFIX {
            let c = child.inline();
            let take_c = c.len().min(MAX_PREFIX - pos);
            bytes[pos..pos + take_c].copy_from_slice(&c[..take_c]);
        }

        PrefixBlock {
            bytes,
            len: total_len,
        }
    }
}

/// A node in the Adaptive Radix Tree.
pub(crate) enum Node<V> {
    Leaf {
        /// The stored key, including the terminating sentinel.
        key: Vec<u8>,
        value: V,
    },
    N4 {
        prefix: PrefixBlock,
        keys: [u8; MAX_N4],
        children: Vec<Box<Node<V>>>,
    },
    N16 {
        prefix: PrefixBlock,
        keys: [u8; MAX_N16],
        children: Vec<Box<Node<V>>>,
    },
    N48 {
        prefix: PrefixBlock,
        /// `child_index[b] > 0` means `children[child_index[b] - 1]` is
        /// occupied by the child for byte `b` (the "+1 bias").
        child_index: Box<[u8; 256]>,
        children: Vec<Option<Box<Node<V>>>>,
    },
    N256 {
        prefix: PrefixBlock,
        children: Box<[Option<Box<Node<V>>>; 256]>,
        size: u16,
    },
}

impl<V> Node<V> {
    pub(crate) fn new_leaf(key: Vec<u8>, value: V) -> Self {
        Node::Leaf { key, value }
    }

    pub(crate) fn new_n4() -> Self {
        Node::N4 {
            prefix: PrefixBlock::default(),
            keys: [0; MAX_N4],
            children: Vec::new(),
        }
    }

    pub(crate) fn new_n16() -> Self {
        Node::N16 {
            prefix: PrefixBlock::default(),
            keys: [0; MAX_N16],
            children: Vec::new(),
        }
    }

    pub(crate) fn new_n48() -> Self {
        Node::N48 {
            prefix: PrefixBlock::default(),
            child_index: Box::new([0u8; 256]),
            children: Vec::new(),
        }
    }

    pub(crate) fn new_n256() -> Self {
        Node::N256 {
            prefix: PrefixBlock::default(),
            children: Box::new(std::array::from_fn(|_| None)),
            size: 0,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Leaf { .. } => NodeKind::Leaf,
            Node::N4 { .. } => NodeKind::N4,
            Node::N16 { .. } => NodeKind::N16,
            Node::N48 { .. } => NodeKind::N48,
            Node::N256 { .. } => NodeKind::N256,
        }
    }

    pub(crate) fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    pub(crate) fn size(&self) -> usize {
        match self {
            Node::Leaf { .. } => 0,
            Node::N4 { children, .. } | Node::N16 { children, .. } => children.len(),
            Node::N48 { children, .. } => children.iter().filter(|c| c.is_some()).count(),
            Node::N256 { size, .. } => *size as usize,
        }
    }

    pub(crate) fn min_size(&self) -> usize {
        match self.kind() {
            NodeKind::Leaf => 0,
            NodeKind::N4 => MIN_N4,
            NodeKind::N16 => MIN_N16,
            NodeKind::N48 => MIN_N48,
            NodeKind::N256 => MIN_N256,
        }
    }

    pub(crate) fn max_size(&self) -> usize {
        match self.kind() {
            NodeKind::Leaf => 0,
            NodeKind::N4 => MAX_N4,
            NodeKind::N16 => MAX_N16,
            NodeKind::N48 => MAX_N48,
            NodeKind::N256 => MAX_N256,
        }
    }

    pub(crate) fn is_full(&self) -> bool {
        self.size() >= self.max_size()
    }

    pub(crate) fn prefix(&self) -> &PrefixBlock {
        const EMPTY: PrefixBlock = PrefixBlock {
            bytes: [0; MAX_PREFIX],
            len: 0,
        };
        match self {
            Node::Leaf { .. } => &EMPTY,
            Node::N4 { prefix, .. }
            | Node::N16 { prefix, .. }
            | Node::N48 { prefix, .. }
            | Node::N256 { prefix, .. } => prefix,
        }
    }

    pub(crate) fn set_prefix(&mut self, full: &[u8]) {
        match self {
            Node::Leaf { .. } => {}
            Node::N4 { prefix, .. }
            | Node::N16 { prefix, .. }
            | Node::N48 { prefix, .. }
            | Node::N256 { prefix, .. } => prefix.set(full),
        }
    }

    /// Find the child for `byte`, returning a reference.
    pub(crate) fn find_child(&self, byte: u8) -> Option<&Node<V>> {
        match self {
            Node::Leaf { .. } => None,
            Node::N4 { keys, children, .. } | Node::N16 { keys, children, .. } => children
                .iter()
                .zip(keys.iter())
                .take(children.len())
                .find(|(_, &k)| k == byte)
                .map(|(c, _)| c.as_ref()),
            Node::N48 {
                child_index,
                children,
                ..
            } => {
                let i = child_index[byte as usize];
                if i == 0 {
                    None
                } else {
                    children[(i - 1) as usize].as_deref()
                }
            }
            Node::N256 { children, .. } => children[byte as usize].as_deref(),
        }
    }

    pub(crate) fn find_child_mut(&mut self, byte: u8) -> Option<&mut Box<Node<V>>> {
        match self {
            Node::Leaf { .. } => None,
            Node::N4 { keys, children, .. } | Node::N16 { keys, children, .. } => {
                let n = children.len();
                keys[..n]
                    .iter()
                    .position(|&k| k == byte)
                    .map(move |i| &mut children[i])
            }
            Node::N48 {
                child_index,
                children,
                ..
            } => {
                let i = child_index[byte as usize];
                if i == 0 {
                    None
                } else {
                    children[(i - 1) as usize].as_mut()
                }
            }
            Node::N256 { children, .. } => children[byte as usize].as_mut(),
        }
    }

    /// Remove and return the child stored under `byte`. Panics if absent —
    /// callers must have already located the child via `find_child`.
    pub(crate) fn remove_child(&mut self, byte: u8) -> Box<Node<V>> {
        match self {
            Node::Leaf { .. } => panic!("leaf has no children"),
            Node::N4 { keys, children, .. } | Node::N16 { keys, children, .. } => {
                let n = children.len();
                let i = keys[..n]
                    .iter()
                    .position(|&k| k == byte)
                    .expect("deleteChild: byte not present");
                let child = children.remove(i);
                for j in i..n - 1 {
                    keys[j] = keys[j + 1];
                }
                child
            }
            Node::N48 {
                child_index,
                children,
                ..
            } => {
                let i = child_index[byte as usize];
                assert!(i != 0, "deleteChild: byte not present");
                child_index[byte as usize] = 0;
                children[(i - 1) as usize]
                    .take()
                    .expect("N48 map/children invariant violated")
            }
            Node::N256 { children, size, .. } => {
                let child = children[byte as usize]
                    .take()
                    .expect("deleteChild: byte not present");
                *size -= 1;
                child
            }
        }
    }

    /// Insert `child` under `byte`. Caller must ensure the node is not full
    /// (grow first); panics otherwise.
    pub(crate) fn add_child(&mut self, byte: u8, child: Box<Node<V>>) {
        match self {
            Node::Leaf { .. } => panic!("leaf has no children"),
            Node::N4 { keys, children, .. } | Node::N16 { keys, children, .. } => {
                let n = children.len();
                assert!(n < keys.len(), "addChild: node full, should grow first");
                let i = keys[..n].iter().position(|&k| k > byte).unwrap_or(n);
                for j in (i..n).rev() {
                    keys[j + 1] = keys[j];
                }
                keys[i] = byte;
                children.insert(i, child);
            }
            Node::N48 {
                child_index,
                children,
                ..
            } => {
                assert!(
                    child_index[byte as usize] == 0,
                    "addChild: byte already present"
                );
                if let Some(slot) = children.iter().position(|c| c.is_none()) {
                    children[slot] = Some(child);
                    child_index[byte as usize] = (slot + 1) as u8;
                } else {
                    assert!(
                        children.len() < MAX_N48,
                        "addChild: N48 full, should grow first"
                    );
                    children.push(Some(child));
                    child_index[byte as usize] = children.len() as u8;
                }
            }
            Node::N256 { children, size, .. } => {
                assert!(
                    children[byte as usize].is_none(),
                    "addChild: byte already present"
                );
                children[byte as usize] = Some(child);
                *size += 1;
            }
        }
    }

    /// Insert `child` under `byte`, growing first if the node is full.
    pub(crate) fn add_child_grow(&mut self, byte: u8, child: Box<Node<V>>) {
        if self.is_full() {
            self.grow();
        }
        self.add_child(byte, child);
    }

    /// Overwrite the prefix block wholesale, e.g. with a `PrefixBlock::merged`
    /// result computed from the old block before this node was mutated.
    pub(crate) fn set_prefix_block(&mut self, block: PrefixBlock) {
        match self {
            Node::Leaf { .. } => {}
            Node::N4 { prefix, .. }
            | Node::N16 { prefix, .. }
            | Node::N48 { prefix, .. }
            | Node::N256 { prefix, .. } => *prefix = block,
        }
    }

    /// Grow to the next capacity class, copying the prefix block verbatim.
    pub(crate) fn grow(&mut self) {
        match self {
            Node::N4 { prefix, keys, children } => {
                let mut next = Node::new_n16();
                if let Node::N16 {
                    keys: nk,
                    children: nc,
                    prefix: np,
                } = &mut next
                {
                    *np = prefix.clone();
                    nk[..keys.len()].copy_from_slice(keys);
                    *nc = std::mem::take(children);
                }
                *self = next;
            }
            Node::N16 { prefix, keys, children } => {
                let mut next = Node::new_n48();
                if let Node::N48 {
                    child_index,
                    children: nc,
                    prefix: np,
                } = &mut next
                {
                    *np = prefix.clone();
                    let moved = std::mem::take(children);
                    for (i, child) in moved.into_iter().enumerate() {
                        child_index[keys[i] as usize] = (i + 1) as u8;
                        nc.push(Some(child));
                    }
                }
                *self = next;
            }
            Node::N48 {
                prefix,
                child_index,
                children,
            } => {
                let mut next = Node::new_n256();
                if let Node::N256 {
                    children: nc,
                    prefix: np,
                    size,
                } = &mut next
                {
                    *np = prefix.clone();
                    for byte in 0..256usize {
                        let i = child_index[byte];
                        if i != 0 {
                            if let Some(child) = children[(i - 1) as usize].take() {
                                nc[byte] = Some(child);
                                *size += 1;
                            }
                        }
                    }
                }
                *self = next;
            }
            Node::N256 { .. } => panic!("N256 cannot grow"),
            Node::Leaf { .. } => panic!("leaf cannot grow"),
        }
    }

    /// Take every (byte, child) pair in ascending byte order, leaving the
    /// node's children empty. Used when shrinking.
    pub(crate) fn drain_sorted(&mut self) -> Vec<(u8, Box<Node<V>>)> {
        match self {
            Node::Leaf { .. } => Vec::new(),
            Node::N4 { keys, children, .. } | Node::N16 { keys, children, .. } => {
                let n = children.len();
                let taken: Vec<Box<Node<V>>> = children.drain(..).collect();
                keys[..n].iter().copied().zip(taken).collect()
            }
            Node::N48 {
                child_index,
                children,
                ..
            } => {
                let mut out = Vec::new();
                for byte in 0..256usize {
                    let i = child_index[byte];
                    if i != 0 {
                        if let Some(child) = children[(i - 1) as usize].take() {
                            out.push((byte as u8, child));
                        }
                        child_index[byte] = 0;
                    }
                }
                out
            }
            Node::N256 { children, size, .. } => {
                let mut out = Vec::new();
                for byte in 0..256usize {
                    if let Some(child) = children[byte].take() {
                        out.push((byte as u8, child));
                    }
                }
                *size = 0;
                out
            }
        }
    }

    /// Shrink to the next smaller capacity class, copying the prefix block
    /// verbatim. Only valid when the current size does not exceed the
    /// target kind's max.
    pub(crate) fn shrink(&mut self) {
        let prefix = self.prefix().clone();
        let entries = self.drain_sorted();
        let mut next = match self.kind() {
            NodeKind::N16 => Node::new_n4(),
            NodeKind::N48 => Node::new_n16(),
            NodeKind::N256 => Node::new_n48(),
            other => panic!("cannot shrink {other:?}"),
        };
        // The prefix block (inline bytes + true length) is copied verbatim;
        // an optimistic prefix's un-inlined tail lives only in descendant
        // leaves and needs no separate recovery here.
        if let Node::N4 { prefix: p, .. }
        | Node::N16 { prefix: p, .. }
        | Node::N48 { prefix: p, .. }
        | Node::N256 { prefix: p, .. } = &mut next
        {
            *p = prefix;
        }
        for (byte, child) in entries {
            next.add_child(byte, child);
        }
        *self = next;
    }

    /// The leftmost descendant leaf, used to resolve optimistic prefixes
    /// and as the pivot source when collapsing a single-child node.
    pub(crate) fn leftmost_leaf(&self) -> &Node<V> {
        match self {
            Node::Leaf { .. } => self,
            Node::N4 { children, .. } | Node::N16 { children, .. } => {
                children[0].leftmost_leaf()
            }
            Node::N48 {
                child_index,
                children,
                ..
            } => {
                for byte in 0..256usize {
                    let i = child_index[byte];
                    if i != 0 {
                        return children[(i - 1) as usize]
                            .as_ref()
                            .expect("N48 map/children invariant violated")
                            .leftmost_leaf();
                    }
                }
                unreachable!("inner node with size >= min_size has no children")
            }
            Node::N256 { children, .. } => {
                for child in children.iter() {
                    if let Some(c) = child {
                        return c.leftmost_leaf();
                    }
                }
                unreachable!("inner node with size >= min_size has no children")
            }
        }
    }

    pub(crate) fn leaf_key(&self) -> &[u8] {
        match self {
            Node::Leaf { key, .. } => key,
            _ => panic!("not a leaf"),
        }
    }
}
