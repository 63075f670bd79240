//! Radix tree node family: a node is a leaf slot, an edge table, or both
//! (a "mixed" node per the source this was distilled from) plus the byte
//! prefix shared by everything below it.

use smallvec::SmallVec;

/// Most shared prefixes in practice are short path segments; inline storage
/// avoids a heap allocation for them while still growing for the rare long
/// one.
pub(crate) type Prefix = SmallVec<[u8; 16]>;

pub(crate) struct Leaf<V> {
    pub(crate) key: Vec<u8>,
    pub(crate) value: V,
}

pub(crate) struct Edge<V> {
    pub(crate) label: u8,
    pub(crate) node: Box<Node<V>>,
}

#[derive(Default)]
pub(crate) struct Node<V> {
    pub(crate) leaf: Option<Box<Leaf<V>>>,
    pub(crate) prefix: Prefix,
    /// Kept sorted by `label` at all times; edges are found with a binary
    /// search rather than a hash lookup since node fan-out is small.
    pub(crate) edges: Vec<Edge<V>>,
}

impl<V> Node<V> {
    pub(crate) fn leaf_only(key: Vec<u8>, prefix: Prefix, value: V) -> Self {
        Node {
            leaf: Some(Box::new(Leaf { key, value })),
            prefix,
            edges: Vec::new(),
        }
    }

    pub(crate) fn prefix_only(prefix: Prefix) -> Self {
        Node {
            leaf: None,
            prefix,
            edges: Vec::new(),
        }
    }

    pub(crate) fn is_leaf_node(&self) -> bool {
        self.leaf.is_some()
    }

    pub(crate) fn is_prefix_node(&self) -> bool {
        !self.edges.is_empty()
    }

    fn bin_search(&self, label: u8) -> Result<usize, usize> {
        self.edges.binary_search_by_key(&label, |e| e.label)
    }

    pub(crate) fn edge_index(&self, label: u8) -> Option<usize> {
        self.bin_search(label).ok()
    }

    pub(crate) fn edge(&self, label: u8) -> Option<&Node<V>> {
        self.edge_index(label).map(|i| &*self.edges[i].node)
    }

    /// Insert a new edge, keeping `edges` sorted by label. Panics if the
    /// label is already present — callers check with `edge_index` first.
    pub(crate) fn add_edge(&mut self, label: u8, node: Box<Node<V>>) {
        match self.bin_search(label) {
            Ok(_) => panic!("addEdge: label {label} already present"),
            Err(i) => self.edges.insert(i, Edge { label, node }),
        }
    }

    pub(crate) fn delete_edge(&mut self, label: u8) {
        match self.bin_search(label) {
            Ok(i) => {
                self.edges.remove(i);
            }
            Err(_) => panic!("deleteEdge: label {label} not present"),
        }
    }

    /// Absorb this node's sole child: its prefix is appended to ours, and
    /// its leaf/edges replace ours. Used when a node is left with exactly
    /// one edge and no leaf of its own after a delete.
    pub(crate) fn replace_by_only_child(&mut self) {
        let Edge { node: child, .. } = self
            .edges
            .pop()
            .expect("replaceByOnlyChild: node has no edges");
        let child = *child;
        self.prefix.extend_from_slice(&child.prefix);
        self.leaf = child.leaf;
        self.edges = child.edges;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_stay_sorted() {
        let mut n: Node<i32> = Node::prefix_only(Prefix::new());
        n.add_edge(b'z', Box::new(Node::leaf_only(b"z".to_vec(), Prefix::new(), 1)));
        n.add_edge(b'a', Box::new(Node::leaf_only(b"a".to_vec(), Prefix::new(), 2)));
        n.add_edge(b'm', Box::new(Node::leaf_only(b"m".to_vec(), Prefix::new(), 3)));
        let labels: Vec<u8> = n.edges.iter().map(|e| e.label).collect();
        assert_eq!(labels, vec![b'a', b'm', b'z']);
    }
}
