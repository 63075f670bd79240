//! Property tests comparing both engines against a `BTreeMap` model and
//! checking the structural invariants from the design notes (every ART
//! node's size in bounds, N48 map/children consistency, and so on).

use std::collections::BTreeMap;

use proptest::prelude::*;
use proptest_derive::Arbitrary;

use crate::{ArtTree, Index, RadixTree};

#[derive(Default, Clone)]
struct Model {
    map: BTreeMap<Vec<u8>, i64>,
}

impl Model {
    fn insert(&mut self, key: Vec<u8>, value: i64) {
        self.map.insert(key, value);
    }

    fn get(&self, key: &[u8]) -> Option<&i64> {
        self.map.get(key)
    }

    fn remove(&mut self, key: &[u8]) -> bool {
        self.map.remove(key).is_some()
    }

    fn len(&self) -> usize {
        self.map.len()
    }
}

#[derive(Arbitrary, Debug, Clone)]
enum Action {
    Insert(KeyValue),
    Search(Key),
    Delete(Key),
}

#[derive(Debug, Clone)]
struct Key(Vec<u8>);

#[derive(Debug, Clone)]
struct KeyValue {
    key: Key,
    value: i64,
}

impl Arbitrary for Key {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        prop_oneof![
            Just(Key(vec![])),
            prop::collection::vec(any::<u8>(), 1..4).prop_map(Key),
            prop::collection::vec(any::<u8>(), 4..64).prop_map(Key),
            // Keys that share prefixes, to exercise path compression and
            // node splits/merges rather than only the empty tree.
            "[a-z]{2,6}".prop_map(|prefix| {
                let mut key = prefix.into_bytes();
                key.extend_from_slice(b"/suffix");
                Key(key)
            }),
            // Keys containing an embedded NUL, to exercise the sentinel
            // edge case the ART engine documents.
            prop::collection::vec(0u8..4, 1..6).prop_map(Key),
        ]
        .boxed()
    }
}

impl Arbitrary for KeyValue {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (any::<Key>(), any::<i64>())
            .prop_map(|(key, value)| KeyValue { key, value })
            .boxed()
    }
}

fn run_actions<T: Index<i64> + Default>(actions: Vec<Action>) {
    let mut tree = T::default();
    let mut model = Model::default();

    for action in actions {
        match action {
            Action::Insert(kv) => {
                tree.insert(&kv.key.0, kv.value);
                model.insert(kv.key.0, kv.value);
            }
            Action::Search(key) => {
                assert_eq!(
                    tree.search(&key.0),
                    model.get(&key.0),
                    "search mismatch for key {:?}",
                    key.0
                );
            }
            Action::Delete(key) => {
                assert_eq!(
                    tree.delete(&key.0),
                    model.remove(&key.0),
                    "delete mismatch for key {:?}",
                    key.0
                );
            }
        }
        assert_eq!(tree.len(), model.len(), "len mismatch");
    }

    let mut dumped: Vec<_> = tree.dump();
    dumped.sort();
    let mut expected: Vec<_> = model.map.into_iter().collect();
    expected.sort();
    assert_eq!(dumped, expected, "dump mismatch");
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        failure_persistence: None,
        ..ProptestConfig::default()
    })]

    #[test]
    fn art_matches_btreemap(actions in prop::collection::vec(any::<Action>(), 1..64)) {
        run_actions::<ArtTree<i64>>(actions);
    }

    #[test]
    fn radix_matches_btreemap(actions in prop::collection::vec(any::<Action>(), 1..64)) {
        run_actions::<RadixTree<i64>>(actions);
    }

    #[test]
    fn radix_min_max_matches_btreemap(actions in prop::collection::vec(any::<Action>(), 1..64)) {
        let mut tree = RadixTree::<i64>::new();
        let mut model = Model::default();
        for action in actions {
            match action {
                Action::Insert(kv) => {
                    tree.insert(&kv.key.0, kv.value);
                    model.insert(kv.key.0, kv.value);
                }
                Action::Search(_) => {}
                Action::Delete(key) => {
                    tree.delete(&key.0);
                    model.remove(&key.0);
                }
            }
            let expected_min = model.map.iter().next().map(|(k, v)| (k.as_slice(), v));
            let expected_max = model.map.iter().next_back().map(|(k, v)| (k.as_slice(), v));
            prop_assert_eq!(tree.min(), expected_min, "min mismatch");
            prop_assert_eq!(tree.max(), expected_max, "max mismatch");
        }
    }

    #[test]
    fn art_stays_structurally_sound(actions in prop::collection::vec(any::<Action>(), 1..64)) {
        let mut tree = ArtTree::<i64>::new();
        for action in actions {
            match action {
                Action::Insert(kv) => tree.insert(&kv.key.0, kv.value),
                Action::Search(key) => { tree.search(&key.0); }
                Action::Delete(key) => { tree.delete(&key.0); }
            }
            let issues = tree.debug_integrity();
            assert!(issues.is_empty(), "integrity violations: {issues:?}");
        }
    }

    #[test]
    fn insert_is_idempotent(key in any::<Key>(), value in any::<i64>()) {
        let mut tree = ArtTree::<i64>::new();
        tree.insert(&key.0, value);
        tree.insert(&key.0, value);
        prop_assert_eq!(tree.len(), 1);
        prop_assert_eq!(tree.search(&key.0), Some(&value));
    }

    #[test]
    fn delete_is_insert_inverse(key in any::<Key>(), value in any::<i64>()) {
        let mut tree = ArtTree::<i64>::new();
        let was_empty = tree.is_empty();
        tree.insert(&key.0, value);
        prop_assert!(tree.delete(&key.0));
        prop_assert_eq!(tree.is_empty(), was_empty);
        prop_assert_eq!(tree.search(&key.0), None);
    }
}
