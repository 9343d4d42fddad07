use crate::key::Key;
use crate::map::TrieMap;
use crate::options::MapOptions;
use crate::trie::Trie;

use proptest::prelude::*;
use std::collections::BTreeMap;

#[derive(Clone, Debug)]
enum Op {
    Insert(Key<u8>, u32),
    Remove(Key<u8>),
    Get(Key<u8>),
    Clear,
}

// Small alphabets and short sequences so that keys share prefixes often.
fn key_strategy() -> impl Strategy<Value = Key<u8>> {
    let atom = (0u8..4).prop_map(Key::Atom);
    atom.prop_recursive(3, 24, 4, |inner| {
        prop::collection::vec(inner, 0..4).prop_map(Key::Seq)
    })
}

fn seq_strategy() -> impl Strategy<Value = Vec<Key<u8>>> {
    prop::collection::vec(key_strategy(), 0..5)
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    let op = prop_oneof![
        50 => (key_strategy(), any::<u32>()).prop_map(|(k, v)| Op::Insert(k, v)),
        30 => key_strategy().prop_map(Op::Remove),
        19 => key_strategy().prop_map(Op::Get),
        1 => Just(Op::Clear),
    ];
    prop::collection::vec(op, 0..200)
}

fn options_strategy() -> impl Strategy<Value = MapOptions> {
    (any::<bool>(), any::<bool>()).prop_map(|(deep, ordered)| MapOptions { deep, ordered })
}

proptest! {
    #[test]
    fn map_matches_btreemap_model(options in options_strategy(), ops in ops_strategy()) {
        let mut map = TrieMap::with_options(options);
        let mut model: BTreeMap<Key<u8>, u32> = BTreeMap::new();

        for op in ops {
            match op {
                Op::Insert(k, v) => {
                    prop_assert_eq!(map.insert(k.clone(), v), model.insert(k, v));
                }
                Op::Remove(k) => {
                    let had = model.contains_key(&k);
                    prop_assert_eq!(map.contains_key(&k), had);
                    prop_assert_eq!(map.remove(&k), model.remove(&k));
                    prop_assert!(!map.contains_key(&k));
                }
                Op::Get(k) => {
                    prop_assert_eq!(map.get(&k), model.get(&k));
                }
                Op::Clear => {
                    map.clear();
                    model.clear();
                }
            }
            prop_assert_eq!(map.len(), model.len());
        }

        prop_assert_eq!(map.iter().count(), model.len());
        for (k, v) in &model {
            prop_assert_eq!(map.get(k), Some(v));
        }
        map.check_structure();
    }

    #[test]
    fn ordered_map_iterates_in_insertion_order(ops in ops_strategy()) {
        let mut map = TrieMap::new();
        let mut order: Vec<Key<u8>> = Vec::new();

        for op in ops {
            match op {
                Op::Insert(k, v) => {
                    if map.insert(k.clone(), v).is_none() {
                        order.push(k);
                    }
                }
                Op::Remove(k) => {
                    if map.delete(&k) {
                        order.retain(|o| *o != k);
                    }
                }
                Op::Get(_) => {}
                Op::Clear => {
                    map.clear();
                    order.clear();
                }
            }
        }

        let keys: Vec<Key<u8>> = map.keys().cloned().collect();
        prop_assert_eq!(keys, order);
    }

    // Pruning stops at the first surviving ancestor. Checking every
    // ancestor instead could only help if an empty node were left behind
    // above a surviving one, which check_structure rules out.
    #[test]
    fn early_exit_pruning_leaves_no_empty_nodes(
        deep in any::<bool>(),
        inserts in prop::collection::vec(seq_strategy(), 0..64),
        removals in prop::collection::vec(any::<prop::sample::Index>(), 0..64),
    ) {
        let mut trie: Trie<u8, usize> = Trie::with_depth(deep);
        for (i, key) in inserts.iter().enumerate() {
            trie.insert(key, i);
        }
        trie.check_structure();

        if !inserts.is_empty() {
            for index in removals {
                let key = index.get(&inserts);
                let present = trie.contains(key);
                prop_assert_eq!(trie.remove(key).is_some(), present);
                prop_assert!(!trie.contains(key));
                trie.check_structure();
            }
        }

        for key in &inserts {
            trie.remove(key);
        }
        prop_assert!(trie.is_empty());
        prop_assert_eq!(trie.iter().count(), 0);
        trie.check_structure();
    }

    #[test]
    fn trie_iteration_rebuilds_inserted_keys(deep in any::<bool>(), keys in prop::collection::vec(seq_strategy(), 0..32)) {
        let mut trie: Trie<u8, ()> = Trie::with_depth(deep);
        let mut model: BTreeMap<Vec<Key<u8>>, ()> = BTreeMap::new();
        for key in keys {
            trie.insert(&key, ());
            model.insert(key, ());
        }
        let mut rebuilt: Vec<Vec<Key<u8>>> = trie.iter().map(|kv| kv.key).collect();
        rebuilt.sort();
        let expected: Vec<Vec<Key<u8>>> = model.into_keys().collect();
        prop_assert_eq!(rebuilt, expected);
    }
}
