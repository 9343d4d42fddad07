//! Provides TrieMap, a map whose sequence keys compare by content.
//!
//! Atomic keys are stored directly. Sequence keys are stored in a
//! [`crate::trie::Trie`], and the entry is recorded against the trie node
//! the key ends at, so two equal sequences always find the same entry no
//! matter which `Vec` they live in.
//!
//! ```
//! use deepkey::key::Key;
//! use deepkey::map::TrieMap;
//!
//! let mut map = TrieMap::new();
//! map.insert(Key::seq(["a", "b"]), 1);
//! map.insert(Key::seq(["a", "b", "c"]), 2);
//! map.insert(Key::atom("a"), 3);
//!
//! assert_eq!(map.get(&Key::seq(["a", "b"])), Some(&1));
//! assert!(map.delete(&Key::seq(["a", "b", "c"])));
//! assert!(!map.contains_key(&Key::seq(["a", "b", "c"])));
//! assert_eq!(map.get(&Key::seq(["a", "b"])), Some(&1));
//! assert_eq!(map.len(), 2);
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};

use indexmap::{Equivalent, IndexMap};
use tracing::debug;

use crate::iterator::{Iter, IterMut, Keys, Values};
use crate::key::{Key, KeyAtom};
use crate::options::MapOptions;
use crate::trie::{NodeId, Trie};

/// Where an entry lives: an atomic key, or the trie node a sequence key
/// ends at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Slot<A> {
    Atom(A),
    Node(NodeId),
}

// Lookup form of Slot, so atomic lookups need not clone the atom.
#[derive(Hash, PartialEq, Eq)]
enum SlotRef<'a, A> {
    Atom(&'a A),
    Node(NodeId),
}

impl<A> Slot<A> {
    fn borrowed(&self) -> SlotRef<'_, A> {
        match self {
            Slot::Atom(atom) => SlotRef::Atom(atom),
            Slot::Node(id) => SlotRef::Node(*id),
        }
    }
}

// Must agree with SlotRef's hash for Equivalent lookups
impl<A: Hash> Hash for Slot<A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.borrowed().hash(state)
    }
}

impl<A: Eq> Equivalent<Slot<A>> for SlotRef<'_, A> {
    fn equivalent(&self, key: &Slot<A>) -> bool {
        *self == key.borrowed()
    }
}

/// A map from [`Key`]s to values.
///
/// Sequence keys are equal iff their elements are equal one by one, so
/// `Key::seq([1, 2])` built twice names the same entry. An atom never
/// equals a sequence.
#[derive(Clone)]
pub struct TrieMap<A, V> {
    trie: Trie<A, ()>,
    pub(crate) entries: IndexMap<Slot<A>, (Key<A>, V)>,
    options: MapOptions,
}

impl<A: KeyAtom, V> Default for TrieMap<A, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: KeyAtom, V> TrieMap<A, V> {
    /// Create an empty, deep and ordered TrieMap.
    pub fn new() -> Self {
        Self::with_options(MapOptions::default())
    }

    pub fn with_options(options: MapOptions) -> Self {
        debug!(deep = options.deep, ordered = options.ordered, "creating trie map");
        Self {
            trie: Trie::with_depth(options.deep),
            entries: IndexMap::new(),
            options,
        }
    }

    /// Create a TrieMap holding the given entries. Entries are inserted in
    /// order, so a later duplicate key overwrites an earlier one.
    pub fn from_entries<I>(entries: I, options: MapOptions) -> Self
    where
        I: IntoIterator<Item = (Key<A>, V)>,
    {
        let mut map = Self::with_options(options);
        map.extend(entries);
        map
    }

    pub fn options(&self) -> MapOptions {
        self.options
    }

    /// How many entries does the map hold?
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert a value. If the key was present its value is replaced (its
    /// position in iteration order is kept) and the old value returned.
    pub fn insert(&mut self, key: Key<A>, value: V) -> Option<V> {
        let slot = match &key {
            Key::Atom(atom) => Slot::Atom(atom.clone()),
            Key::Seq(elements) => Slot::Node(self.trie.insert_at(elements, ()).0),
        };
        self.entries
            .insert(slot, (key, value))
            .map(|(_, previous)| previous)
    }

    pub fn get(&self, key: &Key<A>) -> Option<&V> {
        self.get_key_value(key).map(|(_, value)| value)
    }

    /// Get the stored key along with its value. The stored key is the one
    /// most recently inserted, which may be a different (but equal) object
    /// from `key`.
    pub fn get_key_value(&self, key: &Key<A>) -> Option<(&Key<A>, &V)> {
        let slot = self.locate(key)?;
        self.entries.get(&slot).map(|(key, value)| (key, value))
    }

    pub fn get_mut(&mut self, key: &Key<A>) -> Option<&mut V> {
        let slot = self.locate(key)?;
        self.entries.get_mut(&slot).map(|(_, value)| value)
    }

    pub fn contains_key(&self, key: &Key<A>) -> bool {
        self.locate(key)
            .is_some_and(|slot| self.entries.contains_key(&slot))
    }

    /// Remove a key, returning its value if it was present.
    pub fn remove(&mut self, key: &Key<A>) -> Option<V> {
        self.remove_entry(key).map(|(_, value)| value)
    }

    /// Remove a key, returning the stored key and value.
    pub fn remove_entry(&mut self, key: &Key<A>) -> Option<(Key<A>, V)> {
        let slot = match key {
            Key::Atom(atom) => SlotRef::Atom(atom),
            Key::Seq(elements) => SlotRef::Node(self.trie.remove_at(elements)?.0),
        };
        if self.options.ordered {
            self.entries.shift_remove(&slot)
        } else {
            self.entries.swap_remove(&slot)
        }
    }

    /// Remove a key. Returns true iff an entry was removed.
    pub fn delete(&mut self, key: &Key<A>) -> bool {
        self.remove_entry(key).is_some()
    }

    pub fn clear(&mut self) {
        debug!(len = self.len(), "clearing trie map");
        self.trie.clear();
        self.entries.clear();
    }

    /// Iterate over entries. Entries come in insertion order unless the
    /// map was built unordered and has since had removals.
    pub fn iter(&self) -> Iter<'_, A, V> {
        Iter {
            inner: self.entries.values(),
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, A, V> {
        IterMut {
            inner: self.entries.values_mut(),
        }
    }

    pub fn keys(&self) -> Keys<'_, A, V> {
        Keys { inner: self.iter() }
    }

    pub fn values(&self) -> Values<'_, A, V> {
        Values { inner: self.iter() }
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> {
        self.iter_mut().map(|(_, value)| value)
    }

    /// Call `visitor` with every value and its key.
    pub fn for_each<F>(&self, mut visitor: F)
    where
        F: FnMut(&V, &Key<A>),
    {
        for (key, value) in self.iter() {
            visitor(value, key);
        }
    }

    // The slot an entry for `key` would occupy, if it can exist at all.
    fn locate<'k>(&self, key: &'k Key<A>) -> Option<SlotRef<'k, A>> {
        match key {
            Key::Atom(atom) => Some(SlotRef::Atom(atom)),
            Key::Seq(elements) => self.trie.find(elements).map(SlotRef::Node),
        }
    }
}

#[cfg(test)]
impl<A: KeyAtom + fmt::Debug, V> TrieMap<A, V> {
    /// Assert that entries and trie terminals correspond one to one.
    pub(crate) fn check_structure(&self) {
        self.trie.check_structure();
        let atoms = self
            .entries
            .keys()
            .filter(|slot| matches!(slot, Slot::Atom(_)))
            .count();
        assert_eq!(self.len(), atoms + self.trie.count());
        for (slot, (key, _)) in &self.entries {
            match (slot, key) {
                (Slot::Atom(stored), Key::Atom(atom)) => assert_eq!(stored, atom),
                (Slot::Node(id), Key::Seq(elements)) => {
                    assert_eq!(self.trie.find(elements), Some(*id));
                    assert!(self.trie.contains(elements));
                }
                _ => panic!("{key:?} stored under the wrong kind of slot"),
            }
        }
    }
}

impl<A: KeyAtom, V> FromIterator<(Key<A>, V)> for TrieMap<A, V> {
    fn from_iter<I: IntoIterator<Item = (Key<A>, V)>>(iter: I) -> Self {
        Self::from_entries(iter, MapOptions::default())
    }
}

impl<A: KeyAtom, V> Extend<(Key<A>, V)> for TrieMap<A, V> {
    fn extend<I: IntoIterator<Item = (Key<A>, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<A: KeyAtom, V: PartialEq> PartialEq for TrieMap<A, V> {
    /// Maps are equal when they hold equal entries, in any order.
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(key, value)| other.get(key) == Some(value))
    }
}

impl<A: KeyAtom, V: Eq> Eq for TrieMap<A, V> {}

impl<A: fmt::Debug, V: fmt::Debug> fmt::Debug for TrieMap<A, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TrieMap ")?;
        f.debug_map()
            .entries(self.entries.values().map(|(key, value)| (key, value)))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{thread_rng, Rng};

    fn seq(items: &[u32]) -> Key<u32> {
        Key::seq(items.iter().copied())
    }

    #[test]
    fn it_gets_what_was_set() {
        let mut map = TrieMap::new();
        assert_eq!(map.insert(seq(&[1, 2, 3]), "x"), None);
        assert_eq!(map.get(&seq(&[1, 2, 3])), Some(&"x"));
        assert!(map.contains_key(&seq(&[1, 2, 3])));
        assert_eq!(map.insert(seq(&[1, 2, 3]), "y"), Some("x"));
        assert_eq!(map.len(), 1);
        map.check_structure();
    }

    #[test]
    fn it_treats_equal_sequences_as_one_key() {
        let mut map = TrieMap::new();
        let first = Key::seq(vec![1u32, 2, 3]);
        let second: Key<u32> = [1u32, 2, 3].iter().copied().map(Key::atom).collect();
        map.insert(first, 1);
        assert_eq!(map.get(&second), Some(&1));
        assert!(map.delete(&second));
        assert!(map.is_empty());
        map.check_structure();
    }

    #[test]
    fn it_deletes_once() {
        let mut map = TrieMap::new();
        map.insert(seq(&[4, 2]), ());
        assert!(map.delete(&seq(&[4, 2])));
        assert!(!map.delete(&seq(&[4, 2])));
        assert!(!map.contains_key(&seq(&[4, 2])));
        assert!(!map.delete(&Key::atom(4)));
    }

    #[test]
    fn it_never_confuses_atoms_and_sequences() {
        let mut map = TrieMap::new();
        map.insert(Key::atom(1u32), "atom");
        map.insert(seq(&[1]), "sequence");
        map.insert(Key::nest([seq(&[1])]), "nested");
        assert_eq!(map.len(), 3);
        assert_eq!(map.get(&Key::atom(1)), Some(&"atom"));
        assert_eq!(map.get(&seq(&[1])), Some(&"sequence"));
        assert_eq!(map.get(&Key::nest([seq(&[1])])), Some(&"nested"));
        assert!(map.delete(&seq(&[1])));
        assert_eq!(map.get(&Key::atom(1)), Some(&"atom"));
        assert_eq!(map.get(&Key::nest([seq(&[1])])), Some(&"nested"));
        map.check_structure();
    }

    #[test]
    fn it_prunes_unused_branches() {
        let mut map = TrieMap::new();
        map.insert(seq(&[1, 2]), 12);
        map.insert(seq(&[1, 3]), 13);
        assert!(map.delete(&seq(&[1, 3])));
        assert!(!map.trie.contains_prefix([Key::atom(1u32), Key::atom(3)]));
        assert!(map.trie.contains_prefix([Key::atom(1u32)]));
        assert!(map.locate(&seq(&[1, 3])).is_none());
        assert_eq!(map.get(&seq(&[1, 2])), Some(&12));
        map.check_structure();
    }

    #[test]
    fn it_stores_the_empty_sequence() {
        let mut map = TrieMap::new();
        map.insert(Key::<char>::empty(), "root");
        assert_eq!(map.get(&Key::empty()), Some(&"root"));
        assert!(map.contains_key(&Key::empty()));
        assert!(!map.contains_key(&Key::nest([Key::<char>::empty()])));
        map.check_structure();
    }

    #[test]
    fn it_keeps_prefix_keys_after_deleting_extensions() {
        let mut map = TrieMap::new();
        map.insert(Key::seq(["a", "b"]), 1);
        map.insert(Key::seq(["a", "b", "c"]), 2);
        assert_eq!(map.get(&Key::seq(["a", "b"])), Some(&1));
        assert_eq!(map.get(&Key::seq(["a", "b", "c"])), Some(&2));
        assert!(map.delete(&Key::seq(["a", "b", "c"])));
        assert_eq!(map.get(&Key::seq(["a", "b"])), Some(&1));
        assert!(!map.contains_key(&Key::seq(["a", "b", "c"])));
        map.check_structure();
    }

    #[test]
    fn it_lets_later_initial_entries_win() {
        let map = TrieMap::from_entries(
            vec![(seq(&[1, 2]), "x"), (seq(&[1, 2]), "y")],
            MapOptions::default(),
        );
        assert_eq!(map.get(&seq(&[1, 2])), Some(&"y"));
        assert_eq!(map.len(), 1);
        map.check_structure();
    }

    #[test]
    fn it_keeps_the_latest_key_object() {
        let mut map = TrieMap::new();
        map.insert(Key::atom("k"), 1);
        map.insert(Key::atom("k"), 2);
        let (key, value) = map.get_key_value(&Key::atom("k")).expect("present");
        assert_eq!((key, value), (&Key::atom("k"), &2));
        assert_eq!(map.remove_entry(&Key::atom("k")), Some((Key::atom("k"), 2)));
    }

    #[test]
    fn it_works_flat() {
        let options = MapOptions::new().deep(false);
        let mut map: TrieMap<u32, &str> = TrieMap::with_options(options);
        assert_eq!(map.options(), options);
        let nested = Key::nest([seq(&[1, 2]), Key::atom(3)]);
        map.insert(nested.clone(), "flat");
        assert_eq!(map.get(&Key::nest([seq(&[1, 2]), Key::atom(3)])), Some(&"flat"));
        assert!(!map.contains_key(&Key::nest([seq(&[1]), Key::atom(3)])));
        assert_eq!(map.remove(&nested), Some("flat"));
        map.check_structure();
    }

    #[test]
    fn it_preserves_order_across_removals_when_ordered() {
        let mut map: TrieMap<u32, u32> = (0..10).map(|i| (seq(&[i, i]), i)).collect();
        map.remove(&seq(&[3, 3]));
        map.remove(&seq(&[0, 0]));
        let values: Vec<u32> = map.values().copied().collect();
        assert_eq!(values, vec![1, 2, 4, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn it_keeps_every_entry_when_unordered() {
        let mut map = TrieMap::with_options(MapOptions::new().ordered(false));
        map.extend((0..10u32).map(|i| (seq(&[i]), i)));
        map.remove(&seq(&[3]));
        let mut values: Vec<u32> = map.values().copied().collect();
        values.sort_unstable();
        assert_eq!(values, vec![0, 1, 2, 4, 5, 6, 7, 8, 9]);
        map.check_structure();
    }

    #[test]
    fn it_clears_both_stores() {
        let mut map = TrieMap::new();
        map.insert(Key::atom('a'), 1);
        map.insert(Key::seq(['a']), 2);
        map.clear();
        assert!(map.is_empty());
        assert!(!map.contains_key(&Key::atom('a')));
        assert!(!map.contains_key(&Key::seq(['a'])));
        assert_eq!(map.iter().count(), 0);
        map.insert(Key::seq(['a']), 3);
        assert_eq!(map.get(&Key::seq(['a'])), Some(&3));
        map.check_structure();
    }

    #[test]
    fn it_updates_values_in_place() {
        let mut map = TrieMap::new();
        map.insert(Key::seq(['x', 'y']), 1);
        map.insert(Key::atom('x'), 2);
        if let Some(value) = map.get_mut(&Key::seq(['x', 'y'])) {
            *value += 40;
        }
        map.values_mut().for_each(|value| *value *= 2);
        assert_eq!(map.get(&Key::seq(['x', 'y'])), Some(&82));
        assert_eq!(map.get(&Key::atom('x')), Some(&4));
    }

    #[test]
    fn it_visits_every_entry() {
        let mut map = TrieMap::new();
        map.insert(Key::seq([1u32, 2]), 3);
        map.insert(Key::atom(7u32), 7);
        let mut seen = vec![];
        map.for_each(|value, key| seen.push((key.clone(), *value)));
        assert_eq!(seen, vec![(Key::seq([1u32, 2]), 3), (Key::atom(7), 7)]);
    }

    #[test]
    fn it_compares_maps_by_content() {
        let a: TrieMap<u32, u32> = vec![(seq(&[1]), 1), (Key::atom(2), 2)].into_iter().collect();
        let b: TrieMap<u32, u32> = vec![(Key::atom(2), 2), (seq(&[1]), 1)].into_iter().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn it_tags_debug_output() {
        assert_eq!(format!("{:?}", TrieMap::<u32, u32>::new()), "TrieMap {}");
        let mut map = TrieMap::new();
        map.insert(seq(&[1]), 1);
        map.insert(Key::atom(2u32), 2);
        assert_eq!(format!("{:?}", map), "TrieMap {Seq([Atom(1)]): 1, Atom(2): 2}");
    }

    #[test]
    fn it_handles_deeply_nested_keys() {
        let depth = 256;
        let mut key = Key::atom(0u32);
        for _ in 0..depth {
            key = Key::nest([key]);
        }
        assert_eq!(key.depth(), depth);
        let mut map = TrieMap::new();
        map.insert(key.clone(), "deep");
        assert_eq!(map.get(&key), Some(&"deep"));
        assert_eq!(map.remove(&key), Some("deep"));
        assert!(map.is_empty());
        map.check_structure();
    }

    #[test]
    fn it_keeps_size_consistent_with_iteration() {
        static POPULATION_SIZE: usize = 500;
        let mut map = TrieMap::new();
        for _i in 0..POPULATION_SIZE {
            let len = thread_rng().gen_range(0..=6);
            let key: Vec<u32> = (0..len).map(|_| thread_rng().gen_range(0..4)).collect();
            let key = if len == 1 { Key::atom(key[0]) } else { key.into() };
            if thread_rng().gen_bool(0.3) {
                map.remove(&key);
            } else {
                map.insert(key, len);
            }
            assert_eq!(map.len(), map.iter().count());
        }
        map.check_structure();
    }
}
