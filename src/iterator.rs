//! Provides Trie and TrieMap iterators.
//!
//! [`crate::trie::Trie`] iterators rebuild each key from the path leading
//! to its terminal node. [`crate::map::TrieMap`] iterators yield the
//! original keys as they were inserted.
use std::fmt;
use std::iter::FusedIterator;

use indexmap::map::{IntoValues, Values as EntryValues, ValuesMut};

use crate::key::{Key, KeyAtom};
use crate::map::{Slot, TrieMap};
use crate::trie::{NodeId, Trie, ROOT};

/// Iterator Item
#[derive(Debug)]
pub struct KeyValue<A, T> {
    pub key: Vec<Key<A>>,
    pub value: T,
}

/// Iterator Item
#[derive(Debug)]
pub struct KeyValueRef<'a, A, T> {
    pub key: Vec<Key<A>>,
    pub value: &'a T,
}

/// Consuming iterator over a Trie.
#[derive(Debug)]
pub struct TrieIntoIterator<A, T> {
    trie: Trie<A, T>,
    stack: Vec<(NodeId, Vec<Key<A>>)>,
}

/// Iterator over a Trie.
#[derive(Debug)]
pub struct TrieRefIntoIterator<'a, A, T> {
    trie: &'a Trie<A, T>,
    stack: Vec<(NodeId, Vec<Key<A>>)>,
}

// Push the children of a node so that the smallest element pops first.
fn descend<A: KeyAtom, T>(
    trie: &Trie<A, T>,
    stack: &mut Vec<(NodeId, Vec<Key<A>>)>,
    id: NodeId,
    key: &[Key<A>],
) {
    for (element, child) in trie.nodes[id].branches.edges().into_iter().rev() {
        let mut child_key = Vec::with_capacity(key.len() + 1);
        child_key.extend_from_slice(key);
        child_key.push(element);
        stack.push((child, child_key));
    }
}

impl<A: KeyAtom, T> IntoIterator for Trie<A, T> {
    type Item = KeyValue<A, T>;
    type IntoIter = TrieIntoIterator<A, T>;

    fn into_iter(self) -> Self::IntoIter {
        TrieIntoIterator {
            trie: self,
            stack: vec![(ROOT, vec![])],
        }
    }
}

impl<A: KeyAtom, T> Iterator for TrieIntoIterator<A, T> {
    type Item = KeyValue<A, T>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((id, key)) = self.stack.pop() {
            descend(&self.trie, &mut self.stack, id, &key);
            if let Some(value) = self.trie.nodes[id].terminal.take() {
                return Some(KeyValue { key, value });
            }
        }
        None
    }
}

impl<'a, A: KeyAtom, T> IntoIterator for &'a Trie<A, T> {
    type Item = KeyValueRef<'a, A, T>;
    type IntoIter = TrieRefIntoIterator<'a, A, T>;

    fn into_iter(self) -> Self::IntoIter {
        TrieRefIntoIterator {
            trie: self,
            stack: vec![(ROOT, vec![])],
        }
    }
}

impl<'a, A: KeyAtom, T> Iterator for TrieRefIntoIterator<'a, A, T> {
    type Item = KeyValueRef<'a, A, T>;

    fn next(&mut self) -> Option<Self::Item> {
        let trie = self.trie;
        while let Some((id, key)) = self.stack.pop() {
            descend(trie, &mut self.stack, id, &key);
            if let Some(value) = trie.nodes[id].terminal.as_ref() {
                return Some(KeyValueRef { key, value });
            }
        }
        None
    }
}

impl<A: KeyAtom, T> FusedIterator for TrieIntoIterator<A, T> {}

impl<A: KeyAtom, T> FusedIterator for TrieRefIntoIterator<'_, A, T> {}

/// Iterator over the entries of a TrieMap.
pub struct Iter<'a, A, V> {
    pub(crate) inner: EntryValues<'a, Slot<A>, (Key<A>, V)>,
}

/// Mutable iterator over the entries of a TrieMap.
pub struct IterMut<'a, A, V> {
    pub(crate) inner: ValuesMut<'a, Slot<A>, (Key<A>, V)>,
}

/// Consuming iterator over the entries of a TrieMap.
pub struct IntoIter<A, V> {
    pub(crate) inner: IntoValues<Slot<A>, (Key<A>, V)>,
}

/// Iterator over the keys of a TrieMap.
pub struct Keys<'a, A, V> {
    pub(crate) inner: Iter<'a, A, V>,
}

/// Iterator over the values of a TrieMap.
pub struct Values<'a, A, V> {
    pub(crate) inner: Iter<'a, A, V>,
}

impl<'a, A, V> Iterator for Iter<'a, A, V> {
    type Item = (&'a Key<A>, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, value)| (key, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, A, V> Iterator for IterMut<'a, A, V> {
    type Item = (&'a Key<A>, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, value)| (&*key, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<A, V> Iterator for IntoIter<A, V> {
    type Item = (Key<A>, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, A, V> Iterator for Keys<'a, A, V> {
    type Item = &'a Key<A>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, A, V> Iterator for Values<'a, A, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<A, V> Clone for Iter<'_, A, V> {
    fn clone(&self) -> Self {
        Iter {
            inner: self.inner.clone(),
        }
    }
}

impl<A, V> Clone for Keys<'_, A, V> {
    fn clone(&self) -> Self {
        Keys {
            inner: self.inner.clone(),
        }
    }
}

impl<A, V> Clone for Values<'_, A, V> {
    fn clone(&self) -> Self {
        Values {
            inner: self.inner.clone(),
        }
    }
}

impl<A: fmt::Debug, V: fmt::Debug> fmt::Debug for Iter<'_, A, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<A: fmt::Debug, V> fmt::Debug for Keys<'_, A, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<A, V: fmt::Debug> fmt::Debug for Values<'_, A, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<A, V> ExactSizeIterator for Iter<'_, A, V> {}
impl<A, V> ExactSizeIterator for IterMut<'_, A, V> {}
impl<A, V> ExactSizeIterator for IntoIter<A, V> {}
impl<A, V> ExactSizeIterator for Keys<'_, A, V> {}
impl<A, V> ExactSizeIterator for Values<'_, A, V> {}

impl<'a, A: KeyAtom, V> IntoIterator for &'a TrieMap<A, V> {
    type Item = (&'a Key<A>, &'a V);
    type IntoIter = Iter<'a, A, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, A: KeyAtom, V> IntoIterator for &'a mut TrieMap<A, V> {
    type Item = (&'a Key<A>, &'a mut V);
    type IntoIter = IterMut<'a, A, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<A: KeyAtom, V> IntoIterator for TrieMap<A, V> {
    type Item = (Key<A>, V);
    type IntoIter = IntoIter<A, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.entries.into_values(),
        }
    }
}
