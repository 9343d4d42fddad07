//! Provides the trie which stores sequence keys as chains of nodes, one
//! node per element. A node may hold a terminal value, meaning "a key ends
//! exactly here".
//!
//! Elements are [`Key`]s, so an element may itself be a sequence. A *deep*
//! trie (the default) decomposes such elements through a nested trie at
//! each level, while a *flat* trie looks each element up whole in a
//! per-level table. Either way two keys match iff their elements are equal
//! one by one.
//!
//! A deep trie recurses once per level of element nesting. Keys nested a
//! thousand levels deep are fine; a few thousand can overflow a default
//! thread stack, so build such keys on a thread with a larger stack.
//!
//! Removing a key prunes every node left holding neither a terminal value
//! nor children, so the trie never carries dead branches.
//!
//! Example 1
//! ```
//! use deepkey::key::Key;
//! use deepkey::trie::Trie;
//!
//! let mut trie = Trie::new();
//! let key: Vec<Key<char>> = "abcdef".chars().map(Key::atom).collect();
//! trie.insert(&key, "abcdef".len());
//!
//! assert!(trie.contains(&key));
//! assert!(trie.contains_prefix(&key[..3]));
//! assert_eq!(trie.get(&key), Some(&6));
//! assert_eq!(trie.remove(&key), Some(6));
//! assert!(!trie.contains(&key));
//! assert!(!trie.contains_prefix(&key[..3]));
//! ```
//!
//! Example 2
//! ```
//! use deepkey::key::Key;
//! use deepkey::trie::Trie;
//!
//! // Elements may be sequences themselves
//! let mut trie = Trie::new();
//! let key = vec![Key::seq([1u32, 2]), Key::atom(3)];
//! trie.insert(&key, "nested");
//!
//! let same = vec![Key::seq(vec![1u32, 2]), Key::atom(3)];
//! assert_eq!(trie.get(&same), Some(&"nested"));
//! ```

use std::borrow::Borrow;
use std::collections::BTreeMap;

use tracing::{debug, trace};

use crate::iterator::KeyValueRef;
use crate::key::{Key, KeyAtom};

/// Index of a node in the trie's arena.
pub(crate) type NodeId = usize;

pub(crate) const ROOT: NodeId = 0;

/// Outgoing edges of a node.
#[derive(Clone, Debug)]
pub(crate) enum Branches<A> {
    Flat(BTreeMap<Key<A>, NodeId>),
    Deep {
        atoms: BTreeMap<A, NodeId>,
        // Sequence elements map to the child id through a trie of their own
        nested: Option<Box<Trie<A, NodeId>>>,
    },
}

#[derive(Clone, Debug)]
pub(crate) struct Node<A, T> {
    pub(crate) branches: Branches<A>,
    pub(crate) terminal: Option<T>,
}

/// Stores sequence keys as chains of nodes. A key's value lives in the
/// terminal slot of the node its last element leads to.
#[derive(Clone, Debug)]
pub struct Trie<A, T> {
    pub(crate) nodes: Vec<Node<A, T>>,
    free: Vec<NodeId>,
    count: usize,
    deep: bool,
}

impl<A: KeyAtom> Branches<A> {
    fn new(deep: bool) -> Self {
        if deep {
            Branches::Deep {
                atoms: BTreeMap::new(),
                nested: None,
            }
        } else {
            Branches::Flat(BTreeMap::new())
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            Branches::Flat(edges) => edges.is_empty(),
            Branches::Deep { atoms, nested } => atoms.is_empty() && nested.is_none(),
        }
    }

    fn get(&self, element: &Key<A>) -> Option<NodeId> {
        match (self, element) {
            (Branches::Flat(edges), _) => edges.get(element).copied(),
            (Branches::Deep { atoms, .. }, Key::Atom(atom)) => atoms.get(atom).copied(),
            (Branches::Deep { nested, .. }, Key::Seq(elements)) => nested
                .as_ref()
                .and_then(|nested| nested.get(elements).copied()),
        }
    }

    fn link(&mut self, element: &Key<A>, child: NodeId) {
        match (self, element) {
            (Branches::Flat(edges), _) => {
                edges.insert(element.clone(), child);
            }
            (Branches::Deep { atoms, .. }, Key::Atom(atom)) => {
                atoms.insert(atom.clone(), child);
            }
            (Branches::Deep { nested, .. }, Key::Seq(elements)) => {
                nested
                    .get_or_insert_with(|| Box::new(Trie::new()))
                    .insert(elements, child);
            }
        }
    }

    fn unlink(&mut self, element: &Key<A>) {
        match (self, element) {
            (Branches::Flat(edges), _) => {
                edges.remove(element);
            }
            (Branches::Deep { atoms, .. }, Key::Atom(atom)) => {
                atoms.remove(atom);
            }
            (Branches::Deep { nested, .. }, Key::Seq(elements)) => {
                let emptied = match nested {
                    Some(inner) => {
                        inner.remove(elements);
                        inner.is_empty()
                    }
                    None => false,
                };
                if emptied {
                    *nested = None;
                }
            }
        }
    }

    /// Edges in element order: atoms first, then nested sequences.
    pub(crate) fn edges(&self) -> Vec<(Key<A>, NodeId)> {
        match self {
            Branches::Flat(edges) => edges.iter().map(|(e, &id)| (e.clone(), id)).collect(),
            Branches::Deep { atoms, nested } => atoms
                .iter()
                .map(|(atom, &id)| (Key::Atom(atom.clone()), id))
                .chain(
                    nested
                        .iter()
                        .flat_map(|inner| inner.iter())
                        .map(|kv| (Key::Seq(kv.key), *kv.value)),
                )
                .collect(),
        }
    }
}

impl<A: KeyAtom, T> Node<A, T> {
    fn new(deep: bool) -> Self {
        Self {
            branches: Branches::new(deep),
            terminal: None,
        }
    }

    fn is_empty(&self) -> bool {
        self.terminal.is_none() && self.branches.is_empty()
    }
}

impl<A: KeyAtom, T> Default for Trie<A, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: KeyAtom, T> Trie<A, T> {
    /// Create a new deep Trie.
    pub fn new() -> Self {
        Self::with_depth(true)
    }

    /// Create a new flat Trie, which compares sequence elements whole at
    /// each level instead of descending into them.
    pub fn flat() -> Self {
        Self::with_depth(false)
    }

    pub(crate) fn with_depth(deep: bool) -> Self {
        Self {
            nodes: vec![Node::new(deep)],
            free: Vec::new(),
            count: 0,
            deep,
        }
    }

    /// Does this Trie decompose sequence elements?
    pub fn is_deep(&self) -> bool {
        self.deep
    }

    /// Clear the Trie.
    pub fn clear(&mut self) {
        debug!(count = self.count, nodes = self.nodes.len(), "clearing trie");
        self.nodes.clear();
        self.nodes.push(Node::new(self.deep));
        self.free.clear();
        self.count = 0;
    }

    /// Does the Trie contain the supplied key?
    pub fn contains<K, E>(&self, key: K) -> bool
    where
        K: IntoIterator<Item = E>,
        E: Borrow<Key<A>>,
    {
        self.get(key).is_some()
    }

    /// Does any key in the Trie start with the supplied prefix?
    pub fn contains_prefix<P, E>(&self, prefix: P) -> bool
    where
        P: IntoIterator<Item = E>,
        E: Borrow<Key<A>>,
    {
        // Pruning guarantees every reachable node leads to a terminal
        !self.is_empty() && self.find(prefix).is_some()
    }

    /// How many keys does the Trie contain?
    #[inline(always)]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Is the Trie empty?
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Get a reference to a key's associated value.
    pub fn get<K, E>(&self, key: K) -> Option<&T>
    where
        K: IntoIterator<Item = E>,
        E: Borrow<Key<A>>,
    {
        let id = self.find(key)?;
        self.nodes[id].terminal.as_ref()
    }

    /// Get a mutable reference to a key's associated value.
    pub fn get_mut<K, E>(&mut self, key: K) -> Option<&mut T>
    where
        K: IntoIterator<Item = E>,
        E: Borrow<Key<A>>,
    {
        let id = self.find(key)?;
        self.nodes[id].terminal.as_mut()
    }

    /// Insert the key and value into the Trie. If the key is already present
    /// the value is updated to the new value. Returns the previously
    /// associated value.
    pub fn insert<K, E>(&mut self, key: K, value: T) -> Option<T>
    where
        K: IntoIterator<Item = E>,
        E: Borrow<Key<A>>,
    {
        self.insert_at(key, value).1
    }

    /// Remove the key from the Trie, returning its value if it was present.
    pub fn remove<K, E>(&mut self, key: K) -> Option<T>
    where
        K: IntoIterator<Item = E>,
        E: Borrow<Key<A>>,
    {
        self.remove_at(key).map(|(_, value)| value)
    }

    /// Create an iterator over the Trie. Keys are yielded before their
    /// extensions and siblings in element order.
    pub fn iter(&self) -> impl Iterator<Item = KeyValueRef<'_, A, T>> {
        self.into_iter()
    }

    /// Walk the key without creating anything. Returns the node the last
    /// element leads to, whether or not a key ends there.
    pub(crate) fn find<K, E>(&self, key: K) -> Option<NodeId>
    where
        K: IntoIterator<Item = E>,
        E: Borrow<Key<A>>,
    {
        key.into_iter().try_fold(ROOT, |node, element| {
            let element: &Key<A> = element.borrow();
            self.nodes[node].branches.get(element)
        })
    }

    /// Insert, returning the terminal node along with any previous value.
    pub(crate) fn insert_at<K, E>(&mut self, key: K, value: T) -> (NodeId, Option<T>)
    where
        K: IntoIterator<Item = E>,
        E: Borrow<Key<A>>,
    {
        let mut node = ROOT;
        for element in key {
            let element: &Key<A> = element.borrow();
            node = match self.nodes[node].branches.get(element) {
                Some(child) => child,
                None => {
                    let child = self.alloc();
                    self.nodes[node].branches.link(element, child);
                    child
                }
            };
        }
        let previous = self.nodes[node].terminal.replace(value);
        if previous.is_none() {
            self.count += 1;
        }
        (node, previous)
    }

    /// Remove, returning the node which held the terminal value along with
    /// the value. The node id is stale once this returns if the node was
    /// pruned.
    pub(crate) fn remove_at<K, E>(&mut self, key: K) -> Option<(NodeId, T)>
    where
        K: IntoIterator<Item = E>,
        E: Borrow<Key<A>>,
    {
        let mut path: Vec<(NodeId, NodeId, E)> = Vec::new();
        let mut node = ROOT;
        for element in key {
            let step: &Key<A> = element.borrow();
            let child = self.nodes[node].branches.get(step)?;
            path.push((node, child, element));
            node = child;
        }
        let value = self.nodes[node].terminal.take()?;
        self.count -= 1;
        self.prune(path);
        Some((node, value))
    }

    // Emptiness only propagates upwards, so the first surviving node ends
    // the walk.
    fn prune<E: Borrow<Key<A>>>(&mut self, path: Vec<(NodeId, NodeId, E)>) {
        for (parent, child, element) in path.into_iter().rev() {
            if !self.nodes[child].is_empty() {
                break;
            }
            let step: &Key<A> = element.borrow();
            self.nodes[parent].branches.unlink(step);
            self.free.push(child);
            trace!(parent, child, "pruned trie node");
        }
    }

    fn alloc(&mut self) -> NodeId {
        match self.free.pop() {
            Some(id) => id,
            None => {
                self.nodes.push(Node::new(self.deep));
                self.nodes.len() - 1
            }
        }
    }
}

#[cfg(test)]
impl<A: KeyAtom, T> Trie<A, T> {
    /// Assert the structural invariants: every reachable node except the
    /// root is non-empty, terminals match the count and no node leaks.
    pub(crate) fn check_structure(&self) {
        let mut reachable = vec![false; self.nodes.len()];
        let mut stack = vec![ROOT];
        let mut terminals = 0;
        while let Some(id) = stack.pop() {
            assert!(!reachable[id], "node {id} is linked twice");
            reachable[id] = true;
            let node = &self.nodes[id];
            if id != ROOT {
                assert!(!node.is_empty(), "empty node {id} survived pruning");
            }
            if node.terminal.is_some() {
                terminals += 1;
            }
            if let Branches::Deep {
                nested: Some(nested),
                ..
            } = &node.branches
            {
                assert!(!nested.is_empty(), "empty nested trie kept in node {id}");
                nested.check_structure();
            }
            stack.extend(node.branches.edges().into_iter().map(|(_, child)| child));
        }
        assert_eq!(terminals, self.count);
        for &id in &self.free {
            assert!(!reachable[id], "freed node {id} is still linked");
            assert!(self.nodes[id].is_empty(), "freed node {id} is not empty");
        }
        assert_eq!(
            reachable.iter().filter(|r| **r).count() + self.free.len(),
            self.nodes.len(),
            "nodes leaked from the arena"
        );
    }

    pub(crate) fn free_count(&self) -> usize {
        self.free.len()
    }
}
