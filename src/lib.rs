//! Provides [`crate::map::TrieMap`], a map whose keys may be sequences
//! compared by their contents rather than by identity, alongside ordinary
//! atomic keys.
//!
//! Keys are [`crate::key::Key`]s: either an atom, or a sequence of keys
//! which may nest to any depth. Sequence keys are stored in a
//! [`crate::trie::Trie`], one node per element, so two sequences holding
//! equal elements in the same order always name the same entry. No key is
//! ever hashed whole; each level of the trie looks its element up directly.
//!
//! ```
//! use deepkey::{Key, TrieMap};
//!
//! let mut map = TrieMap::new();
//! map.insert(Key::seq([1u32, 2, 3]), "by content");
//! map.insert(Key::atom(1u32), "by value");
//!
//! let probe: Key<u32> = vec![1u32, 2, 3].into();
//! assert_eq!(map.get(&probe), Some(&"by content"));
//! assert_eq!(map.get(&Key::atom(1)), Some(&"by value"));
//! assert_eq!(map.len(), 2);
//! ```
//!
//! Construction is configured with [`crate::options::MapOptions`]:
//!  - `deep`: descend into sequence elements through nested tries (default)
//!    or compare each element whole
//!  - `ordered`: keep insertion order across removals (default) or remove
//!    in constant time
//!
//! Examples:
//! * trie : [`crate::trie`]
//! * map : [`crate::map`]
//! * iterator : [`crate::iterator`]
//!
//! The map is single threaded. Structural events are logged through
//! `tracing` at `debug` and `trace` level; install a subscriber to see them.

#[cfg(feature = "serde")]
extern crate serde_crate;

pub mod iterator;

pub mod key;

pub mod map;

pub mod options;

pub mod trie;

#[cfg(test)]
mod proptests;

pub use key::{Key, KeyAtom};
pub use map::TrieMap;
pub use options::MapOptions;
pub use trie::Trie;
