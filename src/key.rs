//! Keys for [`crate::map::TrieMap`].
//!
//! A [`Key`] is either an atom, compared by its own value, or a sequence of
//! keys, compared element by element. Sequences may nest to any depth.
//!
//! ```
//! use deepkey::key::Key;
//!
//! let a: Key<u32> = Key::seq([1u32, 2, 3]);
//! let b: Key<u32> = vec![1u32, 2, 3].into();
//! assert_eq!(a, b);
//! assert_ne!(Key::atom(1u32), Key::seq([1u32]));
//! ```

use std::hash::Hash;

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

/// Atoms which we wish to use as keys (or as elements of sequence keys)
/// must implement KeyAtom.
pub trait KeyAtom: Clone + Ord + Hash {}

// Blanket implementation which satisfies the compiler
impl<A> KeyAtom for A
where
    A: Clone + Ord + Hash,
{
    // Nothing to implement, since A already supports the other traits.
}

/// A map key: a single atom or an ordered sequence of keys.
///
/// Classification is fixed by the variant, so a key can never change from
/// atom to sequence between an insert and a lookup.
///
/// Nesting depth has no fixed bound, but a deep map descends one nested
/// trie per level of nesting, recursively. Keys nested a few thousand
/// levels deep can exhaust a default 2 MiB thread stack; a thousand
/// levels is fine.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", untagged)
)]
pub enum Key<A> {
    Atom(A),
    Seq(Vec<Key<A>>),
}

impl<A> Key<A> {
    /// Build an atomic key.
    pub fn atom(atom: A) -> Self {
        Key::Atom(atom)
    }

    /// Build a sequence key from anything convertible into keys.
    ///
    /// When the elements are themselves keys and nothing else fixes `A`,
    /// the conversion is ambiguous; use [`Key::nest`] or `Key::<A>::seq`.
    pub fn seq<I, E>(elements: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Key<A>>,
    {
        Key::Seq(elements.into_iter().map(Into::into).collect())
    }

    /// Build a sequence key whose elements are already keys.
    ///
    /// ```
    /// use deepkey::key::Key;
    ///
    /// let k = Key::nest([Key::seq([1u32, 2]), Key::atom(3)]);
    /// assert_eq!(k.depth(), 2);
    /// ```
    pub fn nest<I>(elements: I) -> Self
    where
        I: IntoIterator<Item = Key<A>>,
    {
        Key::Seq(elements.into_iter().collect())
    }

    /// The empty sequence.
    pub fn empty() -> Self {
        Key::Seq(Vec::new())
    }

    pub fn is_atom(&self) -> bool {
        matches!(self, Key::Atom(_))
    }

    pub fn is_seq(&self) -> bool {
        matches!(self, Key::Seq(_))
    }

    pub fn as_atom(&self) -> Option<&A> {
        match self {
            Key::Atom(a) => Some(a),
            Key::Seq(_) => None,
        }
    }

    pub fn as_seq(&self) -> Option<&[Key<A>]> {
        match self {
            Key::Atom(_) => None,
            Key::Seq(s) => Some(s),
        }
    }

    /// Nesting depth: 0 for an atom, 1 for a sequence of atoms, and so on.
    pub fn depth(&self) -> usize {
        match self {
            Key::Atom(_) => 0,
            Key::Seq(s) => 1 + s.iter().map(Key::depth).max().unwrap_or(0),
        }
    }
}

impl<A> From<A> for Key<A> {
    fn from(atom: A) -> Self {
        Key::Atom(atom)
    }
}

impl<A> From<Vec<A>> for Key<A> {
    fn from(atoms: Vec<A>) -> Self {
        Key::Seq(atoms.into_iter().map(Key::Atom).collect())
    }
}

impl<A> FromIterator<Key<A>> for Key<A> {
    fn from_iter<I: IntoIterator<Item = Key<A>>>(iter: I) -> Self {
        Key::Seq(iter.into_iter().collect())
    }
}
