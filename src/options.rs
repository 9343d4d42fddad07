//! Construction options for [`crate::map::TrieMap`].

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

/// Controls how a TrieMap stores its keys.
///
/// With the `serde` feature enabled, options can be read from any
/// configuration format; missing fields take their default.
///
/// ```
/// use deepkey::options::MapOptions;
///
/// let options = MapOptions::default().deep(false);
/// assert!(!options.deep);
/// assert!(options.ordered);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", default)
)]
pub struct MapOptions {
    /// Descend into sequence elements of sequence keys through nested
    /// tries. When false, each level compares elements whole.
    pub deep: bool,
    /// Keep entries in insertion order across removals. When false,
    /// removal is constant time and may reorder the remaining entries.
    pub ordered: bool,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            deep: true,
            ordered: true,
        }
    }
}

impl MapOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deep(mut self, deep: bool) -> Self {
        self.deep = deep;
        self
    }

    pub fn ordered(mut self, ordered: bool) -> Self {
        self.ordered = ordered;
        self
    }
}
