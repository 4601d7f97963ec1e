//! Map types used across the workspace.
//!
//! Tag-keyed tables default to `hashbrown`; the `std-hash` feature swaps in the
//! standard library maps.

#[cfg(feature = "std-hash")]
pub mod map {
    pub use std::collections::{HashMap, HashSet};
}

#[cfg(not(feature = "std-hash"))]
pub mod map {
    pub use hashbrown::{HashMap, HashSet};
}

/// Insertion-ordered map used wherever draining order must be stable.
pub use indexmap::IndexMap;

/// Table keyed by view tag.
pub type TagMap<V> = map::HashMap<crate::Tag, V>;
/// Set of view tags.
pub type TagSet = map::HashSet<crate::Tag>;
