//! # sylva
//!
//! Ordered maps and sets stored in an in-place B-tree.
//!
//! ## Overview
//!
//! Entries live directly in the tree nodes: leaves hold runs of entries and
//! branches hold the separator entries between their children, so every
//! key is stored once. Node fill is kept between a low-water mark and a
//! maximum derived from the tree order. Overflow and underflow are first
//! shifted into neighbouring siblings, and nodes split three ways or merge
//! only when the neighbours are full or low as well.
//!
//! - **Maps and sets**: [`tree::TreeMap`] and [`tree::TreeSet`] with
//!   lower/higher/floor/ceiling navigation
//! - **Range views**: inclusive head, sub and tail views over a live tree
//! - **Cursors**: bidirectional cursors that can remove the current entry
//! - **Hooks**: an [`tree::EntryHook`] observes inserts, replacements and
//!   removals
//!
//! ## Feature Flags
//!
//! - `sync`: [`sync::Synchronized`], a mutex wrapper for sharing a tree
//! - `cardinality`: prefix statistics for composite keys
//! - `full`: Enable all features
//!
//! ## Example
//!
//! ```rust
//! use sylva::prelude::*;
//!
//! let mut set: TreeSet<u32> = (1..=5).collect();
//! assert_eq!(set.floor(&0), None);
//! assert_eq!(set.ceiling(&6), None);
//!
//! let view = set.sub_set(2, 4);
//! assert_eq!(view.iter().copied().collect::<Vec<_>>(), vec![2, 3, 4]);
//!
//! assert!(set.remove(&3));
//! assert_eq!(set.higher(&2), Some(&4));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::redundant_closure_for_method_calls)]

/// Prelude module for convenient imports.
///
/// Re-exports commonly used types and traits.
///
/// # Usage
///
/// ```rust
/// use sylva::prelude::*;
/// ```
pub mod prelude {
    pub use crate::tree::{
        Comparator, Cursor, CursorMut, EntryHook, NaturalOrder, ReverseOrder, SearchStrategy,
        Seek, TreeConfig, TreeError, TreeMap, TreeResult, TreeSet,
    };

    #[cfg(feature = "cardinality")]
    pub use crate::tree::{CardinalityMap, KeyParts};

    #[cfg(feature = "sync")]
    pub use crate::sync::Synchronized;
}

pub mod tree;

#[cfg(feature = "sync")]
pub mod sync;
