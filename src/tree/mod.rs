//! Ordered maps and sets stored in an in-place B-tree.
//!
//! - [`TreeMap`]: ordered map with navigation, range views and cursors
//! - [`TreeSet`]: ordered set over the same engine
//! - [`CardinalityMap`]: prefix statistics for composite keys (feature
//!   `cardinality`)
//!
//! Every entry is stored exactly once: leaves hold runs of entries and
//! branches hold separator entries between their children. Nodes are kept
//! between a low-water mark and a maximum fill derived from the tree order,
//! and overflow or underflow is first absorbed by neighbouring siblings
//! before a node is split or merged.
//!
//! # Examples
//!
//! ```rust
//! use sylva::tree::{Seek, TreeConfig, TreeMap};
//!
//! let mut map = TreeMap::with_config(TreeConfig::new().with_order(4));
//! for key in 0..1000 {
//!     map.put(key * 2, ());
//! }
//!
//! assert_eq!(map.lower_key(&501), Some(&500));
//! assert_eq!(map.higher_key(&501), Some(&502));
//! assert_eq!(map.sub_map(100, 110).len(), 6);
//!
//! let mut cursor = map.cursor_at(&7, Seek::Ceiling);
//! assert_eq!(cursor.next().map(|(key, _)| *key), Some(8));
//! assert!(map.check_invariants().is_ok());
//! ```

mod engine;
mod node;
mod rebalance;

mod comparator;
mod config;
mod error;
mod hook;
mod iter;
mod map;
mod set;
mod view;

#[cfg(feature = "cardinality")]
mod cardinality;

pub use comparator::Comparator;
pub use comparator::NaturalOrder;
pub use comparator::ReverseOrder;
pub use config::MIN_ORDER;
pub use config::SearchStrategy;
pub use config::Thresholds;
pub use config::TreeConfig;
pub use error::InvariantViolation;
pub use error::TreeError;
pub use error::TreeResult;
pub use hook::EntryHook;
pub use iter::Cursor;
pub use iter::CursorMut;
pub use iter::IntoIter;
pub use iter::Iter;
pub use iter::IterMut;
pub use iter::Keys;
pub use iter::Range;
pub use iter::Seek;
pub use iter::Values;
pub use iter::ValuesMut;
pub use map::Append;
pub use map::TreeMap;
pub use set::RangeSet;
pub use set::RangeSetMut;
pub use set::SetCursor;
pub use set::SetCursorMut;
pub use set::SetIntoIter;
pub use set::SetIter;
pub use set::SetRange;
pub use set::TreeSet;
pub use view::EntrySet;
pub use view::KeySet;
pub use view::RangeMap;
pub use view::RangeMapMut;

#[cfg(feature = "cardinality")]
pub use cardinality::CardinalityMap;
#[cfg(feature = "cardinality")]
pub use cardinality::KeyParts;
