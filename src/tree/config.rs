//! Construction-time tuning for trees.
//!
//! [`TreeConfig`] fixes the order (branching parameter) of a tree, the scan
//! used inside nodes, and whether children cache their slot in the parent.
//! The order determines every capacity threshold through [`Thresholds`].
//!
//! # Examples
//!
//! ```rust
//! use sylva::tree::{SearchStrategy, TreeConfig, TreeMap};
//!
//! let config = TreeConfig::new()
//!     .with_order(16)
//!     .with_search(SearchStrategy::Binary)
//!     .with_slotted(true);
//!
//! let mut map: TreeMap<u64, u64> = TreeMap::with_config(config);
//! map.put(1, 10);
//! assert_eq!(map.config().order(), 16);
//! ```

use std::fmt;
use std::str::FromStr;

use static_assertions::const_assert;

use super::error::TreeError;

/// Smallest order a tree accepts; smaller requests are raised to this.
pub const MIN_ORDER: usize = 3;

const_assert!(MIN_ORDER >= 3);

// =============================================================================
// SearchStrategy
// =============================================================================

/// How a node locates a key among its entries or separators.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SearchStrategy {
    /// Scan entries from the lowest upward.
    #[default]
    Linear,
    /// Bisect the sorted entries.
    Binary,
}

impl fmt::Display for SearchStrategy {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linear => formatter.write_str("linear"),
            Self::Binary => formatter.write_str("binary"),
        }
    }
}

impl FromStr for SearchStrategy {
    type Err = TreeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(Self::Linear),
            "binary" => Ok(Self::Binary),
            other => Err(TreeError::invalid_config(
                "search",
                format!("unknown strategy `{other}`, expected `linear` or `binary`"),
            )),
        }
    }
}

// =============================================================================
// TreeConfig
// =============================================================================

/// Construction-time parameters of a tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TreeConfig {
    order: usize,
    search: SearchStrategy,
    slotted: bool,
}

impl TreeConfig {
    /// Creates the default configuration: order 3, linear search, no slot cache.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            order: MIN_ORDER,
            search: SearchStrategy::Linear,
            slotted: false,
        }
    }

    /// Sets the order. Values below [`MIN_ORDER`] are raised to it.
    #[must_use]
    pub const fn with_order(mut self, order: usize) -> Self {
        self.order = if order < MIN_ORDER { MIN_ORDER } else { order };
        self
    }

    /// Sets the in-node search strategy.
    #[must_use]
    pub const fn with_search(mut self, search: SearchStrategy) -> Self {
        self.search = search;
        self
    }

    /// Enables or disables the cached child slot index.
    ///
    /// With the cache, finding a child inside its parent is O(1) instead of
    /// a scan over the parent's children.
    #[must_use]
    pub const fn with_slotted(mut self, slotted: bool) -> Self {
        self.slotted = slotted;
        self
    }

    /// Returns the order.
    #[inline]
    #[must_use]
    pub const fn order(&self) -> usize {
        self.order
    }

    /// Returns the in-node search strategy.
    #[inline]
    #[must_use]
    pub const fn search(&self) -> SearchStrategy {
        self.search
    }

    /// Returns whether children cache their slot index.
    #[inline]
    #[must_use]
    pub const fn slotted(&self) -> bool {
        self.slotted
    }

    /// Returns the capacity thresholds derived from the order.
    #[inline]
    #[must_use]
    pub const fn thresholds(&self) -> Thresholds {
        Thresholds::for_order(self.order)
    }
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Thresholds
// =============================================================================

/// Fill limits of leaves and branches, derived from the tree order.
///
/// Index limits follow the `last index` convention: a leaf holding `n`
/// entries has last index `n - 1`, a branch holding `n` separators has last
/// index `n`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Thresholds {
    /// Highest last index a branch reaches before it must shed items.
    pub branch_max_index: usize,
    /// A branch whose last index falls below this is low.
    pub branch_low_water: usize,
    /// Highest last index a leaf reaches before it must shed entries.
    pub leaf_max_index: usize,
    /// A leaf whose last index falls below this is low.
    pub leaf_low_water: usize,
}

impl Thresholds {
    /// Derives the thresholds for `order` (raised to [`MIN_ORDER`]).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sylva::tree::Thresholds;
    ///
    /// let thresholds = Thresholds::for_order(3);
    /// assert_eq!(thresholds.branch_max_index, 3);
    /// assert_eq!(thresholds.branch_low_water, 1);
    /// assert_eq!(thresholds.leaf_max_index, 7);
    /// assert_eq!(thresholds.leaf_low_water, 2);
    /// ```
    #[must_use]
    pub const fn for_order(order: usize) -> Self {
        let order = if order < MIN_ORDER { MIN_ORDER } else { order };
        let leaf_max_index = 2 * (order + 1) - 1;
        Self {
            branch_max_index: order,
            branch_low_water: (order - 1) / 2,
            leaf_max_index,
            leaf_low_water: leaf_max_index / 2 - 1,
        }
    }

    /// Physical capacity of a leaf.
    #[inline]
    #[must_use]
    pub const fn leaf_capacity(&self) -> usize {
        self.leaf_max_index + 1
    }

    /// Physical capacity of a branch, counted in separators.
    #[inline]
    #[must_use]
    pub const fn branch_capacity(&self) -> usize {
        self.branch_max_index
    }
}
