//! Three-way key comparison injected into trees.
//!
//! Every key comparison a [`TreeMap`](super::TreeMap) performs goes through
//! a [`Comparator`]. The default, [`NaturalOrder`], defers to [`Ord`];
//! closures of type `Fn(&K, &K) -> Ordering` work as comparators directly.
//!
//! # Examples
//!
//! ```rust
//! use std::cmp::Ordering;
//! use sylva::tree::{Comparator, NaturalOrder, ReverseOrder};
//!
//! assert_eq!(NaturalOrder.compare(&1, &2), Ordering::Less);
//! assert_eq!(ReverseOrder.compare(&1, &2), Ordering::Greater);
//!
//! let by_length = |left: &&str, right: &&str| left.len().cmp(&right.len());
//! assert_eq!(by_length.compare(&"abc", &"de"), Ordering::Greater);
//! ```

use std::cmp::Ordering;

/// A total order over keys of type `K`.
///
/// Implementations must be consistent: `compare(a, b)` is the reverse of
/// `compare(b, a)`, and the relation is transitive. Two keys comparing
/// [`Ordering::Equal`] are the same key as far as the tree is concerned.
pub trait Comparator<K: ?Sized> {
    /// Compares two keys.
    fn compare(&self, left: &K, right: &K) -> Ordering;

    /// Returns `true` if `left` sorts strictly before `right`.
    #[inline]
    fn less(&self, left: &K, right: &K) -> bool {
        self.compare(left, right) == Ordering::Less
    }

    /// Returns `true` if both keys are equal under this order.
    #[inline]
    fn equal(&self, left: &K, right: &K) -> bool {
        self.compare(left, right) == Ordering::Equal
    }
}

/// Orders keys by their [`Ord`] implementation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct NaturalOrder;

impl<K: Ord + ?Sized> Comparator<K> for NaturalOrder {
    #[inline]
    fn compare(&self, left: &K, right: &K) -> Ordering {
        left.cmp(right)
    }
}

/// Orders keys by the reverse of their [`Ord`] implementation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ReverseOrder;

impl<K: Ord + ?Sized> Comparator<K> for ReverseOrder {
    #[inline]
    fn compare(&self, left: &K, right: &K) -> Ordering {
        right.cmp(left)
    }
}

impl<K: ?Sized, F> Comparator<K> for F
where
    F: Fn(&K, &K) -> Ordering,
{
    #[inline]
    fn compare(&self, left: &K, right: &K) -> Ordering {
        self(left, right)
    }
}
