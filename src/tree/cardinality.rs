//! Prefix cardinality statistics for composite keys.
//!
//! [`CardinalityMap`] wraps a [`TreeMap`] whose keys are made of ordered
//! parts (tuples, arrays, vectors). For every part index `i` it keeps the
//! number of entries whose first difference from their predecessor is at
//! part `i`, so the number of distinct key prefixes of any length is a sum
//! over a short array instead of a walk.
//!
//! The counts are updated from the neighbours of the touched key on every
//! insert and removal. The comparator must order keys part by part, so that
//! equal keys have equal parts.
//!
//! # Examples
//!
//! ```rust
//! use sylva::tree::CardinalityMap;
//!
//! let mut map = CardinalityMap::new();
//! map.put(("eu", "paris"), 1);
//! map.put(("eu", "rome"), 2);
//! map.put(("us", "boston"), 3);
//!
//! assert_eq!(map.distinct_prefixes(1), 2);
//! assert_eq!(map.distinct_prefixes(2), 3);
//!
//! map.remove(&("us", "boston"));
//! assert_eq!(map.distinct_prefixes(1), 1);
//! assert!(map.verify());
//! ```

use tracing::debug;

use super::comparator::{Comparator, NaturalOrder};
use super::config::TreeConfig;
use super::map::TreeMap;

// =============================================================================
// KeyParts
// =============================================================================

/// A key composed of a sequence of comparable parts.
pub trait KeyParts {
    /// Returns the number of parts in this key.
    fn part_count(&self) -> usize;

    /// Returns the index of the first part where `self` and `other` differ.
    ///
    /// When one key is a prefix of the other the result is the shorter
    /// length; equal keys yield their common length.
    fn divergence(&self, other: &Self) -> usize;
}

fn slice_divergence<T: PartialEq>(left: &[T], right: &[T]) -> usize {
    left.iter()
        .zip(right)
        .position(|(left, right)| left != right)
        .unwrap_or_else(|| left.len().min(right.len()))
}

impl<T: PartialEq, const N: usize> KeyParts for [T; N] {
    fn part_count(&self) -> usize {
        N
    }

    fn divergence(&self, other: &Self) -> usize {
        slice_divergence(self, other)
    }
}

impl<T: PartialEq> KeyParts for Vec<T> {
    fn part_count(&self) -> usize {
        self.len()
    }

    fn divergence(&self, other: &Self) -> usize {
        slice_divergence(self, other)
    }
}

macro_rules! impl_key_parts_for_tuple {
    ($count:expr; $($part:ident : $index:tt),+) => {
        impl<$($part: PartialEq),+> KeyParts for ($($part,)+) {
            fn part_count(&self) -> usize {
                $count
            }

            fn divergence(&self, other: &Self) -> usize {
                $(
                    if self.$index != other.$index {
                        return $index;
                    }
                )+
                $count
            }
        }
    };
}

impl_key_parts_for_tuple!(2; A: 0, B: 1);
impl_key_parts_for_tuple!(3; A: 0, B: 1, C: 2);
impl_key_parts_for_tuple!(4; A: 0, B: 1, C: 2, D: 3);

// =============================================================================
// CardinalityMap
// =============================================================================

/// A [`TreeMap`] that tracks how many distinct key prefixes it holds.
pub struct CardinalityMap<K, V, C = NaturalOrder> {
    map: TreeMap<K, V, C>,
    counts: Vec<usize>,
}

/// Stored keys on either side of a probed key.
struct Neighborhood<'a, K> {
    predecessor: Option<&'a K>,
    present: bool,
    successor: Option<&'a K>,
}

impl<K, V> CardinalityMap<K, V, NaturalOrder> {
    /// Creates an empty map with the default configuration.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            map: TreeMap::new(),
            counts: Vec::new(),
        }
    }

    /// Creates an empty map with the given configuration.
    #[must_use]
    pub const fn with_config(config: TreeConfig) -> Self {
        Self {
            map: TreeMap::with_config(config),
            counts: Vec::new(),
        }
    }
}

impl<K, V> Default for CardinalityMap<K, V, NaturalOrder> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, C> CardinalityMap<K, V, C> {
    /// Creates an empty map ordered by `comparator`.
    #[must_use]
    pub const fn with_comparator(comparator: C) -> Self {
        Self {
            map: TreeMap::with_comparator(comparator),
            counts: Vec::new(),
        }
    }

    /// Returns the number of entries.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if the map holds no entries.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns the underlying map.
    #[inline]
    #[must_use]
    pub const fn as_map(&self) -> &TreeMap<K, V, C> {
        &self.map
    }

    /// Unwraps the underlying map, discarding the statistics.
    #[must_use]
    pub fn into_inner(self) -> TreeMap<K, V, C> {
        self.map
    }

    /// Returns the per-part divergence counts.
    ///
    /// `counts()[i]` is the number of entries whose first difference from
    /// their predecessor is at part `i`. The first entry counts at part 0.
    #[inline]
    #[must_use]
    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// Returns the number of distinct key prefixes made of `parts` parts.
    ///
    /// # Complexity
    ///
    /// O(`parts`), independent of the number of entries.
    #[must_use]
    pub fn distinct_prefixes(&self, parts: usize) -> usize {
        self.counts.iter().take(parts).sum()
    }

    /// Removes every entry and resets the statistics.
    pub fn clear(&mut self) {
        self.map.clear();
        self.counts.clear();
    }

    fn bump(&mut self, part: usize) {
        if self.counts.len() <= part {
            self.counts.resize(part + 1, 0);
        }
        self.counts[part] += 1;
    }

    fn drop_count(&mut self, part: usize) {
        debug_assert!(
            self.counts.get(part).is_some_and(|count| *count > 0),
            "cardinality count underflow at part {part}"
        );
        if let Some(count) = self.counts.get_mut(part) {
            *count = count.saturating_sub(1);
        }
    }
}

impl<K: KeyParts, V, C: Comparator<K>> CardinalityMap<K, V, C> {
    /// Predecessor of `key`, the entry at `key` if stored, and the entry
    /// after it, from a single descent.
    fn neighbors(&self, key: &K) -> Neighborhood<'_, K> {
        let raw = &self.map.raw;
        let found = raw.lower_search(key);
        let predecessor = found.strict.map(|position| &raw.entry(position).key);
        match found.other {
            Some(position) if raw.comparator.equal(&raw.entry(position).key, key) => {
                Neighborhood {
                    predecessor,
                    present: true,
                    successor: raw
                        .next_position(position)
                        .map(|next| &raw.entry(next).key),
                }
            }
            other => Neighborhood {
                predecessor,
                present: false,
                successor: other.map(|position| &raw.entry(position).key),
            },
        }
    }

    /// Inserts or replaces an entry, returning the previous value.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        let around = self.neighbors(&key);
        if around.present {
            return self.map.put(key, value);
        }

        let inserted = around.predecessor.map_or(0, |lower| lower.divergence(&key));
        let shifted = around.successor.map(|higher| {
            let before = around.predecessor.map_or(0, |lower| lower.divergence(higher));
            (before, key.divergence(higher))
        });

        if let Some((before, _)) = shifted {
            self.drop_count(before);
        }
        self.bump(inserted);
        if let Some((_, after)) = shifted {
            self.bump(after);
        }
        self.map.put(key, value)
    }

    /// Removes `key`, returning its value.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let around = self.neighbors(key);
        if !around.present {
            return None;
        }

        let removed = around.predecessor.map_or(0, |lower| lower.divergence(key));
        let shifted = around.successor.map(|higher| {
            let after = around.predecessor.map_or(0, |lower| lower.divergence(higher));
            (key.divergence(higher), after)
        });

        self.drop_count(removed);
        if let Some((before, after)) = shifted {
            self.drop_count(before);
            self.bump(after);
        }
        self.map.remove(key)
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.map.get(key)
    }

    /// Returns `true` if the map holds `key`.
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    fn walk(&self) -> Vec<usize> {
        let mut counts = Vec::new();
        let mut previous: Option<&K> = None;
        for key in self.map.keys() {
            let part = previous.map_or(0, |previous| previous.divergence(key));
            if counts.len() <= part {
                counts.resize(part + 1, 0);
            }
            counts[part] += 1;
            previous = Some(key);
        }
        counts
    }

    /// Rebuilds the statistics from a full walk of the entries.
    pub fn recalculate(&mut self) {
        self.counts = self.walk();
        debug!(entries = self.map.len(), parts = self.counts.len(), "recalculated cardinality");
    }

    /// Returns `true` if the maintained statistics match a full walk.
    #[must_use]
    pub fn verify(&self) -> bool {
        let walked = self.walk();
        let width = walked.len().max(self.counts.len());
        (0..width).all(|part| {
            walked.get(part).copied().unwrap_or(0) == self.counts.get(part).copied().unwrap_or(0)
        })
    }
}
