//! Set-shaped views and key-range views over a map.
//!
//! Views never copy entries. [`EntrySet`] and [`KeySet`] borrow a tree and
//! a pair of bounds; [`RangeMap`] and [`RangeMapMut`] own inclusive bound
//! keys and hand out entry sets, iterators and cursors restricted to them.
//! Direct insertion and removal through a range view is unsupported;
//! [`RangeMapMut::cursor_mut`] is the one way to delete through a view.

use std::ops::Bound;

use super::comparator::{Comparator, NaturalOrder};
use super::engine::RawTree;
use super::error::{TreeError, TreeResult};
use super::iter::{Cursor, CursorMut, Range};
use super::map::TreeMap;

const fn inclusive<K>(bound: Option<&K>) -> Bound<&K> {
    match bound {
        Some(key) => Bound::Included(key),
        None => Bound::Unbounded,
    }
}

// =============================================================================
// EntrySet
// =============================================================================

/// The entries of a map, or of a key range of it, viewed as a set.
pub struct EntrySet<'a, K, V, C = NaturalOrder> {
    tree: &'a RawTree<K, V, C>,
    from: Bound<&'a K>,
    to: Bound<&'a K>,
}

impl<K, V, C> Clone for EntrySet<'_, K, V, C> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            from: self.from,
            to: self.to,
        }
    }
}

impl<'a, K, V, C> EntrySet<'a, K, V, C> {
    pub(crate) const fn new(tree: &'a RawTree<K, V, C>, from: Bound<&'a K>, to: Bound<&'a K>) -> Self {
        Self { tree, from, to }
    }

    const fn is_unbounded(&self) -> bool {
        matches!((self.from, self.to), (Bound::Unbounded, Bound::Unbounded))
    }
}

impl<'a, K, V, C: Comparator<K>> EntrySet<'a, K, V, C> {
    /// Returns the number of entries in the set.
    ///
    /// # Complexity
    ///
    /// O(1) for a whole map, O(n) over the range otherwise.
    #[must_use]
    pub fn len(&self) -> usize {
        if self.is_unbounded() {
            self.tree.len
        } else {
            self.iter().count()
        }
    }

    /// Returns `true` if the set holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.span(self.from, self.to).is_none()
    }

    /// Returns `true` if `key` is inside the bounds and present.
    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Returns the entry for `key` if it lies inside the bounds.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<(&'a K, &'a V)> {
        let tree = self.tree;
        if !tree.in_bounds(key, self.from, self.to) {
            return None;
        }
        tree.find_position(key)
            .map(|position| tree.entry(position).as_pair())
    }

    /// Returns the entry with the smallest key.
    #[must_use]
    pub fn first(&self) -> Option<(&'a K, &'a V)> {
        let tree = self.tree;
        tree.start_position(self.from)
            .filter(|&position| tree.below_upper(&tree.entry(position).key, self.to))
            .map(|position| tree.entry(position).as_pair())
    }

    /// Returns the entry with the largest key.
    #[must_use]
    pub fn last(&self) -> Option<(&'a K, &'a V)> {
        let tree = self.tree;
        tree.end_position(self.to)
            .filter(|&position| tree.above_lower(&tree.entry(position).key, self.from))
            .map(|position| tree.entry(position).as_pair())
    }

    /// Returns an iterator over the entries in ascending key order.
    #[must_use]
    pub fn iter(&self) -> Range<'a, K, V, C> {
        Range::new(self.tree, self.tree.span(self.from, self.to))
    }

    /// Returns a cursor before the first entry of the set.
    #[must_use]
    pub fn cursor(&self) -> Cursor<'a, K, V, C> {
        Cursor::within(self.tree, self.tree.span(self.from, self.to))
    }
}

impl<'a, K, V, C: Comparator<K>> IntoIterator for EntrySet<'a, K, V, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = Range<'a, K, V, C>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, C: Comparator<K>> IntoIterator for &EntrySet<'a, K, V, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = Range<'a, K, V, C>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// =============================================================================
// KeySet
// =============================================================================

/// The keys of a map, or of a key range of it, viewed as a set.
///
/// # Examples
///
/// ```rust
/// use sylva::tree::TreeMap;
///
/// let map: TreeMap<i32, ()> = (1..=9).map(|key| (key, ())).collect();
/// let view = map.sub_map(3, 6);
/// let keys = view.key_set();
///
/// assert_eq!(keys.len(), 4);
/// assert!(keys.contains(&6));
/// assert!(!keys.contains(&7));
/// assert_eq!(keys.iter().copied().collect::<Vec<_>>(), vec![3, 4, 5, 6]);
/// ```
pub struct KeySet<'a, K, V, C = NaturalOrder> {
    entries: EntrySet<'a, K, V, C>,
}

impl<K, V, C> Clone for KeySet<'_, K, V, C> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<'a, K, V, C> KeySet<'a, K, V, C> {
    pub(crate) const fn new(entries: EntrySet<'a, K, V, C>) -> Self {
        Self { entries }
    }
}

impl<'a, K, V, C: Comparator<K>> KeySet<'a, K, V, C> {
    /// Returns the number of keys in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the set holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if `key` is inside the bounds and present.
    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains(key)
    }

    /// Returns the smallest key.
    #[must_use]
    pub fn first(&self) -> Option<&'a K> {
        self.entries.first().map(|(key, _)| key)
    }

    /// Returns the largest key.
    #[must_use]
    pub fn last(&self) -> Option<&'a K> {
        self.entries.last().map(|(key, _)| key)
    }

    /// Returns an iterator over the keys in ascending order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &'a K> + use<'a, K, V, C> {
        self.entries.iter().map(|(key, _)| key)
    }
}

// =============================================================================
// RangeMap
// =============================================================================

/// A read-only view of the entries of a map within inclusive key bounds.
///
/// Created by [`TreeMap::head_map`], [`TreeMap::sub_map`] and
/// [`TreeMap::tail_map`].
///
/// # Examples
///
/// ```rust
/// use sylva::tree::TreeMap;
///
/// let map: TreeMap<u32, u32> = (0..=20).step_by(2).map(|key| (key, key)).collect();
/// let head = map.head_map(10);
///
/// assert_eq!(head.first_key(), Some(&0));
/// assert_eq!(head.last_key(), Some(&10));
/// assert_eq!(head.len(), 6);
/// ```
pub struct RangeMap<'a, K, V, C = NaturalOrder> {
    tree: &'a RawTree<K, V, C>,
    from: Option<K>,
    to: Option<K>,
}

impl<'a, K, V, C> RangeMap<'a, K, V, C> {
    pub(crate) const fn new(tree: &'a RawTree<K, V, C>, from: Option<K>, to: Option<K>) -> Self {
        Self { tree, from, to }
    }

    /// Returns the entries of the view as a set.
    #[must_use]
    pub fn entry_set(&self) -> EntrySet<'_, K, V, C> {
        EntrySet::new(
            self.tree,
            inclusive(self.from.as_ref()),
            inclusive(self.to.as_ref()),
        )
    }

    /// Returns the keys of the view as a set.
    #[must_use]
    pub fn key_set(&self) -> KeySet<'_, K, V, C> {
        KeySet::new(self.entry_set())
    }

    /// Returns the inclusive lower bound, if any.
    #[inline]
    #[must_use]
    pub const fn lower_bound(&self) -> Option<&K> {
        self.from.as_ref()
    }

    /// Returns the inclusive upper bound, if any.
    #[inline]
    #[must_use]
    pub const fn upper_bound(&self) -> Option<&K> {
        self.to.as_ref()
    }
}

impl<K, V, C: Comparator<K>> RangeMap<'_, K, V, C> {
    /// Returns the smallest key of the view.
    #[must_use]
    pub fn first_key(&self) -> Option<&K> {
        self.entry_set().first().map(|(key, _)| key)
    }

    /// Returns the largest key of the view.
    #[must_use]
    pub fn last_key(&self) -> Option<&K> {
        self.entry_set().last().map(|(key, _)| key)
    }

    /// Returns the entry with the smallest key of the view.
    #[must_use]
    pub fn first_entry(&self) -> Option<(&K, &V)> {
        self.entry_set().first()
    }

    /// Returns the entry with the largest key of the view.
    #[must_use]
    pub fn last_entry(&self) -> Option<(&K, &V)> {
        self.entry_set().last()
    }

    /// Returns the value for `key` if it lies inside the view.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.entry_set().get(key).map(|(_, value)| value)
    }

    /// Returns `true` if `key` lies inside the view and is present.
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.entry_set().contains(key)
    }

    /// Returns the number of entries inside the view.
    ///
    /// # Complexity
    ///
    /// O(n) in the size of the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entry_set().len()
    }

    /// Returns `true` if no entry lies inside the view.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entry_set().is_empty()
    }

    /// Returns an iterator over the entries of the view.
    #[must_use]
    pub fn iter(&self) -> Range<'_, K, V, C> {
        self.entry_set().iter()
    }

    /// Returns an iterator over the keys of the view.
    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &K> {
        self.iter().map(|(key, _)| key)
    }

    /// Returns a cursor before the first entry of the view.
    #[must_use]
    pub fn cursor(&self) -> Cursor<'_, K, V, C> {
        self.entry_set().cursor()
    }
}

#[allow(clippy::unused_self)]
impl<K, V, C> RangeMap<'_, K, V, C> {
    /// Always fails: a read-only view cannot insert.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::Unsupported`].
    pub fn put(&mut self, _key: K, _value: V) -> TreeResult<Option<V>> {
        Err(TreeError::unsupported("put"))
    }

    /// Always fails: a read-only view cannot remove.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::Unsupported`].
    pub fn remove(&mut self, _key: &K) -> TreeResult<Option<V>> {
        Err(TreeError::unsupported("remove"))
    }

    /// Always fails: a read-only view cannot clear.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::Unsupported`].
    pub fn clear(&mut self) -> TreeResult<()> {
        Err(TreeError::unsupported("clear"))
    }
}

impl<'a, K, V, C: Comparator<K>> IntoIterator for &'a RangeMap<'_, K, V, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = Range<'a, K, V, C>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// =============================================================================
// RangeMapMut
// =============================================================================

/// A view of a key range of a map that can delete through a cursor.
///
/// Created by [`TreeMap::head_map_mut`], [`TreeMap::sub_map_mut`] and
/// [`TreeMap::tail_map_mut`].
///
/// # Examples
///
/// ```rust
/// use sylva::tree::TreeMap;
///
/// let mut map: TreeMap<u32, u32> = (0..10).map(|key| (key, key)).collect();
/// let mut tail = map.tail_map_mut(7);
/// let mut cursor = tail.cursor_mut();
/// while cursor.next().is_some() {
///     cursor.remove().unwrap();
/// }
///
/// assert_eq!(map.last_key(), Some(&6));
/// ```
pub struct RangeMapMut<'a, K, V, C = NaturalOrder> {
    map: &'a mut TreeMap<K, V, C>,
    from: Option<K>,
    to: Option<K>,
}

impl<'a, K, V, C> RangeMapMut<'a, K, V, C> {
    pub(crate) const fn new(map: &'a mut TreeMap<K, V, C>, from: Option<K>, to: Option<K>) -> Self {
        Self { map, from, to }
    }

    /// Returns the entries of the view as a set.
    #[must_use]
    pub fn entry_set(&self) -> EntrySet<'_, K, V, C> {
        EntrySet::new(
            &self.map.raw,
            inclusive(self.from.as_ref()),
            inclusive(self.to.as_ref()),
        )
    }

    /// Returns the keys of the view as a set.
    #[must_use]
    pub fn key_set(&self) -> KeySet<'_, K, V, C> {
        KeySet::new(self.entry_set())
    }
}

impl<K, V, C: Comparator<K>> RangeMapMut<'_, K, V, C> {
    /// Returns the smallest key of the view.
    #[must_use]
    pub fn first_key(&self) -> Option<&K> {
        self.entry_set().first().map(|(key, _)| key)
    }

    /// Returns the largest key of the view.
    #[must_use]
    pub fn last_key(&self) -> Option<&K> {
        self.entry_set().last().map(|(key, _)| key)
    }

    /// Returns the entry with the smallest key of the view.
    #[must_use]
    pub fn first_entry(&self) -> Option<(&K, &V)> {
        self.entry_set().first()
    }

    /// Returns the entry with the largest key of the view.
    #[must_use]
    pub fn last_entry(&self) -> Option<(&K, &V)> {
        self.entry_set().last()
    }

    /// Returns the value for `key` if it lies inside the view.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.entry_set().get(key).map(|(_, value)| value)
    }

    /// Returns a mutable reference to the value for `key` inside the view.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let from = inclusive(self.from.as_ref());
        let to = inclusive(self.to.as_ref());
        if self.map.raw.in_bounds(key, from, to) {
            self.map.get_mut(key)
        } else {
            None
        }
    }

    /// Returns `true` if `key` lies inside the view and is present.
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.entry_set().contains(key)
    }

    /// Returns the number of entries inside the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entry_set().len()
    }

    /// Returns `true` if no entry lies inside the view.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entry_set().is_empty()
    }

    /// Returns an iterator over the entries of the view.
    #[must_use]
    pub fn iter(&self) -> Range<'_, K, V, C> {
        self.entry_set().iter()
    }

    /// Returns an iterator over the keys of the view.
    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &K> {
        self.iter().map(|(key, _)| key)
    }

    /// Returns a cursor before the first entry of the view.
    #[must_use]
    pub fn cursor(&self) -> Cursor<'_, K, V, C> {
        self.entry_set().cursor()
    }

    /// Returns a cursor that can remove entries of the view from the map.
    pub fn cursor_mut(&mut self) -> CursorMut<'_, K, V, C> {
        CursorMut::new(
            self.map,
            inclusive(self.from.as_ref()),
            inclusive(self.to.as_ref()),
        )
    }
}

#[allow(clippy::unused_self)]
impl<K, V, C> RangeMapMut<'_, K, V, C> {
    /// Always fails: insert through the map itself.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::Unsupported`].
    pub fn put(&mut self, _key: K, _value: V) -> TreeResult<Option<V>> {
        Err(TreeError::unsupported("put"))
    }

    /// Always fails: remove through [`RangeMapMut::cursor_mut`].
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::Unsupported`].
    pub fn remove(&mut self, _key: &K) -> TreeResult<Option<V>> {
        Err(TreeError::unsupported("remove"))
    }

    /// Always fails: clear through [`RangeMapMut::cursor_mut`].
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::Unsupported`].
    pub fn clear(&mut self) -> TreeResult<()> {
        Err(TreeError::unsupported("clear"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn map() -> TreeMap<i32, i32> {
        (0..=100).step_by(5).map(|key| (key, -key)).collect()
    }

    #[rstest]
    #[case(Bound::Unbounded, Bound::Unbounded, 21)]
    #[case(Bound::Included(10), Bound::Included(20), 3)]
    #[case(Bound::Excluded(10), Bound::Excluded(20), 1)]
    #[case(Bound::Included(11), Bound::Included(14), 0)]
    #[case(Bound::Included(90), Bound::Unbounded, 3)]
    fn test_entry_set_len(
        map: TreeMap<i32, i32>,
        #[case] from: Bound<i32>,
        #[case] to: Bound<i32>,
        #[case] expected: usize,
    ) {
        let set = EntrySet::new(&map.raw, from.as_ref(), to.as_ref());
        assert_eq!(set.len(), expected);
        assert_eq!(set.is_empty(), expected == 0);
        assert_eq!(set.iter().count(), expected);
    }

    #[rstest]
    fn test_entry_set_bounds_filter_lookups(map: TreeMap<i32, i32>) {
        let set = EntrySet::new(&map.raw, Bound::Included(&10), Bound::Included(&30));
        assert!(set.contains(&15));
        assert!(!set.contains(&35));
        assert_eq!(set.first(), Some((&10, &-10)));
        assert_eq!(set.last(), Some((&30, &-30)));
    }

    #[rstest]
    fn test_range_map_reports_bounds(map: TreeMap<i32, i32>) {
        let view = map.sub_map(12, 48);
        assert_eq!(view.lower_bound(), Some(&12));
        assert_eq!(view.upper_bound(), Some(&48));
        assert_eq!(view.first_key(), Some(&15));
        assert_eq!(view.last_key(), Some(&45));
    }

    #[rstest]
    fn test_range_map_rejects_mutation(map: TreeMap<i32, i32>) {
        let mut view = map.tail_map(50);
        assert_eq!(view.put(1, 1), Err(TreeError::unsupported("put")));
        assert_eq!(view.remove(&50), Err(TreeError::unsupported("remove")));
        assert_eq!(view.clear(), Err(TreeError::unsupported("clear")));
    }

    #[rstest]
    fn test_range_map_mut_get_mut_respects_bounds(mut map: TreeMap<i32, i32>) {
        let mut view = map.head_map_mut(20);
        if let Some(value) = view.get_mut(&20) {
            *value = 0;
        }
        assert!(view.get_mut(&25).is_none());
        assert_eq!(map.get(&20), Some(&0));
    }
}
