//! Iterators and cursors over tree maps.
//!
//! All borrowed iterators walk the tree through parent links: a step stays
//! inside the current leaf when it can, descends into the adjacent child
//! after a separator, and otherwise climbs until an ancestor has an entry
//! on the wanted side. No stack is kept, so an iterator is two positions
//! wide regardless of the tree height.
//!
//! [`Cursor`] moves in both directions over a shared tree. [`CursorMut`]
//! also removes the entry it last returned; since a removal may rebalance
//! any part of the tree, the cursor then searches its neighbours again from
//! the removed key instead of trusting stored positions.

use std::iter::FusedIterator;
use std::ops::Bound;
use std::vec;

use super::comparator::{Comparator, NaturalOrder};
use super::engine::RawTree;
use super::error::{TreeError, TreeResult};
use super::map::TreeMap;
use super::node::{Entry, Position};

// =============================================================================
// Range
// =============================================================================

/// An iterator over the entries between two positions, inclusive.
///
/// Produced by range views and entry sets.
pub struct Range<'a, K, V, C = NaturalOrder> {
    tree: &'a RawTree<K, V, C>,
    front: Option<Position>,
    back: Option<Position>,
}

impl<'a, K, V, C> Range<'a, K, V, C> {
    pub(crate) fn new(tree: &'a RawTree<K, V, C>, span: Option<(Position, Position)>) -> Self {
        let (front, back) = span.unzip();
        Self { tree, front, back }
    }

    fn finish(&mut self) {
        self.front = None;
        self.back = None;
    }
}

impl<K, V, C> Clone for Range<'_, K, V, C> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            front: self.front,
            back: self.back,
        }
    }
}

impl<'a, K, V, C> Iterator for Range<'a, K, V, C> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.tree;
        let position = self.front?;
        if Some(position) == self.back {
            self.finish();
        } else {
            self.front = tree.next_position(position);
        }
        Some(tree.entry(position).as_pair())
    }
}

impl<K, V, C> DoubleEndedIterator for Range<'_, K, V, C> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let tree = self.tree;
        let position = self.back?;
        if Some(position) == self.front {
            self.finish();
        } else {
            self.back = tree.previous_position(position);
        }
        Some(tree.entry(position).as_pair())
    }
}

impl<K, V, C> FusedIterator for Range<'_, K, V, C> {}

// =============================================================================
// Whole-map iterators
// =============================================================================

/// An iterator over the entries of a [`TreeMap`], in ascending key order.
pub struct Iter<'a, K, V, C = NaturalOrder> {
    range: Range<'a, K, V, C>,
    remaining: usize,
}

impl<'a, K, V, C> Iter<'a, K, V, C> {
    pub(crate) fn new(tree: &'a RawTree<K, V, C>) -> Self {
        let span = tree.first_position().zip(tree.last_position());
        Self {
            range: Range::new(tree, span),
            remaining: tree.len,
        }
    }
}

impl<K, V, C> Clone for Iter<'_, K, V, C> {
    fn clone(&self) -> Self {
        Self {
            range: self.range.clone(),
            remaining: self.remaining,
        }
    }
}

impl<'a, K, V, C> Iterator for Iter<'a, K, V, C> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        self.range.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V, C> DoubleEndedIterator for Iter<'_, K, V, C> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        self.range.next_back()
    }
}

impl<K, V, C> ExactSizeIterator for Iter<'_, K, V, C> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<K, V, C> FusedIterator for Iter<'_, K, V, C> {}

/// An iterator over the keys of a [`TreeMap`].
pub struct Keys<'a, K, V, C = NaturalOrder> {
    inner: Iter<'a, K, V, C>,
}

impl<'a, K, V, C> Keys<'a, K, V, C> {
    pub(crate) const fn new(inner: Iter<'a, K, V, C>) -> Self {
        Self { inner }
    }
}

impl<'a, K, V, C> Iterator for Keys<'a, K, V, C> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V, C> DoubleEndedIterator for Keys<'_, K, V, C> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(key, _)| key)
    }
}

impl<K, V, C> ExactSizeIterator for Keys<'_, K, V, C> {}

impl<K, V, C> FusedIterator for Keys<'_, K, V, C> {}

/// An iterator over the values of a [`TreeMap`], ordered by key.
pub struct Values<'a, K, V, C = NaturalOrder> {
    inner: Iter<'a, K, V, C>,
}

impl<'a, K, V, C> Values<'a, K, V, C> {
    pub(crate) const fn new(inner: Iter<'a, K, V, C>) -> Self {
        Self { inner }
    }
}

impl<'a, K, V, C> Iterator for Values<'a, K, V, C> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V, C> DoubleEndedIterator for Values<'_, K, V, C> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, value)| value)
    }
}

impl<K, V, C> ExactSizeIterator for Values<'_, K, V, C> {}

impl<K, V, C> FusedIterator for Values<'_, K, V, C> {}

// =============================================================================
// Mutable and owning iterators
// =============================================================================

/// An iterator yielding mutable references to the values of a [`TreeMap`].
///
/// # Complexity
///
/// Creation is O(n): every entry reference is collected up front into a
/// buffer of `n` slots, and a per-node table of the same total size is
/// built and dropped on the way. Each step after that is O(1).
pub struct IterMut<'a, K, V> {
    entries: vec::IntoIter<&'a mut Entry<K, V>>,
}

impl<'a, K, V> IterMut<'a, K, V> {
    pub(crate) fn new<C>(tree: &'a mut RawTree<K, V, C>) -> Self {
        let positions = tree.positions();
        let mut table = tree.arena.entry_table_mut();
        let entries: Vec<_> = positions
            .into_iter()
            .map(|position| {
                table[position.node.index()][position.index]
                    .take()
                    .unwrap_or_else(|| unreachable!("position {position:?} visited twice"))
            })
            .collect();
        Self {
            entries: entries.into_iter(),
        }
    }
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next().map(|Entry { key, value }| (&*key, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IterMut<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.entries.next_back().map(|Entry { key, value }| (&*key, value))
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}

impl<K, V> FusedIterator for IterMut<'_, K, V> {}

/// An iterator yielding mutable references to the values of a [`TreeMap`].
pub struct ValuesMut<'a, K, V> {
    inner: IterMut<'a, K, V>,
}

impl<'a, K, V> ValuesMut<'a, K, V> {
    pub(crate) const fn new(inner: IterMut<'a, K, V>) -> Self {
        Self { inner }
    }
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for ValuesMut<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, value)| value)
    }
}

impl<K, V> ExactSizeIterator for ValuesMut<'_, K, V> {}

/// An owning iterator over the entries of a [`TreeMap`].
///
/// # Complexity
///
/// Creation is O(n) and moves every entry into a buffer of `n` pairs;
/// the nodes are released before the first item is yielded. Each step
/// after that is O(1).
pub struct IntoIter<K, V> {
    entries: vec::IntoIter<(K, V)>,
}

impl<K, V> IntoIter<K, V> {
    pub(crate) fn new<C>(tree: RawTree<K, V, C>) -> Self {
        let positions = tree.positions();
        let mut table = tree.arena.into_entry_table();
        let entries: Vec<_> = positions
            .into_iter()
            .map(|position| {
                table[position.node.index()][position.index]
                    .take()
                    .unwrap_or_else(|| unreachable!("position {position:?} visited twice"))
                    .into_pair()
            })
            .collect();
        Self {
            entries: entries.into_iter(),
        }
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.entries.next_back()
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}

impl<K, V> FusedIterator for IntoIter<K, V> {}

// =============================================================================
// Cursor
// =============================================================================

/// Where [`TreeMap::cursor_at`] places a cursor relative to a key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Seek {
    /// The next entry is the smallest key `>= key`.
    Ceiling,
    /// The next entry is the largest key `<= key`.
    Floor,
}

/// A bidirectional cursor over a shared tree.
///
/// The cursor sits between two entries. [`Iterator::next`] returns the
/// entry after the gap and moves past it; [`Cursor::previous`] does the
/// same in the other direction.
///
/// # Examples
///
/// ```rust
/// use sylva::tree::TreeMap;
///
/// let map: TreeMap<i32, char> = [(1, 'a'), (2, 'b'), (3, 'c')].into_iter().collect();
/// let mut cursor = map.cursor();
///
/// assert!(!cursor.has_previous());
/// assert_eq!(cursor.next(), Some((&1, &'a')));
/// assert_eq!(cursor.next(), Some((&2, &'b')));
/// assert_eq!(cursor.previous(), Some((&2, &'b')));
/// assert_eq!(cursor.previous(), Some((&1, &'a')));
/// assert_eq!(cursor.previous(), None);
/// ```
pub struct Cursor<'a, K, V, C = NaturalOrder> {
    tree: &'a RawTree<K, V, C>,
    next: Option<Position>,
    previous: Option<Position>,
    lowest: Option<Position>,
    highest: Option<Position>,
}

impl<'a, K, V, C> Cursor<'a, K, V, C> {
    /// A cursor over the whole tree, before its first entry.
    pub(crate) fn new(tree: &'a RawTree<K, V, C>) -> Self {
        Self::between(tree, None, tree.first_position())
    }

    /// An unbounded cursor in the gap between two positions.
    pub(crate) const fn between(
        tree: &'a RawTree<K, V, C>,
        previous: Option<Position>,
        next: Option<Position>,
    ) -> Self {
        Self {
            tree,
            next,
            previous,
            lowest: None,
            highest: None,
        }
    }

    /// A cursor confined to `span`, before its first entry.
    pub(crate) fn within(tree: &'a RawTree<K, V, C>, span: Option<(Position, Position)>) -> Self {
        let (lowest, highest) = span.unzip();
        Self {
            tree,
            next: lowest,
            previous: None,
            lowest,
            highest,
        }
    }

    /// Returns `true` if [`Iterator::next`] would return an entry.
    #[inline]
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.next.is_some()
    }

    /// Returns `true` if [`Cursor::previous`] would return an entry.
    #[inline]
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.previous.is_some()
    }

    /// Returns the entry before the cursor and moves the cursor before it.
    pub fn previous(&mut self) -> Option<(&'a K, &'a V)> {
        let tree = self.tree;
        let position = self.previous?;
        self.next = Some(position);
        self.previous = if Some(position) == self.lowest {
            None
        } else {
            tree.previous_position(position)
        };
        Some(tree.entry(position).as_pair())
    }

    /// Returns the entry after the cursor without moving.
    #[must_use]
    pub fn peek_next(&self) -> Option<(&'a K, &'a V)> {
        let tree = self.tree;
        self.next.map(|position| tree.entry(position).as_pair())
    }

    /// Returns the entry before the cursor without moving.
    #[must_use]
    pub fn peek_previous(&self) -> Option<(&'a K, &'a V)> {
        let tree = self.tree;
        self.previous.map(|position| tree.entry(position).as_pair())
    }
}

impl<'a, K, V, C> Iterator for Cursor<'a, K, V, C> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.tree;
        let position = self.next?;
        self.previous = Some(position);
        self.next = if Some(position) == self.highest {
            None
        } else {
            tree.next_position(position)
        };
        Some(tree.entry(position).as_pair())
    }
}

// =============================================================================
// CursorMut
// =============================================================================

/// A bidirectional cursor that can remove the entry it last returned.
///
/// The cursor keeps to an inclusive key range; the whole map when created
/// by [`TreeMap::cursor_mut`].
///
/// # Examples
///
/// ```rust
/// use sylva::tree::TreeMap;
///
/// let mut map: TreeMap<i32, i32> = (0..10).map(|key| (key, key * 10)).collect();
/// let mut cursor = map.cursor_mut();
/// while let Some((key, _)) = cursor.next() {
///     if key % 2 == 1 {
///         cursor.remove().unwrap();
///     }
/// }
///
/// assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec![0, 2, 4, 6, 8]);
/// ```
pub struct CursorMut<'a, K, V, C = NaturalOrder> {
    map: &'a mut TreeMap<K, V, C>,
    from: Bound<&'a K>,
    to: Bound<&'a K>,
    next: Option<Position>,
    previous: Option<Position>,
    current: Option<Position>,
}

impl<'a, K, V, C: Comparator<K>> CursorMut<'a, K, V, C> {
    pub(crate) fn new(map: &'a mut TreeMap<K, V, C>, from: Bound<&'a K>, to: Bound<&'a K>) -> Self {
        let next = map.raw.span(from, to).map(|(first, _)| first);
        Self {
            map,
            from,
            to,
            next,
            previous: None,
            current: None,
        }
    }

    fn within_upper(&self, position: Option<Position>) -> Option<Position> {
        let tree = &self.map.raw;
        position.filter(|&candidate| tree.below_upper(&tree.entry(candidate).key, self.to))
    }

    fn within_lower(&self, position: Option<Position>) -> Option<Position> {
        let tree = &self.map.raw;
        position.filter(|&candidate| tree.above_lower(&tree.entry(candidate).key, self.from))
    }

    /// Returns `true` if [`CursorMut::next`] would return an entry.
    #[inline]
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.next.is_some()
    }

    /// Returns `true` if [`CursorMut::previous`] would return an entry.
    #[inline]
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.previous.is_some()
    }

    /// Returns the entry after the cursor and moves past it.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<(&K, &mut V)> {
        let position = self.next?;
        let following = self.within_upper(self.map.raw.next_position(position));
        self.next = following;
        self.previous = Some(position);
        self.current = Some(position);
        let entry = self.map.raw.entry_mut(position);
        Some((&entry.key, &mut entry.value))
    }

    /// Returns the entry before the cursor and moves before it.
    pub fn previous(&mut self) -> Option<(&K, &mut V)> {
        let position = self.previous?;
        let preceding = self.within_lower(self.map.raw.previous_position(position));
        self.previous = preceding;
        self.next = Some(position);
        self.current = Some(position);
        let entry = self.map.raw.entry_mut(position);
        Some((&entry.key, &mut entry.value))
    }

    /// Returns the entry after the cursor without moving.
    #[must_use]
    pub fn peek_next(&self) -> Option<(&K, &V)> {
        self.next
            .map(|position| self.map.raw.entry(position).as_pair())
    }

    /// Returns the entry before the cursor without moving.
    #[must_use]
    pub fn peek_previous(&self) -> Option<(&K, &V)> {
        self.previous
            .map(|position| self.map.raw.entry(position).as_pair())
    }

    /// Removes the entry most recently returned by `next` or `previous`.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::NoCurrentEntry`] if the cursor has not returned
    /// an entry since it was created or since the last removal.
    pub fn remove(&mut self) -> TreeResult<(K, V)> {
        let position = self.current.take().ok_or(TreeError::NoCurrentEntry)?;
        let entry = self.map.remove_position(position);

        let tree = &self.map.raw;
        let next = self.within_upper(tree.higher_position(&entry.key));
        let previous = self.within_lower(tree.lower_position(&entry.key));
        self.next = next;
        self.previous = previous;
        Ok(entry.into_pair())
    }
}
