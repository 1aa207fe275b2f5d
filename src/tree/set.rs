//! An ordered set stored in an in-place B-tree.
//!
//! [`TreeSet`] is a [`TreeMap`] whose values are `()`. It shares the node
//! algebra, navigation, views and cursors of the map and only reshapes the
//! API around single elements.
//!
//! # Examples
//!
//! ```rust
//! use sylva::tree::TreeSet;
//!
//! let mut set: TreeSet<i32> = (1..=5).collect();
//!
//! assert_eq!(set.first(), Some(&1));
//! assert_eq!(set.last(), Some(&5));
//! assert_eq!(set.lower(&3), Some(&2));
//! assert_eq!(set.higher(&3), Some(&4));
//! assert_eq!(set.floor(&3), Some(&3));
//! assert_eq!(set.ceiling(&3), Some(&3));
//!
//! let mut cursor = set.cursor_mut();
//! while cursor.next().is_some() {
//!     cursor.remove().unwrap();
//! }
//! assert!(set.is_empty());
//! ```

use std::borrow::Borrow;
use std::fmt;
use std::iter::FusedIterator;

use super::comparator::{Comparator, NaturalOrder};
use super::config::TreeConfig;
use super::error::{InvariantViolation, TreeError, TreeResult};
use super::iter::{Cursor, CursorMut, IntoIter, Keys, Range, Seek};
use super::map::TreeMap;
use super::view::{RangeMap, RangeMapMut};

// =============================================================================
// TreeSet
// =============================================================================

/// An ordered set backed by an in-place B-tree.
pub struct TreeSet<T, C = NaturalOrder> {
    map: TreeMap<T, (), C>,
}

impl<T> TreeSet<T, NaturalOrder> {
    /// Creates an empty set with the default configuration.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            map: TreeMap::new(),
        }
    }

    /// Creates an empty set with the given configuration.
    #[must_use]
    pub const fn with_config(config: TreeConfig) -> Self {
        Self {
            map: TreeMap::with_config(config),
        }
    }
}

impl<T, C> TreeSet<T, C> {
    /// Creates an empty set ordered by `comparator`.
    #[must_use]
    pub const fn with_comparator(comparator: C) -> Self {
        Self {
            map: TreeMap::with_comparator(comparator),
        }
    }

    /// Creates an empty set with the given configuration and comparator.
    #[must_use]
    pub const fn with_config_and_comparator(config: TreeConfig, comparator: C) -> Self {
        Self {
            map: TreeMap::with_config_and_comparator(config, comparator),
        }
    }

    /// Returns the number of elements.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if the set holds no elements.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns the number of levels in the tree.
    #[must_use]
    pub fn height(&self) -> usize {
        self.map.height()
    }

    /// Returns the configuration the set was built with.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> TreeConfig {
        self.map.config()
    }

    /// Returns the structural modification counter.
    #[inline]
    #[must_use]
    pub const fn modification(&self) -> u64 {
        self.map.modification()
    }

    /// Returns the smallest element.
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.map.first_key()
    }

    /// Returns the largest element.
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.map.last_key()
    }

    /// Removes and returns the smallest element.
    pub fn pop_first(&mut self) -> Option<T> {
        self.map.pop_first().map(|(element, ())| element)
    }

    /// Removes and returns the largest element.
    pub fn pop_last(&mut self) -> Option<T> {
        self.map.pop_last().map(|(element, ())| element)
    }

    /// Removes every element.
    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Returns an iterator over the elements in ascending order.
    #[must_use]
    pub fn iter(&self) -> SetIter<'_, T, C> {
        SetIter {
            inner: self.map.keys(),
        }
    }

    /// Returns a cursor before the first element.
    #[must_use]
    pub fn cursor(&self) -> SetCursor<'_, T, C> {
        SetCursor {
            inner: self.map.cursor(),
        }
    }

    /// Checks every structural invariant of the tree.
    ///
    /// # Errors
    ///
    /// Returns the first [`InvariantViolation`] found.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation>
    where
        C: Comparator<T>,
    {
        self.map.check_invariants()
    }
}

impl<T, C: Comparator<T>> TreeSet<T, C> {
    /// Adds `element` if no equal element is present.
    ///
    /// Returns `true` if the set changed. An equal element already in the
    /// set is left in place; see [`TreeSet::replace`] to swap it.
    ///
    /// # Complexity
    ///
    /// O(log n) node visits.
    pub fn add(&mut self, element: T) -> bool {
        self.map.insert_if_absent(element, ())
    }

    /// Adds `element`, returning the equal element it displaced.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sylva::tree::TreeSet;
    ///
    /// let by_first = |left: &(i32, &str), right: &(i32, &str)| left.0.cmp(&right.0);
    /// let mut set = TreeSet::with_comparator(by_first);
    /// set.add((1, "old"));
    ///
    /// assert_eq!(set.replace((1, "new")), Some((1, "old")));
    /// assert_eq!(set.first(), Some(&(1, "new")));
    /// ```
    pub fn replace(&mut self, element: T) -> Option<T> {
        self.map
            .replace_entry(element, ())
            .map(|(element, ())| element)
    }

    /// Adds every element of `elements`; returns how many were new.
    pub fn add_all<I>(&mut self, elements: I) -> usize
    where
        I: IntoIterator<Item = T>,
    {
        elements
            .into_iter()
            .filter_map(|element| self.add(element).then_some(()))
            .count()
    }

    /// Removes `element`; returns whether it was present.
    pub fn remove<Q>(&mut self, element: &Q) -> bool
    where
        T: Borrow<Q>,
        C: Comparator<Q>,
        Q: ?Sized,
    {
        self.map.remove_entry(element).is_some()
    }

    /// Removes and returns the stored element equal to `element`.
    pub fn take<Q>(&mut self, element: &Q) -> Option<T>
    where
        T: Borrow<Q>,
        C: Comparator<Q>,
        Q: ?Sized,
    {
        self.map.remove_entry(element).map(|(element, ())| element)
    }

    /// Returns `true` if the set holds `element`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sylva::tree::TreeSet;
    ///
    /// let set: TreeSet<String> = ["pear", "plum"].map(String::from).into_iter().collect();
    /// assert!(set.contains("plum"));
    /// assert!(!set.contains("fig"));
    /// ```
    #[must_use]
    pub fn contains<Q>(&self, element: &Q) -> bool
    where
        T: Borrow<Q>,
        C: Comparator<Q>,
        Q: ?Sized,
    {
        self.map.contains_key(element)
    }

    /// Returns the stored element equal to `element`.
    #[must_use]
    pub fn get<Q>(&self, element: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        C: Comparator<Q>,
        Q: ?Sized,
    {
        self.map.get_key_value(element).map(|(element, ())| element)
    }

    /// Returns the largest element strictly below `element`.
    #[must_use]
    pub fn lower(&self, element: &T) -> Option<&T> {
        self.map.lower_key(element)
    }

    /// Returns the smallest element strictly above `element`.
    #[must_use]
    pub fn higher(&self, element: &T) -> Option<&T> {
        self.map.higher_key(element)
    }

    /// Returns the largest element at or below `element`.
    #[must_use]
    pub fn floor(&self, element: &T) -> Option<&T> {
        self.map.floor_key(element)
    }

    /// Returns the smallest element at or above `element`.
    #[must_use]
    pub fn ceiling(&self, element: &T) -> Option<&T> {
        self.map.ceiling_key(element)
    }

    /// Returns a view of the elements `<= to`.
    #[must_use]
    pub fn head_set(&self, to: T) -> RangeSet<'_, T, C> {
        RangeSet {
            inner: self.map.head_map(to),
        }
    }

    /// Returns a view of the elements in `from..=to`.
    #[must_use]
    pub fn sub_set(&self, from: T, to: T) -> RangeSet<'_, T, C> {
        RangeSet {
            inner: self.map.sub_map(from, to),
        }
    }

    /// Returns a view of the elements `>= from`.
    #[must_use]
    pub fn tail_set(&self, from: T) -> RangeSet<'_, T, C> {
        RangeSet {
            inner: self.map.tail_map(from),
        }
    }

    /// Like [`TreeSet::head_set`], with removal through a cursor.
    pub fn head_set_mut(&mut self, to: T) -> RangeSetMut<'_, T, C> {
        RangeSetMut {
            inner: self.map.head_map_mut(to),
        }
    }

    /// Like [`TreeSet::sub_set`], with removal through a cursor.
    pub fn sub_set_mut(&mut self, from: T, to: T) -> RangeSetMut<'_, T, C> {
        RangeSetMut {
            inner: self.map.sub_map_mut(from, to),
        }
    }

    /// Like [`TreeSet::tail_set`], with removal through a cursor.
    pub fn tail_set_mut(&mut self, from: T) -> RangeSetMut<'_, T, C> {
        RangeSetMut {
            inner: self.map.tail_map_mut(from),
        }
    }

    /// Returns a cursor placed at the ceiling or floor of `element`.
    #[must_use]
    pub fn cursor_at(&self, element: &T, seek: Seek) -> SetCursor<'_, T, C> {
        SetCursor {
            inner: self.map.cursor_at(element, seek),
        }
    }

    /// Returns a cursor over the whole set that can remove elements.
    pub fn cursor_mut(&mut self) -> SetCursorMut<'_, T, C> {
        SetCursorMut {
            inner: self.map.cursor_mut(),
        }
    }
}

// =============================================================================
// Iterators
// =============================================================================

/// An iterator over the elements of a [`TreeSet`].
pub struct SetIter<'a, T, C = NaturalOrder> {
    inner: Keys<'a, T, (), C>,
}

impl<'a, T, C> Iterator for SetIter<'a, T, C> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T, C> DoubleEndedIterator for SetIter<'_, T, C> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<T, C> ExactSizeIterator for SetIter<'_, T, C> {}

impl<T, C> FusedIterator for SetIter<'_, T, C> {}

/// An owning iterator over the elements of a [`TreeSet`].
pub struct SetIntoIter<T> {
    inner: IntoIter<T, ()>,
}

impl<T> Iterator for SetIntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(element, ())| element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> DoubleEndedIterator for SetIntoIter<T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(element, ())| element)
    }
}

impl<T> ExactSizeIterator for SetIntoIter<T> {}

/// An iterator over the elements of a [`RangeSet`].
pub struct SetRange<'a, T, C = NaturalOrder> {
    inner: Range<'a, T, (), C>,
}

impl<'a, T, C> Iterator for SetRange<'a, T, C> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(element, ())| element)
    }
}

impl<T, C> DoubleEndedIterator for SetRange<'_, T, C> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(element, ())| element)
    }
}

impl<T, C> FusedIterator for SetRange<'_, T, C> {}

// =============================================================================
// Cursors
// =============================================================================

/// A bidirectional cursor over a [`TreeSet`].
pub struct SetCursor<'a, T, C = NaturalOrder> {
    inner: Cursor<'a, T, (), C>,
}

impl<'a, T, C> SetCursor<'a, T, C> {
    /// Returns `true` if [`Iterator::next`] would return an element.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.inner.has_next()
    }

    /// Returns `true` if [`SetCursor::previous`] would return an element.
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.inner.has_previous()
    }

    /// Returns the element before the cursor and moves before it.
    pub fn previous(&mut self) -> Option<&'a T> {
        self.inner.previous().map(|(element, ())| element)
    }

    /// Returns the element after the cursor without moving.
    #[must_use]
    pub fn peek_next(&self) -> Option<&'a T> {
        self.inner.peek_next().map(|(element, ())| element)
    }

    /// Returns the element before the cursor without moving.
    #[must_use]
    pub fn peek_previous(&self) -> Option<&'a T> {
        self.inner.peek_previous().map(|(element, ())| element)
    }
}

impl<'a, T, C> Iterator for SetCursor<'a, T, C> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(element, ())| element)
    }
}

/// A cursor over a [`TreeSet`] that can remove the element it last returned.
pub struct SetCursorMut<'a, T, C = NaturalOrder> {
    inner: CursorMut<'a, T, (), C>,
}

impl<T, C: Comparator<T>> SetCursorMut<'_, T, C> {
    /// Returns `true` if [`SetCursorMut::next`] would return an element.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.inner.has_next()
    }

    /// Returns `true` if [`SetCursorMut::previous`] would return an element.
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.inner.has_previous()
    }

    /// Returns the element after the cursor and moves past it.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<&T> {
        self.inner.next().map(|(element, _)| element)
    }

    /// Returns the element before the cursor and moves before it.
    pub fn previous(&mut self) -> Option<&T> {
        self.inner.previous().map(|(element, _)| element)
    }

    /// Removes the element most recently returned.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::NoCurrentEntry`] if there is no such element.
    pub fn remove(&mut self) -> TreeResult<T> {
        self.inner.remove().map(|(element, ())| element)
    }
}

// =============================================================================
// Range views
// =============================================================================

/// A read-only view of the elements of a set within inclusive bounds.
pub struct RangeSet<'a, T, C = NaturalOrder> {
    inner: RangeMap<'a, T, (), C>,
}

impl<T, C: Comparator<T>> RangeSet<'_, T, C> {
    /// Returns the smallest element of the view.
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.inner.first_key()
    }

    /// Returns the largest element of the view.
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.inner.last_key()
    }

    /// Returns `true` if `element` lies inside the view and is present.
    #[must_use]
    pub fn contains(&self, element: &T) -> bool {
        self.inner.contains_key(element)
    }

    /// Returns the number of elements inside the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if no element lies inside the view.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns an iterator over the elements of the view.
    #[must_use]
    pub fn iter(&self) -> SetRange<'_, T, C> {
        SetRange {
            inner: self.inner.iter(),
        }
    }

    /// Returns a cursor before the first element of the view.
    #[must_use]
    pub fn cursor(&self) -> SetCursor<'_, T, C> {
        SetCursor {
            inner: self.inner.cursor(),
        }
    }
}

#[allow(clippy::unused_self)]
impl<T, C> RangeSet<'_, T, C> {
    /// Always fails: a read-only view cannot insert.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::Unsupported`].
    pub fn add(&mut self, _element: T) -> TreeResult<bool> {
        Err(TreeError::unsupported("add"))
    }

    /// Always fails: a read-only view cannot remove.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::Unsupported`].
    pub fn remove(&mut self, _element: &T) -> TreeResult<bool> {
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

/// A view of a range of a set that can delete through a cursor.
pub struct RangeSetMut<'a, T, C = NaturalOrder> {
    inner: RangeMapMut<'a, T, (), C>,
}

impl<T, C: Comparator<T>> RangeSetMut<'_, T, C> {
    /// Returns the smallest element of the view.
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.inner.first_key()
    }

    /// Returns the largest element of the view.
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.inner.last_key()
    }

    /// Returns `true` if `element` lies inside the view and is present.
    #[must_use]
    pub fn contains(&self, element: &T) -> bool {
        self.inner.contains_key(element)
    }

    /// Returns the number of elements inside the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if no element lies inside the view.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns an iterator over the elements of the view.
    #[must_use]
    pub fn iter(&self) -> SetRange<'_, T, C> {
        SetRange {
            inner: self.inner.iter(),
        }
    }

    /// Returns a cursor that can remove elements of the view from the set.
    pub fn cursor_mut(&mut self) -> SetCursorMut<'_, T, C> {
        SetCursorMut {
            inner: self.inner.cursor_mut(),
        }
    }
}

#[allow(clippy::unused_self)]
impl<T, C> RangeSetMut<'_, T, C> {
    /// Always fails: add through the set itself.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::Unsupported`].
    pub fn add(&mut self, _element: T) -> TreeResult<bool> {
        Err(TreeError::unsupported("add"))
    }

    /// Always fails: remove through [`RangeSetMut::cursor_mut`].
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::Unsupported`].
    pub fn remove(&mut self, _element: &T) -> TreeResult<bool> {
        Err(TreeError::unsupported("remove"))
    }

    /// Always fails: clear through [`RangeSetMut::cursor_mut`].
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::Unsupported`].
    pub fn clear(&mut self) -> TreeResult<()> {
        Err(TreeError::unsupported("clear"))
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<T, C: Default> Default for TreeSet<T, C> {
    fn default() -> Self {
        Self::with_comparator(C::default())
    }
}

impl<T: Clone, C: Clone> Clone for TreeSet<T, C> {
    fn clone(&self) -> Self {
        Self {
            map: self.map.clone(),
        }
    }
}

impl<T: fmt::Debug, C> fmt::Debug for TreeSet<T, C> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_set().entries(self.iter()).finish()
    }
}

impl<T: PartialEq, C> PartialEq for TreeSet<T, C> {
    fn eq(&self, other: &Self) -> bool {
        self.map == other.map
    }
}

impl<T: Eq, C> Eq for TreeSet<T, C> {}

impl<T, C: Comparator<T> + Default> FromIterator<T> for TreeSet<T, C> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::default();
        set.add_all(iter);
        set
    }
}

impl<T, C: Comparator<T>> Extend<T> for TreeSet<T, C> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.add_all(iter);
    }
}

impl<T, C> IntoIterator for TreeSet<T, C> {
    type Item = T;
    type IntoIter = SetIntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        SetIntoIter {
            inner: self.map.into_iter(),
        }
    }
}

impl<'a, T, C> IntoIterator for &'a TreeSet<T, C> {
    type Item = &'a T;
    type IntoIter = SetIter<'a, T, C>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
