//! An ordered map stored in an in-place B-tree.
//!
//! [`TreeMap`] keeps its entries in leaves and branches whose fill levels are
//! held between a low-water mark and a maximum derived from the tree order.
//! Separators inside branches are real entries, so every key is stored
//! exactly once and lookups may end at any level.
//!
//! # Examples
//!
//! ```rust
//! use sylva::tree::TreeMap;
//!
//! let mut map = TreeMap::new();
//! for key in (0..100).step_by(2) {
//!     map.put(key, key * 10);
//! }
//!
//! assert_eq!(map.len(), 50);
//! assert_eq!(map.get(&42), Some(&420));
//! assert_eq!(map.lower_key(&42), Some(&40));
//! assert_eq!(map.ceiling_key(&43), Some(&44));
//! assert_eq!(map.remove(&42), Some(420));
//! assert_eq!(map.floor_key(&42), Some(&40));
//! ```

use std::borrow::Borrow;
use std::fmt;
use std::mem;
use std::ops::{Bound, Index};

use static_assertions::assert_impl_all;
use tracing::debug;

use super::comparator::{Comparator, NaturalOrder};
use super::config::TreeConfig;
use super::engine::{Lookup, RawTree};
use super::error::InvariantViolation;
use super::hook::{BoxedHook, EntryHook};
use super::iter::{Cursor, CursorMut, IntoIter, Iter, IterMut, Keys, Seek, Values, ValuesMut};
use super::node::{Entry, Position};
use super::view::{EntrySet, KeySet, RangeMap, RangeMapMut};

/// Outcome of [`TreeMap::append`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Append<V> {
    /// The key was above every stored key and went in on the fast path.
    Appended,
    /// The key was new but not the largest; it was inserted normally.
    Inserted,
    /// The key was present; the previous value is returned.
    Replaced(V),
}

// =============================================================================
// TreeMap
// =============================================================================

/// An ordered map backed by an in-place B-tree.
///
/// Keys are ordered by the comparator `C`, which defaults to
/// [`NaturalOrder`]. The tree order and in-node search are fixed at
/// construction through [`TreeConfig`].
pub struct TreeMap<K, V, C = NaturalOrder> {
    pub(crate) raw: RawTree<K, V, C>,
    hook: Option<BoxedHook<K, V>>,
}

assert_impl_all!(TreeMap<u64, String>: Send, Sync);

impl<K, V> TreeMap<K, V, NaturalOrder> {
    /// Creates an empty map with the default configuration.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sylva::tree::TreeMap;
    ///
    /// let map: TreeMap<i32, &str> = TreeMap::new();
    /// assert!(map.is_empty());
    /// ```
    #[must_use]
    pub const fn new() -> Self {
        Self::with_config_and_comparator(TreeConfig::new(), NaturalOrder)
    }

    /// Creates an empty map with the given configuration.
    #[must_use]
    pub const fn with_config(config: TreeConfig) -> Self {
        Self::with_config_and_comparator(config, NaturalOrder)
    }
}

impl<K, V, C> TreeMap<K, V, C> {
    /// Creates an empty map ordered by `comparator`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sylva::tree::{ReverseOrder, TreeMap};
    ///
    /// let mut map = TreeMap::with_comparator(ReverseOrder);
    /// map.put(1, 'a');
    /// map.put(2, 'b');
    /// assert_eq!(map.first_key(), Some(&2));
    /// ```
    #[must_use]
    pub const fn with_comparator(comparator: C) -> Self {
        Self::with_config_and_comparator(TreeConfig::new(), comparator)
    }

    /// Creates an empty map with the given configuration and comparator.
    #[must_use]
    pub const fn with_config_and_comparator(config: TreeConfig, comparator: C) -> Self {
        Self {
            raw: RawTree::new(config, comparator),
            hook: None,
        }
    }

    // =========================================================================
    // Size and diagnostics
    // =========================================================================

    /// Returns the number of entries.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len
    }

    /// Returns `true` if the map holds no entries.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.len == 0
    }

    /// Returns the number of levels in the tree; `0` when empty.
    #[must_use]
    pub fn height(&self) -> usize {
        self.raw.height()
    }

    /// Returns the configuration the map was built with.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> TreeConfig {
        self.raw.config
    }

    /// Returns the comparator.
    #[inline]
    #[must_use]
    pub const fn comparator(&self) -> &C {
        &self.raw.comparator
    }

    /// Returns a counter bumped by every insertion, removal, replacement
    /// and clear.
    #[inline]
    #[must_use]
    pub const fn modification(&self) -> u64 {
        self.raw.modification
    }

    // =========================================================================
    // Hooks
    // =========================================================================

    /// Installs `hook`, returning the previously installed one.
    pub fn set_hook(
        &mut self,
        hook: Box<dyn EntryHook<K, V> + Send + Sync>,
    ) -> Option<Box<dyn EntryHook<K, V> + Send + Sync>> {
        self.hook.replace(hook)
    }

    /// Removes and returns the installed hook.
    pub fn take_hook(&mut self) -> Option<Box<dyn EntryHook<K, V> + Send + Sync>> {
        self.hook.take()
    }

    /// Removes the entry at `position`, notifying the hook.
    pub(crate) fn remove_position(&mut self, position: Position) -> Entry<K, V> {
        let entry = self.raw.remove_at(position);
        if let Some(hook) = self.hook.as_deref() {
            hook.on_remove(&entry.key, &entry.value);
        }
        entry
    }

    // =========================================================================
    // Whole-map operations
    // =========================================================================

    /// Removes every entry and releases all nodes.
    ///
    /// # Complexity
    ///
    /// O(n) to drop the entries.
    pub fn clear(&mut self) {
        let count = self.raw.len;
        self.raw.clear_nodes();
        if let Some(hook) = self.hook.as_deref() {
            hook.on_clear(count);
        }
        debug!(count, "cleared tree");
    }

    /// Moves every entry of this map into `other`, which is cleared first.
    ///
    /// The two maps exchange configuration and comparator along with the
    /// entries; hooks stay where they are.
    ///
    /// # Complexity
    ///
    /// O(1) apart from clearing `other`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sylva::tree::TreeMap;
    ///
    /// let mut source: TreeMap<i32, i32> = (0..5).map(|key| (key, key)).collect();
    /// let mut target = TreeMap::new();
    /// target.put(99, 99);
    ///
    /// source.transfer_to(&mut target);
    /// assert!(source.is_empty());
    /// assert_eq!(target.len(), 5);
    /// assert!(!target.contains_key(&99));
    /// ```
    pub fn transfer_to(&mut self, other: &mut Self) {
        other.clear();
        mem::swap(&mut self.raw, &mut other.raw);
        self.raw.modification += 1;
        other.raw.modification += 1;
        debug!(count = other.raw.len, "transferred tree");
    }

    // =========================================================================
    // Boundary entries
    // =========================================================================

    /// Returns the smallest key.
    #[must_use]
    pub fn first_key(&self) -> Option<&K> {
        self.first_entry().map(|(key, _)| key)
    }

    /// Returns the largest key.
    #[must_use]
    pub fn last_key(&self) -> Option<&K> {
        self.last_entry().map(|(key, _)| key)
    }

    /// Returns the entry with the smallest key.
    #[must_use]
    pub fn first_entry(&self) -> Option<(&K, &V)> {
        self.pair_at(self.raw.first_position())
    }

    /// Returns the entry with the largest key.
    #[must_use]
    pub fn last_entry(&self) -> Option<(&K, &V)> {
        self.pair_at(self.raw.last_position())
    }

    /// Removes and returns the entry with the smallest key.
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        let position = self.raw.first_position()?;
        Some(self.remove_position(position).into_pair())
    }

    /// Removes and returns the entry with the largest key.
    pub fn pop_last(&mut self) -> Option<(K, V)> {
        let position = self.raw.last_position()?;
        Some(self.remove_position(position).into_pair())
    }

    fn pair_at(&self, position: Option<Position>) -> Option<(&K, &V)> {
        position.map(|position| self.raw.entry(position).as_pair())
    }

    /// Returns `true` if some entry holds `value`.
    ///
    /// # Complexity
    ///
    /// O(n)
    #[must_use]
    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.values().any(|candidate| candidate == value)
    }

    // =========================================================================
    // Iteration
    // =========================================================================

    /// Returns an iterator over the entries in ascending key order.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, V, C> {
        Iter::new(&self.raw)
    }

    /// Returns an iterator over the keys in ascending order.
    #[must_use]
    pub fn keys(&self) -> Keys<'_, K, V, C> {
        Keys::new(self.iter())
    }

    /// Returns an iterator over the values, ordered by key.
    #[must_use]
    pub fn values(&self) -> Values<'_, K, V, C> {
        Values::new(self.iter())
    }

    /// Returns an iterator over the entries with mutable values.
    ///
    /// # Complexity
    ///
    /// O(n) time and O(n) extra memory on creation, since the entry
    /// references are gathered before the first step. Prefer
    /// [`cursor_mut`](Self::cursor_mut) or [`get_mut`](Self::get_mut) when
    /// only a few values change.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut::new(&mut self.raw)
    }

    /// Returns an iterator over mutable references to the values.
    ///
    /// # Complexity
    ///
    /// Same as [`iter_mut`](Self::iter_mut): O(n) extra memory on creation.
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut::new(self.iter_mut())
    }

    /// Returns the entries as a set view.
    #[must_use]
    pub fn entry_set(&self) -> EntrySet<'_, K, V, C> {
        EntrySet::new(&self.raw, Bound::Unbounded, Bound::Unbounded)
    }

    /// Returns the keys as a set view.
    #[must_use]
    pub fn key_set(&self) -> KeySet<'_, K, V, C> {
        KeySet::new(self.entry_set())
    }

    /// Returns a cursor before the first entry.
    #[must_use]
    pub fn cursor(&self) -> Cursor<'_, K, V, C> {
        Cursor::new(&self.raw)
    }

    /// Checks every structural invariant of the tree.
    ///
    /// # Errors
    ///
    /// Returns the first [`InvariantViolation`] found. A violation is a
    /// defect in the tree itself.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation>
    where
        C: Comparator<K>,
    {
        self.raw.check_invariants()
    }
}

impl<K, V, C: Comparator<K>> TreeMap<K, V, C> {
    // =========================================================================
    // Insertion
    // =========================================================================

    /// Associates `value` with `key`, returning the previous value.
    ///
    /// An existing entry has both its key and value replaced, which matters
    /// for keys that compare equal without being identical.
    ///
    /// # Arguments
    ///
    /// * `key` - The key to insert
    /// * `value` - The value to associate with the key
    ///
    /// # Complexity
    ///
    /// O(log n) node visits.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sylva::tree::TreeMap;
    ///
    /// let mut map = TreeMap::new();
    /// assert_eq!(map.put("a", 1), None);
    /// assert_eq!(map.put("a", 2), Some(1));
    /// assert_eq!(map.get(&"a"), Some(&2));
    /// ```
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        self.replace_entry(key, value).map(|(_, value)| value)
    }

    /// Like [`TreeMap::put`], but returns the replaced key along with the
    /// replaced value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sylva::tree::TreeMap;
    ///
    /// let by_length = |left: &String, right: &String| left.len().cmp(&right.len());
    /// let mut map = TreeMap::with_comparator(by_length);
    /// map.put("abc".to_string(), 1);
    ///
    /// let replaced = map.replace_entry("xyz".to_string(), 2);
    /// assert_eq!(replaced, Some(("abc".to_string(), 1)));
    /// assert_eq!(map.first_key().map(String::as_str), Some("xyz"));
    /// ```
    pub fn replace_entry(&mut self, key: K, value: V) -> Option<(K, V)> {
        match self.raw.find(&key) {
            None => {
                if let Some(hook) = self.hook.as_deref() {
                    hook.on_insert(&key, &value);
                }
                self.raw.insert_root(Entry::new(key, value));
                None
            }
            Some(Lookup::Vacant(position)) => {
                if let Some(hook) = self.hook.as_deref() {
                    hook.on_insert(&key, &value);
                }
                self.raw
                    .leaf_insert(position.node, position.index, Entry::new(key, value), false);
                None
            }
            Some(Lookup::Found(position)) => {
                let stored = self.raw.entry_mut(position);
                let previous = mem::replace(stored, Entry::new(key, value));
                if let Some(hook) = self.hook.as_deref() {
                    hook.on_replace(&stored.key, &previous.value, &stored.value);
                }
                self.raw.modification += 1;
                Some(previous.into_pair())
            }
        }
    }

    /// Inserts `key` only if it is absent; returns whether it was inserted.
    pub(crate) fn insert_if_absent(&mut self, key: K, value: V) -> bool {
        let position = match self.raw.find(&key) {
            Some(Lookup::Found(_)) => return false,
            Some(Lookup::Vacant(position)) => Some(position),
            None => None,
        };
        if let Some(hook) = self.hook.as_deref() {
            hook.on_insert(&key, &value);
        }
        let entry = Entry::new(key, value);
        match position {
            Some(position) => self.raw.leaf_insert(position.node, position.index, entry, false),
            None => self.raw.insert_root(entry),
        }
        true
    }

    /// Inserts an entry expected to sort after every stored key.
    ///
    /// When the key is above the current maximum, the entry goes straight
    /// into the last leaf without a search from the root. Otherwise this
    /// behaves exactly like [`TreeMap::put`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sylva::tree::{Append, TreeMap};
    ///
    /// let mut map = TreeMap::new();
    /// assert_eq!(map.append(1, "a"), Append::Appended);
    /// assert_eq!(map.append(5, "e"), Append::Appended);
    /// assert_eq!(map.append(3, "c"), Append::Inserted);
    /// assert_eq!(map.append(5, "E"), Append::Replaced("e"));
    /// ```
    pub fn append(&mut self, key: K, value: V) -> Append<V> {
        let Some(last) = self.raw.last_position() else {
            if let Some(hook) = self.hook.as_deref() {
                hook.on_insert(&key, &value);
            }
            self.raw.insert_root(Entry::new(key, value));
            return Append::Appended;
        };

        if self.raw.comparator.less(&self.raw.entry(last).key, &key) {
            if let Some(hook) = self.hook.as_deref() {
                hook.on_insert(&key, &value);
            }
            self.raw
                .leaf_insert(last.node, last.index + 1, Entry::new(key, value), true);
            Append::Appended
        } else {
            match self.replace_entry(key, value) {
                Some((_, previous)) => Append::Replaced(previous),
                None => Append::Inserted,
            }
        }
    }

    /// Puts every entry of `entries`.
    pub fn put_all<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let before = self.raw.len;
        for (key, value) in entries {
            self.put(key, value);
        }
        debug!(added = self.raw.len - before, total = self.raw.len, "put all");
    }

    /// Puts every entry of `entries`, collecting displaced entries into
    /// `replaced`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sylva::tree::TreeMap;
    ///
    /// let mut map: TreeMap<i32, &str> = [(1, "a"), (2, "b")].into_iter().collect();
    /// let mut replaced = TreeMap::new();
    /// map.put_all_into([(2, "B"), (3, "C")], &mut replaced);
    ///
    /// assert_eq!(map.len(), 3);
    /// assert_eq!(replaced.get(&2), Some(&"b"));
    /// assert_eq!(replaced.len(), 1);
    /// ```
    pub fn put_all_into<I, D>(&mut self, entries: I, replaced: &mut TreeMap<K, V, D>)
    where
        I: IntoIterator<Item = (K, V)>,
        D: Comparator<K>,
    {
        let before = replaced.len();
        for (key, value) in entries {
            if let Some((key, value)) = self.replace_entry(key, value) {
                replaced.put(key, value);
            }
        }
        debug!(replaced = replaced.len() - before, total = self.raw.len, "put all");
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Returns the value for `key`.
    ///
    /// `key` may be any borrowed form of the key type, as long as the
    /// comparator orders the borrowed form the same way.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sylva::tree::TreeMap;
    ///
    /// let mut map = TreeMap::new();
    /// map.put("apple".to_string(), 3);
    /// assert_eq!(map.get("apple"), Some(&3));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n) node visits.
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        C: Comparator<Q>,
        Q: ?Sized,
    {
        self.get_key_value(key).map(|(_, value)| value)
    }

    /// Returns the stored key and value for `key`.
    #[must_use]
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        C: Comparator<Q>,
        Q: ?Sized,
    {
        self.pair_at(self.raw.find_position(key))
    }

    /// Returns a mutable reference to the value for `key`.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        C: Comparator<Q>,
        Q: ?Sized,
    {
        let position = self.raw.find_position(key)?;
        Some(&mut self.raw.entry_mut(position).value)
    }

    /// Returns `true` if the map holds `key`.
    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        C: Comparator<Q>,
        Q: ?Sized,
    {
        self.raw.find_position(key).is_some()
    }

    // =========================================================================
    // Removal
    // =========================================================================

    /// Removes `key`, returning its value.
    ///
    /// Removing an absent key changes nothing.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        C: Comparator<Q>,
        Q: ?Sized,
    {
        self.remove_entry(key).map(|(_, value)| value)
    }

    /// Removes `key`, returning the stored key and value.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        C: Comparator<Q>,
        Q: ?Sized,
    {
        let position = self.raw.find_position(key)?;
        Some(self.remove_position(position).into_pair())
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Returns the largest key strictly below `key`.
    #[must_use]
    pub fn lower_key(&self, key: &K) -> Option<&K> {
        self.lower_entry(key).map(|(key, _)| key)
    }

    /// Returns the smallest key strictly above `key`.
    #[must_use]
    pub fn higher_key(&self, key: &K) -> Option<&K> {
        self.higher_entry(key).map(|(key, _)| key)
    }

    /// Returns the largest key at or below `key`.
    #[must_use]
    pub fn floor_key(&self, key: &K) -> Option<&K> {
        self.floor_entry(key).map(|(key, _)| key)
    }

    /// Returns the smallest key at or above `key`.
    #[must_use]
    pub fn ceiling_key(&self, key: &K) -> Option<&K> {
        self.ceiling_entry(key).map(|(key, _)| key)
    }

    /// Returns the entry with the largest key strictly below `key`.
    #[must_use]
    pub fn lower_entry(&self, key: &K) -> Option<(&K, &V)> {
        self.pair_at(self.raw.lower_position(key))
    }

    /// Returns the entry with the smallest key strictly above `key`.
    #[must_use]
    pub fn higher_entry(&self, key: &K) -> Option<(&K, &V)> {
        self.pair_at(self.raw.higher_position(key))
    }

    /// Returns the entry with the largest key at or below `key`.
    ///
    /// One descent answers both the exact match and the fallback.
    #[must_use]
    pub fn floor_entry(&self, key: &K) -> Option<(&K, &V)> {
        self.pair_at(self.raw.floor_position(key))
    }

    /// Returns the entry with the smallest key at or above `key`.
    #[must_use]
    pub fn ceiling_entry(&self, key: &K) -> Option<(&K, &V)> {
        self.pair_at(self.raw.ceiling_position(key))
    }

    // =========================================================================
    // Views and cursors
    // =========================================================================

    /// Returns a view of the entries with keys `<= to`.
    #[must_use]
    pub fn head_map(&self, to: K) -> RangeMap<'_, K, V, C> {
        RangeMap::new(&self.raw, None, Some(to))
    }

    /// Returns a view of the entries with keys in `from..=to`.
    #[must_use]
    pub fn sub_map(&self, from: K, to: K) -> RangeMap<'_, K, V, C> {
        RangeMap::new(&self.raw, Some(from), Some(to))
    }

    /// Returns a view of the entries with keys `>= from`.
    #[must_use]
    pub fn tail_map(&self, from: K) -> RangeMap<'_, K, V, C> {
        RangeMap::new(&self.raw, Some(from), None)
    }

    /// Like [`TreeMap::head_map`], with removal through a cursor.
    pub fn head_map_mut(&mut self, to: K) -> RangeMapMut<'_, K, V, C> {
        RangeMapMut::new(self, None, Some(to))
    }

    /// Like [`TreeMap::sub_map`], with removal through a cursor.
    pub fn sub_map_mut(&mut self, from: K, to: K) -> RangeMapMut<'_, K, V, C> {
        RangeMapMut::new(self, Some(from), Some(to))
    }

    /// Like [`TreeMap::tail_map`], with removal through a cursor.
    pub fn tail_map_mut(&mut self, from: K) -> RangeMapMut<'_, K, V, C> {
        RangeMapMut::new(self, Some(from), None)
    }

    /// Returns a cursor placed relative to `key`.
    ///
    /// With [`Seek::Ceiling`] the next entry is the smallest key `>= key`;
    /// with [`Seek::Floor`] it is the largest key `<= key`. When no such
    /// entry exists the cursor has no next entry.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sylva::tree::{Seek, TreeMap};
    ///
    /// let map: TreeMap<i32, ()> = [10, 20, 30].into_iter().map(|key| (key, ())).collect();
    ///
    /// let mut cursor = map.cursor_at(&15, Seek::Ceiling);
    /// assert_eq!(cursor.peek_previous(), Some((&10, &())));
    /// assert_eq!(cursor.next(), Some((&20, &())));
    ///
    /// let mut cursor = map.cursor_at(&15, Seek::Floor);
    /// assert_eq!(cursor.next(), Some((&10, &())));
    /// ```
    #[must_use]
    pub fn cursor_at(&self, key: &K, seek: Seek) -> Cursor<'_, K, V, C> {
        match seek {
            Seek::Ceiling => {
                let neighbors = self.raw.lower_search(key);
                Cursor::between(&self.raw, neighbors.strict, neighbors.other)
            }
            Seek::Floor => {
                let next = self.raw.floor_position(key);
                let previous = next.and_then(|position| self.raw.previous_position(position));
                Cursor::between(&self.raw, previous, next)
            }
        }
    }

    /// Returns a cursor over the whole map that can remove entries.
    pub fn cursor_mut(&mut self) -> CursorMut<'_, K, V, C> {
        CursorMut::new(self, Bound::Unbounded, Bound::Unbounded)
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<K, V, C: Default> Default for TreeMap<K, V, C> {
    fn default() -> Self {
        Self::with_comparator(C::default())
    }
}

impl<K: Clone, V: Clone, C: Clone> Clone for TreeMap<K, V, C> {
    /// Clones the entries and structure; the hook is not cloned.
    fn clone(&self) -> Self {
        Self {
            raw: self.raw.clone(),
            hook: None,
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for TreeMap<K, V, C> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.iter()).finish()
    }
}

impl<K: PartialEq, V: PartialEq, C> PartialEq for TreeMap<K, V, C> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq, C> Eq for TreeMap<K, V, C> {}

impl<K, V, C: Comparator<K> + Default> FromIterator<(K, V)> for TreeMap<K, V, C> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::default();
        map.put_all(iter);
        map
    }
}

impl<K, V, C: Comparator<K>> Extend<(K, V)> for TreeMap<K, V, C> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.put_all(iter);
    }
}

impl<K, V, C> IntoIterator for TreeMap<K, V, C> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self.raw)
    }
}

impl<'a, K, V, C> IntoIterator for &'a TreeMap<K, V, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, C>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, C> IntoIterator for &'a mut TreeMap<K, V, C> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<K, V, C: Comparator<K>> Index<&K> for TreeMap<K, V, C> {
    type Output = V;

    /// # Panics
    ///
    /// Panics if the key is not present.
    fn index(&self, key: &K) -> &V {
        self.get(key).expect("key not found in TreeMap")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::comparator::ReverseOrder;
    use crate::tree::config::SearchStrategy;
    use rstest::rstest;
    use std::sync::{Arc, Mutex};

    fn config(order: usize) -> TreeConfig {
        TreeConfig::new().with_order(order)
    }

    #[rstest]
    fn test_new_map_is_empty() {
        let map: TreeMap<i32, i32> = TreeMap::new();
        assert!(map.is_empty());
        assert_eq!(map.height(), 0);
        assert_eq!(map.first_key(), None);
        assert_eq!(map.iter().next(), None);
        map.check_invariants().unwrap();
    }

    #[rstest]
    #[case(3, SearchStrategy::Linear, false)]
    #[case(3, SearchStrategy::Binary, true)]
    #[case(7, SearchStrategy::Linear, true)]
    #[case(16, SearchStrategy::Binary, false)]
    fn test_put_get_remove(
        #[case] order: usize,
        #[case] search: SearchStrategy,
        #[case] slotted: bool,
    ) {
        let mut map = TreeMap::with_config(
            config(order).with_search(search).with_slotted(slotted),
        );
        for key in (0..3_000_u32).map(|index| index * 7_919 % 3_001) {
            assert_eq!(map.put(key, key * 2), None);
        }
        assert_eq!(map.len(), 3_000);
        map.check_invariants().unwrap();

        for key in (0..3_000_u32).map(|index| index * 7_919 % 3_001) {
            assert_eq!(map.get(&key), Some(&(key * 2)));
        }
        for key in (0..3_000_u32).step_by(3).map(|index| index * 7_919 % 3_001) {
            assert_eq!(map.remove(&key), Some(key * 2));
        }
        assert_eq!(map.len(), 2_000);
        map.check_invariants().unwrap();
    }

    #[rstest]
    fn test_put_replaces_value() {
        let mut map = TreeMap::new();
        map.put(1, "one");
        let before = map.modification();
        assert_eq!(map.put(1, "uno"), Some("one"));
        assert_eq!(map.len(), 1);
        assert_eq!(map[&1], "uno");
        assert!(map.modification() > before);
    }

    #[rstest]
    fn test_remove_last_entry_releases_tree() {
        let mut map = TreeMap::with_config(config(3));
        for key in 0..100 {
            map.put(key, ());
        }
        for key in 0..100 {
            map.remove(&key);
        }
        assert!(map.is_empty());
        assert_eq!(map.height(), 0);
        assert_eq!(map.raw.arena.live(), 0);
    }

    #[rstest]
    fn test_append_takes_fast_path_for_ascending_keys() {
        let mut map = TreeMap::with_config(config(3));
        for key in 0..1_000 {
            assert_eq!(map.append(key, key), Append::Appended);
        }
        map.check_invariants().unwrap();
        assert_eq!(map.keys().copied().collect::<Vec<_>>(), (0..1_000).collect::<Vec<_>>());
    }

    #[rstest]
    fn test_append_mixed_with_put() {
        let mut map = TreeMap::with_config(config(4));
        for key in (0..500).map(|key| key * 2) {
            map.append(key, key);
        }
        for key in (0..499).map(|key| key * 2 + 1) {
            assert_eq!(map.append(key, key), Append::Inserted);
        }
        assert_eq!(map.append(999, 999), Append::Appended);
        assert_eq!(map.append(10, 0), Append::Replaced(10));
        map.check_invariants().unwrap();
        assert_eq!(map.len(), 1_000);
    }

    #[rstest]
    fn test_pop_first_and_last() {
        let mut map: TreeMap<i32, i32> = (0..50).map(|key| (key, key)).collect();
        assert_eq!(map.pop_first(), Some((0, 0)));
        assert_eq!(map.pop_last(), Some((49, 49)));
        assert_eq!(map.len(), 48);
        map.check_invariants().unwrap();
    }

    #[rstest]
    fn test_reverse_order_navigation() {
        let mut map = TreeMap::with_comparator(ReverseOrder);
        for key in [10, 20, 30] {
            map.put(key, ());
        }
        assert_eq!(map.first_key(), Some(&30));
        assert_eq!(map.lower_key(&20), Some(&30));
        assert_eq!(map.higher_key(&20), Some(&10));
        assert_eq!(map.floor_key(&25), Some(&30));
        assert_eq!(map.ceiling_key(&25), Some(&20));
    }

    #[rstest]
    fn test_contains_value() {
        let map: TreeMap<i32, &str> = [(1, "a"), (2, "b")].into_iter().collect();
        assert!(map.contains_value(&"b"));
        assert!(!map.contains_value(&"c"));
    }

    #[rstest]
    fn test_clone_is_independent() {
        let mut original: TreeMap<i32, i32> = (0..100).map(|key| (key, key)).collect();
        let copy = original.clone();
        original.remove(&5);
        assert_eq!(copy.len(), 100);
        assert!(copy.contains_key(&5));
        copy.check_invariants().unwrap();
        assert_ne!(original, copy);
    }

    #[rstest]
    fn test_clone_copies_shape_without_hook() {
        struct Silent;
        impl EntryHook<i32, i32> for Silent {}

        let mut original = TreeMap::with_config(config(3));
        for key in (0..500).rev() {
            original.put(key, key);
        }
        original.set_hook(Box::new(Silent));

        let mut copy = original.clone();
        assert_eq!(copy.height(), original.height());
        assert_eq!(copy.raw.arena.live(), original.raw.arena.live());
        assert_eq!(copy.raw.root, original.raw.root);
        assert_eq!(copy.modification(), 0);
        assert!(copy.take_hook().is_none());
        assert!(original.take_hook().is_some());
        copy.check_invariants().unwrap();
    }

    #[rstest]
    fn test_debug_lists_entries() {
        let map: TreeMap<i32, char> = [(2, 'b'), (1, 'a')].into_iter().collect();
        assert_eq!(format!("{map:?}"), "{1: 'a', 2: 'b'}");
    }

    #[rstest]
    fn test_hook_sees_every_change() {
        #[derive(Clone, Default)]
        struct Log(Arc<Mutex<Vec<String>>>);

        impl EntryHook<i32, i32> for Log {
            fn on_insert(&self, key: &i32, value: &i32) {
                self.0.lock().unwrap().push(format!("+{key}:{value}"));
            }
            fn on_replace(&self, key: &i32, previous: &i32, current: &i32) {
                self.0.lock().unwrap().push(format!("~{key}:{previous}->{current}"));
            }
            fn on_remove(&self, key: &i32, value: &i32) {
                self.0.lock().unwrap().push(format!("-{key}:{value}"));
            }
            fn on_clear(&self, count: usize) {
                self.0.lock().unwrap().push(format!("clear {count}"));
            }
        }

        let log = Log::default();
        let mut map = TreeMap::new();
        assert!(map.set_hook(Box::new(log.clone())).is_none());

        map.put(1, 10);
        map.put(1, 11);
        map.put(2, 20);
        map.remove(&1);
        map.clear();

        assert_eq!(
            *log.0.lock().unwrap(),
            vec!["+1:10", "~1:10->11", "+2:20", "-1:11", "clear 1"]
        );
        assert!(map.take_hook().is_some());
    }

    #[rstest]
    fn test_insert_hook_runs_before_placement() {
        struct Veto;

        impl EntryHook<i32, i32> for Veto {
            fn on_insert(&self, key: &i32, _value: &i32) {
                assert!(key % 2 == 0, "odd key {key}");
            }
        }

        let mut map = TreeMap::with_config(config(3));
        map.set_hook(Box::new(Veto));
        for key in (0..80).step_by(2) {
            map.put(key, key);
        }

        let put = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| map.put(13, 13)));
        assert!(put.is_err());
        let append = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| map.append(81, 81)));
        assert!(append.is_err());

        assert_eq!(map.len(), 40);
        assert!(!map.contains_key(&13));
        assert_eq!(map.last_key(), Some(&78));
        map.check_invariants().unwrap();
    }

    #[rstest]
    #[should_panic(expected = "key not found")]
    fn test_index_panics_on_missing_key() {
        let map: TreeMap<i32, i32> = TreeMap::new();
        let _ = map[&1];
    }
}
