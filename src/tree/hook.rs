//! Observers notified about entry-level changes of a map.
//!
//! A [`TreeMap`](super::TreeMap) can carry one [`EntryHook`]. The tree never
//! inspects what the hook does; it only reports every insert, replace,
//! remove and clear. Hooks are the place for auxiliary bookkeeping such as
//! counters or audit trails.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use sylva::tree::{EntryHook, TreeMap};
//!
//! struct Removals(Arc<AtomicUsize>);
//!
//! impl EntryHook<u32, &'static str> for Removals {
//!     fn on_remove(&self, _key: &u32, _value: &&'static str) {
//!         self.0.fetch_add(1, Ordering::Relaxed);
//!     }
//! }
//!
//! let counter = Arc::new(AtomicUsize::new(0));
//! let mut map = TreeMap::new();
//! map.set_hook(Box::new(Removals(Arc::clone(&counter))));
//!
//! map.put(1, "one");
//! map.put(2, "two");
//! map.remove(&1);
//! assert_eq!(counter.load(Ordering::Relaxed), 1);
//! ```

/// Callbacks invoked by a map around each entry-level change.
///
/// `on_insert` runs before the new entry is placed, so a panicking hook
/// leaves the map untouched. The other callbacks run once the tree has
/// already changed.
///
/// Every method has an empty default, so implementors override only what
/// they need.
pub trait EntryHook<K, V> {
    /// A new entry is about to be inserted.
    fn on_insert(&self, _key: &K, _value: &V) {}

    /// The value stored under `key` was replaced.
    fn on_replace(&self, _key: &K, _previous: &V, _current: &V) {}

    /// An entry was removed. Called before the entry is handed back.
    fn on_remove(&self, _key: &K, _value: &V) {}

    /// The map was cleared; `count` entries were dropped.
    fn on_clear(&self, _count: usize) {}
}

/// Boxed hook as stored inside a map.
pub(crate) type BoxedHook<K, V> = Box<dyn EntryHook<K, V> + Send + Sync>;
