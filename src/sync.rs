//! Shared access to a tree from several threads.
//!
//! The tree types never lock. When a map or set has to be shared, wrap it in
//! [`Synchronized`], which serialises every access through a
//! [`parking_lot::Mutex`].
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use std::thread;
//! use sylva::sync::Synchronized;
//! use sylva::tree::TreeMap;
//!
//! let shared = Arc::new(Synchronized::new(TreeMap::new()));
//!
//! let handles: Vec<_> = (0..4)
//!     .map(|worker| {
//!         let shared = Arc::clone(&shared);
//!         thread::spawn(move || {
//!             for key in 0..100 {
//!                 shared.with(|map| map.put(worker * 100 + key, worker));
//!             }
//!         })
//!     })
//!     .collect();
//!
//! for handle in handles {
//!     handle.join().unwrap();
//! }
//!
//! assert_eq!(shared.lock().len(), 400);
//! ```

use std::fmt;

use parking_lot::{Mutex, MutexGuard};

/// A value guarded by a mutex.
pub struct Synchronized<T> {
    inner: Mutex<T>,
}

impl<T> Synchronized<T> {
    /// Wraps `value`.
    #[must_use]
    pub const fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(value),
        }
    }

    /// Blocks until the lock is acquired.
    pub fn lock(&self) -> MutexGuard<'_, T> {
        self.inner.lock()
    }

    /// Acquires the lock if it is free.
    pub fn try_lock(&self) -> Option<MutexGuard<'_, T>> {
        self.inner.try_lock()
    }

    /// Runs `action` with exclusive access and returns its result.
    ///
    /// # Arguments
    ///
    /// * `action` - Receives the guarded value for the duration of the call
    pub fn with<R>(&self, action: impl FnOnce(&mut T) -> R) -> R {
        let mut guard = self.inner.lock();
        action(&mut guard)
    }

    /// Returns mutable access without locking.
    pub fn get_mut(&mut self) -> &mut T {
        self.inner.get_mut()
    }

    /// Unwraps the guarded value.
    pub fn into_inner(self) -> T {
        self.inner.into_inner()
    }
}

impl<T: Default> Default for Synchronized<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> From<T> for Synchronized<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T: fmt::Debug> fmt::Debug for Synchronized<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_lock() {
            Some(guard) => formatter
                .debug_struct("Synchronized")
                .field("inner", &*guard)
                .finish(),
            None => formatter
                .debug_struct("Synchronized")
                .field("inner", &"<locked>")
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::TreeSet;
    use rstest::rstest;

    #[rstest]
    fn test_with_returns_action_result() {
        let shared = Synchronized::new(TreeSet::new());
        assert!(shared.with(|set| set.add(3)));
        assert!(!shared.with(|set| set.add(3)));
        assert_eq!(shared.lock().len(), 1);
    }

    #[rstest]
    fn test_try_lock_fails_while_locked() {
        let shared = Synchronized::new(0);
        let guard = shared.lock();
        assert!(shared.try_lock().is_none());
        drop(guard);
        assert!(shared.try_lock().is_some());
    }

    #[rstest]
    fn test_debug_shows_locked_marker() {
        let shared = Synchronized::new(5);
        assert_eq!(format!("{shared:?}"), "Synchronized { inner: 5 }");
        let _guard = shared.lock();
        assert_eq!(format!("{shared:?}"), "Synchronized { inner: \"<locked>\" }");
    }
}
