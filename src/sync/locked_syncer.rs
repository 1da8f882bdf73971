//! # Single-cell latest-value slot.
//!
//! [`LockedSyncer`] has the `get` / `set` / `try_sync` contract of
//! [`Syncer`](super::Syncer) but keeps one copy of the value behind a mutex.
//! Readers and writers exclude each other; memory cost is one `T`.
//!
//! ```text
//! set(&v):       lock ─► cell = v ─► unlock ─► dirty.store(true, Release)
//! try_sync(out): dirty.swap(false) ? lock ─► out = cell ─► unlock : false
//! ```

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

/// Mutex-guarded publication slot for values of type `T`.
pub struct LockedSyncer<T> {
    cell: Mutex<T>,
    dirty: AtomicBool,
}

impl<T: Clone> LockedSyncer<T> {
    /// Creates a clean slot holding `initial`.
    pub fn new(initial: T) -> Self {
        Self {
            cell: Mutex::new(initial),
            dirty: AtomicBool::new(false),
        }
    }

    /// Publishes a copy of `value` as the latest one.
    pub fn set(&self, value: &T) {
        self.cell.lock().clone_from(value);
        self.dirty.store(true, Ordering::Release);
    }

    /// Returns a copy of the latest value, whether or not it was consumed.
    pub fn get(&self) -> T {
        self.cell.lock().clone()
    }

    /// Copies the latest value into `out` if it was published since the last
    /// successful `try_sync`.
    pub fn try_sync(&self, out: &mut T) -> bool {
        if !self.dirty.swap(false, Ordering::AcqRel) {
            return false;
        }
        out.clone_from(&self.cell.lock());
        true
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }
}

impl<T: Clone + Default> Default for LockedSyncer<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
