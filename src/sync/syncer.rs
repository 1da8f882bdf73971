//! # Double-buffered latest-value slot.
//!
//! [`Syncer`] hands the newest value of some evolving state from a writer thread
//! to any number of readers.
//!
//! ## Layout
//! ```text
//!            ready ──┐
//!                    ▼
//!   cells: [ value A ][ value B ]      dirty: bool
//!              ▲
//!   set() ─────┘ writes the cell NOT marked ready, then:
//!                ready.store(target, Release); dirty.store(true, Release)
//! ```
//!
//! ## Rules
//! - Writers are serialized by an internal lock and only ever write the non-ready cell.
//! - Publication is the release store of the ready index; readers load it with acquire.
//! - Each cell carries its own guard, so a reader still copying a stale cell
//!   and the next writer of that same cell never overlap: a reader always
//!   returns one published value in full.
//! - `get()` is level-triggered and has no consumer restriction.
//! - `try_sync()` is edge-triggered over one shared dirty bit: with several
//!   consumers, each update is observed by only one of them.
//!
//! ## Blocking
//! Readers never wait for the writer of the cell they read. The writer can
//! wait: if a reader is still copying the stale cell when the next `set`
//! targets it, `set` blocks until that copy ends. This bounds a write by one
//! clone of `T` and rules out torn reads.
//!
//! [`LockedSyncer`](super::LockedSyncer) offers the same contract over a single
//! mutex-guarded cell, for values too large to keep twice.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::{Mutex, RwLock};

/// Double-buffered publication slot for values of type `T`.
pub struct Syncer<T> {
    cells: [RwLock<T>; 2],
    ready: AtomicUsize,
    dirty: AtomicBool,
    writer: Mutex<()>,
}

impl<T: Clone> Syncer<T> {
    /// Creates a slot whose both cells hold `initial`. The slot starts clean:
    /// `try_sync` reports no update until the first `set`.
    pub fn new(initial: T) -> Self {
        Self {
            cells: [RwLock::new(initial.clone()), RwLock::new(initial)],
            ready: AtomicUsize::new(0),
            dirty: AtomicBool::new(false),
            writer: Mutex::new(()),
        }
    }

    /// Publishes a copy of `value` as the latest one.
    pub fn set(&self, value: &T) {
        let _writer = self.writer.lock();
        let target = 1 - self.ready.load(Ordering::Relaxed);

        self.cells[target].write().clone_from(value);

        self.ready.store(target, Ordering::Release);
        self.dirty.store(true, Ordering::Release);
    }

    /// Returns a copy of the latest published value, whether or not it was consumed.
    pub fn get(&self) -> T {
        let index = self.ready.load(Ordering::Acquire);
        self.cells[index].read().clone()
    }

    /// Copies the latest value into `out` if it was published since the last
    /// successful `try_sync`. Returns `false` and leaves `out` untouched otherwise.
    pub fn try_sync(&self, out: &mut T) -> bool {
        if !self.dirty.swap(false, Ordering::AcqRel) {
            return false;
        }
        let index = self.ready.load(Ordering::Acquire);
        out.clone_from(&self.cells[index].read());
        true
    }

    /// True when a value was published and not yet claimed by `try_sync`.
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }
}

impl<T: Clone + Default> Default for Syncer<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_try_sync_is_edge_triggered() {
        let s = Syncer::new(0u32);
        let mut out = 7;
        assert!(!s.try_sync(&mut out));
        assert_eq!(out, 7);

        s.set(&1);
        assert!(s.try_sync(&mut out));
        assert_eq!(out, 1);
        assert!(!s.try_sync(&mut out));
        assert_eq!(out, 1);
    }

    #[test]
    fn test_get_is_level_triggered() {
        let s = Syncer::new(String::from("a"));
        s.set(&"b".to_string());
        assert_eq!(s.get(), "b");
        assert_eq!(s.get(), "b");
        assert!(s.is_dirty());

        s.set(&"c".to_string());
        s.set(&"d".to_string());
        assert_eq!(s.get(), "d");
    }

    #[test]
    fn test_only_one_consumer_sees_each_update() {
        let s = Syncer::new(0u8);
        s.set(&5);
        let (mut a, mut b) = (0, 0);
        let hits = [s.try_sync(&mut a), s.try_sync(&mut b)];
        assert_eq!(hits.iter().filter(|h| **h).count(), 1);
    }

    #[test]
    fn test_concurrent_readers_never_see_torn_values() {
        const LEN: usize = 256;
        let s = Arc::new(Syncer::new(vec![0u64; LEN]));
        let done = Arc::new(AtomicBool::new(false));

        let writers: Vec<_> = (0..2u64)
            .map(|w| {
                let s = s.clone();
                std::thread::spawn(move || {
                    for i in 1..=2_000u64 {
                        s.set(&vec![w * 1_000_000 + i; LEN]);
                    }
                })
            })
            .collect();

        let readers: Vec<_> = (0..4)
            .map(|r| {
                let s = s.clone();
                let done = done.clone();
                std::thread::spawn(move || {
                    let mut synced = vec![0u64; LEN];
                    while !done.load(Ordering::Acquire) {
                        let v = if r % 2 == 0 {
                            s.get()
                        } else {
                            s.try_sync(&mut synced);
                            synced.clone()
                        };
                        assert!(v.iter().all(|x| *x == v[0]), "torn read");
                    }
                })
            })
            .collect();

        for w in writers {
            w.join().unwrap();
        }
        done.store(true, Ordering::Release);
        for r in readers {
            r.join().unwrap();
        }

        let last = s.get();
        assert!(last[0] == 2_000 || last[0] == 1_002_000);
    }
}
