//! # Single-slot channel over a [`Syncer`].
//!
//! ```text
//! producer thread(s)                    consumer
//!   Inlet::set(&v) ──► Syncer ──try_sync──► Channel::current() -> &T
//! ```
//!
//! The consumer keeps its own copy of the latest value; `current()` refreshes it
//! when something new was published and hands out a borrow of it. The borrow
//! ends before the next refresh because refreshing needs `&mut self`.

use std::sync::Arc;

use super::Syncer;

/// Consumer side of a latest-value channel.
pub struct Channel<T> {
    syncer: Arc<Syncer<T>>,
    value: T,
}

/// Producer facade of a [`Channel`]: it can only publish.
pub struct Inlet<T> {
    syncer: Arc<Syncer<T>>,
}

impl<T> Clone for Inlet<T> {
    fn clone(&self) -> Self {
        Self {
            syncer: Arc::clone(&self.syncer),
        }
    }
}

impl<T: Clone> Inlet<T> {
    /// Publishes a copy of `value`.
    pub fn set(&self, value: &T) {
        self.syncer.set(value);
    }
}

impl<T: Clone> Channel<T> {
    pub fn new(initial: T) -> Self {
        Self {
            syncer: Arc::new(Syncer::new(initial.clone())),
            value: initial,
        }
    }

    /// Returns a producer handle for this channel.
    pub fn inlet(&self) -> Inlet<T> {
        Inlet {
            syncer: Arc::clone(&self.syncer),
        }
    }

    /// Refreshes the local copy if an update arrived and returns it.
    pub fn current(&mut self) -> &T {
        self.syncer.try_sync(&mut self.value);
        &self.value
    }

    /// Like [`Channel::current`], but only yields a value when it changed.
    pub fn updated(&mut self) -> Option<&T> {
        if self.syncer.try_sync(&mut self.value) {
            Some(&self.value)
        } else {
            None
        }
    }
}

impl<T: Clone + Default> Default for Channel<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
