//! # Disposable callback slot.
//!
//! [`OneCallFunction`] stores at most one callback. Calling the slot takes the
//! callback out under the lock and runs it after the lock is released, so the
//! callback may freely re-arm or call the same slot.

use parking_lot::Mutex;

type Callback<A, R> = Box<dyn FnOnce(A) -> R + Send>;

/// Thread-safe, swap-and-clear callback slot taking `A` and returning `R`.
pub struct OneCallFunction<A = (), R = ()> {
    slot: Mutex<Option<Callback<A, R>>>,
}

/// Slot for argument-less callbacks; arm it with `slot.set(|()| ...)`.
pub type OneCaller = OneCallFunction<(), ()>;

impl<A, R> OneCallFunction<A, R> {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// Stores `f`, replacing any callback not yet fired.
    pub fn set<F>(&self, f: F)
    where
        F: FnOnce(A) -> R + Send + 'static,
    {
        *self.slot.lock() = Some(Box::new(f));
    }

    /// Drops the stored callback without running it. Returns whether one was armed.
    pub fn clear(&self) -> bool {
        self.slot.lock().take().is_some()
    }

    pub fn is_armed(&self) -> bool {
        self.slot.lock().is_some()
    }

    /// Fires the stored callback once and empties the slot.
    ///
    /// On an empty slot nothing runs and `R::default()` is returned.
    pub fn call(&self, args: A) -> R
    where
        R: Default,
    {
        let cached = self.slot.lock().take();
        match cached {
            Some(f) => f(args),
            None => R::default(),
        }
    }
}

impl<A, R> Default for OneCallFunction<A, R> {
    fn default() -> Self {
        Self::new()
    }
}
