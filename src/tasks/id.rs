use std::fmt;
use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};

/// An opaque id that uniquely identifies a task relative to all other tasks
/// launched in this process.
///
/// Ids are assigned when a task is launched and stay stable for as long as the
/// task is tracked by its registry. They are never re-used.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, PartialOrd, Ord)]
pub struct TaskId(NonZeroU64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl TaskId {
    pub(crate) fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);

        let id = COUNTER.fetch_add(1, Ordering::Relaxed);

        // Even at a billion launches per second this takes centuries to wrap.
        let Some(id) = NonZeroU64::new(id) else {
            Self::exhausted();
        };

        Self(id)
    }

    /// Returns the raw numeric value of the id.
    pub fn as_u64(&self) -> u64 {
        self.0.get()
    }

    #[cold]
    fn exhausted() -> ! {
        panic!("failed to generate unique task id: bitspace exhausted")
    }
}
