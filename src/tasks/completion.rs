//! # Completion signal of a task's single invocation.
//!
//! One producer (the task thread, through [`Completer`]) and any number of
//! waiters (through cloned [`Completion`] handles). The outcome is written once;
//! every waiter observes the same value.
//!
//! ```text
//! task thread ── Completer::complete(outcome) ──► watch slot ──► Completion::wait()    (thread)
//!                                                          └──► Completion::wait_async() (async)
//! ```
//!
//! If the producer disappears without reporting, waiters get [`TaskError::Abandoned`].

use tokio::sync::watch;

use crate::error::TaskError;

/// Result of one task invocation (or of a whole periodic loop).
pub type Outcome = Result<(), TaskError>;

/// Producer half; consumed by the single call to [`Completer::complete`].
pub(crate) struct Completer {
    tx: watch::Sender<Option<Outcome>>,
}

impl Completer {
    /// Records the outcome and wakes every waiter.
    pub(crate) fn complete(self, outcome: Outcome) {
        self.tx.send_replace(Some(outcome));
    }
}

/// Shared, multi-waiter handle to a task's outcome.
#[derive(Clone, Debug)]
pub struct Completion {
    rx: watch::Receiver<Option<Outcome>>,
}

/// Creates a connected producer/waiter pair.
pub(crate) fn completion_pair() -> (Completer, Completion) {
    let (tx, rx) = watch::channel(None);
    (Completer { tx }, Completion { rx })
}

impl Completion {
    /// Returns true once the outcome is available (or the producer is gone).
    pub fn is_finished(&self) -> bool {
        self.rx.borrow().is_some() || self.rx.has_changed().is_err()
    }

    /// Returns the outcome without blocking, if it is available.
    pub fn outcome(&self) -> Option<Outcome> {
        if let Some(outcome) = self.rx.borrow().as_ref() {
            return Some(outcome.clone());
        }
        if self.rx.has_changed().is_err() {
            return Some(Err(TaskError::Abandoned));
        }
        None
    }

    /// Blocks the calling thread until the outcome is available.
    ///
    /// From async code prefer [`Completion::wait_async`]; this call parks the
    /// current thread.
    pub fn wait(&self) -> Outcome {
        futures::executor::block_on(self.wait_async())
    }

    /// Waits asynchronously until the outcome is available.
    pub async fn wait_async(&self) -> Outcome {
        let mut rx = self.rx.clone();
        match rx.wait_for(Option::is_some).await {
            Ok(slot) => Option::clone(&slot).unwrap_or(Err(TaskError::Abandoned)),
            Err(_) => Err(TaskError::Abandoned),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_every_waiter_sees_the_outcome() {
        let (completer, completion) = completion_pair();
        let waiters: Vec<_> = (0..3)
            .map(|_| {
                let c = completion.clone();
                std::thread::spawn(move || c.wait())
            })
            .collect();

        std::thread::sleep(Duration::from_millis(20));
        assert!(!completion.is_finished());
        completer.complete(Err(TaskError::fail("boom")));

        for w in waiters {
            assert_eq!(w.join().unwrap(), Err(TaskError::fail("boom")));
        }
        assert!(completion.is_finished());
    }

    #[test]
    fn test_outcome_is_readable_after_producer_is_gone() {
        let (completer, completion) = completion_pair();
        completer.complete(Ok(()));
        assert_eq!(completion.outcome(), Some(Ok(())));
        assert_eq!(completion.wait(), Ok(()));
    }

    #[test]
    fn test_dropped_producer_means_abandoned() {
        let (completer, completion) = completion_pair();
        assert_eq!(completion.outcome(), None);
        drop(completer);
        assert!(completion.is_finished());
        assert_eq!(completion.wait(), Err(TaskError::Abandoned));
    }

    #[tokio::test]
    async fn test_async_wait() {
        let (completer, completion) = completion_pair();
        let waiter = tokio::spawn({
            let c = completion.clone();
            async move { c.wait_async().await }
        });
        completer.complete(Ok(()));
        assert_eq!(waiter.await.unwrap(), Ok(()));
    }
}
