//! # Coalescing launcher: at most one invocation in flight.
//!
//! [`SingleAsyncExecutor`] ignores submissions while the previous one is still
//! running. There is no queue; callers who need one layer it themselves.

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Runs submitted closures on a runtime's blocking pool, one at a time,
/// dropping submissions that arrive while one is running.
pub struct SingleAsyncExecutor<R> {
    handle: Handle,
    inflight: Mutex<Option<JoinHandle<R>>>,
}

impl<R: Send + 'static> SingleAsyncExecutor<R> {
    /// Creates an executor launching onto `handle`.
    pub fn new(handle: Handle) -> Self {
        Self {
            handle,
            inflight: Mutex::new(None),
        }
    }

    /// Creates an executor on the runtime of the calling context, if any.
    pub fn try_current() -> Option<Self> {
        Handle::try_current().ok().map(Self::new)
    }

    /// Launches `f` unless the previous submission is still running.
    ///
    /// Returns `true` if `f` was launched, `false` if it was dropped.
    pub fn submit_exclusive<F>(&self, f: F) -> bool
    where
        F: FnOnce() -> R + Send + 'static,
    {
        let mut inflight = self.inflight.lock();
        if inflight.as_ref().is_some_and(|h| !h.is_finished()) {
            return false;
        }
        *inflight = Some(self.handle.spawn_blocking(f));
        true
    }

    /// True while the last launched invocation has not completed.
    pub fn is_busy(&self) -> bool {
        self.inflight
            .lock()
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc;
    use std::time::{Duration, Instant};

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .build()
            .unwrap()
    }

    fn wait_idle<R: Send + 'static>(exec: &SingleAsyncExecutor<R>) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while exec.is_busy() {
            assert!(Instant::now() < deadline, "executor stuck busy");
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn test_rapid_submissions_coalesce() {
        let rt = runtime();
        let exec = SingleAsyncExecutor::new(rt.handle().clone());
        let runs = Arc::new(AtomicUsize::new(0));
        let (release_tx, release_rx) = mpsc::channel::<()>();

        let r = runs.clone();
        assert!(exec.submit_exclusive(move || {
            r.fetch_add(1, Ordering::SeqCst);
            let _ = release_rx.recv();
        }));
        let r = runs.clone();
        assert!(!exec.submit_exclusive(move || {
            r.fetch_add(1, Ordering::SeqCst);
        }));
        assert!(exec.is_busy());

        release_tx.send(()).unwrap();
        wait_idle(&exec);
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        let r = runs.clone();
        assert!(exec.submit_exclusive(move || {
            r.fetch_add(1, Ordering::SeqCst);
        }));
        wait_idle(&exec);
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn test_try_current_inside_runtime() {
        let exec = SingleAsyncExecutor::<u8>::try_current().expect("runtime handle");
        assert!(!exec.is_busy());
        assert!(exec.submit_exclusive(|| 1));
    }

    #[test]
    fn test_try_current_outside_runtime() {
        assert!(SingleAsyncExecutor::<()>::try_current().is_none());
    }
}
