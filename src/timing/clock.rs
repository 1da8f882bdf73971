use std::time::Instant;

use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

/// How a wait ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The deadline was reached.
    Elapsed,
    /// The token fired before the deadline.
    Cancelled,
}

/// Monotonic time source with a coarse, cancellable wait.
///
/// Implementations are called from plain task threads, never from async code.
pub trait Clock: Send + Sync + 'static {
    /// Current monotonic time.
    fn now(&self) -> Instant;

    /// Parks the calling thread until `deadline` or until `token` is cancelled,
    /// whichever comes first. Cancellation wins when both are ready.
    fn sleep_until(&self, deadline: Instant, token: &CancellationToken) -> WaitOutcome;
}

/// [`Clock`] backed by the timer of a tokio runtime.
///
/// The runtime's worker threads drive the timer; the waiting thread only
/// parks in `block_on`. Must not be used from inside that runtime's tasks.
#[derive(Clone, Debug)]
pub struct DriverClock {
    handle: Handle,
}

impl DriverClock {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }
}

impl Clock for DriverClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep_until(&self, deadline: Instant, token: &CancellationToken) -> WaitOutcome {
        if token.is_cancelled() {
            return WaitOutcome::Cancelled;
        }
        if Instant::now() >= deadline {
            return WaitOutcome::Elapsed;
        }
        let deadline = tokio::time::Instant::from_std(deadline);
        self.handle.block_on(async {
            tokio::select! {
                biased;
                _ = token.cancelled() => WaitOutcome::Cancelled,
                _ = tokio::time::sleep_until(deadline) => WaitOutcome::Elapsed,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn driver() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_time()
            .build()
            .unwrap()
    }

    #[test]
    fn test_sleep_reaches_deadline() {
        let rt = driver();
        let clock = DriverClock::new(rt.handle().clone());
        let token = CancellationToken::new();

        let deadline = clock.now() + Duration::from_millis(30);
        assert_eq!(clock.sleep_until(deadline, &token), WaitOutcome::Elapsed);
        assert!(Instant::now() >= deadline);
    }

    #[test]
    fn test_cancel_interrupts_sleep() {
        let rt = driver();
        let clock = DriverClock::new(rt.handle().clone());
        let token = CancellationToken::new();

        let canceller = {
            let token = token.clone();
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(20));
                token.cancel();
            })
        };

        let start = Instant::now();
        let outcome = clock.sleep_until(start + Duration::from_secs(10), &token);
        assert_eq!(outcome, WaitOutcome::Cancelled);
        assert!(start.elapsed() < Duration::from_secs(5));
        canceller.join().unwrap();
    }

    #[test]
    fn test_already_cancelled_wins() {
        let rt = driver();
        let clock = DriverClock::new(rt.handle().clone());
        let token = CancellationToken::new();
        token.cancel();
        assert_eq!(
            clock.sleep_until(Instant::now(), &token),
            WaitOutcome::Cancelled
        );
    }
}
