use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use super::{Clock, TimingMode, WaitOutcome};

/// Slice length of the sleep phase in [`TimingMode::SystemPerformance`].
const SLEEP_SLICE: Duration = Duration::from_millis(1);

/// Waits for deadlines using the strategy of one [`TimingMode`].
///
/// One pacer belongs to one periodic task; it is used only from that task's thread.
#[derive(Clone)]
pub struct Pacer {
    clock: Arc<dyn Clock>,
    mode: TimingMode,
    spin_window: Duration,
}

impl Pacer {
    /// Creates a pacer; `mode` is degraded to what the platform supports.
    pub fn new(clock: Arc<dyn Clock>, mode: TimingMode, spin_window: Duration) -> Self {
        Self {
            clock,
            mode: mode.effective(),
            spin_window,
        }
    }

    /// Mode in effect after platform degradation.
    pub fn mode(&self) -> TimingMode {
        self.mode
    }

    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    /// Blocks until `deadline` or until `token` fires.
    ///
    /// Never returns [`WaitOutcome::Elapsed`] before `deadline`.
    pub fn wait_until(&self, deadline: Instant, token: &CancellationToken) -> WaitOutcome {
        match self.mode {
            TimingMode::Standard => self.clock.sleep_until(deadline, token),
            TimingMode::HighResolution => self.yield_wait(deadline, token),
            TimingMode::SystemPerformance => self.spin_wait(deadline, token),
        }
    }

    /// One coarse sleep up to the spin window, then yield between clock reads.
    fn yield_wait(&self, deadline: Instant, token: &CancellationToken) -> WaitOutcome {
        if let Some(coarse) = deadline.checked_sub(self.spin_window) {
            if self.clock.now() < coarse
                && self.clock.sleep_until(coarse, token) == WaitOutcome::Cancelled
            {
                return WaitOutcome::Cancelled;
            }
        }
        self.poll_until(deadline, token, std::thread::yield_now)
    }

    /// Short sleep slices while far from the deadline, then busy-poll the counter.
    fn spin_wait(&self, deadline: Instant, token: &CancellationToken) -> WaitOutcome {
        loop {
            let now = self.clock.now();
            if deadline.saturating_duration_since(now) <= self.spin_window {
                break;
            }
            let slice_end = (now + SLEEP_SLICE).min(deadline - self.spin_window);
            if self.clock.sleep_until(slice_end, token) == WaitOutcome::Cancelled {
                return WaitOutcome::Cancelled;
            }
        }
        self.poll_until(deadline, token, std::hint::spin_loop)
    }

    fn poll_until(
        &self,
        deadline: Instant,
        token: &CancellationToken,
        relax: impl Fn(),
    ) -> WaitOutcome {
        loop {
            if token.is_cancelled() {
                return WaitOutcome::Cancelled;
            }
            if self.clock.now() >= deadline {
                return WaitOutcome::Elapsed;
            }
            relax();
        }
    }
}
