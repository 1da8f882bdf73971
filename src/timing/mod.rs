//! # Time source and precision waits used by periodic scheduling.
//!
//! ## Contents
//! - [`Clock`] monotonic time source with a coarse, cancellable wait
//! - [`DriverClock`] clock whose waits run on a tokio timer driver
//! - [`TimingMode`] precision/CPU tradeoff of a periodic task
//! - [`Pacer`] waits for a deadline with the strategy of a [`TimingMode`]
//!
//! ## Modes
//! ```text
//! Standard           ── sleep_until(deadline) ─────────────────────────────► done
//! HighResolution     ── sleep_until(deadline - window) ── yield-poll ──────► done
//! SystemPerformance  ── 1ms sleep slices ─────────────── spin-poll ───────► done
//! ```
//! Every wait returns early with [`WaitOutcome::Cancelled`] once the token fires.

mod clock;
mod mode;
mod pacer;

pub use clock::{Clock, DriverClock, WaitOutcome};
pub use mode::{TimingMode, has_performance_counter};
pub use pacer::Pacer;
