//! # Bodies of task threads.
//!
//! Each launched task runs one of these on its own OS thread:
//!
//! ```text
//! one-shot:  invoke(f)
//! delayed:   sleep_until(launch + delay)  ─► invoke(f)     (teardown: skip f)
//! periodic:  loop {
//!              ├─► token cancelled? ─► exit Ok
//!              ├─► invoke(f)         ─► Err ─► exit Err
//!              ├─► wait_until(next)  ─► cancelled ─► exit Ok
//!              └─► next += interval  (schedule anchored at launch, no drift)
//!            }
//! ```
//!
//! ## Rules
//! - A body is never interrupted; tokens are only checked around it.
//! - Panics are caught and turned into [`TaskError::Panicked`].
//! - Exactly one of `TaskFinished` / `TaskFailed` is published per task.

use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use crate::error::TaskError;
use crate::events::{Bus, Event, EventKind};
use crate::tasks::{Outcome, TaskId, panic_message};
use crate::timing::{Clock, Pacer, WaitOutcome};

/// Runs one invocation of a body, converting a panic into an error.
pub(crate) fn invoke<F>(f: F) -> Outcome
where
    F: FnOnce() -> Outcome,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(outcome) => outcome,
        Err(payload) => Err(TaskError::Panicked {
            message: panic_message(&*payload),
        }),
    }
}

/// Sleeps until `deadline`, then invokes `f` once. Returns without invoking
/// when `shutdown` fires first.
///
/// A `None` deadline lies beyond what `Instant` can represent: the body never
/// runs and the thread waits for `shutdown` only.
pub(crate) fn run_delayed<F>(
    f: F,
    deadline: Option<Instant>,
    clock: &dyn Clock,
    shutdown: &CancellationToken,
) -> Outcome
where
    F: FnOnce() -> Outcome,
{
    match wait_for(deadline, clock, shutdown) {
        WaitOutcome::Elapsed => invoke(f),
        WaitOutcome::Cancelled => Ok(()),
    }
}

/// Invokes `f` every `interval` until `token` fires or `f` fails.
///
/// Once the schedule overflows `Instant`, the next invocation is never due and
/// the loop only waits for `token`.
pub(crate) fn run_periodic<F>(
    mut f: F,
    interval: Duration,
    pacer: &Pacer,
    token: &CancellationToken,
) -> Outcome
where
    F: FnMut() -> Outcome,
{
    let mut next = pacer.now().checked_add(interval);
    while !token.is_cancelled() {
        invoke(&mut f)?;
        let waited = match next {
            Some(deadline) => pacer.wait_until(deadline, token),
            None => park_until_cancelled(token),
        };
        if waited == WaitOutcome::Cancelled {
            break;
        }
        next = next.and_then(|n| n.checked_add(interval));
    }
    Ok(())
}

fn wait_for(deadline: Option<Instant>, clock: &dyn Clock, token: &CancellationToken) -> WaitOutcome {
    match deadline {
        Some(deadline) => clock.sleep_until(deadline, token),
        None => park_until_cancelled(token),
    }
}

/// Blocks the calling thread until `token` fires.
fn park_until_cancelled(token: &CancellationToken) -> WaitOutcome {
    futures::executor::block_on(token.cancelled());
    WaitOutcome::Cancelled
}

/// Publishes `TaskStarted` from the task thread.
pub(crate) fn publish_started(bus: &Bus, name: &str, id: TaskId, interval: Option<Duration>) {
    let ev = Event::new(EventKind::TaskStarted).with_task(name).with_id(id);
    bus.publish(match interval {
        Some(d) => ev.with_interval(d),
        None => ev,
    });
}

/// Publishes `TaskFinished` or `TaskFailed` for the final outcome.
pub(crate) fn publish_outcome(bus: &Bus, name: &str, id: TaskId, outcome: &Outcome) {
    let ev = match outcome {
        Ok(()) => Event::new(EventKind::TaskFinished),
        Err(e) => Event::new(EventKind::TaskFailed).with_reason(e.to_string()),
    };
    bus.publish(ev.with_task(name).with_id(id));
}
