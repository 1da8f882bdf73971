//! # Lifecycle events emitted by the registry.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Task events**: launch, completion, failure, stop request, reclamation
//! - **Registry events**: teardown requested / finished
//! - **Subscriber events**: overflow and panics inside subscriber workers
//!
//! The [`Event`] struct carries additional metadata such as timestamps, task name
//! and id, reasons and periodic intervals.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use taskreg::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::TaskFailed)
//!     .with_task("heartbeat")
//!     .with_reason("boom");
//!
//! assert_eq!(ev.kind, EventKind::TaskFailed);
//! assert_eq!(ev.task.as_deref(), Some("heartbeat"));
//! assert_eq!(ev.reason.as_deref(), Some("boom"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

use crate::tasks::TaskId;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of registry events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `task`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `task`: subscriber name
    /// - `reason`: reason string (e.g., "full", "closed")
    SubscriberOverflow,

    // === Registry events ===
    /// Teardown started; cancellation tokens are being signalled.
    ShutdownRequested,

    /// Teardown finished; the reaper has stopped.
    ShutdownComplete,

    // === Task events ===
    /// Task thread is running and its record is visible.
    ///
    /// Sets:
    /// - `task`, `id`
    /// - `interval_ms`: period (periodic tasks only)
    TaskStarted,

    /// Task body (or periodic loop) returned successfully.
    ///
    /// Sets:
    /// - `task`, `id`
    TaskFinished,

    /// Task body returned an error or panicked.
    ///
    /// Sets:
    /// - `task`, `id`
    /// - `reason`: failure message
    TaskFailed,

    /// Stop was requested for a periodic task.
    ///
    /// Sets:
    /// - `task`, `id`
    StopRequested,

    /// Reaper removed a finished record.
    ///
    /// Sets:
    /// - `task`, `id`
    TaskReaped,
}

/// Registry event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Name of the task (or subscriber), if applicable.
    pub task: Option<Arc<str>>,
    /// Id of the task, if applicable.
    pub id: Option<TaskId>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
    /// Period of a periodic task in milliseconds (compact).
    pub interval_ms: Option<u32>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            task: None,
            id: None,
            reason: None,
            interval_ms: None,
        }
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a task name.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches a task id.
    #[inline]
    pub fn with_id(mut self, id: TaskId) -> Self {
        self.id = Some(id);
        self
    }

    /// Attaches a periodic interval (stored as milliseconds).
    #[inline]
    pub fn with_interval(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.interval_ms = Some(ms);
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_task(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_task(subscriber)
            .with_reason(info)
    }

    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }
}
