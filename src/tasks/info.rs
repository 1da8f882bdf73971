//! # Point-in-time task snapshots.
//!
//! [`TaskInfo`] is what the registry stores per tracked task and what lookups
//! hand out as copies. A snapshot keeps a handle to the task's [`Completion`], so
//! it can be polled or waited on even after the registry has reaped the record.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::tasks::{Completion, Outcome, TaskId};
use crate::timing::TimingMode;

/// How a task was launched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskKind {
    /// Runs once, immediately.
    OneShot,
    /// Runs once after `delay`.
    Delayed {
        /// Delay measured from launch.
        delay: Duration,
    },
    /// Runs every `interval` until stopped.
    Periodic {
        /// Period between invocation starts.
        interval: Duration,
        /// Wait strategy between invocations (after platform degradation).
        mode: TimingMode,
    },
}

/// Snapshot of one tracked task.
#[derive(Clone, Debug)]
pub struct TaskInfo {
    id: TaskId,
    name: Arc<str>,
    kind: TaskKind,
    started_at: Instant,
    completion: Completion,
}

impl TaskInfo {
    pub(crate) fn new(id: TaskId, name: Arc<str>, kind: TaskKind, completion: Completion) -> Self {
        Self {
            id,
            name,
            kind,
            started_at: Instant::now(),
            completion,
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Task name; several tasks may share one.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> TaskKind {
        self.kind
    }

    /// Moment the task was launched.
    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    pub fn is_periodic(&self) -> bool {
        matches!(self.kind, TaskKind::Periodic { .. })
    }

    /// True once the task's completion has fired. A finished task may still be
    /// listed until the next reaper pass.
    pub fn is_finished(&self) -> bool {
        self.completion.is_finished()
    }

    /// Shared completion handle of the task.
    pub fn completion(&self) -> &Completion {
        &self.completion
    }

    /// Blocks until the task completes and returns its outcome.
    pub fn wait(&self) -> Outcome {
        self.completion.wait()
    }
}
