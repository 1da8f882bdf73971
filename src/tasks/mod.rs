//! # Task identities, snapshots and completion signals.
//!
//! This module provides the task-related types shared by the registry:
//! - [`TaskId`] - opaque unique id of a launched task
//! - [`TaskInfo`] / [`TaskKind`] - point-in-time snapshot of a tracked task
//! - [`Completion`] - multi-waiter signal carrying the task's [`Outcome`]

mod completion;
mod id;
mod info;

pub use completion::{Completion, Outcome};
pub(crate) use completion::completion_pair;
pub use id::TaskId;
pub use info::{TaskInfo, TaskKind};

use std::any::Any;

/// Renders a caught panic payload as text.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
