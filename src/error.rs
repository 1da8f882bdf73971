//! Error types used by the registry and by task bodies.
//!
//! This module defines two main error enums:
//!
//! - [`RegistryError`]: errors raised by the registry itself while launching work.
//! - [`TaskError`]: errors produced by individual task bodies.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logs and events.
//!
//! ## Fire-and-forget caveat
//! A [`TaskError`] is stored in the task's [`Completion`](crate::Completion) and is
//! only observed by whoever waits on it. Tasks that are never waited on drop their
//! errors silently; the registry does not retry, rethrow or escalate them.

use std::io;

use thiserror::Error;

/// # Errors produced by the registry.
///
/// These are failures to *launch* work. They are returned synchronously from
/// the `start*` operations and never stored in a task's completion.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RegistryError {
    /// The OS refused to create an execution thread for the task.
    #[error("failed to spawn thread for task {name:?}: {source}")]
    Spawn {
        /// Name of the task that could not be launched.
        name: String,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },

    /// The timer driver runtime could not be built.
    #[error("failed to build timer driver: {source}")]
    Driver {
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },

    /// The registry was already torn down.
    #[error("registry is shut down")]
    ShutDown,
}

impl RegistryError {
    /// Returns a short stable label (snake_case) for use in logs/events.
    ///
    /// # Example
    /// ```
    /// use taskreg::RegistryError;
    ///
    /// assert_eq!(RegistryError::ShutDown.as_label(), "registry_shut_down");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RegistryError::Spawn { .. } => "registry_spawn_failed",
            RegistryError::Driver { .. } => "registry_driver_failed",
            RegistryError::ShutDown => "registry_shut_down",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RegistryError::Spawn { name, source } => format!("spawn {name}: {source}"),
            RegistryError::Driver { source } => format!("driver: {source}"),
            RegistryError::ShutDown => "shut down".to_string(),
        }
    }
}

/// # Errors produced by task bodies.
///
/// Cloneable so that every waiter of a [`Completion`](crate::Completion)
/// receives its own copy of the outcome.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// Task body returned an error.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Task body panicked; the panic was caught on the task thread.
    #[error("task panicked: {message}")]
    Panicked {
        /// Panic payload rendered as text.
        message: String,
    },

    /// Task thread went away without reporting an outcome.
    #[error("task abandoned without outcome")]
    Abandoned,
}

impl TaskError {
    /// Shorthand for [`TaskError::Fail`].
    ///
    /// # Example
    /// ```
    /// use taskreg::TaskError;
    ///
    /// let err = TaskError::fail("disk full");
    /// assert_eq!(err.to_string(), "execution failed: disk full");
    /// ```
    pub fn fail(error: impl Into<String>) -> Self {
        TaskError::Fail {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/events.
    ///
    /// # Example
    /// ```
    /// use taskreg::TaskError;
    ///
    /// assert_eq!(TaskError::fail("boom").as_label(), "task_failed");
    /// assert_eq!(TaskError::Abandoned.as_label(), "task_abandoned");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Fail { .. } => "task_failed",
            TaskError::Panicked { .. } => "task_panicked",
            TaskError::Abandoned => "task_abandoned",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::Fail { error } => format!("error: {error}"),
            TaskError::Panicked { message } => format!("panic: {message}"),
            TaskError::Abandoned => "abandoned".to_string(),
        }
    }
}
