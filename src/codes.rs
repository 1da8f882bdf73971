//! # Error-code table.
//!
//! An append-only table mapping stable integer codes to the source location and
//! message of a failure. Entries are added with an ordinary call at startup (or
//! lazily by task bodies); the registry itself never reads the table.
//!
//! ## Rules
//! - Code `0` is always the default entry (`"default"`, `0:0`, `"error"`).
//! - Registering a message that is already present returns the existing code.
//! - Unknown codes resolve to the message `"unknown error"`.
//!
//! ## Example
//! ```rust
//! use taskreg::ErrorTable;
//!
//! let table = ErrorTable::new();
//! let code = table.register("config file missing");
//! assert_eq!(table.register("config file missing"), code);
//! assert_eq!(table.message(code), "config file missing");
//! assert_eq!(table.describe(code).unwrap().path, file!());
//! ```

use std::fmt;
use std::panic::Location;
use std::sync::LazyLock;

use parking_lot::RwLock;

use crate::error::TaskError;

const UNKNOWN_MESSAGE: &str = "unknown error";

/// Stable integer code of a registered error.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, PartialOrd, Ord)]
pub struct ErrorCode(u32);

impl ErrorCode {
    /// Code of the default entry.
    pub const DEFAULT: ErrorCode = ErrorCode(0);

    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One registered error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorEntry {
    /// Source file of the registration call.
    pub path: &'static str,
    pub line: u32,
    pub column: u32,
    pub message: String,
}

/// Append-only table of registered errors.
pub struct ErrorTable {
    entries: RwLock<Vec<ErrorEntry>>,
}

static GLOBAL: LazyLock<ErrorTable> = LazyLock::new(ErrorTable::new);

impl ErrorTable {
    /// Creates a table holding only the default entry.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(vec![ErrorEntry {
                path: "default",
                line: 0,
                column: 0,
                message: "error".to_string(),
            }]),
        }
    }

    /// Process-wide table.
    pub fn global() -> &'static ErrorTable {
        &GLOBAL
    }

    /// Registers `message` at the caller's source location and returns its code.
    ///
    /// If the message is already registered, the existing code is returned and
    /// the table is left unchanged.
    #[track_caller]
    pub fn register(&self, message: impl Into<String>) -> ErrorCode {
        let location = Location::caller();
        let message = message.into();

        let mut entries = self.entries.write();
        if let Some(index) = entries.iter().position(|e| e.message == message) {
            return ErrorCode(index as u32);
        }
        entries.push(ErrorEntry {
            path: location.file(),
            line: location.line(),
            column: location.column(),
            message,
        });
        ErrorCode((entries.len() - 1) as u32)
    }

    /// Registers `message` and builds a [`TaskError`] carrying its code,
    /// for use as the return value of a failing task body.
    #[track_caller]
    pub fn fail(&self, message: impl Into<String>) -> TaskError {
        let message = message.into();
        let code = self.register(message.clone());
        TaskError::Fail {
            error: format!("[E{code}] {message}"),
        }
    }

    /// Returns the code of an already registered message.
    pub fn code_of(&self, message: &str) -> Option<ErrorCode> {
        self.entries
            .read()
            .iter()
            .position(|e| e.message == message)
            .map(|index| ErrorCode(index as u32))
    }

    pub fn describe(&self, code: ErrorCode) -> Option<ErrorEntry> {
        self.entries.read().get(code.0 as usize).cloned()
    }

    /// Message of `code`, or `"unknown error"`.
    pub fn message(&self, code: ErrorCode) -> String {
        self.entries
            .read()
            .get(code.0 as usize)
            .map(|e| e.message.clone())
            .unwrap_or_else(|| UNKNOWN_MESSAGE.to_string())
    }

    /// Copy of all entries in code order.
    pub fn entries(&self) -> Vec<ErrorEntry> {
        self.entries.read().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Always false: the default entry is never removed.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Default for ErrorTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_entry_is_code_zero() {
        let table = ErrorTable::new();
        let entry = table.describe(ErrorCode::DEFAULT).unwrap();
        assert_eq!(entry.path, "default");
        assert_eq!(entry.message, "error");
        assert_eq!(table.register("error"), ErrorCode::DEFAULT);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_codes_are_stable_and_sequential() {
        let table = ErrorTable::new();
        let a = table.register("first");
        let b = table.register("second");
        assert_eq!(a.as_u32(), 1);
        assert_eq!(b.as_u32(), 2);
        assert_eq!(table.register("first"), a);
        assert_eq!(table.code_of("second"), Some(b));
        assert_eq!(table.code_of("third"), None);
    }

    #[test]
    fn test_location_is_the_caller() {
        let table = ErrorTable::new();
        let line = line!() + 1;
        let code = table.register("where am i");
        let entry = table.describe(code).unwrap();
        assert_eq!(entry.path, file!());
        assert_eq!(entry.line, line);
    }

    #[test]
    fn test_unknown_code_message() {
        let table = ErrorTable::new();
        assert_eq!(table.message(ErrorCode::new(42)), "unknown error");
        assert!(table.describe(ErrorCode::new(42)).is_none());
    }

    #[test]
    fn test_fail_embeds_code() {
        let table = ErrorTable::new();
        let err = table.fail("disk full");
        assert_eq!(err, TaskError::fail("[E1] disk full"));
        assert_eq!(table.entries().len(), 2);
    }
}
