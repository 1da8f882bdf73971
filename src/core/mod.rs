//! Registry core: task table, thread bodies and reclamation.
//!
//! The only public API from this module is [`Registry`].
//!
//! Internal modules:
//! - [`registry`]: launch, lookup, stop, wait and teardown;
//! - [`runner`]: bodies of task threads (one-shot, delayed, periodic) and their events;
//! - [`reaper`]: periodic removal of finished records;
//! - [`table`]: the record and token maps guarded by one lock.

mod reaper;
mod registry;
mod runner;
mod table;

#[cfg(test)]
mod tests;

pub use registry::Registry;
