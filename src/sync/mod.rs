//! # Building blocks for handing state between threads.
//!
//! - [`Syncer`] double-buffered latest-value slot (level- and edge-triggered reads)
//! - [`LockedSyncer`] same contract over one mutex-guarded cell
//! - [`Channel`] / [`Inlet`] consumer and producer facades over one `Syncer`
//! - [`OneCallFunction`] swap-and-clear callback slot
//! - [`SingleAsyncExecutor`] "ignore while busy" launcher
//!
//! None of these fail: empty or busy states are reported as no-ops or defaults.

mod channel;
mod locked_syncer;
mod one_call;
mod single_async;
mod syncer;

pub use channel::{Channel, Inlet};
pub use locked_syncer::LockedSyncer;
pub use one_call::{OneCallFunction, OneCaller};
pub use single_async::SingleAsyncExecutor;
pub use syncer::Syncer;
