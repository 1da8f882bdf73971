//! # taskreg
//!
//! **taskreg** is a registry of thread-backed tasks: one-shot, delayed and
//! periodic work launched by name, tracked by id, stopped on request and
//! reclaimed automatically once finished.
//!
//! Next to the registry it ships a few small concurrency primitives that task
//! bodies tend to need: a double-buffered latest-value slot, a single-use
//! callback and a coalescing launcher.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   start("a", f)     start_after("b", d, f)     start_periodic("c", i, mode, f)
//!        │                     │                            │
//!        ▼                     ▼                            ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Registry                                                         │
//! │  - Table (records + periodic tokens, one RwLock)                  │
//! │  - root CancellationToken (parent of periodic tokens)             │
//! │  - driver runtime (timers, reaper, subscriber workers)            │
//! │  - Bus (broadcast events)                                         │
//! └──────┬──────────────────┬──────────────────┬───────────────┬──────┘
//!        ▼                  ▼                  ▼               │
//!   ┌──────────┐      ┌──────────┐      ┌──────────────┐       │
//!   │ thread a │      │ thread b │      │   thread c   │       │
//!   │ f()      │      │ sleep; f │      │ loop f; pace │       │
//!   └────┬─────┘      └────┬─────┘      └──────┬───────┘       │
//!        │ Completion      │ Completion        │ Completion    │ reaper
//!        ▼                 ▼                   ▼               ▼
//!   wait(id) / TaskInfo::wait()          sweep finished records every reap_interval
//!
//!   Bus ──► subscriber listener ──► SubscriberSet ──► sub.on_event()
//! ```
//!
//! ### Periodic lifecycle
//! ```text
//! next = launch + interval
//! loop {
//!   ├─► token cancelled?           ─► exit Ok
//!   ├─► f()                        ─► Err ─► exit Err (stored in Completion)
//!   ├─► pacer.wait_until(next)     ─► cancelled ─► exit Ok
//!   └─► next += interval
//! }
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                          |
//! |-------------------|--------------------------------------------------------------|---------------------------------------------|
//! | **Registry**      | Launch, look up, stop, wait for and reclaim tasks.           | [`Registry`], [`TaskInfo`], [`TaskId`]      |
//! | **Timing**        | Wait strategies for periodic tasks.                          | [`TimingMode`], [`Pacer`], [`Clock`]        |
//! | **Sync**          | Latest-value slot, single-use callback, coalescing launcher. | [`Syncer`], [`LockedSyncer`], [`Channel`], [`OneCallFunction`], [`SingleAsyncExecutor`] |
//! | **Subscriber API**| Hook into task lifecycle events.                             | [`Subscribe`], [`Event`]                    |
//! | **Errors**        | Typed errors for launching and for task bodies.              | [`RegistryError`], [`TaskError`]            |
//! | **Error codes**   | Stable integer codes with source locations.                  | [`ErrorTable`], [`ErrorCode`]               |
//! | **Configuration** | Centralize registry settings.                                | [`Config`]                                  |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::time::Duration;
//! use taskreg::{Config, Registry, TaskError, TimingMode};
//!
//! let registry = Registry::new(Config::default()).unwrap();
//!
//! // One-shot work; errors surface through wait().
//! let id = registry.start("parse", || Err(TaskError::fail("bad header"))).unwrap();
//! assert_eq!(registry.wait(id), Some(Err(TaskError::fail("bad header"))));
//!
//! // Periodic work until stopped.
//! let ticks = Arc::new(AtomicUsize::new(0));
//! let t = ticks.clone();
//! let id = registry
//!     .start_periodic("tick", Duration::from_millis(10), TimingMode::Standard, move || {
//!         t.fetch_add(1, Ordering::Relaxed);
//!         Ok(())
//!     })
//!     .unwrap();
//! std::thread::sleep(Duration::from_millis(50));
//! registry.stop(id);
//! registry.wait(id);
//! assert!(ticks.load(Ordering::Relaxed) >= 2);
//!
//! registry.shutdown();
//! ```

mod codes;
mod config;
mod core;
mod error;
mod events;
mod subscribers;
mod sync;
mod tasks;
mod timing;

// ---- Public re-exports ----

pub use codes::{ErrorCode, ErrorEntry, ErrorTable};
pub use config::Config;
pub use core::Registry;
pub use error::{RegistryError, TaskError};
pub use events::{Bus, Event, EventKind};
pub use subscribers::{Subscribe, SubscriberSet};
pub use sync::{
    Channel, Inlet, LockedSyncer, OneCallFunction, OneCaller, SingleAsyncExecutor, Syncer,
};
pub use tasks::{Completion, Outcome, TaskId, TaskInfo, TaskKind};
pub use timing::{Clock, DriverClock, Pacer, TimingMode, WaitOutcome, has_performance_counter};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
