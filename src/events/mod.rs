//! Registry events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to lifecycle events emitted by the registry, its task
//! threads, the reaper and subscriber workers.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Registry` (start/stop/shutdown), task threads
//!   (finished/failed), the reaper, `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the registry's subscriber listener, which fans out to `SubscriberSet`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
