//! # Background reclamation of finished task records.
//!
//! ```text
//! loop {
//!   sweep(table)         write lock: drop finished records + their tokens
//!     └─► TaskReaped     one event per removed record (lock released first)
//!   select! {
//!     token.cancelled()  ─► exit
//!     sleep(interval)    ─► next pass
//!   }
//! }
//! ```
//!
//! The reaper is not woken on insert: a record finished at time `t` is gone by
//! `t + interval` at the latest, never earlier than the next pass.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::core::table::Table;
use crate::events::{Bus, Event, EventKind};

/// Spawns the reaper loop on the driver runtime.
pub(crate) fn spawn(
    handle: &Handle,
    table: Arc<RwLock<Table>>,
    bus: Bus,
    interval: Duration,
    token: CancellationToken,
) -> JoinHandle<()> {
    handle.spawn(async move {
        loop {
            sweep(&table, &bus);
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = tokio::time::sleep(interval) => {}
            }
        }
    })
}

/// One reclamation pass. Returns the number of removed records.
pub(crate) fn sweep(table: &RwLock<Table>, bus: &Bus) -> usize {
    let reaped = table.write().drain_finished();
    for info in &reaped {
        bus.publish(
            Event::new(EventKind::TaskReaped)
                .with_task(info.name())
                .with_id(info.id()),
        );
    }
    reaped.len()
}
