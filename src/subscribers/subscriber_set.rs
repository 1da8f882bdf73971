//! # Per-subscriber delivery queues.
//!
//! The registry's subscriber listener reads the [`Bus`] on the driver runtime
//! and hands every event to [`SubscriberSet::emit`]. Each subscriber owns a
//! bounded queue drained by its own worker task:
//!
//! ```text
//! emit(&event) ──try_send──► [queue "log"]     ──► worker ──► LogWriter::on_event
//!              ──try_send──► [queue "metrics"] ──► worker ──► Metrics::on_event
//!                   │ full / closed
//!                   └──► Bus: SubscriberOverflow (never for an overflow event)
//! ```
//!
//! A subscriber sees events in publish order. A full queue drops the event for
//! that subscriber alone. A panic inside `on_event` is caught, reported as
//! `SubscriberPanicked`, and the worker moves on to the next event; state the
//! subscriber shares elsewhere may be left half-updated.

use std::sync::Arc;

use futures::FutureExt;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;

use crate::events::{Bus, Event};
use crate::subscribers::Subscribe;
use crate::tasks::panic_message;

struct Queue {
    name: &'static str,
    tx: mpsc::Sender<Arc<Event>>,
}

/// Subscribers of one registry, each behind its own queue and worker.
pub struct SubscriberSet {
    queues: Vec<Queue>,
    workers: Vec<JoinHandle<()>>,
    bus: Bus,
}

impl SubscriberSet {
    /// Spawns one worker per subscriber on `handle`. Queue sizes come from
    /// [`Subscribe::queue_capacity`] (at least 1).
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>, bus: Bus, handle: &Handle) -> Self {
        let (queues, workers): (Vec<Queue>, Vec<JoinHandle<()>>) = subs
            .into_iter()
            .map(|sub| {
                let (tx, rx) = mpsc::channel(sub.queue_capacity().max(1));
                let queue = Queue {
                    name: sub.name(),
                    tx,
                };
                (queue, handle.spawn(drain(sub, rx, bus.clone())))
            })
            .unzip();

        Self {
            queues,
            workers,
            bus,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.queues.is_empty()
    }

    /// Queues `event` for every subscriber without waiting.
    pub fn emit(&self, event: &Event) {
        let event = Arc::new(event.clone());

        for queue in &self.queues {
            let reason = match queue.tx.try_send(Arc::clone(&event)) {
                Ok(()) => continue,
                Err(TrySendError::Full(_)) => "full",
                Err(TrySendError::Closed(_)) => "closed",
            };
            // Reporting an overflow of an overflow event would feed back forever.
            if !event.is_subscriber_overflow() {
                self.bus
                    .publish(Event::subscriber_overflow(queue.name, reason));
            }
        }
    }

    /// Closes every queue and waits until the workers delivered what was queued.
    pub async fn shutdown(self) {
        drop(self.queues);
        for worker in self.workers {
            let _ = worker.await;
        }
    }
}

async fn drain(sub: Arc<dyn Subscribe>, mut rx: mpsc::Receiver<Arc<Event>>, bus: Bus) {
    while let Some(ev) = rx.recv().await {
        let delivery = std::panic::AssertUnwindSafe(sub.on_event(&ev)).catch_unwind();
        if let Err(payload) = delivery.await {
            bus.publish(Event::subscriber_panicked(sub.name(), panic_message(&*payload)));
        }
    }
}
