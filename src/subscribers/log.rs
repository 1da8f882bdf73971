//! # LogWriter: simple event printer
//!
//! A minimal subscriber that prints incoming [`Event`]s to stdout.
//! Use it for tests or demos.
//!
//! ## Example output
//! ```text
//! [started] task="heartbeat" id=3 every=50ms
//! [failed] task="loader" id=4 err="execution failed: file missing"
//! [stop-requested] task="heartbeat" id=3
//! [finished] task="heartbeat" id=3
//! [reaped] task="heartbeat" id=3
//! [shutdown-requested]
//! [shutdown-complete]
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn id_text(e: &Event) -> String {
    e.id.map(|id| id.to_string())
        .unwrap_or_else(|| "-".to_string())
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let task = e.task.as_deref().unwrap_or("unknown");
        match e.kind {
            EventKind::TaskStarted => match e.interval_ms {
                Some(ms) => println!("[started] task={task:?} id={} every={ms}ms", id_text(e)),
                None => println!("[started] task={task:?} id={}", id_text(e)),
            },
            EventKind::TaskFinished => {
                println!("[finished] task={task:?} id={}", id_text(e));
            }
            EventKind::TaskFailed => {
                println!(
                    "[failed] task={task:?} id={} err={:?}",
                    id_text(e),
                    e.reason.as_deref().unwrap_or("unknown")
                );
            }
            EventKind::StopRequested => {
                println!("[stop-requested] task={task:?} id={}", id_text(e));
            }
            EventKind::TaskReaped => {
                println!("[reaped] task={task:?} id={}", id_text(e));
            }
            EventKind::ShutdownRequested => {
                println!("[shutdown-requested]");
            }
            EventKind::ShutdownComplete => {
                println!("[shutdown-complete]");
            }
            EventKind::SubscriberOverflow => {
                println!(
                    "[subscriber-overflow] subscriber={task} reason={:?}",
                    e.reason
                );
            }
            EventKind::SubscriberPanicked => {
                println!(
                    "[subscriber-panicked] subscriber={task} info={}",
                    e.reason.as_deref().unwrap_or("unknown"),
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
