//! # Example: heartbeat
//!
//! Demonstrates the three launch kinds and how their outcomes are observed.
//!
//! Shows how to:
//! - Run a periodic heartbeat and stop it by id.
//! - Schedule a delayed task and wait for it.
//! - Report a failure with a stable code from [`ErrorTable`].
//! - Attach a custom [`Subscribe`] implementation.
//!
//! ## Flow
//! ```text
//! Registry::with_subscribers()
//!     ├─► start_periodic("heartbeat", 50ms)   ─► beat every 50ms
//!     ├─► start_after("report", 120ms)        ─► runs once
//!     ├─► start("loader")                     ─► fails with [E1]
//!     ├─► sleep 260ms ─► stop(heartbeat) ─► wait(heartbeat)
//!     └─► shutdown()
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example heartbeat
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use taskreg::{Config, ErrorTable, Event, EventKind, Registry, Subscribe, TimingMode};

/// Prints failures and reclamation; everything else is ignored.
struct ConsoleSubscriber;

#[async_trait::async_trait]
impl Subscribe for ConsoleSubscriber {
    async fn on_event(&self, ev: &Event) {
        let task = ev.task.as_deref().unwrap_or("<unknown>");
        match ev.kind {
            EventKind::TaskFailed => println!(
                "[sub] failed: task={task} reason={}",
                ev.reason.as_deref().unwrap_or("<none>")
            ),
            EventKind::TaskReaped => println!("[sub] reaped: task={task}"),
            _ => {}
        }
    }

    fn name(&self) -> &'static str {
        "console"
    }
}

fn main() -> anyhow::Result<()> {
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(ConsoleSubscriber)];
    let registry = Registry::with_subscribers(Config::default(), subs)?;

    let beats = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&beats);
    let heartbeat = registry.start_periodic(
        "heartbeat",
        Duration::from_millis(50),
        TimingMode::HighResolution,
        move || {
            let n = counter.fetch_add(1, Ordering::Relaxed) + 1;
            println!("[heartbeat] beat #{n}");
            Ok(())
        },
    )?;

    let report = registry.start_after("report", Duration::from_millis(120), || {
        println!("[report] delayed task ran");
        Ok(())
    })?;

    let loader = registry.start("loader", || Err(ErrorTable::global().fail("config file missing")))?;

    std::thread::sleep(Duration::from_millis(260));
    registry.stop(heartbeat);

    println!("heartbeat: {:?}", registry.wait(heartbeat));
    println!("report:    {:?}", registry.wait(report));
    println!("loader:    {:?}", registry.wait(loader));
    println!("beats:     {}", beats.load(Ordering::Relaxed));

    // Let the reaper and subscriber catch up before teardown.
    std::thread::sleep(Duration::from_millis(150));
    registry.shutdown();
    Ok(())
}
