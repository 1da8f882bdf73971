//! # Example: channel
//!
//! A sampler publishes readings through an [`Inlet`]; a slower consumer only
//! ever sees the newest one. A [`OneCaller`] is armed to print a farewell the
//! first time the consumer notices the producer is done.
//!
//! ## Flow
//! ```text
//! sampler  (periodic 5ms)  ── Inlet::set(&reading) ──► Syncer
//! consumer (periodic 20ms) ── Channel::updated()   ◄── Syncer
//!                                 └─► reading.done ─► farewell.call(())
//! ```
//!
//! ## Run
//! Requires the `logging` feature to export [`LogWriter`].
//! ```bash
//! cargo run --example channel --features logging
//! ```

use std::sync::Arc;
use std::time::Duration;

use taskreg::{Channel, Config, LogWriter, OneCaller, Registry, Subscribe, TaskError, TimingMode};

#[derive(Clone, Debug, Default)]
struct Reading {
    seq: u64,
    value: f64,
    done: bool,
}

fn main() -> anyhow::Result<()> {
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let registry = Registry::with_subscribers(Config::default(), subs)?;

    let mut channel = Channel::new(Reading::default());
    let inlet = channel.inlet();

    let farewell = Arc::new(OneCaller::new());
    farewell.set(|()| println!("[consumer] producer finished, farewell fired once"));

    let mut seq = 0u64;
    let sampler = registry.start_periodic(
        "sampler",
        Duration::from_millis(5),
        TimingMode::SystemPerformance,
        move || {
            seq += 1;
            let done = seq == 40;
            inlet.set(&Reading {
                seq,
                value: (seq as f64).sin(),
                done,
            });
            if done {
                return Err(TaskError::fail("sample budget exhausted"));
            }
            Ok(())
        },
    )?;

    let slot = Arc::clone(&farewell);
    let consumer = registry.start_periodic(
        "consumer",
        Duration::from_millis(20),
        TimingMode::Standard,
        move || {
            if let Some(r) = channel.updated() {
                println!("[consumer] seq={} value={:.3}", r.seq, r.value);
                if r.done {
                    slot.call(());
                }
            }
            Ok(())
        },
    )?;

    println!("sampler: {:?}", registry.wait(sampler));
    std::thread::sleep(Duration::from_millis(60));
    registry.stop(consumer);
    println!("consumer: {:?}", registry.wait(consumer));
    println!("farewell still armed: {}", farewell.is_armed());

    registry.shutdown();
    Ok(())
}
