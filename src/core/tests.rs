use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::config::Config;
use crate::core::Registry;
use crate::error::{RegistryError, TaskError};
use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;
use crate::tasks::{TaskId, TaskKind};
use crate::timing::TimingMode;

fn registry(reap: Duration) -> Registry {
    Registry::new(Config {
        reap_interval: reap,
        ..Config::default()
    })
    .unwrap()
}

#[test]
fn test_record_is_visible_when_start_returns() {
    let reg = registry(Duration::from_millis(50));
    let release = Arc::new(AtomicBool::new(false));

    let r = release.clone();
    let id = reg
        .start("worker", move || {
            while !r.load(Ordering::Acquire) {
                std::thread::sleep(Duration::from_millis(1));
            }
            Ok(())
        })
        .unwrap();

    let info = reg.lookup_by_id(id).expect("record present");
    assert_eq!(info.name(), "worker");
    assert_eq!(info.kind(), TaskKind::OneShot);
    assert!(!info.is_finished());
    assert!(reg.has_name("worker"));
    assert!(reg.has_id(id));

    release.store(true, Ordering::Release);
    assert_eq!(reg.wait(id), Some(Ok(())));
}

#[test]
fn test_errors_and_panics_reach_the_waiter() {
    let reg = registry(Duration::from_secs(5));

    let failed = reg.start("fails", || Err(TaskError::fail("bad input"))).unwrap();
    let panicked = reg.start("panics", || panic!("boom")).unwrap();

    assert_eq!(reg.wait(failed), Some(Err(TaskError::fail("bad input"))));
    assert_eq!(
        reg.wait(panicked),
        Some(Err(TaskError::Panicked {
            message: "boom".into()
        }))
    );
}

#[test]
fn test_finished_task_is_reaped_within_one_interval() {
    let reap = Duration::from_millis(50);
    let slack = Duration::from_millis(40);
    let reg = registry(reap);

    let id = reg.start("quick", || Ok(())).unwrap();
    let snapshot = reg.lookup_by_id(id).unwrap();
    assert_eq!(reg.wait(id), Some(Ok(())));
    let finished = Instant::now();

    // Still listed right after completion, unless a sweep landed in between.
    let listed = reg.has_id(id);
    assert!(listed || finished.elapsed() < Duration::from_millis(5));

    while reg.has_id(id) {
        assert!(
            finished.elapsed() <= reap + slack,
            "record outlived one reap interval: {:?}",
            finished.elapsed()
        );
        std::thread::sleep(Duration::from_millis(1));
    }
    assert!(finished.elapsed() <= reap + slack);

    assert!(reg.lookup_by_name("quick").is_empty());
    assert_eq!(reg.wait(id), None);
    assert!(reg.is_empty());

    // The snapshot outlives the record.
    assert_eq!(snapshot.wait(), Ok(()));
}

#[test]
fn test_stopped_periodic_stays_visible_until_reaped() {
    let reap = Duration::from_millis(50);
    let reg = registry(reap);

    let id = reg
        .start_periodic(
            "poller",
            Duration::from_millis(5),
            TimingMode::Standard,
            || Ok(()),
        )
        .unwrap();
    std::thread::sleep(Duration::from_millis(20));

    assert!(reg.stop(id));
    assert!(reg.has_id(id), "stop must not remove the record");
    assert_eq!(reg.wait(id), Some(Ok(())));

    std::thread::sleep(reap * 3);
    assert!(!reg.has_id(id));
}

#[test]
fn test_heartbeat_invocation_count() {
    let reg = registry(Duration::from_millis(100));
    let count = Arc::new(AtomicUsize::new(0));

    let c = count.clone();
    let id = reg
        .start_periodic(
            "heartbeat",
            Duration::from_millis(50),
            TimingMode::HighResolution,
            move || {
                c.fetch_add(1, Ordering::SeqCst);
                Ok(())
            },
        )
        .unwrap();

    std::thread::sleep(Duration::from_millis(260));
    reg.stop(id);
    assert_eq!(reg.wait(id), Some(Ok(())));

    let n = count.load(Ordering::SeqCst);
    assert!((4..=6).contains(&n), "unexpected invocation count {n}");
}

#[test]
fn test_every_timing_mode_runs_and_stops() {
    let reg = registry(Duration::from_millis(100));

    for mode in [
        TimingMode::Standard,
        TimingMode::HighResolution,
        TimingMode::SystemPerformance,
    ] {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let id = reg
            .start_periodic("moded", Duration::from_millis(10), mode, move || {
                c.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .unwrap();

        std::thread::sleep(Duration::from_millis(45));
        reg.stop(id);
        assert_eq!(reg.wait(id), Some(Ok(())));
        assert!(count.load(Ordering::SeqCst) >= 3, "{mode:?}");
    }
}

#[test]
fn test_periodic_error_ends_the_loop() {
    let reg = registry(Duration::from_millis(100));
    let count = Arc::new(AtomicUsize::new(0));

    let c = count.clone();
    let id = reg
        .start_periodic(
            "flaky",
            Duration::from_millis(5),
            TimingMode::Standard,
            move || {
                if c.fetch_add(1, Ordering::SeqCst) == 2 {
                    return Err(TaskError::fail("third time"));
                }
                Ok(())
            },
        )
        .unwrap();

    assert_eq!(reg.wait(id), Some(Err(TaskError::fail("third time"))));
    std::thread::sleep(Duration::from_millis(30));
    assert_eq!(count.load(Ordering::SeqCst), 3);
}

#[test]
fn test_delayed_task_fires_after_delay() {
    let reg = registry(Duration::from_millis(100));
    let fired_at = Arc::new(Mutex::new(None));

    let launched = Instant::now();
    let slot = fired_at.clone();
    let id = reg
        .start_after("later", Duration::from_millis(60), move || {
            *slot.lock() = Some(Instant::now());
            Ok(())
        })
        .unwrap();

    assert_eq!(
        reg.lookup_by_id(id).unwrap().kind(),
        TaskKind::Delayed {
            delay: Duration::from_millis(60)
        }
    );
    assert_eq!(reg.wait(id), Some(Ok(())));

    let fired = fired_at.lock().expect("body ran");
    assert!(fired.duration_since(launched) >= Duration::from_millis(60));
}

#[test]
fn test_delayed_task_cannot_be_stopped_individually() {
    let reg = registry(Duration::from_millis(100));
    let id = reg
        .start_after("later", Duration::from_millis(20), || Ok(()))
        .unwrap();
    assert!(!reg.stop(id));
    assert_eq!(reg.wait(id), Some(Ok(())));
}

#[test]
fn test_teardown_before_deadline_skips_delayed_body() {
    let reg = registry(Duration::from_millis(100));
    let ran = Arc::new(AtomicBool::new(false));

    let r = ran.clone();
    let id = reg
        .start_after("never", Duration::from_secs(30), move || {
            r.store(true, Ordering::SeqCst);
            Ok(())
        })
        .unwrap();
    let info = reg.lookup_by_id(id).unwrap();

    reg.shutdown();
    assert_eq!(info.wait(), Ok(()));
    assert!(!ran.load(Ordering::SeqCst));
}

#[test]
fn test_teardown_stops_periodic_tasks_and_refuses_launches() {
    let reg = registry(Duration::from_millis(100));
    let id = reg
        .start_periodic("loop", Duration::from_millis(5), TimingMode::Standard, || Ok(()))
        .unwrap();
    let info = reg.lookup_by_id(id).unwrap();

    reg.shutdown();
    assert_eq!(info.wait(), Ok(()));
    assert!(reg.is_shut_down());
    assert!(reg.is_empty());
    assert!(matches!(
        reg.start("late", || Ok(())),
        Err(RegistryError::ShutDown)
    ));

    // Idempotent.
    reg.shutdown();
}

#[test]
fn test_unknown_ids_are_ignored() {
    let reg = registry(Duration::from_millis(100));
    let ghost = TaskId::next();

    assert!(!reg.stop(ghost));
    assert_eq!(reg.wait(ghost), None);
    assert!(reg.lookup_by_id(ghost).is_none());

    let one_shot = reg.start("plain", || Ok(())).unwrap();
    assert!(!reg.stop(one_shot));
}

#[test]
fn test_lookup_by_name_returns_all_matches_in_launch_order() {
    let reg = registry(Duration::from_secs(5));
    let gate = Arc::new(AtomicBool::new(false));

    let ids: Vec<TaskId> = (0..3)
        .map(|_| {
            let g = gate.clone();
            reg.start("twin", move || {
                while !g.load(Ordering::Acquire) {
                    std::thread::sleep(Duration::from_millis(1));
                }
                Ok(())
            })
            .unwrap()
        })
        .collect();
    reg.start("other", || Ok(())).unwrap();

    let found: Vec<TaskId> = reg.lookup_by_name("twin").iter().map(|i| i.id()).collect();
    assert_eq!(found, ids);
    assert_eq!(reg.len(), 4);

    gate.store(true, Ordering::Release);
    for id in ids {
        assert_eq!(reg.wait(id), Some(Ok(())));
    }
}

#[test]
fn test_events_follow_task_lifecycle() {
    let reg = registry(Duration::from_millis(20));
    let mut rx = reg.events();

    let id = reg.start("evented", || Ok(())).unwrap();
    reg.wait(id);
    std::thread::sleep(Duration::from_millis(80));

    let kinds: Vec<EventKind> = std::iter::from_fn(|| rx.try_recv().ok())
        .filter(|ev| ev.id == Some(id))
        .map(|ev| ev.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![
            EventKind::TaskStarted,
            EventKind::TaskFinished,
            EventKind::TaskReaped
        ]
    );
}

struct Recorder(Arc<Mutex<Vec<EventKind>>>);

#[async_trait]
impl Subscribe for Recorder {
    async fn on_event(&self, ev: &Event) {
        self.0.lock().push(ev.kind);
    }
    fn name(&self) -> &'static str {
        "recorder"
    }
}

#[test]
fn test_subscribers_receive_events() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(Recorder(seen.clone()))];
    let reg = Registry::with_subscribers(Config::default(), subs).unwrap();

    let id = reg.start("watched", || Err(TaskError::fail("nope"))).unwrap();
    reg.wait(id);

    let deadline = Instant::now() + Duration::from_secs(2);
    while !seen.lock().contains(&EventKind::TaskFailed) && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(5));
    }
    let seen = seen.lock();
    assert!(seen.contains(&EventKind::TaskStarted));
    assert!(seen.contains(&EventKind::TaskFailed));
}

#[tokio::test]
async fn test_wait_async_from_foreign_runtime() {
    let reg = registry(Duration::from_millis(100));
    let id = reg
        .start("async", || {
            std::thread::sleep(Duration::from_millis(10));
            Ok(())
        })
        .unwrap();
    assert_eq!(reg.wait_async(id).await, Some(Ok(())));
}

#[test]
fn test_single_executor_runs_on_driver() {
    let reg = registry(Duration::from_millis(100));
    let exec = reg.single_executor::<()>();
    let (tx, rx) = std::sync::mpsc::channel();

    assert!(exec.submit_exclusive(move || {
        std::thread::sleep(Duration::from_millis(30));
        let _ = tx.send(());
    }));
    assert!(!exec.submit_exclusive(|| {}));
    rx.recv_timeout(Duration::from_secs(2)).unwrap();
}

#[test]
fn test_global_registry_is_shared() {
    let a = Registry::global().unwrap();
    let b = Registry::global().unwrap();
    assert!(std::ptr::eq(a, b));

    let id = a.start("global-task", || Ok(())).unwrap();
    assert_eq!(b.wait(id), Some(Ok(())));
}

#[test]
fn test_stopping_one_periodic_leaves_the_others_running() {
    let reg = registry(Duration::from_millis(30));
    let counters: Vec<Arc<AtomicUsize>> = (0..3).map(|_| Arc::new(AtomicUsize::new(0))).collect();

    let ids: Vec<TaskId> = counters
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let c = c.clone();
            reg.start_periodic(
                format!("pool-{i}"),
                Duration::from_millis(10),
                TimingMode::Standard,
                move || {
                    c.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                },
            )
            .unwrap()
        })
        .collect();

    std::thread::sleep(Duration::from_millis(30));
    assert!(reg.stop(ids[0]));
    assert_eq!(reg.wait(ids[0]), Some(Ok(())));
    std::thread::sleep(Duration::from_millis(100));

    assert!(reg.lookup_by_name("pool-0").is_empty());
    for (i, id) in ids.iter().enumerate().skip(1) {
        let found = reg.lookup_by_name(&format!("pool-{i}"));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id(), *id);
        assert!(!found[0].is_finished());
    }

    let before: Vec<usize> = counters[1..].iter().map(|c| c.load(Ordering::SeqCst)).collect();
    std::thread::sleep(Duration::from_millis(50));
    for (c, b) in counters[1..].iter().zip(before) {
        assert!(c.load(Ordering::SeqCst) > b, "surviving task stopped counting");
    }
}

#[test]
fn test_unschedulable_delay_never_fires_and_ends_on_teardown() {
    let reg = registry(Duration::from_millis(100));
    let ran = Arc::new(AtomicBool::new(false));

    let r = ran.clone();
    let id = reg
        .start_after("never", Duration::MAX, move || {
            r.store(true, Ordering::SeqCst);
            Ok(())
        })
        .unwrap();
    let info = reg.lookup_by_id(id).unwrap();

    std::thread::sleep(Duration::from_millis(30));
    assert!(!info.is_finished());

    reg.shutdown();
    assert_eq!(info.wait(), Ok(()));
    assert!(!ran.load(Ordering::SeqCst));
}

#[test]
fn test_unschedulable_interval_runs_once_until_stopped() {
    let reg = registry(Duration::from_millis(100));
    let count = Arc::new(AtomicUsize::new(0));

    let c = count.clone();
    let id = reg
        .start_periodic("once", Duration::MAX, TimingMode::Standard, move || {
            c.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .unwrap();

    std::thread::sleep(Duration::from_millis(30));
    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert!(reg.stop(id));
    assert_eq!(reg.wait(id), Some(Ok(())));
}
