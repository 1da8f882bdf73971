//! # Task registry: launch, track, stop and reclaim thread-backed tasks.
//!
//! A [`Registry`] runs every task body on its own OS thread and keeps one
//! [`TaskInfo`] record per launched task until the reaper reclaims it.
//!
//! ## Architecture
//! ```text
//! start / start_after / start_periodic
//!     │  write lock: insert record (+ token for periodic)
//!     ├──► std::thread::Builder::spawn ──► runner::{invoke, run_delayed, run_periodic}
//!     │        │                                 └─► Completer::complete(outcome)
//!     │        └─► Bus: TaskStarted / TaskFinished / TaskFailed
//!     └──► returns once the thread runs
//!
//! driver runtime (tokio, owned by the registry)
//!     ├─► timers used by task threads (DriverClock)
//!     ├─► reaper: sweep finished records every reap_interval
//!     └─► subscriber listener: Bus ─► SubscriberSet::emit
//! ```
//!
//! ## Rules
//! - One reader/writer lock guards the record map and the token map together.
//! - A periodic task's token is a child of the registry root token.
//! - Delayed tasks observe only the root token: they cannot be stopped one by one.
//! - `stop` never removes a record; the reaper does, after the task finished.
//! - Teardown signals periodic tokens, then the root, then stops the reaper and
//!   clears the table. Running threads are not joined.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use taskreg::{Config, Registry, TimingMode};
//!
//! let registry = Registry::new(Config::default()).unwrap();
//! let id = registry
//!     .start_periodic("tick", Duration::from_millis(10), TimingMode::Standard, || Ok(()))
//!     .unwrap();
//!
//! std::thread::sleep(Duration::from_millis(35));
//! registry.stop(id);
//! assert_eq!(registry.wait(id), Some(Ok(())));
//! ```

use std::sync::mpsc as std_mpsc;
use std::sync::{Arc, OnceLock};
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::{Mutex, RwLock};
use tokio::runtime::{Handle, Runtime};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::core::{reaper, runner, table::Table};
use crate::error::{RegistryError, TaskError};
use crate::events::{Bus, Event, EventKind};
use crate::subscribers::{Subscribe, SubscriberSet};
use crate::sync::SingleAsyncExecutor;
use crate::tasks::{Outcome, TaskId, TaskInfo, TaskKind, completion_pair};
use crate::timing::{Clock, DriverClock, Pacer, TimingMode};

static GLOBAL: OnceLock<Registry> = OnceLock::new();

/// Registry of thread-backed one-shot, delayed and periodic tasks.
pub struct Registry {
    cfg: Config,
    table: Arc<RwLock<Table>>,
    bus: Bus,
    /// Parent of every periodic token; observed by delayed tasks.
    root: CancellationToken,
    reaper_token: CancellationToken,
    reaper: Mutex<Option<JoinHandle<()>>>,
    clock: Arc<dyn Clock>,
    handle: Handle,
    runtime: Option<Runtime>,
}

impl Registry {
    /// Creates a registry with its own driver runtime and a running reaper.
    pub fn new(cfg: Config) -> Result<Self, RegistryError> {
        Self::with_subscribers(cfg, Vec::new())
    }

    /// Creates a registry whose lifecycle events are fanned out to `subscribers`.
    pub fn with_subscribers(
        cfg: Config,
        subscribers: Vec<Arc<dyn Subscribe>>,
    ) -> Result<Self, RegistryError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(cfg.driver_threads_clamped())
            .thread_name("taskreg-driver")
            .enable_time()
            .build()
            .map_err(|source| RegistryError::Driver { source })?;
        let handle = runtime.handle().clone();

        let bus = Bus::new(cfg.bus_capacity_clamped());
        if !subscribers.is_empty() {
            let set = SubscriberSet::new(subscribers, bus.clone(), &handle);
            Self::subscriber_listener(&handle, &bus, set);
        }

        let table = Arc::new(RwLock::new(Table::default()));
        let reaper_token = CancellationToken::new();
        let reaper = reaper::spawn(
            &handle,
            Arc::clone(&table),
            bus.clone(),
            cfg.reap_interval_clamped(),
            reaper_token.clone(),
        );

        Ok(Self {
            clock: Arc::new(DriverClock::new(handle.clone())),
            cfg,
            table,
            bus,
            root: CancellationToken::new(),
            reaper_token,
            reaper: Mutex::new(Some(reaper)),
            handle,
            runtime: Some(runtime),
        })
    }

    /// Process-wide registry with the default configuration, created on first use.
    ///
    /// It lives until process exit; calling [`Registry::shutdown`] on it is final.
    pub fn global() -> Result<&'static Registry, RegistryError> {
        if let Some(registry) = GLOBAL.get() {
            return Ok(registry);
        }
        let fresh = Registry::new(Config::default())?;
        Ok(GLOBAL.get_or_init(|| fresh))
    }

    /// Forwards bus events to the subscriber set (fire-and-forget).
    fn subscriber_listener(handle: &Handle, bus: &Bus, set: SubscriberSet) {
        let mut rx = bus.subscribe();
        handle.spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(ev) => set.emit(&ev),
                    Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => break,
                }
            }
            set.shutdown().await;
        });
    }

    /// Launches `f` once on a new thread.
    ///
    /// Returns after the thread is running and its record is visible to lookups.
    pub fn start<F>(&self, name: impl Into<Arc<str>>, f: F) -> Result<TaskId, RegistryError>
    where
        F: FnOnce() -> Result<(), TaskError> + Send + 'static,
    {
        self.launch(name.into(), TaskKind::OneShot, None, move || runner::invoke(f))
    }

    /// Launches `f` once, `delay` after this call.
    ///
    /// The task cannot be stopped individually; teardown before the deadline
    /// completes it with `Ok(())` without running `f`. A delay too large to
    /// schedule (such as `Duration::MAX`) never fires.
    pub fn start_after<F>(
        &self,
        name: impl Into<Arc<str>>,
        delay: Duration,
        f: F,
    ) -> Result<TaskId, RegistryError>
    where
        F: FnOnce() -> Result<(), TaskError> + Send + 'static,
    {
        let deadline = Instant::now().checked_add(delay);
        let clock = Arc::clone(&self.clock);
        let shutdown = self.root.clone();

        self.launch(name.into(), TaskKind::Delayed { delay }, None, move || {
            runner::run_delayed(f, deadline, clock.as_ref(), &shutdown)
        })
    }

    /// Launches `f` every `interval` until [`Registry::stop`], teardown, or the
    /// first error returned by `f`.
    ///
    /// The first invocation happens immediately; later ones start at
    /// `launch + k * interval` as measured by the pacer of `mode`.
    pub fn start_periodic<F>(
        &self,
        name: impl Into<Arc<str>>,
        interval: Duration,
        mode: TimingMode,
        f: F,
    ) -> Result<TaskId, RegistryError>
    where
        F: FnMut() -> Result<(), TaskError> + Send + 'static,
    {
        let token = self.root.child_token();
        let pacer = Pacer::new(Arc::clone(&self.clock), mode, self.cfg.spin_window);
        let kind = TaskKind::Periodic {
            interval,
            mode: pacer.mode(),
        };
        let loop_token = token.clone();

        self.launch(name.into(), kind, Some(token), move || {
            runner::run_periodic(f, interval, &pacer, &loop_token)
        })
    }

    /// Inserts the record, spawns the thread and waits for it to start.
    fn launch<B>(
        &self,
        name: Arc<str>,
        kind: TaskKind,
        cancel: Option<CancellationToken>,
        body: B,
    ) -> Result<TaskId, RegistryError>
    where
        B: FnOnce() -> Outcome + Send + 'static,
    {
        let id = TaskId::next();
        let (completer, completion) = completion_pair();
        {
            let mut table = self.table.write();
            if table.closed {
                return Err(RegistryError::ShutDown);
            }
            table.insert(TaskInfo::new(id, Arc::clone(&name), kind, completion), cancel);
        }

        let interval = match kind {
            TaskKind::Periodic { interval, .. } => Some(interval),
            _ => None,
        };
        let bus = self.bus.clone();
        let thread_name = Arc::clone(&name);
        let (started_tx, started_rx) = std_mpsc::sync_channel::<()>(1);

        // Thread names may not contain NUL.
        let mut builder = thread::Builder::new().name(name.replace('\0', ""));
        if let Some(size) = self.cfg.stack_size() {
            builder = builder.stack_size(size);
        }
        let spawned = builder.spawn(move || {
            runner::publish_started(&bus, &thread_name, id, interval);
            let _ = started_tx.send(());

            let outcome = body();
            runner::publish_outcome(&bus, &thread_name, id, &outcome);
            completer.complete(outcome);
        });

        match spawned {
            Ok(_detached) => {
                let _ = started_rx.recv();
                Ok(id)
            }
            Err(source) => {
                self.table.write().remove(id);
                Err(RegistryError::Spawn {
                    name: name.to_string(),
                    source,
                })
            }
        }
    }

    /// Requests a periodic task to stop before its next invocation.
    ///
    /// Returns `false` (and does nothing) for unknown ids and for tasks that are
    /// not periodic. The record stays visible until the reaper reclaims it.
    pub fn stop(&self, id: TaskId) -> bool {
        let table = self.table.read();
        let Some(token) = table.cancels.get(&id) else {
            return false;
        };
        token.cancel();

        let ev = Event::new(EventKind::StopRequested).with_id(id);
        self.bus.publish(match table.tasks.get(&id) {
            Some(info) => ev.with_task(info.name()),
            None => ev,
        });
        true
    }

    /// Blocks until task `id` completes and returns its outcome.
    ///
    /// Returns `None` if `id` is unknown or was already reaped. The table lock
    /// is not held while waiting.
    pub fn wait(&self, id: TaskId) -> Option<Outcome> {
        let info = self.lookup_by_id(id)?;
        Some(info.wait())
    }

    /// Async variant of [`Registry::wait`].
    pub async fn wait_async(&self, id: TaskId) -> Option<Outcome> {
        let info = self.lookup_by_id(id)?;
        Some(info.completion().wait_async().await)
    }

    /// Snapshots of every tracked task named `name`, ordered by launch.
    pub fn lookup_by_name(&self, name: &str) -> Vec<TaskInfo> {
        let table = self.table.read();
        let mut found: Vec<TaskInfo> = table
            .tasks
            .values()
            .filter(|info| info.name() == name)
            .cloned()
            .collect();
        found.sort_unstable_by_key(|info| info.id());
        found
    }

    pub fn lookup_by_id(&self, id: TaskId) -> Option<TaskInfo> {
        self.table.read().tasks.get(&id).cloned()
    }

    pub fn has_name(&self, name: &str) -> bool {
        self.table.read().tasks.values().any(|info| info.name() == name)
    }

    pub fn has_id(&self, id: TaskId) -> bool {
        self.table.read().tasks.contains_key(&id)
    }

    /// Number of tracked records, finished ones included until reaped.
    pub fn len(&self) -> usize {
        self.table.read().tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.read().tasks.is_empty()
    }

    /// Subscribes to lifecycle events.
    pub fn events(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Handle of the driver runtime.
    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    /// Creates a [`SingleAsyncExecutor`] running on the driver's blocking pool.
    pub fn single_executor<R: Send + 'static>(&self) -> SingleAsyncExecutor<R> {
        SingleAsyncExecutor::new(self.handle.clone())
    }

    pub fn is_shut_down(&self) -> bool {
        self.table.read().closed
    }

    /// Tears the registry down. Idempotent.
    ///
    /// 1. refuses further launches and publishes `ShutdownRequested`
    /// 2. cancels every periodic token, then the root token
    /// 3. stops and joins the reaper
    /// 4. clears the table and publishes `ShutdownComplete`
    ///
    /// Task threads are not joined: a body in progress finishes on its own.
    /// Must not be called from a subscriber (it blocks on the driver runtime).
    pub fn shutdown(&self) {
        let tokens: Vec<CancellationToken> = {
            let mut table = self.table.write();
            if table.closed {
                return;
            }
            table.closed = true;
            table.cancels.values().cloned().collect()
        };
        self.bus.publish(Event::new(EventKind::ShutdownRequested));

        for token in &tokens {
            token.cancel();
        }
        self.root.cancel();

        self.reaper_token.cancel();
        if let Some(reaper) = self.reaper.lock().take() {
            let _ = futures::executor::block_on(reaper);
        }

        {
            let mut table = self.table.write();
            table.tasks.clear();
            table.cancels.clear();
        }
        self.bus.publish(Event::new(EventKind::ShutdownComplete));
    }
}

impl Drop for Registry {
    fn drop(&mut self) {
        self.shutdown();
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}
