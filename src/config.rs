//! # Registry configuration.
//!
//! Provides [`Config`], the centralized settings of a [`Registry`](crate::Registry).
//!
//! ## Sentinel values
//! - `driver_threads = 0` → clamped to 1
//! - `thread_stack_size = 0` → platform default stack size for task threads
//! - `reap_interval = 0s` → clamped to 1ms (the reaper never busy-loops)

use std::time::Duration;

/// Configuration of a task registry.
///
/// Defines:
/// - **Reclamation**: how often finished records are reaped
/// - **Event system**: bus capacity for event delivery
/// - **Timer driver**: worker threads of the internal runtime
/// - **Precision**: spin window used by the high-precision timing modes
/// - **Task threads**: stack size of spawned task threads
///
/// ## Notes
/// All fields are public for flexibility. Prefer the helper accessors to avoid
/// sprinkling sentinel checks (`0`) across the codebase.
#[derive(Clone, Debug)]
pub struct Config {
    /// Period of the background reaper.
    ///
    /// A finished task stays visible to lookups for at most one period.
    pub reap_interval: Duration,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Minimum value is 1 (enforced by `Bus`).
    pub bus_capacity: usize,

    /// Worker threads of the timer driver runtime (`0` is treated as `1`).
    ///
    /// The driver runs timers, the reaper and subscriber workers. Task bodies
    /// never run on it.
    pub driver_threads: usize,

    /// Window before a deadline in which the high-precision modes stop sleeping
    /// and start polling the clock.
    pub spin_window: Duration,

    /// Stack size for task threads in bytes (`0` = platform default).
    pub thread_stack_size: usize,
}

impl Config {
    /// Returns the reap interval clamped to at least one millisecond.
    #[inline]
    pub fn reap_interval_clamped(&self) -> Duration {
        self.reap_interval.max(Duration::from_millis(1))
    }

    /// Returns the number of driver threads clamped to a minimum of 1.
    #[inline]
    pub fn driver_threads_clamped(&self) -> usize {
        self.driver_threads.max(1)
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Returns the configured stack size as an `Option`.
    ///
    /// - `None` → platform default
    /// - `Some(n)` → explicit stack size
    #[inline]
    pub fn stack_size(&self) -> Option<usize> {
        if self.thread_stack_size == 0 {
            None
        } else {
            Some(self.thread_stack_size)
        }
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `reap_interval = 100ms`
    /// - `bus_capacity = 1024`
    /// - `driver_threads = 1`
    /// - `spin_window = 2ms`
    /// - `thread_stack_size = 0` (platform default)
    fn default() -> Self {
        Self {
            reap_interval: Duration::from_millis(100),
            bus_capacity: 1024,
            driver_threads: 1,
            spin_window: Duration::from_millis(2),
            thread_stack_size: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinels_are_clamped() {
        let cfg = Config {
            reap_interval: Duration::ZERO,
            bus_capacity: 0,
            driver_threads: 0,
            spin_window: Duration::ZERO,
            thread_stack_size: 0,
        };
        assert_eq!(cfg.reap_interval_clamped(), Duration::from_millis(1));
        assert_eq!(cfg.bus_capacity_clamped(), 1);
        assert_eq!(cfg.driver_threads_clamped(), 1);
        assert_eq!(cfg.stack_size(), None);
    }

    #[test]
    fn test_default_reaps_every_100ms() {
        let cfg = Config::default();
        assert_eq!(cfg.reap_interval_clamped(), Duration::from_millis(100));
        assert_eq!(cfg.spin_window, Duration::from_millis(2));
    }
}
