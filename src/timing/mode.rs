/// Precision/CPU tradeoff used between two invocations of a periodic task.
///
/// | mode                | jitter  | CPU cost |
/// |---------------------|---------|----------|
/// | `Standard`          | highest | lowest   |
/// | `HighResolution`    | low     | moderate |
/// | `SystemPerformance` | lowest  | highest  |
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TimingMode {
    /// Coarse timed wait on the timer driver.
    #[default]
    Standard,
    /// Coarse wait, then yield-poll through the final spin window.
    HighResolution,
    /// Short sleep slices, then busy-poll of the hardware counter.
    ///
    /// Degrades to [`TimingMode::HighResolution`] where no counter is available.
    SystemPerformance,
}

impl TimingMode {
    /// Returns the mode actually used on this platform.
    pub fn effective(self) -> Self {
        match self {
            TimingMode::SystemPerformance if !has_performance_counter() => {
                TimingMode::HighResolution
            }
            other => other,
        }
    }

    /// Returns a short stable label (snake_case) for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            TimingMode::Standard => "standard",
            TimingMode::HighResolution => "high_resolution",
            TimingMode::SystemPerformance => "system_performance",
        }
    }
}

/// Reports whether [`std::time::Instant`] is backed by a hardware monotonic
/// counter on this target (QueryPerformanceCounter, `CLOCK_MONOTONIC`,
/// `mach_absolute_time`).
pub const fn has_performance_counter() -> bool {
    cfg!(any(windows, unix))
}
