//! Platform clock tick rate (`USER_HZ`).
//!
//! Cpu times in `/proc/stat` are reported in clock ticks. The rate is a
//! platform setting, so it is queried from `sysconf(_SC_CLK_TCK)` once and
//! cached for the lifetime of the process.

use crate::collector::CollectError;
use std::sync::OnceLock;

static PLATFORM_TICKS: OnceLock<Result<ClockTicks, String>> = OnceLock::new();

/// Clock ticks per second used to convert tick counts into seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockTicks(u64);

impl ClockTicks {
    /// Creates a tick rate from an explicit value.
    ///
    /// Returns `None` for zero, which would make every conversion divide by zero.
    pub fn new(per_second: u64) -> Option<Self> {
        (per_second > 0).then_some(Self(per_second))
    }

    /// Queries the platform tick rate. The first successful or failed query
    /// is cached process-wide.
    pub fn platform() -> Result<Self, CollectError> {
        PLATFORM_TICKS
            .get_or_init(query_platform)
            .clone()
            .map_err(CollectError::PlatformQueryFailure)
    }

    pub fn per_second(self) -> u64 {
        self.0
    }

    /// Converts a tick count into seconds.
    pub fn to_seconds(self, ticks: f64) -> f64 {
        ticks / self.0 as f64
    }
}

#[cfg(unix)]
fn query_platform() -> Result<ClockTicks, String> {
    // SAFETY: `sysconf` has no preconditions and no side effects.
    let hz = unsafe { libc::sysconf(libc::_SC_CLK_TCK) };
    if hz <= 0 {
        return Err(format!("sysconf(_SC_CLK_TCK) returned {}", hz));
    }
    Ok(ClockTicks(hz as u64))
}

#[cfg(not(unix))]
fn query_platform() -> Result<ClockTicks, String> {
    Err("clock tick rate is not available on this platform".to_string())
}
