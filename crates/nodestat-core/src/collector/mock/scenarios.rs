//! Pre-built `/proc/stat` scenarios for testing.
//!
//! These reproduce the record shapes seen on different kernels.

use super::filesystem::MockFs;

/// Recent kernel: 10 cpu fields (the trailing `guest_nice` is ignored).
pub const TYPICAL_STAT: &str = "\
cpu  10000 500 3000 80000 1000 200 100 0 0 0
cpu0 2500 125 750 20000 250 50 25 0 0 0
cpu1 2500 125 750 20000 250 50 25 0 0 0
cpu2 2500 125 750 20000 250 50 25 0 0 0
cpu3 2500 125 750 20000 250 50 25 0 0 0
intr 1000000 50 0 0 0 0 0 0 0 1 0 0 0 100 0 0 1000
ctxt 500000
btime 1700000000
processes 10000
procs_running 2
procs_blocked 0
softirq 400000 0 100000 50 20000 0 0 30000 100000 0 150000
";

/// OpenVZ guest: no `guest` column.
pub const OPENVZ_STAT: &str = "\
cpu  4000 0 2000 90000 100 0 0 0
cpu0 2000 0 1000 45000 50 0 0 0
cpu1 2000 0 1000 45000 50 0 0 0
intr 0
ctxt 123456
btime 1650000000
processes 4321
procs_running 1
procs_blocked 0
";

/// 2.4-era kernel: only user, nice, system and idle.
pub const LEGACY_KERNEL_STAT: &str = "\
cpu  700 10 300 9000
cpu0 700 10 300 9000
page 5741 1808
swap 1 0
intr 1462898
ctxt 1200000
btime 1000000000
processes 2915
";

impl MockFs {
    /// Four cpus on a recent kernel.
    pub fn typical_system() -> Self {
        Self::with_stat("/proc", TYPICAL_STAT)
    }

    /// OpenVZ guest without the `guest` cpu column.
    pub fn openvz_guest() -> Self {
        Self::with_stat("/proc", OPENVZ_STAT)
    }

    /// Old kernel with four cpu columns and no procs_* records.
    pub fn legacy_kernel() -> Self {
        Self::with_stat("/proc", LEGACY_KERNEL_STAT)
    }
}
