//! Mock filesystem for tests and non-Linux builds.

mod filesystem;
mod scenarios;

pub use filesystem::MockFs;
pub use scenarios::{LEGACY_KERNEL_STAT, OPENVZ_STAT, TYPICAL_STAT};
