//! `/proc/stat` collector.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │                 StatCollector                 │
//! │  read ─► parse_stat ─► stage ─► set ─► flush  │
//! └──────┬──────────────────────────────┬─────────┘
//!        │                              │
//!  ┌─────▼──────┐                ┌──────▼──────┐
//!  │ FileSystem │ (trait)        │ MetricSink  │ (trait)
//!  └─────┬──────┘                └──────┬──────┘
//!        │                              │
//!   ┌────┴─────┐                   ┌────▼─────┐
//!   │          │                   │ Registry │
//! RealFs     MockFs                └──────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use nodestat_core::collector::{MockFs, StatCollector};
//! use nodestat_core::{ClockTicks, Registry, StatConfig};
//!
//! let registry = Registry::new();
//! let ticks = ClockTicks::new(100).unwrap();
//! let collector =
//!     StatCollector::new(MockFs::typical_system(), &StatConfig::default(), ticks, &registry)
//!         .unwrap();
//! let samples = collector.collect().unwrap();
//! assert!(!samples.is_empty());
//! ```

mod error;
pub mod mock;
pub mod procfs;
pub mod traits;

pub use error::{CollectError, SourceErrorKind};
pub use mock::MockFs;
pub use procfs::StatCollector;
pub use traits::{FileSystem, RealFs};
