//! nodestat-core — `/proc/stat` collector for metric exporters.
//!
//! Provides:
//! - `collector` — filesystem seam, `/proc/stat` parser and the `StatCollector` cycle
//! - `metrics` — metric sink interface and the in-memory `Registry`
//! - `clock` — platform clock tick rate used for tick-to-seconds conversion
//! - `config` — collector configuration

pub mod clock;
pub mod collector;
pub mod config;
pub mod metrics;

pub use clock::ClockTicks;
pub use collector::{CollectError, StatCollector};
pub use config::StatConfig;
pub use metrics::{MetricKind, MetricSink, Registry, Sample};
