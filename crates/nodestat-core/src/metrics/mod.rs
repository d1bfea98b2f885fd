//! Metric sink interface.
//!
//! The collector creates its handles once through a [`MetricSink`] and then
//! only calls [`MetricHandle::set`] and [`MetricHandle::collect`] on every
//! cycle. Counters use set-absolute semantics: `/proc/stat` already reports
//! cumulative totals, so values are passed through unchanged.

mod registry;

pub use registry::{Metric, Registry};

use serde::Serialize;

/// Kind of a metric series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    /// Monotonically non-decreasing; consumers compute rates.
    Counter,
    /// Point-in-time value.
    Gauge,
}

/// One exported observation: a metric name, its label pairs and current value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    pub name: String,
    pub kind: MetricKind,
    pub labels: Vec<(String, String)>,
    pub value: f64,
}

impl Sample {
    /// Returns the value of label `name`, if present.
    pub fn label(&self, name: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Errors raised by a sink while registering, updating or encoding metrics.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SinkError {
    #[error("metric {0:?} is already registered")]
    Duplicate(String),
    #[error("invalid metric {metric:?}: {reason}")]
    Invalid { metric: String, reason: String },
    #[error("metric {metric:?} expects {expected} label values, got {got}")]
    LabelCardinality {
        metric: String,
        expected: usize,
        got: usize,
    },
    #[error("cannot encode metrics: {0}")]
    Encode(String),
}

/// A registered metric whose series can be set and collected.
pub trait MetricHandle: Send + Sync {
    /// Fully qualified metric name.
    fn name(&self) -> &str;

    /// Sets the absolute value of the series identified by `label_values`.
    ///
    /// `label_values` must match the label names given at registration, in order.
    fn set(&self, label_values: &[&str], value: f64) -> Result<(), SinkError>;

    /// Number of label values `set` expects.
    fn label_count(&self) -> usize;

    /// Returns the current state of every series of this metric.
    fn collect(&self) -> Vec<Sample>;
}

/// Creates metric handles. Handle identity is fixed at creation.
pub trait MetricSink {
    type Handle: MetricHandle;

    fn counter(
        &self,
        name: &str,
        help: &str,
        label_names: &[&str],
    ) -> Result<Self::Handle, SinkError>;

    fn gauge(&self, name: &str, help: &str) -> Result<Self::Handle, SinkError>;
}
