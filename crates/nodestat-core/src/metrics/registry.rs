//! [`MetricSink`] backed by a `prometheus` registry.
//!
//! Every series is stored in a `GaugeVec` so it can be set to an absolute
//! value. Counters are registered through [`CounterFamily`], which re-types
//! the collected families as `COUNTER`.

use super::{MetricHandle, MetricKind, MetricSink, Sample, SinkError};
use prometheus::core::{Collector, Desc};
use prometheus::proto::{self, MetricFamily, MetricType};
use prometheus::{Encoder, GaugeVec, Opts, TextEncoder};

/// Metric registry wrapping [`prometheus::Registry`].
#[derive(Clone, Default)]
pub struct Registry {
    inner: prometheus::Registry,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry").finish_non_exhaustive()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Underlying registry, for exporters that serve it directly.
    pub fn inner(&self) -> &prometheus::Registry {
        &self.inner
    }

    /// Current state of every registered metric, families sorted by name.
    pub fn gather(&self) -> Vec<Sample> {
        samples_from_families(&self.inner.gather())
    }

    /// Encodes every registered metric in the Prometheus text format.
    pub fn encode_text(&self) -> Result<String, SinkError> {
        let mut buf = Vec::new();
        TextEncoder::new()
            .encode(&self.inner.gather(), &mut buf)
            .map_err(|e| SinkError::Encode(e.to_string()))?;
        String::from_utf8(buf).map_err(|e| SinkError::Encode(e.to_string()))
    }

    fn register(
        &self,
        name: &str,
        help: &str,
        kind: MetricKind,
        label_names: &[&str],
    ) -> Result<Metric, SinkError> {
        let values = GaugeVec::new(Opts::new(name, help), label_names)
            .map_err(|e| registration_error(name, e))?;

        let collector: Box<dyn Collector> = match kind {
            MetricKind::Counter => Box::new(CounterFamily(values.clone())),
            MetricKind::Gauge => Box::new(values.clone()),
        };
        self.inner
            .register(collector)
            .map_err(|e| registration_error(name, e))?;

        Ok(Metric {
            name: name.to_string(),
            kind,
            label_names: label_names.iter().map(|l| l.to_string()).collect(),
            values,
        })
    }
}

impl MetricSink for Registry {
    type Handle = Metric;

    fn counter(&self, name: &str, help: &str, label_names: &[&str]) -> Result<Metric, SinkError> {
        self.register(name, help, MetricKind::Counter, label_names)
    }

    fn gauge(&self, name: &str, help: &str) -> Result<Metric, SinkError> {
        self.register(name, help, MetricKind::Gauge, &[])
    }
}

fn registration_error(name: &str, err: prometheus::Error) -> SinkError {
    match err {
        prometheus::Error::AlreadyReg => SinkError::Duplicate(name.to_string()),
        other => SinkError::Invalid {
            metric: name.to_string(),
            reason: other.to_string(),
        },
    }
}

/// Exposes a `GaugeVec` as counter families.
///
/// `prometheus` counters can only be incremented, while `/proc/stat` reports
/// totals that are passed through unchanged.
#[derive(Clone)]
struct CounterFamily(GaugeVec);

impl Collector for CounterFamily {
    fn desc(&self) -> Vec<&Desc> {
        self.0.desc()
    }

    fn collect(&self) -> Vec<MetricFamily> {
        let mut families = self.0.collect();
        for family in &mut families {
            family.set_field_type(MetricType::COUNTER);
            for metric in family.mut_metric().iter_mut() {
                let mut counter = proto::Counter::default();
                counter.set_value(metric.get_gauge().get_value());
                metric.clear_gauge();
                metric.set_counter(counter);
            }
        }
        families
    }
}

/// Handle to a metric registered in a [`Registry`]. Clones share state.
///
/// A series only exists once it has been set.
#[derive(Clone)]
pub struct Metric {
    name: String,
    kind: MetricKind,
    label_names: Vec<String>,
    values: GaugeVec,
}

impl std::fmt::Debug for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metric")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("label_names", &self.label_names)
            .finish()
    }
}

impl Metric {
    pub fn kind(&self) -> MetricKind {
        self.kind
    }

    /// Current value of one series, or `None` if it was never set.
    pub fn get(&self, label_values: &[&str]) -> Option<f64> {
        if label_values.len() != self.label_names.len() {
            return None;
        }
        self.collect()
            .into_iter()
            .find(|s| {
                self.label_names
                    .iter()
                    .zip(label_values)
                    .all(|(name, value)| s.label(name) == Some(*value))
            })
            .map(|s| s.value)
    }
}

impl MetricHandle for Metric {
    fn name(&self) -> &str {
        &self.name
    }

    fn set(&self, label_values: &[&str], value: f64) -> Result<(), SinkError> {
        if label_values.len() != self.label_names.len() {
            return Err(SinkError::LabelCardinality {
                metric: self.name.clone(),
                expected: self.label_names.len(),
                got: label_values.len(),
            });
        }

        let gauge = self
            .values
            .get_metric_with_label_values(label_values)
            .map_err(|e| SinkError::Invalid {
                metric: self.name.clone(),
                reason: e.to_string(),
            })?;
        gauge.set(value);
        Ok(())
    }

    fn label_count(&self) -> usize {
        self.label_names.len()
    }

    fn collect(&self) -> Vec<Sample> {
        let families = match self.kind {
            MetricKind::Counter => CounterFamily(self.values.clone()).collect(),
            MetricKind::Gauge => self.values.collect(),
        };
        samples_from_families(&families)
    }
}

/// Flattens metric families into samples, series sorted by labels.
fn samples_from_families(families: &[MetricFamily]) -> Vec<Sample> {
    let mut samples = Vec::new();

    for family in families {
        let kind = match family.get_field_type() {
            MetricType::COUNTER => MetricKind::Counter,
            MetricType::GAUGE => MetricKind::Gauge,
            _ => continue,
        };

        let mut series: Vec<Sample> = family
            .get_metric()
            .iter()
            .map(|metric| Sample {
                name: family.get_name().to_string(),
                kind,
                labels: metric
                    .get_label()
                    .iter()
                    .map(|l| (l.get_name().to_string(), l.get_value().to_string()))
                    .collect(),
                value: match kind {
                    MetricKind::Counter => metric.get_counter().get_value(),
                    MetricKind::Gauge => metric.get_gauge().get_value(),
                },
            })
            .collect();
        series.sort_by(|a, b| a.labels.cmp(&b.labels));
        samples.extend(series);
    }

    samples
}
