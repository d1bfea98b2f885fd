//! Collector turning `/proc/stat` into cpu, interrupt and process metrics.

use crate::clock::ClockTicks;
use crate::collector::error::CollectError;
use crate::collector::procfs::parser::{ScalarKind, StatRecords, parse_stat};
use crate::collector::traits::FileSystem;
use crate::config::StatConfig;
use crate::metrics::{MetricHandle, MetricSink, Sample, SinkError};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::debug;

/// Handles created once at construction.
struct StatMetrics<H> {
    cpu: H,
    intr: H,
    ctxt: H,
    forks: H,
    btime: H,
    procs_running: H,
    procs_blocked: H,
}

impl<H: MetricHandle> StatMetrics<H> {
    fn register<S>(sink: &S, config: &StatConfig) -> Result<Self, SinkError>
    where
        S: MetricSink<Handle = H>,
    {
        let name = |n: &str| config.metric_name(n);
        Ok(Self {
            cpu: sink.counter(
                &name("cpu"),
                "Seconds the cpus spent in each mode.",
                &["cpu", "mode"],
            )?,
            ctxt: sink.counter(
                &name("context_switches"),
                "Total number of context switches.",
                &[],
            )?,
            intr: sink.counter(&name("intr"), "Total number of interrupts serviced.", &[])?,
            forks: sink.counter(&name("forks"), "Total number of forks.", &[])?,
            btime: sink.gauge(&name("boot_time"), "Node boot time, in unixtime.")?,
            procs_running: sink.gauge(
                &name("procs_running"),
                "Number of processes in runnable state.",
            )?,
            procs_blocked: sink.gauge(
                &name("procs_blocked"),
                "Number of processes blocked waiting for I/O to complete.",
            )?,
        })
    }

    fn scalar(&self, kind: ScalarKind) -> &H {
        match kind {
            ScalarKind::Interrupts => &self.intr,
            ScalarKind::ContextSwitches => &self.ctxt,
            ScalarKind::Forks => &self.forks,
            ScalarKind::BootTime => &self.btime,
            ScalarKind::ProcsRunning => &self.procs_running,
            ScalarKind::ProcsBlocked => &self.procs_blocked,
        }
    }

    /// Flush order of the exported metrics, same as registration order.
    fn all(&self) -> [&H; 7] {
        [
            &self.cpu,
            &self.ctxt,
            &self.intr,
            &self.forks,
            &self.btime,
            &self.procs_running,
            &self.procs_blocked,
        ]
    }
}

/// A value waiting to be written to a handle once the whole file parsed.
struct Staged<'a, H> {
    handle: &'a H,
    labels: Vec<&'a str>,
    value: f64,
}

/// Collects cpu times, interrupts, context switches, forks, boot time and
/// process counts from `/proc/stat`.
///
/// Each [`collect`](Self::collect) call is one full read of the file. Values
/// are only written to the metric handles when the whole file parsed, so a
/// failed cycle leaves the previously published values untouched.
pub struct StatCollector<F: FileSystem, H: MetricHandle> {
    fs: F,
    stat_path: PathBuf,
    ticks: ClockTicks,
    metrics: StatMetrics<H>,
    /// Serializes cycles so concurrent callers never interleave updates.
    cycle: Mutex<()>,
}

impl<F: FileSystem, H: MetricHandle> StatCollector<F, H> {
    /// Creates a collector and registers its metrics with `sink`.
    ///
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `config` - Proc path and metric namespace
    /// * `ticks` - Clock tick rate used to convert cpu times to seconds
    /// * `sink` - Sink that owns the metric handles
    pub fn new<S>(
        fs: F,
        config: &StatConfig,
        ticks: ClockTicks,
        sink: &S,
    ) -> Result<Self, CollectError>
    where
        S: MetricSink<Handle = H>,
    {
        Ok(Self {
            fs,
            stat_path: config.stat_path(),
            ticks,
            metrics: StatMetrics::register(sink, config)?,
            cycle: Mutex::new(()),
        })
    }

    pub fn stat_path(&self) -> &Path {
        &self.stat_path
    }

    pub fn clock_ticks(&self) -> ClockTicks {
        self.ticks
    }

    /// Runs one collection cycle and returns the flushed samples.
    pub fn collect(&self) -> Result<Vec<Sample>, CollectError> {
        let _cycle = self.cycle.lock().unwrap_or_else(PoisonError::into_inner);

        let content = self
            .fs
            .read_to_string(&self.stat_path)
            .map_err(|e| CollectError::source_unavailable(&self.stat_path, e))?;
        let records = parse_stat(&content)?;

        let staged = self.stage(&records)?;
        for s in &staged {
            s.handle.set(&s.labels, s.value)?;
        }

        let samples: Vec<Sample> = self
            .metrics
            .all()
            .into_iter()
            .flat_map(|m| m.collect())
            .collect();

        debug!(
            cpus = records.cpus.len(),
            updated = staged.len(),
            samples = samples.len(),
            "collected {}",
            self.stat_path.display()
        );
        Ok(samples)
    }

    /// Builds the writes for one cycle. Label counts are checked here so the
    /// commit loop cannot fail halfway through.
    fn stage<'a>(&'a self, records: &'a StatRecords) -> Result<Vec<Staged<'a, H>>, SinkError> {
        let mut staged = Vec::new();

        for cpu in &records.cpus {
            for (mode, ticks) in cpu.modes() {
                staged.push(Staged {
                    handle: &self.metrics.cpu,
                    labels: vec![cpu.cpu.as_str(), mode],
                    value: self.ticks.to_seconds(ticks),
                });
            }
        }

        for (kind, value) in records.scalars() {
            staged.push(Staged {
                handle: self.metrics.scalar(kind),
                labels: Vec::new(),
                value,
            });
        }

        for s in &staged {
            let expected = s.handle.label_count();
            if s.labels.len() != expected {
                return Err(SinkError::LabelCardinality {
                    metric: s.handle.name().to_string(),
                    expected,
                    got: s.labels.len(),
                });
            }
        }

        Ok(staged)
    }
}
