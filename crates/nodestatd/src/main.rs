//! nodestatd - `/proc/stat` metrics daemon.
//!
//! Periodically collects cpu, interrupt and process statistics from
//! `/proc/stat` and prints the resulting samples to stdout.

use tikv_jemallocator::Jemalloc;
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::EnvFilter;

#[cfg(not(target_os = "linux"))]
use nodestat_core::collector::MockFs;
#[cfg(target_os = "linux")]
use nodestat_core::collector::RealFs;
use nodestat_core::metrics::{MetricKind, Registry, Sample};
use nodestat_core::{ClockTicks, CollectError, StatCollector, StatConfig};

/// Output format for collected samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Prometheus text exposition format.
    Text,
    /// One JSON object per sample.
    Json,
}

/// `/proc/stat` metrics daemon.
#[derive(Parser)]
#[command(name = "nodestatd", about = "/proc/stat metrics daemon", version)]
struct Args {
    /// Collection interval in seconds.
    #[arg(short, long, default_value = "10", value_parser = clap::value_parser!(u64).range(1..))]
    interval: u64,

    /// Path to /proc filesystem (for testing/mocking).
    #[arg(long, default_value = "/proc")]
    proc_path: String,

    /// Metric name prefix. Pass an empty string for none.
    #[arg(long, default_value = "node")]
    namespace: String,

    /// Clock ticks per second. Defaults to the platform value.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    clock_ticks: Option<u64>,

    /// Collect once, print and exit.
    #[arg(long)]
    once: bool,

    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

/// Initializes the tracing subscriber with the appropriate log level.
/// Logs go to stderr so stdout only carries samples.
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let mut filter = EnvFilter::from_default_env();
    for target in ["nodestatd", "nodestat_core"] {
        if let Ok(directive) = format!("{}={}", target, level).parse() {
            filter = filter.add_directive(directive);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

#[derive(Serialize)]
struct JsonSample<'a> {
    timestamp: &'a str,
    name: &'a str,
    kind: MetricKind,
    labels: BTreeMap<&'a str, &'a str>,
    value: f64,
}

/// Renders samples as JSON lines stamped with the cycle time.
fn render_json(samples: &[Sample], timestamp: &str) -> Result<String, serde_json::Error> {
    let mut out = String::new();
    for sample in samples {
        let line = JsonSample {
            timestamp,
            name: &sample.name,
            kind: sample.kind,
            labels: sample
                .labels
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str()))
                .collect(),
            value: sample.value,
        };
        out.push_str(&serde_json::to_string(&line)?);
        out.push('\n');
    }
    Ok(out)
}

fn emit(registry: &Registry, samples: &[Sample], format: Format) -> io::Result<()> {
    let rendered = match format {
        Format::Text => registry.encode_text().map_err(io::Error::other)? + "\n",
        Format::Json => {
            let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
            render_json(samples, &timestamp).map_err(io::Error::other)?
        }
    };

    let mut stdout = io::stdout().lock();
    stdout.write_all(rendered.as_bytes())?;
    stdout.flush()
}

/// Uses the `--clock-ticks` override when given, the platform rate otherwise.
fn clock_ticks(hz: Option<u64>) -> Result<ClockTicks, CollectError> {
    match hz {
        Some(hz) => ClockTicks::new(hz).ok_or_else(|| {
            CollectError::PlatformQueryFailure(format!("invalid clock tick rate {hz}"))
        }),
        None => ClockTicks::platform(),
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    info!(
        "nodestatd {} ({}) starting",
        env!("CARGO_PKG_VERSION"),
        option_env!("NODESTATD_GIT_REVISION").unwrap_or("unknown")
    );

    let ticks = match clock_ticks(args.clock_ticks) {
        Ok(ticks) => ticks,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let config = StatConfig::default()
        .with_proc_path(&args.proc_path)
        .with_namespace(&args.namespace);

    info!(
        "Config: interval={}s, source={}, namespace={:?}, clock_ticks={}",
        args.interval,
        config.stat_path().display(),
        config.namespace,
        ticks.per_second()
    );

    #[cfg(target_os = "linux")]
    let fs = RealFs::new();
    #[cfg(not(target_os = "linux"))]
    let fs = {
        warn!("Not running on Linux, collecting from a mock /proc/stat");
        MockFs::typical_system()
    };

    let registry = Registry::new();
    let collector = match StatCollector::new(fs, &config, ticks, &registry) {
        Ok(collector) => collector,
        Err(e) => {
            error!("Failed to create collector: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if args.once {
        return match collector.collect() {
            Ok(samples) => match emit(&registry, &samples, args.format) {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    error!("Failed to write samples: {}", e);
                    ExitCode::FAILURE
                }
            },
            Err(e) => {
                error!("Collection failed: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    let interval = Duration::from_secs(args.interval);

    // Setup graceful shutdown
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    if let Err(e) = ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    }) {
        warn!("Failed to set Ctrl-C handler: {}", e);
    }

    info!("Starting collection loop");
    let mut cycle_count: u64 = 0;
    let mut failures: u64 = 0;

    while running.load(Ordering::SeqCst) {
        cycle_count += 1;

        match collector.collect() {
            Ok(samples) => {
                debug!("Cycle #{}: {} samples", cycle_count, samples.len());
                if let Err(e) = emit(&registry, &samples, args.format) {
                    error!("Failed to write samples: {}", e);
                    break;
                }
            }
            Err(e) => {
                failures += 1;
                error!("Cycle #{} failed: {}", cycle_count, e);
            }
        }

        // Sleep with periodic checks for shutdown signal
        let sleep_interval = Duration::from_millis(100);
        let mut remaining = interval;
        while remaining > Duration::ZERO && running.load(Ordering::SeqCst) {
            let sleep_time = remaining.min(sleep_interval);
            std::thread::sleep(sleep_time);
            remaining = remaining.saturating_sub(sleep_time);
        }
    }

    info!(
        "Shutdown complete after {} cycles ({} failed)",
        cycle_count, failures
    );
    ExitCode::SUCCESS
}
