use nodestat_core::collector::{CollectError, FileSystem, RealFs, SourceErrorKind, StatCollector};
use nodestat_core::metrics::{Metric, Registry, Sample};
use nodestat_core::{ClockTicks, StatConfig};
use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::thread;

/// Filesystem whose `/proc/stat` content can be replaced between cycles.
#[derive(Clone, Default)]
struct SwappableFs {
    stat: Arc<Mutex<Option<String>>>,
}

impl SwappableFs {
    fn set(&self, content: &str) {
        *self.stat.lock().unwrap() = Some(content.to_string());
    }

    fn remove(&self) {
        *self.stat.lock().unwrap() = None;
    }
}

impl FileSystem for SwappableFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        assert_eq!(path, Path::new("/proc/stat"));
        self.stat
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
    }
}

fn ticks() -> ClockTicks {
    ClockTicks::new(100).unwrap()
}

fn sorted(mut samples: Vec<Sample>) -> Vec<Sample> {
    samples.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.labels.cmp(&b.labels)));
    samples
}

fn find(samples: &[Sample], name: &str, labels: &[(&str, &str)]) -> Option<f64> {
    samples
        .iter()
        .find(|s| s.name == name && labels.iter().all(|(k, v)| s.label(k) == Some(*v)))
        .map(|s| s.value)
}

const EXAMPLE: &str = "\
cpu0 100 0 50 800 10 0 0 0 5
intr 12345
ctxt 6789
btime 1600000000
procs_running 2
procs_blocked 0
";

#[test]
fn end_to_end_example() {
    let fs = SwappableFs::default();
    fs.set(EXAMPLE);
    let registry = Registry::new();
    let collector = StatCollector::new(fs, &StatConfig::default(), ticks(), &registry).unwrap();

    let samples = collector.collect().unwrap();

    let cpu = |mode: &str| find(&samples, "node_cpu", &[("cpu", "cpu0"), ("mode", mode)]).unwrap();
    assert!((cpu("user") - 1.0).abs() < 1e-9);
    assert!((cpu("nice") - 0.0).abs() < 1e-9);
    assert!((cpu("system") - 0.5).abs() < 1e-9);
    assert!((cpu("idle") - 8.0).abs() < 1e-9);
    assert!((cpu("iowait") - 0.1).abs() < 1e-9);
    assert!((cpu("guest") - 0.05).abs() < 1e-9);

    assert_eq!(find(&samples, "node_intr", &[]), Some(12345.0));
    assert_eq!(find(&samples, "node_context_switches", &[]), Some(6789.0));
    assert_eq!(find(&samples, "node_boot_time", &[]), Some(1600000000.0));
    assert_eq!(find(&samples, "node_procs_running", &[]), Some(2.0));
    assert_eq!(find(&samples, "node_procs_blocked", &[]), Some(0.0));
    // processes line absent: forks never set
    assert_eq!(find(&samples, "node_forks", &[]), None);

    assert_eq!(sorted(registry.gather()), sorted(samples));
}

#[test]
fn failed_cycle_keeps_previous_values() {
    let fs = SwappableFs::default();
    fs.set(EXAMPLE);
    let registry = Registry::new();
    let collector =
        StatCollector::new(fs.clone(), &StatConfig::default(), ticks(), &registry).unwrap();
    collector.collect().unwrap();
    let before = registry.gather();

    fs.set("cpu0 999 999 999 999\nctxt 1\nprocs_running two\n");
    let err = collector.collect().unwrap_err();
    assert!(matches!(err, CollectError::MalformedRecord(_)));
    assert_eq!(registry.gather(), before);

    fs.remove();
    let err = collector.collect().unwrap_err();
    assert_eq!(err.source_kind(), Some(SourceErrorKind::NotFound));
    assert_eq!(registry.gather(), before);
}

#[test]
fn missing_keyword_keeps_last_value() {
    let fs = SwappableFs::default();
    fs.set(EXAMPLE);
    let registry = Registry::new();
    let collector =
        StatCollector::new(fs.clone(), &StatConfig::default(), ticks(), &registry).unwrap();
    collector.collect().unwrap();

    // Next read has fewer cpu fields and no btime.
    fs.set("cpu0 200 0 60 900\nctxt 7000\n");
    let samples = collector.collect().unwrap();

    assert_eq!(find(&samples, "node_context_switches", &[]), Some(7000.0));
    assert_eq!(find(&samples, "node_boot_time", &[]), Some(1600000000.0));
    assert_eq!(
        find(&samples, "node_cpu", &[("cpu", "cpu0"), ("mode", "user")]),
        Some(2.0)
    );
    // guest was not in this read, so the earlier value stays.
    assert_eq!(
        find(&samples, "node_cpu", &[("cpu", "cpu0"), ("mode", "guest")]),
        Some(0.05)
    );
}

#[test]
fn concurrent_collection() {
    let fs = SwappableFs::default();
    fs.set(EXAMPLE);
    let registry = Registry::new();
    let collector: Arc<StatCollector<SwappableFs, Metric>> = Arc::new(
        StatCollector::new(fs, &StatConfig::default(), ticks(), &registry).unwrap(),
    );

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let collector = Arc::clone(&collector);
            thread::spawn(move || collector.collect().map(|s| s.len()))
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap().unwrap(), 14);
    }
}

#[test]
fn real_filesystem() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("stat"), EXAMPLE).unwrap();

    let registry = Registry::new();
    let config = StatConfig::default().with_proc_path(dir.path());
    let collector = StatCollector::new(RealFs::new(), &config, ticks(), &registry).unwrap();

    let samples = collector.collect().unwrap();
    assert_eq!(find(&samples, "node_intr", &[]), Some(12345.0));
}

#[test]
fn real_filesystem_missing_stat() {
    let dir = tempfile::tempdir().unwrap();
    let registry = Registry::new();
    let config = StatConfig::default().with_proc_path(dir.path());
    let collector = StatCollector::new(RealFs::new(), &config, ticks(), &registry).unwrap();

    let err = collector.collect().unwrap_err();
    assert_eq!(err.source_kind(), Some(SourceErrorKind::NotFound));
    assert!(registry.gather().is_empty());
}

#[test]
fn real_filesystem_invalid_utf8_in_unknown_line() {
    let dir = tempfile::tempdir().unwrap();
    let mut content = EXAMPLE.as_bytes().to_vec();
    content.extend_from_slice(b"future_field \xff\xfe\n");
    std::fs::write(dir.path().join("stat"), content).unwrap();

    let registry = Registry::new();
    let config = StatConfig::default().with_proc_path(dir.path());
    let collector = StatCollector::new(RealFs::new(), &config, ticks(), &registry).unwrap();

    let samples = collector.collect().unwrap();
    assert_eq!(find(&samples, "node_context_switches", &[]), Some(6789.0));
    assert_eq!(
        find(&samples, "node_cpu", &[("cpu", "cpu0"), ("mode", "user")]),
        Some(1.0)
    );
}

#[test]
fn real_filesystem_invalid_utf8_in_value() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("stat"), b"ctxt 67\xff89\n").unwrap();

    let registry = Registry::new();
    let config = StatConfig::default().with_proc_path(dir.path());
    let collector = StatCollector::new(RealFs::new(), &config, ticks(), &registry).unwrap();

    let err = collector.collect().unwrap_err();
    assert!(matches!(err, CollectError::MalformedRecord(ref e) if e.keyword == "ctxt"));
    assert!(registry.gather().is_empty());
}

#[test]
fn text_exposition_of_example() {
    let fs = SwappableFs::default();
    fs.set(EXAMPLE);
    let registry = Registry::new();
    let collector = StatCollector::new(fs, &StatConfig::default(), ticks(), &registry).unwrap();
    collector.collect().unwrap();

    let text = registry.encode_text().unwrap();
    assert!(text.contains("# HELP node_intr Total number of interrupts serviced.\n"));
    assert!(text.contains("# TYPE node_intr counter\nnode_intr 12345\n"));
    assert!(text.contains("# TYPE node_procs_running gauge\nnode_procs_running 2\n"));
    assert!(text.contains("node_cpu{cpu=\"cpu0\",mode=\"guest\"} 0.05\n"));
    assert!(!text.contains("node_forks"));
}
