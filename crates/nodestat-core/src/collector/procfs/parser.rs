//! Parser for `/proc/stat`.
//!
//! These are pure functions that turn the content of `/proc/stat` into typed
//! records. They are designed to be easily testable with string inputs.

/// Cpu time columns of a `cpuN` line, in kernel order.
///
/// Only some of these may be present, depending on kernel version. Columns
/// past `guest` (e.g. `guest_nice`) are ignored.
pub const CPU_MODES: [&str; 9] = [
    "user", "nice", "system", "idle", "iowait", "irq", "softirq", "steal", "guest",
];

/// Error type for parsing failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {keyword}: {message}")]
pub struct ParseError {
    /// 1-based line number.
    pub line: usize,
    pub keyword: String,
    pub message: String,
}

impl ParseError {
    fn new(line: usize, keyword: &str, message: impl Into<String>) -> Self {
        Self {
            line,
            keyword: keyword.to_string(),
            message: message.into(),
        }
    }
}

/// Single-value records of `/proc/stat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Interrupts,
    ContextSwitches,
    Forks,
    BootTime,
    ProcsRunning,
    ProcsBlocked,
}

impl ScalarKind {
    pub const ALL: [ScalarKind; 6] = [
        ScalarKind::Interrupts,
        ScalarKind::ContextSwitches,
        ScalarKind::Forks,
        ScalarKind::BootTime,
        ScalarKind::ProcsRunning,
        ScalarKind::ProcsBlocked,
    ];

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "intr" => Some(ScalarKind::Interrupts),
            "ctxt" => Some(ScalarKind::ContextSwitches),
            "processes" => Some(ScalarKind::Forks),
            "btime" => Some(ScalarKind::BootTime),
            "procs_running" => Some(ScalarKind::ProcsRunning),
            "procs_blocked" => Some(ScalarKind::ProcsBlocked),
            _ => None,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            ScalarKind::Interrupts => "intr",
            ScalarKind::ContextSwitches => "ctxt",
            ScalarKind::Forks => "processes",
            ScalarKind::BootTime => "btime",
            ScalarKind::ProcsRunning => "procs_running",
            ScalarKind::ProcsBlocked => "procs_blocked",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// One per-cpu line: identifier and up to 9 tick counts in [`CPU_MODES`] order.
#[derive(Debug, Clone, PartialEq)]
pub struct CpuRecord {
    pub cpu: String,
    pub ticks: Vec<f64>,
}

impl CpuRecord {
    /// Present `(mode, ticks)` pairs, in kernel order.
    pub fn modes(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        CPU_MODES.iter().copied().zip(self.ticks.iter().copied())
    }
}

/// A dispatched `/proc/stat` line.
#[derive(Debug, Clone, PartialEq)]
pub enum Record<'a> {
    Cpu(CpuRecord),
    Scalar(ScalarKind, f64),
    /// The aggregate `cpu` line. Per-cpu series can be summed downstream.
    Aggregate,
    /// Keyword this parser does not export (`page`, `softirq`, ...).
    Unknown(&'a str),
}

/// Dispatches one tokenized line on its first token.
///
/// `tokens` must be non-empty. `line` is the 1-based line number used in errors.
pub fn parse_record<'a>(tokens: &[&'a str], line: usize) -> Result<Record<'a>, ParseError> {
    let keyword = tokens[0];

    if keyword.starts_with("cpu") {
        if keyword == "cpu" {
            return Ok(Record::Aggregate);
        }
        let n = CPU_MODES.len().min(tokens.len() - 1);
        let ticks = tokens[1..=n]
            .iter()
            .map(|t| parse_value(t, line, keyword))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(Record::Cpu(CpuRecord {
            cpu: keyword.to_string(),
            ticks,
        }));
    }

    match ScalarKind::from_keyword(keyword) {
        Some(kind) => {
            let token = tokens
                .get(1)
                .ok_or_else(|| ParseError::new(line, keyword, "missing value"))?;
            Ok(Record::Scalar(kind, parse_value(token, line, keyword)?))
        }
        None => Ok(Record::Unknown(keyword)),
    }
}

fn parse_value(token: &str, line: usize, keyword: &str) -> Result<f64, ParseError> {
    token
        .parse::<f64>()
        .map_err(|_| ParseError::new(line, keyword, format!("invalid number {:?}", token)))
}

/// Everything exported from one read of `/proc/stat`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatRecords {
    pub cpus: Vec<CpuRecord>,
    scalars: [Option<f64>; 6],
}

impl StatRecords {
    /// Value of a scalar record, or `None` if the keyword was absent.
    pub fn scalar(&self, kind: ScalarKind) -> Option<f64> {
        self.scalars[kind.index()]
    }

    /// Present scalar records.
    pub fn scalars(&self) -> impl Iterator<Item = (ScalarKind, f64)> + '_ {
        ScalarKind::ALL
            .iter()
            .filter_map(|&kind| self.scalar(kind).map(|v| (kind, v)))
    }
}

/// Parses `/proc/stat` content.
///
/// Blank lines and unknown keywords are skipped. The first malformed number
/// in a recognized record fails the whole parse. A keyword that repeats keeps
/// its last value.
pub fn parse_stat(content: &str) -> Result<StatRecords, ParseError> {
    let mut stat = StatRecords::default();

    for (idx, line) in content.lines().enumerate() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            continue;
        }

        match parse_record(&tokens, idx + 1)? {
            Record::Cpu(cpu) => stat.cpus.push(cpu),
            Record::Scalar(kind, value) => stat.scalars[kind.index()] = Some(value),
            Record::Aggregate => {}
            Record::Unknown(keyword) => {
                tracing::trace!(keyword, "skipping unexported /proc/stat record");
            }
        }
    }

    Ok(stat)
}
