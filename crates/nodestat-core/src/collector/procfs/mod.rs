//! Collectors for the Linux `/proc` filesystem.

pub mod parser;
pub mod stat;

pub use parser::{CPU_MODES, CpuRecord, ParseError, Record, ScalarKind, StatRecords, parse_stat};
pub use stat::StatCollector;
