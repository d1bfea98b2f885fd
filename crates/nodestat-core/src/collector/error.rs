//! Collection cycle errors.

use crate::collector::procfs::parser::ParseError;
use crate::metrics::SinkError;
use std::io;
use std::path::{Path, PathBuf};

/// Why the stat source could not be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    NotFound,
    PermissionDenied,
    IsDirectory,
    Other,
}

impl From<io::ErrorKind> for SourceErrorKind {
    fn from(kind: io::ErrorKind) -> Self {
        match kind {
            io::ErrorKind::NotFound => SourceErrorKind::NotFound,
            io::ErrorKind::PermissionDenied => SourceErrorKind::PermissionDenied,
            io::ErrorKind::IsADirectory => SourceErrorKind::IsDirectory,
            _ => SourceErrorKind::Other,
        }
    }
}

impl std::fmt::Display for SourceErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SourceErrorKind::NotFound => "not found",
            SourceErrorKind::PermissionDenied => "permission denied",
            SourceErrorKind::IsDirectory => "is a directory",
            SourceErrorKind::Other => "unreadable",
        };
        f.write_str(s)
    }
}

/// Error type for a failed collection cycle. None of these are retried.
#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    /// The stat source could not be opened or read.
    #[error("cannot read {}: {}", .path.display(), .kind)]
    SourceUnavailable {
        path: PathBuf,
        kind: SourceErrorKind,
        #[source]
        source: io::Error,
    },
    /// A recognized record carried a value that is not a number.
    #[error("malformed record: {0}")]
    MalformedRecord(#[from] ParseError),
    /// The platform clock tick rate could not be determined.
    #[error("clock tick rate query failed: {0}")]
    PlatformQueryFailure(String),
    #[error(transparent)]
    Sink(#[from] SinkError),
}

impl CollectError {
    pub(crate) fn source_unavailable(path: &Path, source: io::Error) -> Self {
        CollectError::SourceUnavailable {
            path: path.to_path_buf(),
            kind: source.kind().into(),
            source,
        }
    }

    /// Source error classification, if this is a source failure.
    pub fn source_kind(&self) -> Option<SourceErrorKind> {
        match self {
            CollectError::SourceUnavailable { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}
