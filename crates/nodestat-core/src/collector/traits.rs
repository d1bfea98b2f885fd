//! Abstractions for filesystem access to enable testing and mocking.
//!
//! The `FileSystem` trait allows the collector to work with both the real
//! `/proc` filesystem on Linux and mock implementations for testing on macOS
//! or in CI.

use std::io;
use std::path::Path;

/// Abstraction for filesystem operations.
pub trait FileSystem: Send + Sync {
    /// Reads the entire contents of a file as a string.
    ///
    /// The file is opened, read and closed within the call. Bytes that are
    /// not valid UTF-8 are replaced with U+FFFD rather than failing the read.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

/// Real filesystem implementation that delegates to `std::fs`.
///
/// Use this in production to read from the actual `/proc` filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl RealFs {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for RealFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let bytes = std::fs::read(path)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_real_fs_read_to_string() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "ctxt 500000").unwrap();

        let content = RealFs::new().read_to_string(file.path()).unwrap();
        assert_eq!(content, "ctxt 500000\n");
    }

    #[test]
    fn test_real_fs_invalid_utf8_is_replaced() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"ctxt 6789\nfuture_field \xff\xfe\n").unwrap();

        let content = RealFs::new().read_to_string(file.path()).unwrap();
        assert_eq!(content, "ctxt 6789\nfuture_field \u{fffd}\u{fffd}\n");
    }

    #[test]
    fn test_real_fs_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = RealFs::new()
            .read_to_string(&dir.path().join("stat"))
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_real_fs_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = RealFs::new().read_to_string(dir.path()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::IsADirectory);
    }
}
