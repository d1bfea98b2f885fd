//! Collector configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default mount point of the proc filesystem.
pub const DEFAULT_PROC_PATH: &str = "/proc";

/// Default metric namespace, matching node exporter naming.
pub const DEFAULT_NAMESPACE: &str = "node";

/// Configuration for [`StatCollector`](crate::collector::StatCollector).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatConfig {
    /// Base path of the proc filesystem (usually "/proc").
    pub proc_path: PathBuf,
    /// Prefix joined to every metric name with `_`. Empty means no prefix.
    pub namespace: String,
}

impl Default for StatConfig {
    fn default() -> Self {
        Self {
            proc_path: PathBuf::from(DEFAULT_PROC_PATH),
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}

impl StatConfig {
    pub fn with_proc_path(mut self, proc_path: impl Into<PathBuf>) -> Self {
        self.proc_path = proc_path.into();
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Path of the stat pseudo-file under `proc_path`.
    pub fn stat_path(&self) -> PathBuf {
        self.proc_path.join("stat")
    }

    /// Fully qualified metric name for `name`.
    pub fn metric_name(&self, name: &str) -> String {
        if self.namespace.is_empty() {
            name.to_string()
        } else {
            format!("{}_{}", self.namespace, name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StatConfig::default();
        assert_eq!(config.stat_path(), PathBuf::from("/proc/stat"));
        assert_eq!(config.metric_name("cpu"), "node_cpu");
    }

    #[test]
    fn test_empty_namespace() {
        let config = StatConfig::default().with_namespace("");
        assert_eq!(config.metric_name("boot_time"), "boot_time");
    }

    #[test]
    fn test_custom_proc_path() {
        let config = StatConfig::default().with_proc_path("/host/proc");
        assert_eq!(config.stat_path(), PathBuf::from("/host/proc/stat"));
    }

    #[test]
    fn test_deserialize_partial() {
        let config: StatConfig = serde_json::from_str(r#"{"namespace": "host"}"#).unwrap();
        assert_eq!(config.namespace, "host");
        assert_eq!(config.proc_path, PathBuf::from("/proc"));
    }
}
