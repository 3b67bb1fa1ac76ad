use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Scheduler and storage settings persisted between runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Directory holding the transactions table. Defaults to `<base>/data`.
    pub data_dir: Option<PathBuf>,
    /// Days added to the start date when a request omits its end date.
    #[serde(default = "Config::default_window_days_value")]
    pub default_window_days: u32,
    #[serde(default = "Config::default_max_occurrences_value")]
    pub max_occurrences_per_template: usize,
    /// Extra `tracing` directive applied on top of `RUST_LOG`.
    #[serde(default = "Config::default_log_filter_value")]
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            default_window_days: Self::default_window_days_value(),
            max_occurrences_per_template: Self::default_max_occurrences_value(),
            log_filter: Self::default_log_filter_value(),
        }
    }
}

impl Config {
    pub fn default_window_days_value() -> u32 {
        30
    }

    pub fn default_max_occurrences_value() -> usize {
        10_000
    }

    pub fn default_log_filter_value() -> String {
        "fintrack=info".into()
    }

    pub fn resolve_data_dir(&self, base: &Path) -> PathBuf {
        if let Some(path) = &self.data_dir {
            return path.clone();
        }
        base.join("data")
    }
}
