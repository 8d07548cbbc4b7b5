//! Model: CollectorConfig.

use serde::{Deserialize, Serialize};

use crate::parser::{is_supported_prefix, LogPrefix};

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_LOOKBACK_SECS: u64 = 600;
pub const DEFAULT_MAX_READ_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// Log files to scan or follow
    pub log_files: Vec<String>,
    /// The server's `log_line_prefix`; empty means auto-detect per line
    pub log_prefix: String,
    pub poll_interval_ms: u64,
    /// How far back the first follow poll accepts records
    pub lookback_secs: u64,
    /// Upper bound on bytes read from one file per poll
    pub max_read_bytes: u64,
    /// Derive query samples from `duration:` records
    pub analyze_durations: bool,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            log_files: Vec::new(),
            log_prefix: String::new(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            lookback_secs: DEFAULT_LOOKBACK_SECS,
            max_read_bytes: DEFAULT_MAX_READ_BYTES,
            analyze_durations: true,
        }
    }
}

impl CollectorConfig {
    /// Grammar to force on every line, or `None` to auto-detect.
    pub fn prefix(&self) -> Option<LogPrefix> {
        match LogPrefix::from_template(&self.log_prefix) {
            Some(LogPrefix::Empty) | None => None,
            Some(prefix) => Some(prefix),
        }
    }

    /// Check that configuration values are usable.
    pub fn validate(&self) -> Result<(), String> {
        if !is_supported_prefix(&self.log_prefix) {
            return Err(format!("log_prefix {:?} is not a supported log_line_prefix", self.log_prefix));
        }
        if self.poll_interval_ms == 0 {
            return Err("poll_interval_ms must be > 0".to_string());
        }
        if self.max_read_bytes == 0 {
            return Err("max_read_bytes must be > 0".to_string());
        }
        if self.log_files.iter().any(|f| f.is_empty()) {
            return Err("log_files must not contain empty paths".to_string());
        }
        Ok(())
    }
}
