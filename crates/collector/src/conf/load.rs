//! Load: config loading from file and environment variables.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::model::{
    CollectorConfig, DEFAULT_LOOKBACK_SECS, DEFAULT_MAX_READ_BYTES, DEFAULT_POLL_INTERVAL_MS,
};

pub const CONFIG_FILE_ENV: &str = "COLLECTOR_CONFIG_FILE";
pub const DEFAULT_CONFIG_FILE: &str = "/etc/collector/collector.toml";

impl CollectorConfig {
    /// Load configuration from file or environment variables
    /// Priority: Environment Variables > Config File > Defaults
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path =
            std::env::var(CONFIG_FILE_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());

        if Path::new(&config_path).exists() {
            tracing::info!("Loading configuration from: {}", config_path);
            let mut config = Self::from_file(&config_path)?;
            config.apply_env_overrides();
            Ok(config)
        } else {
            tracing::info!("Config file not found at {}, using environment variables", config_path);
            Ok(Self::from_env())
        }
    }

    /// Load configuration from TOML file
    pub fn from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        let config: CollectorConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from environment variables with sensible defaults
    pub fn from_env() -> Self {
        Self {
            log_files: std::env::var("COLLECTOR_LOG_FILES")
                .map(|s| split_list(&s))
                .unwrap_or_default(),
            log_prefix: std::env::var("COLLECTOR_LOG_PREFIX").unwrap_or_default(),
            poll_interval_ms: env_parse("COLLECTOR_POLL_INTERVAL_MS").unwrap_or(DEFAULT_POLL_INTERVAL_MS),
            lookback_secs: env_parse("COLLECTOR_LOOKBACK_SECS").unwrap_or(DEFAULT_LOOKBACK_SECS),
            max_read_bytes: env_parse("COLLECTOR_MAX_READ_BYTES").unwrap_or(DEFAULT_MAX_READ_BYTES),
            analyze_durations: env_parse("COLLECTOR_ANALYZE_DURATIONS").unwrap_or(true),
        }
    }

    /// Environment variables override file config for the settings that
    /// differ per host.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(files) = std::env::var("COLLECTOR_LOG_FILES") {
            self.log_files = split_list(&files);
        }
        if let Ok(prefix) = std::env::var("COLLECTOR_LOG_PREFIX") {
            self.log_prefix = prefix;
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.parse().ok())
}

/// Comma-separated list, blanks dropped
fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
