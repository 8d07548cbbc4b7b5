//! Boot: logging init, config load, scanner construction.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::conf::CollectorConfig;
use crate::error::CollectorError;
use crate::logs::{DurationAnalyzer, LogAnalyzer, LogScanner, PassthroughAnalyzer};
use crate::parser::metrics::ParsingMetrics;

/// Initialise the tracing / logging subsystem.
///
/// Logs go to stderr; stdout carries the JSON record stream.
pub fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "collector=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Load configuration from `path` when given, otherwise from the default
/// file location or the environment.
pub fn load_config(path: Option<&str>) -> Result<CollectorConfig, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => {
            info!("Loading configuration from: {}", path);
            let mut config = CollectorConfig::from_file(path)?;
            config.apply_env_overrides();
            config
        }
        None => CollectorConfig::load()?,
    };
    Ok(config)
}

/// Validate `config` and build the scanner it describes.
pub fn build_scanner(
    config: &CollectorConfig,
    metrics: Arc<ParsingMetrics>,
) -> Result<LogScanner, CollectorError> {
    config.validate().map_err(CollectorError::Config)?;

    let analyzer: Arc<dyn LogAnalyzer> = if config.analyze_durations {
        Arc::new(DurationAnalyzer)
    } else {
        Arc::new(PassthroughAnalyzer)
    };

    let prefix = config.prefix();
    info!(
        "Log prefix: {}, duration analysis: {}",
        prefix.map_or("auto-detect", |p| p.name()),
        config.analyze_durations
    );

    Ok(LogScanner::new(analyzer)
        .with_prefix(prefix)
        .with_metrics(metrics))
}

/// The cutoff `secs` seconds before `now`.
///
/// Fails instead of panicking when `secs` reaches past the representable
/// time range.
pub fn cutoff_before(now: DateTime<Utc>, secs: u64) -> Result<DateTime<Utc>, CollectorError> {
    i64::try_from(secs)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .and_then(|delta| now.checked_sub_signed(delta))
        .ok_or_else(|| CollectorError::Config(format!("since_secs {} is out of range", secs)))
}
