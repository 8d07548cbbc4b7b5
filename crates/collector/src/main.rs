use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use clap::Parser;

use collector::error::CollectorError;
use collector::parser::cache::SourceCache;
use collector::parser::metrics::ParsingMetrics;
use collector::runtime::cli::Cli;
use collector::runtime::follow::Follower;
use collector::runtime::{boot, oneshot};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    boot::init_logging();
    let cli = Cli::parse();

    let mut config = boot::load_config(cli.config.as_deref())?;
    cli.apply_to(&mut config);

    let metrics = Arc::new(ParsingMetrics::new());
    let scanner = boot::build_scanner(&config, Arc::clone(&metrics))?;
    if config.log_files.is_empty() {
        return Err(CollectorError::Config("no log files given".to_string()).into());
    }

    if cli.debug {
        oneshot::debug_scan_files(&scanner, &config.log_files, &mut std::io::stdout().lock()).await?;
    } else if cli.follow {
        let cutoff = boot::cutoff_before(Utc::now(), cli.since_secs.unwrap_or(config.lookback_secs))?;
        let follower = Follower::new(scanner, Arc::new(SourceCache::new()), metrics, config.max_read_bytes);
        follower
            .run(&config.log_files, Duration::from_millis(config.poll_interval_ms), cutoff)
            .await?;
    } else {
        let cutoff = match cli.since_secs {
            Some(secs) => boot::cutoff_before(Utc::now(), secs)?,
            None => DateTime::<Utc>::MIN_UTC,
        };
        oneshot::scan_files(&scanner, &config.log_files, cutoff, &mut std::io::stdout().lock()).await?;
    }

    Ok(())
}
