use clap::Parser;

use crate::conf::CollectorConfig;

/// Command-line interface for the log collector
#[derive(Parser, Debug)]
#[command(name = "collector")]
#[command(about = "Parse PostgreSQL server logs into structured records")]
pub struct Cli {
    /// Configuration file (defaults to $COLLECTOR_CONFIG_FILE or /etc/collector/collector.toml)
    #[arg(short, long)]
    pub config: Option<String>,

    /// log_line_prefix of the server, overriding the configured one
    #[arg(short, long)]
    pub prefix: Option<String>,

    /// Offline scan that also recognizes platform log-drain dumps
    #[arg(long, conflicts_with = "follow")]
    pub debug: bool,

    /// Keep polling the files for appended lines
    #[arg(short, long)]
    pub follow: bool,

    /// Drop records older than this many seconds
    #[arg(long)]
    pub since_secs: Option<u64>,

    /// Log files to read (replaces the configured list)
    pub files: Vec<String>,
}

impl Cli {
    /// Command-line values take priority over file and environment config.
    pub fn apply_to(&self, config: &mut CollectorConfig) {
        if let Some(prefix) = &self.prefix {
            config.log_prefix = prefix.clone();
        }
        if !self.files.is_empty() {
            config.log_files = self.files.clone();
        }
    }
}
