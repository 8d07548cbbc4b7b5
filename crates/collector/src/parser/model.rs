use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::extract::raw_position;
use super::prefix::LogPrefix;

/// PostgreSQL message severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
    Debug,
    Info,
    Notice,
    Warning,
    Error,
    Log,
    Fatal,
    Panic,
    /// Secondary messages attached to a primary one
    Detail,
    Hint,
    Context,
    Statement,
    Query,
    Location,
}

impl LogLevel {
    /// Look up a level by the exact name the server prints before the colon.
    ///
    /// Returns `None` for empty or unrecognized names, which the scanner
    /// treats as "this line does not start a new record".
    pub fn from_name(name: &str) -> Option<Self> {
        let level = match name {
            "DEBUG" | "DEBUG1" | "DEBUG2" | "DEBUG3" | "DEBUG4" | "DEBUG5" => LogLevel::Debug,
            "INFO" => LogLevel::Info,
            "NOTICE" => LogLevel::Notice,
            "WARNING" => LogLevel::Warning,
            "ERROR" => LogLevel::Error,
            "LOG" => LogLevel::Log,
            "FATAL" => LogLevel::Fatal,
            "PANIC" => LogLevel::Panic,
            "DETAIL" => LogLevel::Detail,
            "HINT" => LogLevel::Hint,
            "CONTEXT" => LogLevel::Context,
            "STATEMENT" => LogLevel::Statement,
            "QUERY" => LogLevel::Query,
            "LOCATION" => LogLevel::Location,
            _ => return None,
        };
        Some(level)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Notice => "NOTICE",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Log => "LOG",
            LogLevel::Fatal => "FATAL",
            LogLevel::Panic => "PANIC",
            LogLevel::Detail => "DETAIL",
            LogLevel::Hint => "HINT",
            LogLevel::Context => "CONTEXT",
            LogLevel::Statement => "STATEMENT",
            LogLevel::Query => "QUERY",
            LogLevel::Location => "LOCATION",
        }
    }
}

/// The grammar that recognized a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// One of the fixed `log_line_prefix` templates
    Prefix(LogPrefix),
    /// OS syslog framing around a server message
    Syslog,
    /// Hosting-platform log drain envelope (offline scans only)
    HerokuDebug,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Prefix(prefix) => prefix.name(),
            LogFormat::Syslog => "syslog",
            LogFormat::HerokuDebug => "heroku_debug",
        }
    }
}

/// Result of a successful line-parse operation, before the scanner has
/// assigned byte offsets or an identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLine {
    pub format: LogFormat,
    pub occurred_at: DateTime<FixedOffset>,
    pub username: Option<String>,
    pub database: Option<String>,
    pub application: Option<String>,
    pub backend_pid: i32,
    pub log_level: LogLevel,
    pub content: String,
}

/// One log record emitted by the scanner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogLine {
    pub uuid: Uuid,
    pub occurred_at: DateTime<FixedOffset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application: Option<String>,
    pub backend_pid: i32,
    pub log_level: LogLevel,
    pub content: String,
    /// Offset of the first byte of the raw line
    pub byte_start: u64,
    /// Offset where `content` begins
    pub byte_content_start: u64,
    /// Offset of the last byte of the record (inclusive)
    pub byte_end: u64,
}

impl LogLine {
    /// Promote a parsed line to an emitted record covering the raw bytes
    /// of its line, starting at `byte_start`.
    ///
    /// Offsets count raw bytes, so invalid UTF-8 that decoding replaced
    /// does not shift them.
    pub fn from_raw(parsed: ParsedLine, byte_start: u64, raw: &[u8]) -> Self {
        let decoded = String::from_utf8_lossy(raw);
        let content_at = raw_position(raw, decoded.len().saturating_sub(parsed.content.len()));

        Self {
            uuid: Uuid::new_v4(),
            occurred_at: parsed.occurred_at,
            username: parsed.username,
            database: parsed.database,
            application: parsed.application,
            backend_pid: parsed.backend_pid,
            log_level: parsed.log_level,
            content: parsed.content,
            byte_start,
            byte_content_start: byte_start + content_at as u64,
            // An empty line cannot be a record, so raw is never empty here
            byte_end: (byte_start + raw.len() as u64).saturating_sub(1),
        }
    }
}

/// Derived query timing extracted from the log stream by an analyzer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuerySample {
    pub occurred_at: DateTime<FixedOffset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    pub query: String,
    pub runtime_ms: f64,
    pub log_line_uuid: Uuid,
}

/// Why a line did not produce a new record.
///
/// Every variant carries the text the continuation stitcher appends to the
/// previous record.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("no log prefix matched")]
    Unrecognized { content: String },

    #[error("unparsable timestamp: {timestamp:?}")]
    InvalidTimestamp { timestamp: String, content: String },

    #[error("missing log level")]
    MissingLevel { content: String },

    #[error("unknown log level: {level:?}")]
    UnknownLevel { level: String, content: String },
}

impl ParseError {
    pub fn content(&self) -> &str {
        match self {
            ParseError::Unrecognized { content }
            | ParseError::InvalidTimestamp { content, .. }
            | ParseError::MissingLevel { content }
            | ParseError::UnknownLevel { content, .. } => content,
        }
    }

    pub fn into_content(self) -> String {
        match self {
            ParseError::Unrecognized { content }
            | ParseError::InvalidTimestamp { content, .. }
            | ParseError::MissingLevel { content }
            | ParseError::UnknownLevel { content, .. } => content,
        }
    }
}
