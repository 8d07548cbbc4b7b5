//! Error: failures of the runtime surface (file reads, output, config).
//!
//! Line parsing never fails outward; see `parser::ParseError` for the
//! reasons a line does not start a record.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CollectorError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Config(String),
}
