//! crates/eer_io/src/lib.rs
//! Serialization and local export for event reports.
//!
//! - `json`: pretty JSON text in data-model order, and the strict reader.
//! - `csv_export`: denormalized one-row-per-movement CSV.
//! - `export`: file naming and atomic writes into a local directory.
//!
//! No network here. The submission body is produced by `json` but sent by
//! `eer_net`.

#![forbid(unsafe_code)]

use thiserror::Error;

/// Unified error for eer_io.
#[derive(Debug, Error)]
pub enum IoError {
    /// Filesystem / path errors (create_dir_all, rename, fsync, etc.)
    #[error("io/path error: {0}")]
    Path(String),

    /// JSON serialization/deserialization errors with a line/column hint.
    #[error("json error at {location}: {msg}")]
    Json { location: String, msg: String },

    /// CSV writer failures.
    #[error("csv error: {0}")]
    Csv(String),

    /// Input exceeds the configured read limit.
    #[error("limit exceeded: {0}")]
    Limit(String),

    /// Parsed fine but violates a report invariant.
    #[error("invalid report: {0}")]
    Invalid(#[from] eer_core::CoreError),
}

pub type IoResult<T> = Result<T, IoError>;

/* ---------------- From conversions (used by file modules) ---------------- */

impl From<std::io::Error> for IoError {
    fn from(e: std::io::Error) -> Self {
        IoError::Path(e.to_string())
    }
}

impl From<serde_json::Error> for IoError {
    fn from(e: serde_json::Error) -> Self {
        let location = if e.line() == 0 {
            "/".to_string()
        } else {
            format!("line {} column {}", e.line(), e.column())
        };
        IoError::Json { location, msg: e.to_string() }
    }
}

impl From<csv::Error> for IoError {
    fn from(e: csv::Error) -> Self {
        IoError::Csv(e.to_string())
    }
}

pub mod csv_export;
pub mod export;
pub mod json;

pub mod prelude {
    pub use crate::csv_export::{to_csv, CSV_HEADER};
    pub use crate::export::{export_file_name, read_report, render, write_export, ExportFormat};
    pub use crate::json::{from_json_str, to_json_pretty};
    pub use crate::{IoError, IoResult};
}
