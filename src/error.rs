use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a run. Everything row-shaped (malformed fields,
/// referential gaps, duplicate keys, invalid dates) is filtered and counted
/// in the transform reports instead of surfacing here.
#[derive(Error, Debug)]
pub enum EtlError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV read failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("database error: {0}")]
    Sql(#[from] rusqlite::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("missing source file: {0}")]
    MissingSource(PathBuf),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, EtlError>;
