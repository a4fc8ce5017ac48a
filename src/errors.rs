// errors.rs
use thiserror::Error;

/// Errors that are signaled to the caller.
///
/// Data-quality problems in the sheet (missing client, bad date, unknown
/// status) are never errors; they are filtered and counted. This enum covers
/// caller mistakes and I/O around the core.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Unknown group-by key: {0} (expected broker, team or origin)")]
    UnknownGroupBy(String),

    #[error("Unknown sale filter: {0} (expected generated or generated-informed)")]
    UnknownSaleFilter(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Xlsx error: {0}")]
    Xlsx(String),

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
