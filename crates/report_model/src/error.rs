//! Error types for report model operations

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Report not found: {0}")]
    ReportNotFound(String),

    #[error("Ledger not found for {0}")]
    LedgerNotFound(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
