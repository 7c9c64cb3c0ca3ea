//! Error types for export operations

use crate::pdf::PdfError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Workbook error: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),

    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    #[error("Capture error: {0}")]
    Capture(#[from] capture::CaptureError),

    #[error("Chart error: {0}")]
    Chart(#[from] charts::ChartError),

    /// A lazily constructed writer could not be created
    #[error("{capability} writer unavailable: {message}")]
    WriterUnavailable {
        capability: &'static str,
        message: String,
    },

    #[error("Gráfico não encontrado: {0}")]
    ChartMissing(String),

    #[error("Não há dados para exportar")]
    NothingToExport,

    #[error("Delivery failed: {0}")]
    Delivery(String),
}

pub type Result<T> = std::result::Result<T, ExportError>;
