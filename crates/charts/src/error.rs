//! Error types for the charts crate

use thiserror::Error;

/// Errors that can occur when rendering charts
#[derive(Error, Debug)]
pub enum ChartError {
    /// Requested surface is empty or too large
    #[error("Invalid surface size: {0}x{1}")]
    InvalidSize(u32, u32),

    /// Rendering error
    #[error("Rendering error: {0}")]
    Render(String),

    #[error(transparent)]
    Capture(#[from] capture::CaptureError),
}

impl From<ChartError> for capture::CaptureError {
    fn from(err: ChartError) -> Self {
        match err {
            ChartError::Capture(inner) => inner,
            other => capture::CaptureError::Render(other.to_string()),
        }
    }
}

/// Result type for chart operations
pub type ChartResult<T> = Result<T, ChartError>;
