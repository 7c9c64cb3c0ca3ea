//! Error types for capture operations

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Pixel buffer of {actual} bytes does not match {width}x{height} RGBA")]
    BufferSize {
        width: u32,
        height: u32,
        actual: usize,
    },

    #[error("Empty raster: {0}x{1}")]
    EmptyRaster(u32, u32),

    #[error("PNG encoding failed: {0}")]
    Encoding(#[from] png::EncodingError),

    #[error("PNG decoding failed: {0}")]
    Decoding(#[from] png::DecodingError),

    #[error("Unsupported PNG layout: {0}")]
    UnsupportedPng(String),

    #[error("Invalid data URL: {0}")]
    DataUrl(String),

    #[error("Render failed: {0}")]
    Render(String),
}

pub type Result<T> = std::result::Result<T, CaptureError>;
