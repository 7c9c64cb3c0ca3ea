//! PDF Export Module
//!
//! A small PDF 1.4 writer for laid-out report pages.
//!
//! # Architecture
//!
//! - `objects`: PDF object model (Dictionary, Array, Stream, Reference)
//! - `document`: Catalog, page tree, media boxes, Info dictionary
//! - `content`: Content stream operators
//! - `fonts`: Standard Helvetica faces, WinAnsi encoding, text metrics
//! - `images`: Image XObjects and soft masks
//! - `renderer`: Laid-out pages to content streams
//! - `writer`: File structure, xref and compression

mod content;
mod document;
mod fonts;
mod images;
mod objects;
mod options;
mod renderer;
mod writer;

pub use document::{MediaBox, PageSize};
pub use fonts::{encode_win_ansi, text_width, StandardFont};
pub use images::ImageData;
pub use options::PdfExportOptions;
pub use renderer::{
    ImageRenderInfo, LineRenderInfo, PageRenderInfo, PdfRenderItem, RectRenderInfo, RgbColor,
    TextRenderInfo,
};
pub use writer::{PdfDocumentWriter, PdfError};
