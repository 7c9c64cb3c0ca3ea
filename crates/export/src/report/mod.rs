//! Paginated evaluation report
//!
//! - `layout`: page geometry, text wrapping and the flowing cursor
//! - `document`: section order and chart placement for one report

mod document;
mod layout;

pub use document::{
    capture_report_charts, PagedDocument, ReportLayout, Section, SectionMark, CHART_PLACEHOLDER,
    DOCUMENT_TITLE,
};
pub use layout::{fit_aspect, wrap_text, FlowLayout, PageGeometry, TextStyle};
