//! Export - Report, workbook, chart archive and ledger exports
//!
//! This crate turns evaluation reports and cash ledgers into files:
//! - a paginated PDF report with the evaluation charts embedded
//! - an XLSX workbook of label/value sheets
//! - a ZIP archive of chart PNGs, or the PNGs one by one when no archive
//!   can be written
//! - CSV and JSON ledger dumps
//!
//! Writers sit behind capability traits and are built lazily by a
//! [`WriterRegistry`]; finished files go to a [`DownloadSink`].

mod error;
pub mod pdf;
pub mod report;
mod sheets;
mod archive;
mod ledger;
mod writers;
mod delivery;
mod settings;
pub mod naming;
mod engine;

pub use error::*;
pub use sheets::*;
pub use archive::*;
pub use ledger::*;
pub use writers::*;
pub use delivery::*;
pub use settings::*;
pub use engine::*;
pub use report::{PagedDocument, ReportLayout, Section};
