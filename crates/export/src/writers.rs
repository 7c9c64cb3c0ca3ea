//! Writer capabilities
//!
//! Each output format sits behind a trait. The registry builds a writer on
//! first use and keeps it; a construction that fails is reported to the
//! caller and attempted again the next time that capability is needed.

use crate::archive::{ArchiveEntry, ZipArchiveWriter};
use crate::pdf::{PdfDocumentWriter, PdfExportOptions};
use crate::report::PagedDocument;
use crate::sheets::{SheetData, XlsxWorkbookWriter};
use crate::{ExportError, Result};
use std::sync::{Arc, Mutex};

pub trait ArchiveWriter: Send + Sync {
    fn write_archive(&self, entries: &[ArchiveEntry]) -> Result<Vec<u8>>;
}

pub trait DocumentWriter: Send + Sync {
    fn write_document(&self, document: &PagedDocument) -> Result<Vec<u8>>;
}

pub trait SpreadsheetWriter: Send + Sync {
    fn write_workbook(&self, sheets: &[SheetData]) -> Result<Vec<u8>>;
}

/// PDF output for laid-out reports
#[derive(Debug, Clone, Default)]
pub struct PdfReportWriter {
    options: PdfExportOptions,
}

impl PdfReportWriter {
    pub fn new(options: PdfExportOptions) -> Self {
        Self { options }
    }
}

impl DocumentWriter for PdfReportWriter {
    fn write_document(&self, document: &PagedDocument) -> Result<Vec<u8>> {
        let mut options = self.options.clone();
        if options.title.is_none() {
            options.title = Some(document.title.clone());
        }
        let bytes = PdfDocumentWriter::new(options).write_to_bytes(&document.pages, &document.images)?;
        Ok(bytes)
    }
}

type Factory<T> = Box<dyn Fn() -> Result<Arc<T>> + Send + Sync>;

/// One capability: a factory plus the writer it produced, once it succeeds
struct LazyWriter<T: ?Sized> {
    capability: &'static str,
    factory: Factory<T>,
    cached: Mutex<Option<Arc<T>>>,
}

impl<T: ?Sized> LazyWriter<T> {
    fn new(capability: &'static str, factory: Factory<T>) -> Self {
        Self {
            capability,
            factory,
            cached: Mutex::new(None),
        }
    }

    fn get(&self) -> Result<Arc<T>> {
        let mut cached = self.cached.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(writer) = cached.as_ref() {
            return Ok(Arc::clone(writer));
        }

        match (self.factory)() {
            Ok(writer) => {
                tracing::debug!("Initialized {} writer", self.capability);
                *cached = Some(Arc::clone(&writer));
                Ok(writer)
            }
            Err(e) => {
                tracing::warn!("Failed to initialize {} writer: {}", self.capability, e);
                Err(match e {
                    ExportError::WriterUnavailable { .. } => e,
                    other => ExportError::WriterUnavailable {
                        capability: self.capability,
                        message: other.to_string(),
                    },
                })
            }
        }
    }

    fn is_ready(&self) -> bool {
        self.cached
            .lock()
            .map(|cached| cached.is_some())
            .unwrap_or(false)
    }
}

/// Lazily constructed writers, one per output format
pub struct WriterRegistry {
    archive: LazyWriter<dyn ArchiveWriter>,
    document: LazyWriter<dyn DocumentWriter>,
    spreadsheet: LazyWriter<dyn SpreadsheetWriter>,
}

impl WriterRegistry {
    /// Registry with the built-in ZIP, PDF and XLSX writers
    pub fn new(pdf_options: PdfExportOptions) -> Self {
        Self {
            archive: LazyWriter::new(
                "archive",
                Box::new(|| Ok(Arc::new(ZipArchiveWriter::new()) as Arc<dyn ArchiveWriter>)),
            ),
            document: LazyWriter::new(
                "document",
                Box::new(move || {
                    Ok(Arc::new(PdfReportWriter::new(pdf_options.clone())) as Arc<dyn DocumentWriter>)
                }),
            ),
            spreadsheet: LazyWriter::new(
                "spreadsheet",
                Box::new(|| Ok(Arc::new(XlsxWorkbookWriter::new()) as Arc<dyn SpreadsheetWriter>)),
            ),
        }
    }

    pub fn with_archive_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn ArchiveWriter>> + Send + Sync + 'static,
    {
        self.archive = LazyWriter::new("archive", Box::new(factory));
        self
    }

    pub fn with_document_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn DocumentWriter>> + Send + Sync + 'static,
    {
        self.document = LazyWriter::new("document", Box::new(factory));
        self
    }

    pub fn with_spreadsheet_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn SpreadsheetWriter>> + Send + Sync + 'static,
    {
        self.spreadsheet = LazyWriter::new("spreadsheet", Box::new(factory));
        self
    }

    pub fn archive(&self) -> Result<Arc<dyn ArchiveWriter>> {
        self.archive.get()
    }

    pub fn document(&self) -> Result<Arc<dyn DocumentWriter>> {
        self.document.get()
    }

    pub fn spreadsheet(&self) -> Result<Arc<dyn SpreadsheetWriter>> {
        self.spreadsheet.get()
    }

    /// Capabilities constructed so far
    pub fn ready(&self) -> Vec<&'static str> {
        [
            (self.archive.capability, self.archive.is_ready()),
            (self.document.capability, self.document.is_ready()),
            (self.spreadsheet.capability, self.spreadsheet.is_ready()),
        ]
        .into_iter()
        .filter_map(|(name, ready)| ready.then_some(name))
        .collect()
    }
}

impl Default for WriterRegistry {
    fn default() -> Self {
        Self::new(PdfExportOptions::default())
    }
}
