//! PDF Export Options

use super::document::PageSize;

/// Options for PDF export
#[derive(Debug, Clone, PartialEq)]
pub struct PdfExportOptions {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    /// Flate-compress content and image streams
    pub compress: bool,
    pub page_size: PageSize,
}

impl Default for PdfExportOptions {
    fn default() -> Self {
        Self {
            title: None,
            author: None,
            subject: None,
            compress: true,
            page_size: PageSize::A4,
        }
    }
}

impl PdfExportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_compression(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    pub fn with_page_size(mut self, page_size: PageSize) -> Self {
        self.page_size = page_size;
        self
    }
}
