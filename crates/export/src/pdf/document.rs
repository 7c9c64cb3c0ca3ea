//! PDF Document Structure
//!
//! Catalog, page tree, media boxes and the Info dictionary.

use super::objects::{PdfDictionary, PdfObject, PdfString};
use serde::{Deserialize, Serialize};

/// PDF version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PdfVersion {
    /// PDF 1.4 (Acrobat 5); first version with soft masks
    #[default]
    V1_4,
}

impl PdfVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            PdfVersion::V1_4 => "1.4",
        }
    }
}

/// PDF document information
#[derive(Debug, Clone, Default)]
pub struct DocumentInfo {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    /// PDF date string (`D:YYYYMMDDHHmmSS`)
    pub creation_date: Option<String>,
}

impl DocumentInfo {
    pub fn new() -> Self {
        Self {
            creator: Some("Gymdesk".to_string()),
            producer: Some("Gymdesk PDF Export".to_string()),
            ..Default::default()
        }
    }

    pub fn to_dictionary(&self) -> PdfDictionary {
        let mut dict = PdfDictionary::new();
        let entries = [
            ("Title", &self.title),
            ("Author", &self.author),
            ("Subject", &self.subject),
            ("Creator", &self.creator),
            ("Producer", &self.producer),
            ("CreationDate", &self.creation_date),
        ];
        for (key, value) in entries {
            if let Some(value) = value {
                dict.insert(key, PdfObject::String(PdfString::text(value)));
            }
        }
        dict
    }
}

/// Standard page sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    #[default]
    A4,
    Letter,
}

impl PageSize {
    pub fn media_box(&self) -> MediaBox {
        match self {
            PageSize::A4 => MediaBox::a4(),
            PageSize::Letter => MediaBox::letter(),
        }
    }
}

/// Page media box (page dimensions)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MediaBox {
    pub width: f64,
    pub height: f64,
}

impl MediaBox {
    pub fn from_dimensions(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// US Letter (8.5 x 11 in)
    pub fn letter() -> Self {
        Self::from_dimensions(612.0, 792.0)
    }

    /// A4 (210 x 297 mm)
    pub fn a4() -> Self {
        Self::from_dimensions(595.28, 841.89)
    }

    pub fn to_array(&self) -> PdfObject {
        PdfObject::Array(vec![
            PdfObject::Integer(0),
            PdfObject::Integer(0),
            PdfObject::Real(self.width),
            PdfObject::Real(self.height),
        ])
    }
}

/// Catalog dictionary
pub fn create_catalog(pages_ref: u32) -> PdfDictionary {
    let mut dict = PdfDictionary::new().with_type("Catalog");
    dict.insert("Pages", PdfObject::reference(pages_ref));
    dict
}

/// Page tree root
pub fn create_pages(page_refs: &[u32]) -> PdfDictionary {
    let mut dict = PdfDictionary::new().with_type("Pages");
    let kids = page_refs.iter().map(|&r| PdfObject::reference(r)).collect();
    dict.insert("Kids", PdfObject::Array(kids));
    dict.insert("Count", PdfObject::Integer(page_refs.len() as i64));
    dict
}
