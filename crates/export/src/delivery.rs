//! Download boundary
//!
//! Exports hand a finished file to a sink; nothing reaches a sink until
//! the whole artifact exists in memory.

use crate::{ExportError, Result};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub const MIME_PNG: &str = "image/png";
pub const MIME_ZIP: &str = "application/zip";
pub const MIME_PDF: &str = "application/pdf";
pub const MIME_XLSX: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const MIME_CSV: &str = "text/csv;charset=utf-8";
pub const MIME_JSON: &str = "application/json";

/// A finished export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl ExportFile {
    pub fn new(name: impl Into<String>, mime: &'static str, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime,
            bytes,
        }
    }
}

/// Receipt for a delivered file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub file_name: String,
    pub size: usize,
    /// Where the file landed, for sinks that write to disk
    pub location: Option<PathBuf>,
}

pub trait DownloadSink: Send + Sync {
    fn deliver(&self, file: ExportFile) -> Result<Delivery>;
}

/// Writes each file into a directory
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DownloadSink for DirectorySink {
    fn deliver(&self, file: ExportFile) -> Result<Delivery> {
        if file.name.contains(['/', '\\']) || file.name.is_empty() {
            return Err(ExportError::Delivery(format!("invalid file name '{}'", file.name)));
        }
        std::fs::create_dir_all(&self.dir)?;

        // write beside the target, then rename, so readers never see half a file
        let target = self.dir.join(&file.name);
        let staging = self.dir.join(format!(".{}.part", file.name));
        std::fs::write(&staging, &file.bytes)?;
        if let Err(e) = std::fs::rename(&staging, &target) {
            let _ = std::fs::remove_file(&staging);
            return Err(e.into());
        }

        tracing::info!("Saved {} ({} bytes)", target.display(), file.bytes.len());
        Ok(Delivery {
            file_name: file.name,
            size: file.bytes.len(),
            location: Some(target),
        })
    }
}

/// Keeps delivered files in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    files: Mutex<Vec<ExportFile>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn files(&self) -> Vec<ExportFile> {
        self.files.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    pub fn names(&self) -> Vec<String> {
        self.files
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .iter()
            .map(|f| f.name.clone())
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<ExportFile> {
        self.files
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .iter()
            .find(|f| f.name == name)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.files.lock().unwrap_or_else(|p| p.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DownloadSink for MemorySink {
    fn deliver(&self, file: ExportFile) -> Result<Delivery> {
        let delivery = Delivery {
            file_name: file.name.clone(),
            size: file.bytes.len(),
            location: None,
        };
        self.files.lock().unwrap_or_else(|p| p.into_inner()).push(file);
        Ok(delivery)
    }
}
