//! Chart archive bundling

use crate::delivery::Delivery;
use crate::writers::ArchiveWriter;
use crate::Result;
use capture::Canvas;
use std::io::{Cursor, Write};
use std::sync::Arc;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// A chart to bundle: its live canvas, if mounted, and its file name
#[derive(Debug, Clone, Default)]
pub struct ChartFile {
    pub canvas: Option<Arc<Canvas>>,
    pub name: Option<String>,
}

impl ChartFile {
    pub fn new(canvas: Option<Arc<Canvas>>, name: impl Into<String>) -> Self {
        Self {
            canvas,
            name: Some(name.into()),
        }
    }

    /// Name inside the archive; unnamed charts are numbered from 1
    pub fn entry_name(&self, index: usize) -> String {
        match self.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => name.to_string(),
            None => format!("grafico_{}.png", index + 1),
        }
    }
}

/// An encoded PNG ready to be stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub png: Vec<u8>,
}

/// Entries read from a list of charts, plus the names that had no canvas
#[derive(Debug, Default)]
pub struct CollectedEntries {
    pub entries: Vec<ArchiveEntry>,
    pub skipped: Vec<String>,
}

/// Read and encode every chart with a canvas
///
/// Entries keep input order. A later entry with a name already taken
/// replaces the earlier one in place.
pub fn collect_entries(files: &[ChartFile]) -> Result<CollectedEntries> {
    let mut collected = CollectedEntries::default();

    for (index, file) in files.iter().enumerate() {
        let name = file.entry_name(index);
        let Some(canvas) = file.canvas.as_ref() else {
            tracing::warn!("Skipping chart '{}': no canvas", name);
            collected.skipped.push(name);
            continue;
        };

        let png = canvas.to_png()?;
        match collected.entries.iter_mut().find(|entry| entry.name == name) {
            Some(existing) => existing.png = png,
            None => collected.entries.push(ArchiveEntry { name, png }),
        }
    }

    Ok(collected)
}

/// Outcome of a chart archive export
#[derive(Debug, Clone, Default)]
pub struct ArchiveReport {
    /// Entry names, in archive order
    pub written: Vec<String>,
    /// Charts left out for lack of a canvas
    pub skipped: Vec<String>,
    /// The archive could not be produced; charts went out one by one
    pub fell_back: bool,
    pub deliveries: Vec<Delivery>,
}

/// ZIP archive writer
#[derive(Debug, Default)]
pub struct ZipArchiveWriter;

impl ZipArchiveWriter {
    pub fn new() -> Self {
        Self
    }
}

impl ArchiveWriter for ZipArchiveWriter {
    fn write_archive(&self, entries: &[ArchiveEntry]) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .compression_level(Some(6));

        for entry in entries {
            zip.start_file(entry.name.as_str(), options)?;
            zip.write_all(&entry.png)?;
        }

        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use capture::RasterImage;
    use std::io::Read;
    use zip::ZipArchive;

    fn canvas(rgba: [u8; 4]) -> Option<Arc<Canvas>> {
        Some(Arc::new(Canvas::new(RasterImage::filled(4, 3, rgba).unwrap())))
    }

    #[test]
    fn test_entry_names_default_to_position() {
        let files = vec![
            ChartFile::default(),
            ChartFile::new(None, "peso.png"),
            ChartFile {
                canvas: None,
                name: Some("  ".to_string()),
            },
        ];
        let names: Vec<String> = files.iter().enumerate().map(|(i, f)| f.entry_name(i)).collect();
        assert_eq!(names, vec!["grafico_1.png", "peso.png", "grafico_3.png"]);
    }

    #[test]
    fn test_missing_canvas_is_skipped() {
        let files = vec![
            ChartFile::new(canvas([255, 0, 0, 255]), "a.png"),
            ChartFile::new(None, "b.png"),
            ChartFile::new(canvas([0, 255, 0, 255]), "c.png"),
        ];
        let collected = collect_entries(&files).unwrap();
        let names: Vec<&str> = collected.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a.png", "c.png"]);
        assert_eq!(collected.skipped, vec!["b.png".to_string()]);
    }

    #[test]
    fn test_duplicate_name_keeps_last_content_in_first_slot() {
        let files = vec![
            ChartFile::new(canvas([255, 0, 0, 255]), "dup.png"),
            ChartFile::new(canvas([0, 0, 255, 255]), "other.png"),
            ChartFile::new(canvas([0, 255, 0, 255]), "dup.png"),
        ];
        let collected = collect_entries(&files).unwrap();
        assert_eq!(collected.entries.len(), 2);
        assert_eq!(collected.entries[0].name, "dup.png");

        let image = RasterImage::decode_png(&collected.entries[0].png).unwrap();
        assert_eq!(&image.pixels()[..4], &[0, 255, 0, 255]);
    }

    #[test]
    fn test_zip_contains_entries() {
        let collected = collect_entries(&[
            ChartFile::new(canvas([10, 20, 30, 255]), "um.png"),
            ChartFile::new(canvas([40, 50, 60, 255]), "dois.png"),
        ])
        .unwrap();
        let bytes = ZipArchiveWriter::new().write_archive(&collected.entries).unwrap();

        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 2);
        let mut data = Vec::new();
        archive.by_name("dois.png").unwrap().read_to_end(&mut data).unwrap();
        assert_eq!(data, collected.entries[1].png);
    }

    #[test]
    fn test_empty_archive_is_valid() {
        let bytes = ZipArchiveWriter::new().write_archive(&[]).unwrap();
        let archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 0);
    }
}
