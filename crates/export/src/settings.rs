//! Export settings
//!
//! Settings live in `export-settings.json`. Every field has a default, so
//! a partial file is fine and a missing one means defaults.

use crate::pdf::{PageSize, PdfExportOptions};
use crate::report::PageGeometry;
use crate::Result;
use capture::CaptureOptions;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const SETTINGS_FILE: &str = "export-settings.json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExportSettings {
    /// Oversampling factor for offscreen chart renders
    pub capture_scale: f64,
    pub settle_delay_ms: u64,
    /// Ceiling for one chart render
    pub capture_timeout_ms: u64,
    pub page_size: PageSize,
    /// Page margin in points
    pub page_margin: f64,
    pub compress: bool,
    pub archive_name: String,
    pub output_dir: Option<PathBuf>,
    pub document_title: Option<String>,
    pub document_author: Option<String>,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            capture_scale: 4.0,
            settle_delay_ms: 300,
            capture_timeout_ms: 15_000,
            page_size: PageSize::A4,
            page_margin: 40.0,
            compress: true,
            archive_name: "graficos.zip".to_string(),
            output_dir: None,
            document_title: None,
            document_author: None,
        }
    }
}

impl ExportSettings {
    pub fn capture_options(&self) -> CaptureOptions {
        let scale = if self.capture_scale.is_finite() && self.capture_scale > 0.0 {
            self.capture_scale
        } else {
            CaptureOptions::default().scale
        };
        CaptureOptions {
            scale,
            settle_delay: Duration::from_millis(self.settle_delay_ms),
            timeout: Duration::from_millis(self.capture_timeout_ms),
        }
    }

    pub fn pdf_options(&self) -> PdfExportOptions {
        let mut options = PdfExportOptions::new()
            .with_compression(self.compress)
            .with_page_size(self.page_size);
        if let Some(title) = &self.document_title {
            options = options.with_title(title.clone());
        }
        if let Some(author) = &self.document_author {
            options = options.with_author(author.clone());
        }
        options
    }

    pub fn page_geometry(&self) -> PageGeometry {
        PageGeometry::new(self.page_size.media_box(), self.page_margin.max(0.0))
    }
}

/// Loads and saves [`ExportSettings`]
pub struct SettingsManager {
    settings_path: PathBuf,
    current: ExportSettings,
}

impl SettingsManager {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            settings_path: dir.join(SETTINGS_FILE),
            current: ExportSettings::default(),
        }
    }

    pub fn settings_path(&self) -> &PathBuf {
        &self.settings_path
    }

    /// Load settings from disk, or defaults if the file doesn't exist
    pub async fn load(&mut self) -> Result<&ExportSettings> {
        if self.settings_path.exists() {
            let content = tokio::fs::read_to_string(&self.settings_path).await?;
            self.current = Self::parse(&content);
        } else {
            self.current = ExportSettings::default();
        }
        Ok(&self.current)
    }

    pub fn load_sync(&mut self) -> Result<&ExportSettings> {
        if self.settings_path.exists() {
            let content = std::fs::read_to_string(&self.settings_path)?;
            self.current = Self::parse(&content);
        } else {
            self.current = ExportSettings::default();
        }
        Ok(&self.current)
    }

    fn parse(content: &str) -> ExportSettings {
        match serde_json::from_str::<ExportSettings>(content) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("Failed to parse export settings, using defaults: {}", e);
                ExportSettings::default()
            }
        }
    }

    pub fn save_sync(&self) -> Result<()> {
        if let Some(parent) = self.settings_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(&self.current)?;
        std::fs::write(&self.settings_path, content)?;
        Ok(())
    }

    pub fn get(&self) -> &ExportSettings {
        &self.current
    }

    pub fn update_sync(&mut self, settings: ExportSettings) -> Result<()> {
        self.current = settings;
        self.save_sync()
    }

    pub fn reset_sync(&mut self) -> Result<&ExportSettings> {
        self.current = ExportSettings::default();
        self.save_sync()?;
        Ok(&self.current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let mut manager = SettingsManager::new(temp.path().to_path_buf());
        let settings = manager.load_sync().unwrap();
        assert_eq!(settings, &ExportSettings::default());
        assert_eq!(settings.capture_options().settle_delay, Duration::from_millis(300));
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join(SETTINGS_FILE),
            r#"{ "page_size": "letter", "archive_name": "charts.zip" }"#,
        )
        .unwrap();

        let mut manager = SettingsManager::new(temp.path().to_path_buf());
        let settings = manager.load_sync().unwrap().clone();
        assert_eq!(settings.page_size, PageSize::Letter);
        assert_eq!(settings.archive_name, "charts.zip");
        assert_eq!(settings.capture_timeout_ms, 15_000);
        assert_eq!(settings.page_geometry().width, 612.0);
    }

    #[test]
    fn test_corrupt_file_falls_back() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(SETTINGS_FILE), "{ not json").unwrap();
        let mut manager = SettingsManager::new(temp.path().to_path_buf());
        assert_eq!(manager.load_sync().unwrap(), &ExportSettings::default());
    }

    #[test]
    fn test_update_persists() {
        let temp = TempDir::new().unwrap();
        let mut manager = SettingsManager::new(temp.path().join("config"));
        let settings = ExportSettings {
            capture_scale: 2.0,
            document_author: Some("Academia Centro".to_string()),
            ..Default::default()
        };
        manager.update_sync(settings.clone()).unwrap();

        let mut reloaded = SettingsManager::new(temp.path().join("config"));
        assert_eq!(reloaded.load_sync().unwrap(), &settings);
        assert_eq!(
            reloaded.get().pdf_options().author.as_deref(),
            Some("Academia Centro")
        );

        reloaded.reset_sync().unwrap();
        assert_eq!(reloaded.get(), &ExportSettings::default());
    }

    #[test]
    fn test_invalid_scale_uses_default() {
        let settings = ExportSettings {
            capture_scale: 0.0,
            ..Default::default()
        };
        assert_eq!(settings.capture_options().scale, 4.0);
    }

    #[tokio::test]
    async fn test_async_load() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(SETTINGS_FILE), r#"{ "compress": false }"#).unwrap();
        let mut manager = SettingsManager::new(temp.path().to_path_buf());
        assert!(!manager.load().await.unwrap().compress);
    }
}
