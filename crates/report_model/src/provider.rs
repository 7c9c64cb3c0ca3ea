//! Data provider boundary
//!
//! Exports never fetch anything themselves; callers hand them snapshots
//! obtained through a [`ReportProvider`].

use crate::{EvaluationReport, LedgerDay, ModelError, Result};
use std::path::{Path, PathBuf};

/// Source of report and ledger snapshots
pub trait ReportProvider: Send + Sync {
    /// Full report for one evaluation
    fn report(&self, evaluation_id: &str) -> Result<EvaluationReport>;

    /// Ledger for one ISO date
    fn ledger(&self, date: &str) -> Result<LedgerDay>;
}

/// Reads `report_<id>.json` and `ledger_<date>.json` from a directory
#[derive(Debug, Clone)]
pub struct JsonDirectoryProvider {
    root: PathBuf,
}

impl JsonDirectoryProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn read(&self, file_name: &str) -> Result<Option<String>> {
        let path = self.root.join(file_name);
        if !path.exists() {
            return Ok(None);
        }
        tracing::debug!("Reading snapshot {:?}", path);
        Ok(Some(std::fs::read_to_string(path)?))
    }
}

impl ReportProvider for JsonDirectoryProvider {
    fn report(&self, evaluation_id: &str) -> Result<EvaluationReport> {
        let content = self
            .read(&format!("report_{evaluation_id}.json"))?
            .ok_or_else(|| ModelError::ReportNotFound(evaluation_id.to_string()))?;
        Ok(serde_json::from_str(&content)?)
    }

    fn ledger(&self, date: &str) -> Result<LedgerDay> {
        let content = self
            .read(&format!("ledger_{date}.json"))?
            .ok_or_else(|| ModelError::LedgerNotFound(date.to_string()))?;
        let mut day: LedgerDay = serde_json::from_str(&content)?;
        if day.date.is_none() {
            day.date = Some(date.to_string());
        }
        Ok(day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_reads_report_snapshot() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("report_12.json"),
            r#"{"evaluation": {"date": "2024-01-10"}, "student": {"name": "Rui"}}"#,
        )
        .unwrap();

        let provider = JsonDirectoryProvider::new(dir.path());
        let report = provider.report("12").unwrap();
        assert_eq!(report.student.name, "Rui");
        assert_eq!(report.evaluation.date, "2024-01-10");
    }

    #[test]
    fn test_missing_snapshots() {
        let dir = TempDir::new().unwrap();
        let provider = JsonDirectoryProvider::new(dir.path());
        assert!(matches!(provider.report("1"), Err(ModelError::ReportNotFound(_))));
        assert!(matches!(
            provider.ledger("2024-01-10"),
            Err(ModelError::LedgerNotFound(_))
        ));
    }

    #[test]
    fn test_ledger_date_defaults_to_request() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("ledger_2024-01-10.json"), r#"{"entries": []}"#).unwrap();
        let provider = JsonDirectoryProvider::new(dir.path());
        let day = provider.ledger("2024-01-10").unwrap();
        assert_eq!(day.date.as_deref(), Some("2024-01-10"));
        assert!(day.is_empty());
    }

    #[test]
    fn test_malformed_snapshot() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("report_2.json"), "{not json").unwrap();
        let provider = JsonDirectoryProvider::new(dir.path());
        assert!(matches!(provider.report("2"), Err(ModelError::Json(_))));
    }
}
