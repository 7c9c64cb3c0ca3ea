//! Export entry points
//!
//! Every export builds its whole artifact in memory, then hands it to the
//! sink. Success emits [`ExportEvent::Completed`]; a failure emits exactly
//! one [`ExportEvent::Failed`] and returns the error.

use crate::archive::{collect_entries, ArchiveEntry, ArchiveReport, ChartFile};
use crate::delivery::{
    Delivery, DownloadSink, ExportFile, MIME_CSV, MIME_JSON, MIME_PDF, MIME_PNG, MIME_XLSX, MIME_ZIP,
};
use crate::ledger::{ledger_csv, ledger_json};
use crate::naming;
use crate::report::{capture_report_charts, ReportLayout};
use crate::settings::ExportSettings;
use crate::sheets::build_sheets;
use crate::writers::WriterRegistry;
use crate::{ExportError, Result};
use capture::{Canvas, CaptureOutcome, ChartBoard, ChartCapturer};
use charts::{paint_canvas, ChartSlot};
use chrono::NaiveDate;
use report_model::{EvaluationReport, LedgerDay, Notifier};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportKind {
    ChartImage,
    ChartArchive,
    ReportDocument,
    ReportWorkbook,
    LedgerCsv,
    LedgerJson,
}

impl ExportKind {
    pub fn label(&self) -> &'static str {
        match self {
            ExportKind::ChartImage => "gráfico",
            ExportKind::ChartArchive => "arquivo de gráficos",
            ExportKind::ReportDocument => "relatório PDF",
            ExportKind::ReportWorkbook => "planilha",
            ExportKind::LedgerCsv => "financeiro CSV",
            ExportKind::LedgerJson => "financeiro JSON",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExportEvent {
    Completed { kind: ExportKind, file_name: String },
    Failed { kind: ExportKind, message: String },
    /// A chart left out of a document; the export itself goes on
    ChartUnavailable { slot: ChartSlot, reason: String },
}

pub struct ExportEngine {
    settings: ExportSettings,
    writers: WriterRegistry,
    sink: Arc<dyn DownloadSink>,
    notifier: Notifier<ExportEvent>,
}

impl ExportEngine {
    pub fn new(settings: ExportSettings, sink: Arc<dyn DownloadSink>) -> Self {
        let writers = WriterRegistry::new(settings.pdf_options());
        Self {
            settings,
            writers,
            sink,
            notifier: Notifier::new(),
        }
    }

    pub fn with_writers(mut self, writers: WriterRegistry) -> Self {
        self.writers = writers;
        self
    }

    pub fn with_notifier(mut self, notifier: Notifier<ExportEvent>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn settings(&self) -> &ExportSettings {
        &self.settings
    }

    pub fn notifier(&self) -> &Notifier<ExportEvent> {
        &self.notifier
    }

    fn completed(&self, kind: ExportKind, delivery: &Delivery) {
        tracing::info!("Exported {} as {}", kind.label(), delivery.file_name);
        self.notifier.emit(&ExportEvent::Completed {
            kind,
            file_name: delivery.file_name.clone(),
        });
    }

    fn failed<T>(&self, kind: ExportKind, error: ExportError) -> Result<T> {
        tracing::error!("Failed to export {}: {}", kind.label(), error);
        self.notifier.emit(&ExportEvent::Failed {
            kind,
            message: error.to_string(),
        });
        Err(error)
    }

    fn deliver(&self, kind: ExportKind, build: impl FnOnce() -> Result<ExportFile>) -> Result<Delivery> {
        match build().and_then(|file| self.sink.deliver(file)) {
            Ok(delivery) => {
                self.completed(kind, &delivery);
                Ok(delivery)
            }
            Err(e) => self.failed(kind, e),
        }
    }

    /// Save one chart canvas as PNG
    pub fn export_chart_png(&self, canvas: Option<&Canvas>, file_name: &str) -> Result<Delivery> {
        self.deliver(ExportKind::ChartImage, || {
            let canvas = canvas.ok_or_else(|| ExportError::ChartMissing(file_name.to_string()))?;
            Ok(ExportFile::new(file_name, MIME_PNG, canvas.to_png()?))
        })
    }

    /// Bundle charts into one archive
    ///
    /// Charts without a canvas are left out and listed in the report. If the
    /// archive cannot be written, every collected chart is delivered as its
    /// own PNG instead.
    pub fn export_charts_archive(&self, files: &[ChartFile], archive_name: Option<&str>) -> Result<ArchiveReport> {
        let kind = ExportKind::ChartArchive;
        let collected = match collect_entries(files) {
            Ok(collected) => collected,
            Err(e) => return self.failed(kind, e),
        };
        let archive_name = archive_name.unwrap_or(self.settings.archive_name.as_str());

        let mut report = ArchiveReport {
            written: collected.entries.iter().map(|e| e.name.clone()).collect(),
            skipped: collected.skipped,
            ..Default::default()
        };

        let bytes = self
            .writers
            .archive()
            .and_then(|writer| writer.write_archive(&collected.entries));
        match bytes {
            Ok(bytes) => {
                let delivery = self.deliver(kind, || Ok(ExportFile::new(archive_name, MIME_ZIP, bytes)))?;
                report.deliveries.push(delivery);
            }
            Err(e) => {
                tracing::warn!("Archive unavailable ({}), saving charts individually", e);
                report.fell_back = true;
                report.deliveries = self.deliver_individually(collected.entries)?;
            }
        }

        Ok(report)
    }

    fn deliver_individually(&self, entries: Vec<ArchiveEntry>) -> Result<Vec<Delivery>> {
        let mut deliveries = Vec::with_capacity(entries.len());
        for entry in entries {
            let delivery = self.deliver(ExportKind::ChartImage, || {
                Ok(ExportFile::new(entry.name, MIME_PNG, entry.png))
            })?;
            deliveries.push(delivery);
        }
        Ok(deliveries)
    }

    /// Draw the evaluation charts onto canvases, named for an archive
    pub fn evaluation_chart_files(&self, report: &EvaluationReport) -> Result<Vec<ChartFile>> {
        let scale = self.settings.capture_options().scale;
        ChartSlot::ALL
            .into_iter()
            .map(|slot| -> Result<ChartFile> {
                let canvas = paint_canvas(slot, &report.evaluation, scale)?;
                Ok(ChartFile::new(
                    Some(Arc::new(canvas)),
                    naming::archive_entry_name(&report.student.name, slot.file_stem()),
                ))
            })
            .collect()
    }

    /// Lay out and write the paginated report
    ///
    /// Charts are captured from `board` one at a time. A chart that cannot be
    /// captured is printed as a placeholder and reported through
    /// [`ExportEvent::ChartUnavailable`].
    pub async fn export_report_document(
        &self,
        report: &EvaluationReport,
        board: &ChartBoard,
        date: NaiveDate,
    ) -> Result<Delivery> {
        let capturer = ChartCapturer::new(self.settings.capture_options());
        let charts = capture_report_charts(&capturer, board).await;
        for (slot, outcome) in &charts {
            if let CaptureOutcome::Unavailable(reason) = outcome {
                self.notifier.emit(&ExportEvent::ChartUnavailable {
                    slot: *slot,
                    reason: reason.to_string(),
                });
            }
        }

        self.deliver(ExportKind::ReportDocument, || {
            let document = ReportLayout::new(self.settings.page_geometry()).build(report, &charts);
            tracing::debug!(
                "Report laid out on {} pages with {} charts",
                document.page_count(),
                document.images.len()
            );
            let bytes = self.writers.document()?.write_document(&document)?;
            Ok(ExportFile::new(
                naming::report_pdf_name(&report.student.name, date),
                MIME_PDF,
                bytes,
            ))
        })
    }

    pub fn export_report_workbook(&self, report: &EvaluationReport, date: NaiveDate) -> Result<Delivery> {
        self.deliver(ExportKind::ReportWorkbook, || {
            let sheets = build_sheets(report);
            let bytes = self.writers.spreadsheet()?.write_workbook(&sheets)?;
            Ok(ExportFile::new(
                naming::report_xlsx_name(&report.student.name, date),
                MIME_XLSX,
                bytes,
            ))
        })
    }

    pub fn export_ledger_csv(&self, ledger: &LedgerDay) -> Result<Delivery> {
        self.deliver(ExportKind::LedgerCsv, || {
            let bytes = ledger_csv(ledger)?;
            Ok(ExportFile::new(format!("{}.csv", ledger_stem(ledger)), MIME_CSV, bytes))
        })
    }

    pub fn export_ledger_json(&self, ledger: &LedgerDay) -> Result<Delivery> {
        self.deliver(ExportKind::LedgerJson, || {
            let bytes = ledger_json(ledger)?;
            Ok(ExportFile::new(format!("{}.json", ledger_stem(ledger)), MIME_JSON, bytes))
        })
    }
}

fn ledger_stem(ledger: &LedgerDay) -> String {
    naming::ledger_stem(ledger.date.as_deref(), chrono::Local::now().date_naive())
}
