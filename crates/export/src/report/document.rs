//! Evaluation report document
//!
//! Lays an [`EvaluationReport`] and its captured charts out into pages.
//! Section order is fixed; optional sections are left out, never moved.

use super::layout::{fit_aspect, FlowLayout, PageGeometry, TextStyle};
use crate::pdf::{ImageData, PageRenderInfo, RgbColor};
use capture::{CaptureOutcome, ChartBoard, ChartCapturer};
use charts::ChartSlot;
use report_model::classify::BmiClass;
use report_model::format::{fixed, fixed_with_unit, format_change, format_date, yes_no, PLACEHOLDER};
use report_model::{Comparison, EvaluationReport};

pub const DOCUMENT_TITLE: &str = "Relatório de Avaliação";
pub const CHART_PLACEHOLDER: &str = "Gráfico indisponível";

const TITLE: TextStyle = TextStyle::bold(18.0);
const SUBTITLE: TextStyle = TextStyle::regular(11.0);
const HEADING: TextStyle = TextStyle::bold(13.0);
const BODY: TextStyle = TextStyle::regular(10.0);
const CHART_TITLE: TextStyle = TextStyle::bold(11.0);
const MUTED: RgbColor = RgbColor {
    r: 0.42,
    g: 0.45,
    b: 0.5,
};
const RULE: RgbColor = RgbColor {
    r: 0.82,
    g: 0.84,
    b: 0.86,
};

const ROW_SPACING: f64 = 4.0;

// column x offsets from the left margin, per section
const METRIC_COLUMNS: [f64; 2] = [0.0, 260.0];
const FLEXIBILITY_COLUMNS: [f64; 1] = [0.0];
const SKINFOLD_COLUMNS: [f64; 2] = [0.0, 260.0];
const PERIMETER_COLUMNS: [f64; 3] = [0.0, 172.0, 344.0];

const SECTION_SPACING: f64 = 10.0;

/// Document sections in print order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Section {
    Header,
    KeyMetrics,
    HealthConditions,
    Flexibility,
    Skinfolds,
    Perimeters,
    Notes,
    Footer,
    Charts,
}

/// Where a section starts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionMark {
    pub section: Section,
    pub page: usize,
    pub y: f64,
}

/// A fully laid-out document, independent of the output format
#[derive(Debug, Clone)]
pub struct PagedDocument {
    pub title: String,
    pub pages: Vec<PageRenderInfo>,
    pub images: Vec<ImageData>,
    pub sections: Vec<SectionMark>,
    /// Slots printed as a placeholder instead of a bitmap
    pub placeholders: Vec<ChartSlot>,
}

impl PagedDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn section_order(&self) -> Vec<Section> {
        self.sections.iter().map(|mark| mark.section).collect()
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.pages
            .iter()
            .flat_map(|page| page.texts())
            .any(|text| text.contains(needle))
    }
}

/// Capture every chart slot from `board`, one at a time in slot order
pub async fn capture_report_charts(
    capturer: &ChartCapturer,
    board: &ChartBoard,
) -> Vec<(ChartSlot, CaptureOutcome)> {
    let keys: Vec<&str> = ChartSlot::ALL.iter().map(|slot| slot.key()).collect();
    let outcomes = capturer.capture_all(board, &keys).await;
    ChartSlot::ALL.into_iter().zip(outcomes.into_iter().map(|(_, o)| o)).collect()
}

/// Target box for a chart slot, in points
fn chart_box(slot: ChartSlot) -> (f64, f64) {
    match slot {
        ChartSlot::BodyClassification => (200.0, 200.0),
        _ => (400.0, 250.0),
    }
}

/// Builds a [`PagedDocument`] from a report and its captured charts
pub struct ReportLayout {
    geometry: PageGeometry,
}

impl ReportLayout {
    pub fn new(geometry: PageGeometry) -> Self {
        Self { geometry }
    }

    pub fn build(&self, report: &EvaluationReport, charts: &[(ChartSlot, CaptureOutcome)]) -> PagedDocument {
        let mut doc = DocumentBuilder::new(self.geometry);
        let evaluation = &report.evaluation;
        let summary = &report.summary;

        doc.section(Section::Header);
        doc.layout.paragraph(DOCUMENT_TITLE, TITLE, 2.0);
        let subtitle = format!(
            "{} - {}",
            report.student.name,
            format_date(Some(evaluation.date.as_str()))
        );
        doc.layout.paragraph(&subtitle, SUBTITLE.with_color(MUTED), 6.0);
        doc.layout.rule(RULE, SECTION_SPACING);

        doc.section(Section::KeyMetrics);
        doc.heading("Métricas Principais");
        doc.grid(&key_metric_cells(report), &METRIC_COLUMNS);

        let conditions = report.reported_conditions();
        if !conditions.is_empty() {
            doc.section(Section::HealthConditions);
            doc.heading("Condições de Saúde");
            for flag in &conditions {
                doc.layout.paragraph(
                    &format!("{}: {}", flag.label, yes_no(true)),
                    TextStyle::bold(10.0),
                    0.0,
                );
                if let Some(notes) = flag.notes.map(str::trim).filter(|n| !n.is_empty()) {
                    doc.layout.paragraph(notes, BODY.with_color(MUTED), ROW_SPACING);
                }
            }
            doc.layout.advance(SECTION_SPACING);
        }

        doc.section(Section::Flexibility);
        doc.heading("Testes de Flexibilidade");
        doc.grid(
            &[
                format!(
                    "Teste de Sentar e Alcançar: {}",
                    fixed_with_unit(evaluation.wells_sit_reach_test, 1, "cm")
                ),
                format!(
                    "Teste de Flexão do Tronco: {}",
                    fixed_with_unit(evaluation.trunk_flexion_test, 1, "cm")
                ),
            ],
            &FLEXIBILITY_COLUMNS,
        );

        doc.section(Section::Skinfolds);
        doc.heading("Dobras Cutâneas (mm)");
        let skinfolds: Vec<String> = evaluation
            .skinfolds()
            .iter()
            .map(|m| format!("{}: {}", m.label, fixed(m.value, 1)))
            .collect();
        doc.grid(&skinfolds, &SKINFOLD_COLUMNS);

        doc.section(Section::Perimeters);
        doc.heading("Perímetros (cm)");
        let perimeters: Vec<String> = evaluation
            .perimeters()
            .iter()
            .map(|m| format!("{}: {}", m.label, fixed(m.value, 1)))
            .collect();
        doc.grid(&perimeters, &PERIMETER_COLUMNS);

        if let Some(notes) = evaluation.notes_text() {
            doc.section(Section::Notes);
            doc.heading("Observações");
            doc.layout.paragraph(notes, BODY, SECTION_SPACING);
        }

        doc.section(Section::Footer);
        doc.layout.rule(RULE, 6.0);
        let number = summary
            .evaluation_number
            .map_or_else(|| PLACEHOLDER.to_string(), |n| n.to_string());
        let total = summary
            .total_evaluations
            .map_or_else(|| PLACEHOLDER.to_string(), |n| n.to_string());
        doc.layout.reserve(BODY.line_height() * 2.0);
        doc.layout.line(
            &format!("Avaliação #{} de {} total", number, total),
            BODY.with_color(MUTED),
        );
        if let Some(trend) = summary.comparison_with_previous.as_ref().and_then(|c| c.trend) {
            doc.layout.line(&format!("Tendência: {}", trend.label()), BODY);
        }
        doc.layout.advance(SECTION_SPACING);

        doc.section(Section::Charts);
        doc.heading("Gráficos");
        for slot in ChartSlot::ALL {
            let outcome = charts
                .iter()
                .find(|(s, _)| *s == slot)
                .map(|(_, outcome)| outcome);
            doc.chart(slot, outcome);
        }

        doc.finish()
    }
}

impl Default for ReportLayout {
    fn default() -> Self {
        Self::new(PageGeometry::default())
    }
}

fn change_since(value: Option<f64>, unit: &str, comparison: Option<&Comparison>) -> Option<String> {
    let comparison = comparison?;
    let change = format_change(value, unit);
    if change == PLACEHOLDER {
        return None;
    }
    let since = match comparison.previous_date.as_deref() {
        Some(date) => format_date(Some(date)),
        None => "última avaliação".to_string(),
    };
    Some(format!("{} desde {}", change, since))
}

fn with_change(base: String, change: Option<String>) -> String {
    match change {
        Some(change) => format!("{} ({})", base, change),
        None => base,
    }
}

fn key_metric_cells(report: &EvaluationReport) -> Vec<String> {
    let evaluation = &report.evaluation;
    let metrics = &report.summary.key_metrics;
    let comparison = report.summary.comparison_with_previous.as_ref();

    let weight = metrics.weight_kg.or(evaluation.weight_kg);
    let imc = metrics.imc.or(evaluation.imc);
    let fat = metrics.fat_percentage.or(evaluation.fat_percentage);
    let lean = metrics.lean_mass_percentage.or(evaluation.lean_mass_percentage);
    let basal = metrics.basal_metabolism.or(evaluation.basal_metabolism);
    let body_age = metrics.body_age.or(evaluation.body_age);
    let visceral = metrics.visceral_fat.or(evaluation.visceral_fat);

    let imc_text = match BmiClass::from_bmi(imc) {
        Some(class) => format!("{} - {}", fixed(imc, 1), class.label()),
        None => fixed(imc, 1),
    };

    vec![
        with_change(
            format!("Peso: {}", fixed_with_unit(weight, 1, "kg")),
            change_since(comparison.and_then(|c| c.weight_change_kg), "kg", comparison),
        ),
        with_change(
            format!("IMC: {}", imc_text),
            change_since(comparison.and_then(|c| c.imc_change), "", comparison),
        ),
        with_change(
            format!("% Gordura: {}", fixed_with_unit(fat, 1, "%")),
            change_since(comparison.and_then(|c| c.fat_percentage_change), "%", comparison),
        ),
        format!("% Massa Magra: {}", fixed_with_unit(lean, 1, "%")),
        format!("Metabolismo Basal: {}", fixed_with_unit(basal, 0, "kcal")),
        format!("Idade Corporal: {}", fixed_with_unit(body_age, 1, "anos")),
        format!("Gordura Visceral: {}", fixed(visceral, 1)),
        format!(
            "Frequência Cardíaca: {}",
            fixed_with_unit(evaluation.heart_rate_rest, 0, "bpm")
        ),
    ]
}

/// Layout plus the bookkeeping the finished document carries
struct DocumentBuilder {
    layout: FlowLayout,
    images: Vec<ImageData>,
    sections: Vec<SectionMark>,
    placeholders: Vec<ChartSlot>,
}

impl DocumentBuilder {
    fn new(geometry: PageGeometry) -> Self {
        Self {
            layout: FlowLayout::new(geometry),
            images: Vec::new(),
            sections: Vec::new(),
            placeholders: Vec::new(),
        }
    }

    fn section(&mut self, section: Section) {
        self.sections.push(SectionMark {
            section,
            page: self.layout.page_index(),
            y: self.layout.cursor(),
        });
    }

    fn heading(&mut self, text: &str) {
        // keep a heading together with at least one body line
        self.layout
            .reserve(HEADING.line_height() + BODY.line_height() + ROW_SPACING);
        self.layout.paragraph(text, HEADING, 4.0);
    }

    fn grid(&mut self, cells: &[String], offsets: &[f64]) {
        self.layout.grid(cells, offsets, BODY, ROW_SPACING);
        self.layout.advance(SECTION_SPACING);
    }

    fn chart(&mut self, slot: ChartSlot, outcome: Option<&CaptureOutcome>) {
        match outcome.and_then(CaptureOutcome::capture) {
            Some(capture) => {
                let (box_width, box_height) = chart_box(slot);
                let (width, height) = fit_aspect(box_width, box_height, capture.aspect_ratio());
                self.layout
                    .reserve(CHART_TITLE.line_height() + 4.0 + height + SECTION_SPACING);
                self.layout.paragraph(slot.title(), CHART_TITLE, 4.0);

                let index = self.images.len();
                self.images.push(ImageData::from_raster(&capture.image));
                self.layout.image(index, width, height);
                self.layout.advance(SECTION_SPACING);
            }
            None => {
                self.layout
                    .reserve(CHART_TITLE.line_height() + BODY.line_height() + SECTION_SPACING);
                self.layout.paragraph(slot.title(), CHART_TITLE, 2.0);
                self.layout
                    .paragraph(CHART_PLACEHOLDER, BODY.with_color(MUTED), SECTION_SPACING);
                self.placeholders.push(slot);
            }
        }
    }

    fn finish(self) -> PagedDocument {
        PagedDocument {
            title: DOCUMENT_TITLE.to_string(),
            pages: self.layout.finish(),
            images: self.images,
            sections: self.sections,
            placeholders: self.placeholders,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use capture::{RasterImage, Unavailable};
    use report_model::{EvaluationRecord, ReportSummary, StudentRef, Trend};

    fn report(notes: Option<&str>) -> EvaluationReport {
        EvaluationReport {
            evaluation: EvaluationRecord {
                date: "2024-03-05".to_string(),
                weight_kg: Some(72.5),
                imc: Some(23.4),
                notes: notes.map(str::to_string),
                ..Default::default()
            },
            student: StudentRef {
                id: Some(3),
                name: "Ana Souza".to_string(),
            },
            summary: ReportSummary::default(),
        }
    }

    fn all_unavailable() -> Vec<(ChartSlot, CaptureOutcome)> {
        ChartSlot::ALL
            .into_iter()
            .map(|slot| (slot, CaptureOutcome::Unavailable(Unavailable::NoSource)))
            .collect()
    }

    #[test]
    fn test_sections_in_fixed_order_without_optional_ones() {
        let doc = ReportLayout::default().build(&report(None), &all_unavailable());
        assert_eq!(
            doc.section_order(),
            vec![
                Section::Header,
                Section::KeyMetrics,
                Section::Flexibility,
                Section::Skinfolds,
                Section::Perimeters,
                Section::Footer,
                Section::Charts,
            ]
        );
        assert!(!doc.contains_text("Observações"));
    }

    #[test]
    fn test_notes_follow_perimeters() {
        let doc = ReportLayout::default().build(&report(Some("x")), &all_unavailable());
        let order = doc.section_order();
        let notes = order.iter().position(|s| *s == Section::Notes).unwrap();
        assert_eq!(order[notes - 1], Section::Perimeters);
        assert_eq!(order[notes + 1], Section::Footer);
        assert!(doc.contains_text("Observações"));
    }

    #[test]
    fn test_blank_notes_are_omitted() {
        let doc = ReportLayout::default().build(&report(Some("   ")), &all_unavailable());
        assert!(!doc.section_order().contains(&Section::Notes));
    }

    #[test]
    fn test_health_section_lists_conditions_with_notes() {
        let mut r = report(None);
        r.evaluation.hypertension = true;
        r.evaluation.hypertension_notes = Some("Controlada com medicação".to_string());
        let doc = ReportLayout::default().build(&r, &all_unavailable());
        assert!(doc.section_order().contains(&Section::HealthConditions));
        assert!(doc.contains_text("Hipertensão: Sim"));
        assert!(doc.contains_text("Controlada com medicação"));
        assert!(!doc.contains_text("Diabetes"));
    }

    #[test]
    fn test_health_section_lists_summary_conditions() {
        let mut r = report(None);
        r.summary.health_conditions.diabetes = true;
        r.evaluation.diabetes_notes = Some("Tipo 2".to_string());
        let doc = ReportLayout::default().build(&r, &all_unavailable());
        assert!(doc.section_order().contains(&Section::HealthConditions));
        assert!(doc.contains_text("Diabetes: Sim"));
        assert!(doc.contains_text("Tipo 2"));
        assert!(!doc.contains_text("Cardiopatia"));
    }

    #[test]
    fn test_perimeters_sit_at_fixed_offsets() {
        let mut r = report(None);
        r.evaluation.perimeter_chest = Some(95.0);
        let doc = ReportLayout::default().build(&r, &all_unavailable());
        let chest_row_y = doc.pages[0]
            .items
            .iter()
            .find_map(|item| match item {
                crate::pdf::PdfRenderItem::Text(t) if t.text.starts_with("Tórax") => Some(t.y),
                _ => None,
            })
            .unwrap();
        let xs: Vec<f64> = doc.pages[0]
            .items
            .iter()
            .filter_map(|item| match item {
                crate::pdf::PdfRenderItem::Text(t) if t.y == chest_row_y => Some(t.x),
                _ => None,
            })
            .collect();
        let left = PageGeometry::default().margin_left;
        assert_eq!(
            xs,
            PERIMETER_COLUMNS.iter().map(|offset| left + offset).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_missing_charts_become_placeholders() {
        let mut charts = all_unavailable();
        let image = RasterImage::filled(480, 300, [200, 50, 50, 255]).unwrap();
        charts[0].1 = capture::ChartCapturer::default().read_canvas(&capture::Canvas::new(image));

        let doc = ReportLayout::default().build(&report(None), &charts);
        assert_eq!(doc.images.len(), 1);
        assert_eq!(doc.placeholders, ChartSlot::ALL[1..].to_vec());
        assert!(doc.contains_text(CHART_PLACEHOLDER));
    }

    #[test]
    fn test_chart_box_keeps_bitmap_ratio() {
        let mut charts = all_unavailable();
        let image = RasterImage::filled(250, 250, [0, 0, 0, 255]).unwrap();
        charts[0].1 = capture::ChartCapturer::default().read_canvas(&capture::Canvas::new(image));

        let doc = ReportLayout::default().build(&report(None), &charts);
        let placed = doc
            .pages
            .iter()
            .flat_map(|p| p.items.iter())
            .find_map(|item| match item {
                crate::pdf::PdfRenderItem::Image(image) => Some(*image),
                _ => None,
            })
            .unwrap();
        assert_eq!((placed.width, placed.height), (250.0, 250.0));
    }

    #[test]
    fn test_footer_and_trend() {
        let mut r = report(None);
        r.summary.evaluation_number = Some(2);
        r.summary.comparison_with_previous = Some(Comparison {
            weight_change_kg: Some(-1.2),
            previous_date: Some("2024-01-10".to_string()),
            trend: Some(Trend::Improving),
            ..Default::default()
        });
        let doc = ReportLayout::default().build(&r, &all_unavailable());
        assert!(doc.contains_text("Avaliação #2 de - total"));
        assert!(doc.contains_text("Tendência: Melhorando"));
        assert!(doc.contains_text("-1.20 kg desde 10/01/2024"));
    }

    #[test]
    fn test_long_report_paginates() {
        let mut r = report(Some(&"Treino de força três vezes por semana. ".repeat(120)));
        r.evaluation.diabetes = true;
        let doc = ReportLayout::default().build(&r, &all_unavailable());
        assert!(doc.page_count() > 1);
        let geometry = PageGeometry::default();
        for page in &doc.pages {
            for item in &page.items {
                if let crate::pdf::PdfRenderItem::Text(text) = item {
                    assert!(text.y <= geometry.bottom_limit());
                }
            }
        }
    }
}
