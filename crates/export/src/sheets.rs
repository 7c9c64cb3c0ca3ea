//! Evaluation workbook
//!
//! Every sheet is a plain row-major grid of strings. Rows are fixed per
//! sheet; a missing measurement still gets its row, valued `-`.

use crate::writers::SpreadsheetWriter;
use crate::Result;
use report_model::format::{fixed, yes_no, PLACEHOLDER};
use report_model::EvaluationReport;
use rust_xlsxwriter::{Format, Workbook};

pub const SUMMARY_SHEET: &str = "Resumo";
pub const SKINFOLDS_SHEET: &str = "Dobras Cutâneas";
pub const PERIMETERS_SHEET: &str = "Perímetros";
pub const FLEXIBILITY_SHEET: &str = "Flexibilidade";
pub const COMPARISON_SHEET: &str = "Comparação";
pub const NOTES_SHEET: &str = "Observações";

/// One worksheet worth of rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetData {
    pub name: String,
    pub rows: Vec<Vec<String>>,
}

impl SheetData {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            rows: Vec::new(),
        }
    }

    fn title(mut self, text: &str) -> Self {
        self.rows.push(vec![text.to_string()]);
        self
    }

    fn pair(mut self, label: &str, value: impl Into<String>) -> Self {
        self.rows.push(vec![label.to_string(), value.into()]);
        self
    }

    fn blank(mut self) -> Self {
        self.rows.push(vec![String::new()]);
        self
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }
}

fn raw_or_placeholder(value: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        value.to_string()
    }
}

/// Sheets for one evaluation, in workbook order
pub fn build_sheets(report: &EvaluationReport) -> Vec<SheetData> {
    let evaluation = &report.evaluation;
    let mut sheets = Vec::with_capacity(6);

    sheets.push(
        SheetData::new(SUMMARY_SHEET)
            .title("Relatório de Avaliação Física")
            .pair("Aluno:", raw_or_placeholder(&report.student.name))
            .pair("Data:", raw_or_placeholder(&evaluation.date))
            .blank()
            .title("Métricas Principais")
            .pair("Peso (kg)", fixed(evaluation.weight_kg, 2))
            .pair("Altura (m)", fixed(evaluation.height_m, 2))
            .pair("IMC", fixed(evaluation.imc, 2))
            .pair("% Gordura", fixed(evaluation.fat_percentage, 2))
            .pair("% Massa Magra", fixed(evaluation.lean_mass_percentage, 2))
            .pair("Metabolismo Basal (kcal)", fixed(evaluation.basal_metabolism, 0))
            .pair("Idade Corporal (anos)", fixed(evaluation.body_age, 1))
            .pair("Gordura Visceral", fixed(evaluation.visceral_fat, 1))
            .pair("Frequência Cardíaca (bpm)", fixed(evaluation.heart_rate_rest, 0))
            .blank()
            .title("Condições de Saúde")
            .pair("Cardiopatia", yes_no(evaluation.cardiopathy))
            .pair("Hipertensão", yes_no(evaluation.hypertension))
            .pair("Diabetes", yes_no(evaluation.diabetes)),
    );

    let skinfolds = evaluation
        .skinfolds()
        .into_iter()
        .fold(SheetData::new(SKINFOLDS_SHEET).title("Dobras Cutâneas (mm)"), |sheet, m| {
            sheet.pair(m.label, fixed(m.value, 1))
        });
    sheets.push(skinfolds);

    let perimeters = evaluation
        .perimeters()
        .into_iter()
        .fold(SheetData::new(PERIMETERS_SHEET).title("Perímetros (cm)"), |sheet, m| {
            sheet.pair(m.label, fixed(m.value, 1))
        });
    sheets.push(perimeters);

    sheets.push(
        SheetData::new(FLEXIBILITY_SHEET)
            .title("Testes de Flexibilidade")
            .pair(
                "Teste de Sentar e Alcançar (cm)",
                fixed(evaluation.wells_sit_reach_test, 1),
            )
            .pair(
                "Teste de Flexão do Tronco (cm)",
                fixed(evaluation.trunk_flexion_test, 1),
            ),
    );

    if let Some(comparison) = &report.summary.comparison_with_previous {
        let trend = comparison
            .trend
            .map_or("Precisa de atenção", |trend| trend.label());
        sheets.push(
            SheetData::new(COMPARISON_SHEET)
                .title("Comparação com Avaliação Anterior")
                .pair(
                    "Data da Avaliação Anterior",
                    raw_or_placeholder(comparison.previous_date.as_deref().unwrap_or_default()),
                )
                .pair("Variação de Peso (kg)", fixed(comparison.weight_change_kg, 2))
                .pair("Variação de IMC", fixed(comparison.imc_change, 2))
                .pair("Variação de % Gordura", fixed(comparison.fat_percentage_change, 2))
                .pair("Tendência", trend),
        );
    }

    if let Some(notes) = evaluation.notes_text() {
        sheets.push(SheetData::new(NOTES_SHEET).title("Observações").title(notes));
    }

    sheets
}

/// Workbook writer backed by `rust_xlsxwriter`
#[derive(Debug, Default)]
pub struct XlsxWorkbookWriter;

impl XlsxWorkbookWriter {
    pub fn new() -> Self {
        Self
    }
}

impl SpreadsheetWriter for XlsxWorkbookWriter {
    fn write_workbook(&self, sheets: &[SheetData]) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();
        let title_format = Format::new().set_bold();

        for sheet in sheets {
            let worksheet = workbook.add_worksheet().set_name(&sheet.name)?;

            for (row, cells) in sheet.rows.iter().enumerate() {
                let row = row as u32;
                for (col, value) in cells.iter().enumerate() {
                    if value.is_empty() {
                        continue;
                    }
                    if row == 0 {
                        worksheet.write_string_with_format(row, col as u16, value, &title_format)?;
                    } else {
                        worksheet.write_string(row, col as u16, value)?;
                    }
                }
            }

            worksheet.set_column_width(0, 34)?;
            worksheet.set_column_width(1, 18)?;
        }

        tracing::debug!("Workbook with {} sheets assembled", sheets.len());
        Ok(workbook.save_to_buffer()?)
    }
}
