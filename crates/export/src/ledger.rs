//! Cash ledger exports

use crate::{ExportError, Result};
use report_model::format::{format_date_time, PLACEHOLDER};
use report_model::LedgerDay;

pub const LEDGER_COLUMNS: [&str; 5] = ["Data", "Tipo", "Valor", "Categoria", "Descrição"];

fn text_or_placeholder(value: Option<&str>) -> &str {
    value.filter(|v| !v.trim().is_empty()).unwrap_or(PLACEHOLDER)
}

/// One row per movement, in ledger order
pub fn ledger_csv(ledger: &LedgerDay) -> Result<Vec<u8>> {
    if ledger.is_empty() {
        return Err(ExportError::NothingToExport);
    }

    let mut output = Vec::new();
    {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(true)
            .from_writer(&mut output);
        writer.write_record(LEDGER_COLUMNS)?;

        for entry in &ledger.entries {
            let amount = format!("{:.2}", entry.amount);
            writer.write_record([
                format_date_time(Some(entry.date_time.as_str())).as_str(),
                entry.kind.label(),
                amount.as_str(),
                text_or_placeholder(entry.category.as_deref()),
                text_or_placeholder(entry.description.as_deref()),
            ])?;
        }
        writer.flush()?;
    }

    Ok(output)
}

/// The ledger day as pretty-printed JSON
pub fn ledger_json(ledger: &LedgerDay) -> Result<Vec<u8>> {
    if ledger.is_empty() {
        return Err(ExportError::NothingToExport);
    }
    Ok(serde_json::to_vec_pretty(ledger)?)
}
