//! Output file names

use chrono::NaiveDate;

const SUBJECT_FALLBACK: &str = "aluno";

/// Student name as used inside file names: runs of whitespace and path
/// separators become `_`
pub fn sanitize_subject(name: &str) -> String {
    let parts: Vec<&str> = name
        .split(|c: char| c.is_whitespace() || c == '/' || c == '\\')
        .filter(|part| !part.is_empty())
        .collect();
    if parts.is_empty() {
        SUBJECT_FALLBACK.to_string()
    } else {
        parts.join("_")
    }
}

fn iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn report_pdf_name(student: &str, date: NaiveDate) -> String {
    format!("relatorio_{}_{}.pdf", sanitize_subject(student), iso(date))
}

pub fn report_xlsx_name(student: &str, date: NaiveDate) -> String {
    format!("relatorio_{}_{}.xlsx", sanitize_subject(student), iso(date))
}

/// A single chart saved on its own
pub fn chart_file_name(student: &str, stem: &str, date: NaiveDate) -> String {
    format!("{}_{}_{}.png", sanitize_subject(student), stem, iso(date))
}

/// A chart's entry name inside an archive
pub fn archive_entry_name(student: &str, stem: &str) -> String {
    format!("{}_{}.png", sanitize_subject(student), stem)
}

pub fn chart_archive_name(student: &str, date: NaiveDate) -> String {
    format!("graficos_{}_{}.zip", sanitize_subject(student), iso(date))
}

/// Ledger file stem; the ledger's own date wins over the export date
pub fn ledger_stem(ledger_date: Option<&str>, today: NaiveDate) -> String {
    let date = ledger_date
        .and_then(report_model::format::parse_date)
        .unwrap_or(today);
    format!("financeiro_{}", iso(date))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
    }

    #[test]
    fn test_sanitize_subject() {
        assert_eq!(sanitize_subject("Ana  Maria\tSouza"), "Ana_Maria_Souza");
        assert_eq!(sanitize_subject("   "), "aluno");
        assert_eq!(sanitize_subject("José"), "José");
    }

    #[test]
    fn test_path_separators_never_reach_file_names() {
        assert_eq!(sanitize_subject("Ana/Souza"), "Ana_Souza");
        assert_eq!(sanitize_subject("Rui \\ Lima"), "Rui_Lima");
        assert_eq!(sanitize_subject("/"), "aluno");
        assert_eq!(report_pdf_name("../Ana", day()), "relatorio_.._Ana_2024-03-05.pdf");
    }

    #[test]
    fn test_file_names() {
        assert_eq!(report_pdf_name("Ana Souza", day()), "relatorio_Ana_Souza_2024-03-05.pdf");
        assert_eq!(report_xlsx_name("", day()), "relatorio_aluno_2024-03-05.xlsx");
        assert_eq!(
            chart_file_name("Ana", "composicao", day()),
            "Ana_composicao_2024-03-05.png"
        );
        assert_eq!(archive_entry_name("Ana", "classificacao"), "Ana_classificacao.png");
        assert_eq!(chart_archive_name("Ana", day()), "graficos_Ana_2024-03-05.zip");
    }

    #[test]
    fn test_ledger_stem_prefers_ledger_date() {
        assert_eq!(ledger_stem(Some("2024-01-31"), day()), "financeiro_2024-01-31");
        assert_eq!(ledger_stem(None, day()), "financeiro_2024-03-05");
        assert_eq!(ledger_stem(Some("ontem"), day()), "financeiro_2024-03-05");
    }
}
