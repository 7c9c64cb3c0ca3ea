//! Display formatting (pt-BR)
//!
//! Raw API values become the strings every export prints. Absent values
//! render as [`PLACEHOLDER`] so tables keep their shape.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Stand-in for a missing value
pub const PLACEHOLDER: &str = "-";

/// Parse the date part of an ISO date or date-time string
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    parse_date_time(raw).map(|dt| dt.date())
}

/// Parse an ISO date-time, with or without offset
pub fn parse_date_time(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// `DD/MM/YYYY`; unparsable input is returned as-is
pub fn format_date(raw: Option<&str>) -> String {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => PLACEHOLDER.to_string(),
        Some(s) => parse_date(s)
            .map(|d| d.format("%d/%m/%Y").to_string())
            .unwrap_or_else(|| s.to_string()),
    }
}

/// `DD/MM/YYYY HH:MM:SS`; unparsable input is returned as-is
pub fn format_date_time(raw: Option<&str>) -> String {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => PLACEHOLDER.to_string(),
        Some(s) => parse_date_time(s)
            .map(|dt| dt.format("%d/%m/%Y %H:%M:%S").to_string())
            .unwrap_or_else(|| s.to_string()),
    }
}

/// Brazilian Real, e.g. `R$ 1.234,56`. Absent values print as zero.
pub fn format_currency(value: Option<f64>) -> String {
    let value = value.filter(|v| v.is_finite()).unwrap_or(0.0);
    let cents = (value.abs() * 100.0).round() as u64;
    let units = (cents / 100).to_string();
    let mut grouped = String::with_capacity(units.len() + units.len() / 3);
    for (i, ch) in units.chars().enumerate() {
        if i > 0 && (units.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}R$ {grouped},{:02}", cents % 100)
}

/// `(DD) DDDDD-DDDD` for mobiles, `(DD) DDDD-DDDD` for landlines
pub fn format_phone(raw: Option<&str>) -> String {
    let Some(phone) = raw.filter(|p| !p.is_empty()) else {
        return PLACEHOLDER.to_string();
    };
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    match digits.len() {
        11 => format!("({}) {}-{}", &digits[..2], &digits[2..7], &digits[7..]),
        10 => format!("({}) {}-{}", &digits[..2], &digits[2..6], &digits[6..]),
        _ => phone.to_string(),
    }
}

/// Body mass index rounded to two decimals
pub fn calculate_bmi(weight_kg: Option<f64>, height_m: Option<f64>) -> Option<f64> {
    let weight = weight_kg.filter(|w| *w > 0.0)?;
    let height = height_m.filter(|h| *h > 0.0)?;
    Some(round_to(weight / (height * height), 2))
}

pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Fixed-point rendering of an optional measurement
pub fn fixed(value: Option<f64>, decimals: usize) -> String {
    match value.filter(|v| v.is_finite()) {
        Some(v) => format!("{v:.decimals$}"),
        None => PLACEHOLDER.to_string(),
    }
}

/// Fixed-point value followed by a unit, or the bare placeholder
pub fn fixed_with_unit(value: Option<f64>, decimals: usize, unit: &str) -> String {
    match value.filter(|v| v.is_finite()) {
        Some(_) if unit.is_empty() => fixed(value, decimals),
        Some(_) => format!("{} {unit}", fixed(value, decimals)),
        None => PLACEHOLDER.to_string(),
    }
}

/// Signed change against a previous value; zero and absent both print `-`
pub fn format_change(value: Option<f64>, unit: &str) -> String {
    match value.filter(|v| v.is_finite() && *v != 0.0) {
        None => PLACEHOLDER.to_string(),
        Some(v) => {
            let sign = if v > 0.0 { "+" } else { "" };
            if unit.is_empty() {
                format!("{sign}{v:.2}")
            } else {
                format!("{sign}{v:.2} {unit}")
            }
        }
    }
}

/// `Sim`/`Não`
pub fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Sim"
    } else {
        "Não"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(Some("2024-03-05")), "05/03/2024");
        assert_eq!(format_date(Some("2024-03-05T14:20:00")), "05/03/2024");
        assert_eq!(format_date(Some("2024-03-05T14:20:00-03:00")), "05/03/2024");
        assert_eq!(format_date(None), "-");
        assert_eq!(format_date(Some("")), "-");
        assert_eq!(format_date(Some("ontem")), "ontem");
    }

    #[test]
    fn test_format_date_time() {
        assert_eq!(
            format_date_time(Some("2024-06-01T09:30:00")),
            "01/06/2024 09:30:00"
        );
        assert_eq!(format_date_time(Some("2024-06-01")), "01/06/2024 00:00:00");
        assert_eq!(format_date_time(None), "-");
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(Some(1234.56)), "R$ 1.234,56");
        assert_eq!(format_currency(Some(0.5)), "R$ 0,50");
        assert_eq!(format_currency(Some(1_000_000.0)), "R$ 1.000.000,00");
        assert_eq!(format_currency(Some(-10.0)), "-R$ 10,00");
        assert_eq!(format_currency(None), "R$ 0,00");
    }

    #[test]
    fn test_format_phone() {
        assert_eq!(format_phone(Some("11987654321")), "(11) 98765-4321");
        assert_eq!(format_phone(Some("(11) 3456-7890")), "(11) 3456-7890");
        assert_eq!(format_phone(Some("1134567890")), "(11) 3456-7890");
        assert_eq!(format_phone(Some("123")), "123");
        assert_eq!(format_phone(None), "-");
    }

    #[test]
    fn test_calculate_bmi() {
        assert_eq!(calculate_bmi(Some(70.0), Some(1.75)), Some(22.86));
        assert_eq!(calculate_bmi(Some(70.0), Some(0.0)), None);
        assert_eq!(calculate_bmi(None, Some(1.75)), None);
    }

    #[test]
    fn test_fixed_and_change() {
        assert_eq!(fixed(Some(81.456), 2), "81.46");
        assert_eq!(fixed(Some(1520.4), 0), "1520");
        assert_eq!(fixed(Some(0.0), 1), "0.0");
        assert_eq!(fixed(None, 1), "-");
        assert_eq!(fixed(Some(f64::NAN), 1), "-");
        assert_eq!(fixed_with_unit(Some(80.0), 2, "kg"), "80.00 kg");
        assert_eq!(fixed_with_unit(None, 2, "kg"), "-");

        assert_eq!(format_change(Some(1.2), "kg"), "+1.20 kg");
        assert_eq!(format_change(Some(-0.35), ""), "-0.35");
        assert_eq!(format_change(Some(0.0), "kg"), "-");
        assert_eq!(format_change(None, "%"), "-");
    }

    proptest! {
        #[test]
        fn test_present_values_never_render_placeholder(v in -1.0e6f64..1.0e6, d in 0usize..3) {
            prop_assert_ne!(fixed(Some(v), d), PLACEHOLDER);
        }

        #[test]
        fn test_mobile_numbers_always_masked(digits in "[0-9]{11}") {
            let formatted = format_phone(Some(&digits));
            prop_assert_eq!(formatted.len(), 15);
            prop_assert!(formatted.starts_with('('));
        }
    }
}
