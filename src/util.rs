// Parsing and formatting helpers.
//
// All the forgiving string handling lives here so the loader and reports can
// work with clean, typed values.
use chrono::NaiveDate;
use num_format::{Locale, ToFormattedString};

/// Parse a currency amount from a CSV cell.
///
/// - Accepts `Option<&str>` so callers can pass optional fields through.
/// - Trims whitespace and strips thousands separators (`,`).
/// - Rejects values containing alphabetic characters.
/// - Returns `None` for anything that cannot be safely parsed.
pub fn parse_amount(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() || s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    s.replace(',', "").parse::<f64>().ok()
}

/// Parse a `YYYY-MM-DD` date cell. Empty or missing cells yield `None`.
pub fn parse_date(s: Option<&str>) -> Option<NaiveDate> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Year-month bucket label for a date, e.g. `2024-01`.
///
/// Months sort correctly as plain strings in this form, which the monthly
/// views rely on.
pub fn month_label(d: NaiveDate) -> String {
    d.format("%Y-%m").to_string()
}

/// Arithmetic mean; 0 for an empty slice so aggregations never produce NaN.
pub fn mean(v: &[f64]) -> f64 {
    if v.is_empty() {
        return 0.0;
    }
    v.iter().sum::<f64>() / v.len() as f64
}

/// Render a Rand amount the way the dashboard shows it: `R` prefix,
/// thousands separators, no decimals (`R12,500`).
pub fn format_amount(n: f64) -> String {
    format!("R{}", format_number(n, 0))
}

/// Fixed-decimal rendering with locale thousands separators (`1,234,567.89`).
pub fn format_number(n: f64, decimals: usize) -> String {
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut out = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = parts.next() {
        out.push('.');
        out.push_str(frac);
    }
    // Sign goes on last so `-0.004` at two decimals renders `0.00`, not `-0.00`.
    let rounded_to_zero = s.chars().all(|c| c == '0' || c == '.');
    if n < 0.0 && !rounded_to_zero {
        format!("-{}", out)
    } else {
        out
    }
}

/// Thousands-separated integer, used for row counts in console messages.
pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}
