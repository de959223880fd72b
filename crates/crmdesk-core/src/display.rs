// ── Display formatting shared by renderers and exporters ──
//
// Dates parse leniently and fall back to their raw text; amounts render
// with thousands separators. Pure functions, no I/O.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Parse an expiry date in any of the shapes the backend emits.
///
/// Offset-less values are taken as UTC; bare dates as UTC midnight.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.and_utc());
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Machine-sortable timestamp (`2024-03-01T00:00:00.000Z`), or the raw text.
pub fn iso_timestamp(raw: &str) -> String {
    parse_date(raw).map_or_else(
        || raw.to_owned(),
        |dt| dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
    )
}

/// Short human date (`Mar 1, 2024`), or the raw text.
pub fn short_date(raw: &str) -> String {
    parse_date(raw).map_or_else(|| raw.to_owned(), |dt| dt.format("%b %-d, %Y").to_string())
}

/// Amount with thousands separators and two decimals, prefixed by `currency`.
pub fn money(value: f64, currency: &str) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    let sign = if value < 0.0 { "-" } else { "" };
    let fixed = format!("{:.2}", value.abs());
    let (whole, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    format!("{sign}{currency}{}.{frac}", group_thousands(whole))
}

/// Whole count with thousands separators.
pub fn count(n: u64) -> String {
    group_thousands(&n.to_string())
}

/// Fractional rate as a percentage (`0.153` is `15.3%`).
pub fn percent(rate: f64) -> String {
    format!("{:.1}%", rate * 100.0)
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Truncate to at most `max` characters (not bytes).
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iso_from_plain_date() {
        assert_eq!(iso_timestamp("2024-03-01"), "2024-03-01T00:00:00.000Z");
    }

    #[test]
    fn iso_from_rfc3339_with_offset() {
        assert_eq!(
            iso_timestamp("2024-03-01T05:30:00+05:30"),
            "2024-03-01T00:00:00.000Z"
        );
    }

    #[test]
    fn unparsable_dates_keep_raw_text() {
        assert_eq!(iso_timestamp("next spring"), "next spring");
        assert_eq!(short_date("31/02/2024"), "31/02/2024");
        assert_eq!(short_date(""), "");
    }

    #[test]
    fn short_date_form() {
        assert_eq!(short_date("2024-03-01T10:00:00.000Z"), "Mar 1, 2024");
    }

    #[test]
    fn money_groups_thousands() {
        assert_eq!(money(1234.5, "$"), "$1,234.50");
        assert_eq!(money(0.0, "€"), "€0.00");
        assert_eq!(money(1_000_000.0, "$"), "$1,000,000.00");
        assert_eq!(money(999.999, "$"), "$1,000.00");
        assert_eq!(money(f64::NAN, "$"), "$0.00");
    }

    #[test]
    fn counts_and_percent() {
        assert_eq!(count(12_345), "12,345");
        assert_eq!(count(12), "12");
        assert_eq!(percent(0.153), "15.3%");
    }

    #[test]
    fn truncates_on_char_boundary() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }
}
