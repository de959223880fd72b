// ── Canonical license row ──

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::display;

/// One license with every field-name alias resolved.
///
/// Produced by [`crate::normalize`]; shared by the table renderers and the
/// export pipeline so both always show the same values.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalLicenseRow {
    pub customer: String,
    pub product_id: String,
    pub description: String,
    /// Raw expiry text; empty when the source had none.
    pub expiry_date: String,
    pub license_type: String,
    /// Always finite and non-negative.
    pub value: f64,
    pub purchase_order_id: String,
}

impl CanonicalLicenseRow {
    /// The expiry date, if the raw text parses.
    pub fn expiry(&self) -> Option<DateTime<Utc>> {
        display::parse_date(&self.expiry_date)
    }

    /// Description with each line break, and the blanks around it,
    /// collapsed to a single space.
    pub fn single_line_description(&self) -> String {
        self.description
            .split(['\r', '\n'])
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_line_breaks() {
        let row = CanonicalLicenseRow {
            description: "line1\nline2\r\n\r\nline3".into(),
            ..CanonicalLicenseRow::default()
        };
        assert_eq!(row.single_line_description(), "line1 line2 line3");
    }

    #[test]
    fn blanks_around_line_breaks_collapse() {
        let row = CanonicalLicenseRow {
            description: "a \n b\t\r\n  c  d".into(),
            ..CanonicalLicenseRow::default()
        };
        assert_eq!(row.single_line_description(), "a b c  d");
    }
}
