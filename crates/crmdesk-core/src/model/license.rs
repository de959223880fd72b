// ── License expiry breakdown ──

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::lenient;

/// Licenses expiring in one year, bucketed by month.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LicenseExpirySummary {
    #[serde(deserialize_with = "lenient::year")]
    pub year: i32,
    #[serde(deserialize_with = "lenient::or_default")]
    pub totals: LicenseTotals,
    /// Ordered by month.
    #[serde(deserialize_with = "lenient::or_default")]
    pub monthly: Vec<MonthlyExpiry>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LicenseTotals {
    #[serde(deserialize_with = "lenient::count")]
    pub count: u64,
    #[serde(deserialize_with = "lenient::amount")]
    pub value: f64,
    /// Number of months with at least one expiring license.
    #[serde(deserialize_with = "lenient::count")]
    pub months: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MonthlyExpiry {
    /// Calendar month, 1-12.
    #[serde(deserialize_with = "lenient::count")]
    pub month: u64,
    #[serde(deserialize_with = "lenient::string")]
    pub label: String,
    /// License type to count/value, in the backend's order.
    #[serde(deserialize_with = "lenient::or_default")]
    pub by_type: IndexMap<String, TypeBreakdown>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub licenses: Vec<LicenseRecord>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeBreakdown {
    #[serde(deserialize_with = "lenient::count")]
    pub count: u64,
    #[serde(deserialize_with = "lenient::amount")]
    pub value: f64,
}

/// One expiring license exactly as the backend sent it.
///
/// Field names vary between record sources, so the record stays loosely
/// typed; read it through [`crate::normalize`]. Non-object entries
/// deserialize as an empty record.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct LicenseRecord(pub Map<String, Value>);

impl<'de> Deserialize<'de> for LicenseRecord {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        })
    }
}

impl From<Map<String, Value>> for LicenseRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_monthly_breakdown() {
        let summary: LicenseExpirySummary = serde_json::from_value(json!({
            "year": 2024,
            "totals": { "count": 3, "value": "4500.50", "months": 2 },
            "monthly": [
                {
                    "month": 3,
                    "label": "March",
                    "byType": { "AMC": { "count": 1, "value": 1200 }, "ATS": { "count": 1, "value": 300 } },
                    "licenses": [ { "productId": "P1", "customerName": "Acme" }, "junk" ]
                }
            ]
        }))
        .unwrap();

        assert_eq!(summary.year, 2024);
        assert_eq!(summary.totals.value, 4500.5);
        let march = &summary.monthly[0];
        let types: Vec<_> = march.by_type.keys().map(String::as_str).collect();
        assert_eq!(types, ["AMC", "ATS"]);
        assert_eq!(march.licenses.len(), 2);
        assert_eq!(march.licenses[0].0["productId"], "P1");
        assert!(march.licenses[1].0.is_empty());
    }

    #[test]
    fn string_year_is_accepted() {
        let summary: LicenseExpirySummary =
            serde_json::from_value(json!({ "year": "2025", "monthly": null })).unwrap();
        assert_eq!(summary.year, 2025);
        assert!(summary.monthly.is_empty());
    }
}
