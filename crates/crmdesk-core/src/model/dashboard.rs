// ── Dashboard summary ──

use serde::{Deserialize, Serialize};

use super::lenient;

/// Current-period activity, lifetime totals and conversion rates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardSummary {
    #[serde(deserialize_with = "lenient::or_default")]
    pub current_period: CurrentPeriod,
    #[serde(deserialize_with = "lenient::or_default")]
    pub totals: EntityTotals,
    #[serde(deserialize_with = "lenient::or_default")]
    pub conversion_rates: ConversionRates,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CurrentPeriod {
    #[serde(deserialize_with = "lenient::or_default")]
    pub leads: PeriodMetric,
    #[serde(deserialize_with = "lenient::or_default")]
    pub quotations: PeriodMetric,
    #[serde(deserialize_with = "lenient::or_default")]
    pub orders: PeriodMetric,
    /// Licenses expiring inside the current window.
    #[serde(deserialize_with = "lenient::count")]
    pub expiring_licenses: u64,
}

/// A count plus its growth against the previous period, in percent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeriodMetric {
    #[serde(deserialize_with = "lenient::count")]
    pub count: u64,
    #[serde(deserialize_with = "lenient::signed")]
    pub growth: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityTotals {
    #[serde(deserialize_with = "lenient::count")]
    pub leads: u64,
    #[serde(deserialize_with = "lenient::count")]
    pub quotations: u64,
    #[serde(deserialize_with = "lenient::count")]
    pub orders: u64,
}

/// Conversion rates as fractions (`0.25` is 25%).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConversionRates {
    #[serde(deserialize_with = "lenient::amount")]
    pub lead_to_quotation: f64,
    #[serde(deserialize_with = "lenient::amount")]
    pub quotation_to_order: f64,
    #[serde(deserialize_with = "lenient::amount")]
    pub overall: f64,
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_full_payload() {
        let summary: DashboardSummary = serde_json::from_value(json!({
            "currentPeriod": {
                "leads": { "count": 14, "growth": -12.5 },
                "quotations": { "count": "9", "growth": 3 },
                "orders": { "count": 4, "growth": null },
                "expiringLicenses": 6
            },
            "totals": { "leads": 310, "quotations": 120, "orders": 48 },
            "conversionRates": { "leadToQuotation": 0.39, "quotationToOrder": 0.4, "overall": "0.15" }
        }))
        .unwrap();

        assert_eq!(summary.current_period.leads.count, 14);
        assert_eq!(summary.current_period.leads.growth, -12.5);
        assert_eq!(summary.current_period.quotations.count, 9);
        assert_eq!(summary.current_period.orders.growth, 0.0);
        assert_eq!(summary.current_period.expiring_licenses, 6);
        assert_eq!(summary.totals.orders, 48);
        assert_eq!(summary.conversion_rates.overall, 0.15);
    }

    #[test]
    fn missing_and_null_sections_default() {
        let summary: DashboardSummary =
            serde_json::from_value(json!({ "totals": null, "currentPeriod": { "leads": { "count": "n/a" } } }))
                .unwrap();
        assert_eq!(summary, DashboardSummary::default());
    }
}
