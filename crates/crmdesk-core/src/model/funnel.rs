// ── Sales funnel ──

use serde::{Deserialize, Serialize};

use super::dashboard::{ConversionRates, EntityTotals};
use super::lenient;

/// Funnel totals plus a per-period breakdown.
///
/// `breakdown` keeps the backend's chronological order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SalesFunnelSummary {
    #[serde(deserialize_with = "lenient::string")]
    pub group_by: String,
    #[serde(deserialize_with = "lenient::or_default")]
    pub totals: EntityTotals,
    #[serde(deserialize_with = "lenient::or_default")]
    pub conversion_rates: ConversionRates,
    #[serde(deserialize_with = "lenient::or_default")]
    pub breakdown: Vec<FunnelPeriod>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FunnelPeriod {
    /// Display label of the period (e.g. "Jan 2024").
    #[serde(deserialize_with = "lenient::string")]
    pub label: String,
    #[serde(deserialize_with = "lenient::count")]
    pub leads: u64,
    #[serde(deserialize_with = "lenient::count")]
    pub quotations: u64,
    #[serde(deserialize_with = "lenient::count")]
    pub orders: u64,
    #[serde(deserialize_with = "lenient::or_default")]
    pub conversion_rates: ConversionRates,
}
