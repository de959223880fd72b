// ── Report view-models ──
//
// UI-ready snapshots of the report payloads. Every numeric field is parsed
// leniently so a malformed value degrades to zero instead of failing the
// whole payload.

pub mod dashboard;
pub mod funnel;
pub(crate) mod lenient;
pub mod license;
pub mod row;

pub use dashboard::{ConversionRates, CurrentPeriod, DashboardSummary, EntityTotals, PeriodMetric};
pub use funnel::{FunnelPeriod, SalesFunnelSummary};
pub use license::{LicenseExpirySummary, LicenseRecord, LicenseTotals, MonthlyExpiry, TypeBreakdown};
pub use row::CanonicalLicenseRow;
