// crmdesk-core: Report aggregation, row normalization and export between
// crmdesk-api and its consumers (CLI/TUI).

pub mod config;
pub mod controller;
pub mod display;
pub mod error;
pub mod export;
pub mod model;
pub mod normalize;
pub mod sort;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{BackendConfig, TlsVerification};
pub use controller::{Clock, FixedClock, RefreshOutcome, ReportSnapshot, ReportsController, SystemClock};
pub use error::{CoreError, ExportError};
pub use export::ToLicenseRow;
pub use normalize::normalize;
pub use sort::{SortColumn, SortDirection, SortState, sort_rows};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    CanonicalLicenseRow, ConversionRates, CurrentPeriod, DashboardSummary, EntityTotals,
    FunnelPeriod, LicenseExpirySummary, LicenseRecord, LicenseTotals, MonthlyExpiry,
    PeriodMetric, SalesFunnelSummary, TypeBreakdown,
};
