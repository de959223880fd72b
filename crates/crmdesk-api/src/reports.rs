// Report endpoints
//
// The four queries behind the reporting dashboard. Each returns the
// unwrapped `data` payload deserialized into the caller's type.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;

use crate::client::ReportsClient;
use crate::error::Error;

/// Parameters of the sales-funnel query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunnelQuery {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub group_by: String,
}

impl FunnelQuery {
    /// The whole calendar year `year`, grouped by month.
    ///
    /// Returns `None` only for years chrono cannot represent.
    pub fn calendar_year(year: i32) -> Option<Self> {
        Some(Self {
            start: NaiveDate::from_ymd_opt(year, 1, 1)?,
            end: NaiveDate::from_ymd_opt(year, 12, 31)?,
            group_by: "month".into(),
        })
    }

    fn to_query(&self) -> Vec<(&'static str, String)> {
        vec![
            ("startDate", self.start.format("%Y-%m-%d").to_string()),
            ("endDate", self.end.format("%Y-%m-%d").to_string()),
            ("groupBy", self.group_by.clone()),
        ]
    }
}

impl ReportsClient {
    /// Current-period dashboard summary.
    ///
    /// `GET /api/reports/dashboard`
    pub async fn dashboard<T: DeserializeOwned>(&self) -> Result<T, Error> {
        let url = self.api_url("/api/reports/dashboard")?;
        self.get(url, &[]).await
    }

    /// Sales funnel between two dates.
    ///
    /// `GET /api/reports/sales-funnel?startDate=..&endDate=..&groupBy=..`
    pub async fn sales_funnel<T: DeserializeOwned>(&self, query: &FunnelQuery) -> Result<T, Error> {
        let url = self.api_url("/api/reports/sales-funnel")?;
        self.get(url, &query.to_query()).await
    }

    /// License expiry breakdown for one year.
    ///
    /// `GET /api/reports/license-expiry?year=YYYY`
    pub async fn license_expiry<T: DeserializeOwned>(&self, year: i32) -> Result<T, Error> {
        let url = self.api_url("/api/reports/license-expiry")?;
        self.get(url, &[("year", year.to_string())]).await
    }

    /// Raw listing of licenses expiring soon.
    ///
    /// `GET /api/reports/expiring-licenses`
    pub async fn expiring_licenses<T: DeserializeOwned>(&self) -> Result<T, Error> {
        let url = self.api_url("/api/reports/expiring-licenses")?;
        self.get(url, &[]).await
    }
}
