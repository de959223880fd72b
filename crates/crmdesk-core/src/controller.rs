// ── Report aggregation controller ──
//
// Owns the backend session and the three report view-models. A refresh
// cycle fans out the four report queries, joins them fail-fast and commits
// all three view-models at once. Overlapping cycles are ordered by a
// monotonically increasing token: only the newest cycle may commit.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Datelike, Local, Utc};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crmdesk_api::{FunnelQuery, ReportsClient};

use crate::config::BackendConfig;
use crate::error::CoreError;
use crate::model::{CanonicalLicenseRow, DashboardSummary, LicenseExpirySummary, SalesFunnelSummary};
use crate::normalize::normalize;

// ── Clock ────────────────────────────────────────────────────────

/// Source of the reference year for the funnel and expiry queries.
pub trait Clock: Send + Sync {
    fn current_year(&self) -> i32;
}

/// Local wall-clock year.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn current_year(&self) -> i32 {
        Local::now().year()
    }
}

/// A pinned year, for tests and reruns of past reports.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i32);

impl Clock for FixedClock {
    fn current_year(&self) -> i32 {
        self.0
    }
}

// ── Snapshot ─────────────────────────────────────────────────────

/// All three view-models from one committed refresh cycle.
///
/// Replaced wholesale on every successful cycle so the views never see a
/// mix of old and new reports. Each field is `None` until the first
/// successful cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSnapshot {
    pub dashboard: Option<DashboardSummary>,
    pub sales_funnel: Option<SalesFunnelSummary>,
    pub license_expiry: Option<LicenseExpirySummary>,
    pub refreshed_at: Option<DateTime<Utc>>,
}

impl ReportSnapshot {
    /// Expiring licenses of every month, in month order, normalized.
    pub fn license_rows(&self) -> Vec<CanonicalLicenseRow> {
        self.license_expiry
            .iter()
            .flat_map(|summary| &summary.monthly)
            .flat_map(|month| &month.licenses)
            .map(|record| normalize(&record.0))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.dashboard.is_none() && self.sales_funnel.is_none() && self.license_expiry.is_none()
    }
}

/// How a refresh cycle ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// New view-models committed.
    Applied,
    /// A query failed; previous view-models are untouched.
    Failed(String),
    /// A newer cycle started before this one settled; results discarded.
    Superseded,
}

// ── Controller ───────────────────────────────────────────────────

/// Report aggregation entry point for the CLI and TUI.
///
/// Cheaply cloneable; clones share the session and state channels.
#[derive(Clone)]
pub struct ReportsController {
    config: Option<Arc<BackendConfig>>,
    client: Arc<tokio::sync::Mutex<Option<ReportsClient>>>,
    state: Arc<SharedState>,
    clock: Arc<dyn Clock>,
}

struct SharedState {
    reports: watch::Sender<Arc<ReportSnapshot>>,
    loading: watch::Sender<bool>,
    /// Token of the newest cycle. Starting a cycle and committing one both
    /// happen under this lock so a commit can never race a newer start.
    latest_cycle: Mutex<u64>,
}

type Batch = (DashboardSummary, SalesFunnelSummary, LicenseExpirySummary, Value);

impl ReportsController {
    /// Create a controller from configuration. Does NOT connect;
    /// call [`connect()`](Self::connect) to log in and load reports.
    pub fn new(config: BackendConfig) -> Self {
        Self::build(Some(Arc::new(config)), None)
    }

    /// Wrap an already-authenticated client.
    pub fn with_client(client: ReportsClient) -> Self {
        Self::build(None, Some(client))
    }

    /// Replace the year source.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    fn build(config: Option<Arc<BackendConfig>>, client: Option<ReportsClient>) -> Self {
        let (reports, _) = watch::channel(Arc::new(ReportSnapshot::default()));
        let (loading, _) = watch::channel(false);
        Self {
            config,
            client: Arc::new(tokio::sync::Mutex::new(client)),
            state: Arc::new(SharedState {
                reports,
                loading,
                latest_cycle: Mutex::new(0),
            }),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn config(&self) -> Option<&BackendConfig> {
        self.config.as_deref()
    }

    // ── Connection lifecycle ─────────────────────────────────────

    /// Log in and run the initial refresh.
    ///
    /// Login failures are errors. The initial refresh never is; its
    /// outcome is returned for the caller to report.
    pub async fn connect(&self) -> Result<RefreshOutcome, CoreError> {
        if let Some(config) = &self.config {
            let client = ReportsClient::new(config.url.clone(), &config.transport())?;
            client.login(&config.username, &config.password).await?;
            info!(url = %config.url, user = %config.username, "logged in");
            *self.client.lock().await = Some(client);
        } else if self.client.lock().await.is_none() {
            return Err(CoreError::NotConnected);
        }

        Ok(self.refresh_reports().await)
    }

    /// Log out and drop the session. Stored view-models stay readable.
    pub async fn disconnect(&self) {
        if let Some(client) = self.client.lock().await.take() {
            client.logout().await;
        }
        debug!("disconnected");
    }

    // ── State ────────────────────────────────────────────────────

    /// Subscribe to committed report snapshots.
    pub fn reports(&self) -> watch::Receiver<Arc<ReportSnapshot>> {
        self.state.reports.subscribe()
    }

    /// Subscribe to the loading flag.
    pub fn loading(&self) -> watch::Receiver<bool> {
        self.state.loading.subscribe()
    }

    /// The most recently committed snapshot.
    pub fn snapshot(&self) -> Arc<ReportSnapshot> {
        self.state.reports.borrow().clone()
    }

    pub fn is_loading(&self) -> bool {
        *self.state.loading.borrow()
    }

    // ── Refresh ──────────────────────────────────────────────────

    /// Run one refresh cycle.
    ///
    /// Sets the loading flag, issues all four report queries concurrently
    /// and waits for them together. If any query fails, nothing is
    /// committed. Only the newest cycle commits or clears the loading
    /// flag; an older cycle settling late returns
    /// [`RefreshOutcome::Superseded`].
    pub async fn refresh_reports(&self) -> RefreshOutcome {
        let cycle = self.begin_cycle();
        let year = self.clock.current_year();
        debug!(cycle, year, "refresh cycle started");

        let result = self.fetch_batch(year).await;

        let latest = self
            .state
            .latest_cycle
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if *latest != cycle {
            debug!(cycle, latest = *latest, "refresh cycle superseded; discarding results");
            return RefreshOutcome::Superseded;
        }

        let outcome = match result {
            Ok((dashboard, sales_funnel, license_expiry, _)) => {
                self.state.reports.send_replace(Arc::new(ReportSnapshot {
                    dashboard: Some(dashboard),
                    sales_funnel: Some(sales_funnel),
                    license_expiry: Some(license_expiry),
                    refreshed_at: Some(Utc::now()),
                }));
                info!(cycle, "reports refreshed");
                RefreshOutcome::Applied
            }
            Err(message) => {
                warn!(cycle, error = %message, "report refresh failed");
                RefreshOutcome::Failed(message)
            }
        };

        self.state.loading.send_replace(false);
        drop(latest);
        outcome
    }

    fn begin_cycle(&self) -> u64 {
        let mut latest = self
            .state
            .latest_cycle
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *latest += 1;
        self.state.loading.send_replace(true);
        *latest
    }

    /// Fan out the four queries, wait for all of them, then fail if any failed.
    ///
    /// Errors come back as the diagnostic text: the backend's message when
    /// it sent one, else the error's display form.
    async fn fetch_batch(&self, year: i32) -> Result<Batch, String> {
        let Some(client) = self.client.lock().await.clone() else {
            return Err(CoreError::NotConnected.to_string());
        };
        let Some(funnel) = FunnelQuery::calendar_year(year) else {
            return Err(CoreError::Config {
                message: format!("year {year} is out of range"),
            }
            .to_string());
        };

        // Every query runs to completion before the batch is judged
        let (dashboard, sales_funnel, license_expiry, listing) = tokio::join!(
            client.dashboard::<DashboardSummary>(),
            client.sales_funnel::<SalesFunnelSummary>(&funnel),
            client.license_expiry::<LicenseExpirySummary>(year),
            client.expiring_licenses::<Value>(),
        );
        let batch = dashboard
            .and_then(|d| Ok((d, sales_funnel?, license_expiry?, listing?)))
            .map_err(|e| e.message().map_or_else(|| e.to_string(), str::to_owned))?;

        log_expiring_listing(&batch.3);
        Ok(batch)
    }
}

/// The raw expiring-licenses listing is diagnostic only; it is logged and
/// never stored.
fn log_expiring_listing(listing: &Value) {
    let count = listing.as_array().map_or(0, Vec::len);
    debug!(count, listing = %listing, "expiring licenses listing");
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::model::{LicenseRecord, MonthlyExpiry};

    #[test]
    fn license_rows_flatten_in_month_order() {
        let month = |m: u64, ids: &[&str]| MonthlyExpiry {
            month: m,
            licenses: ids
                .iter()
                .map(|id| {
                    let Value::Object(map) = json!({ "productId": id }) else {
                        unreachable!()
                    };
                    LicenseRecord(map)
                })
                .collect(),
            ..MonthlyExpiry::default()
        };
        let snapshot = ReportSnapshot {
            license_expiry: Some(LicenseExpirySummary {
                year: 2024,
                monthly: vec![month(1, &["A", "B"]), month(2, &[]), month(3, &["C"])],
                ..LicenseExpirySummary::default()
            }),
            ..ReportSnapshot::default()
        };

        let ids: Vec<String> = snapshot.license_rows().into_iter().map(|r| r.product_id).collect();
        assert_eq!(ids, ["A", "B", "C"]);
    }

    #[test]
    fn empty_snapshot_has_no_rows() {
        assert!(ReportSnapshot::default().license_rows().is_empty());
        assert!(ReportSnapshot::default().is_empty());
    }

    #[tokio::test]
    async fn refresh_without_session_fails_and_clears_loading() {
        let controller = ReportsController::with_client(
            ReportsClient::from_reqwest("http://127.0.0.1:9", reqwest::Client::new()).unwrap(),
        );
        controller.client.lock().await.take();

        let outcome = controller.refresh_reports().await;
        assert!(matches!(outcome, RefreshOutcome::Failed(_)));
        assert!(!controller.is_loading());
        assert!(controller.snapshot().is_empty());
    }
}
