// Refresh-cycle tests for `ReportsController` against a wiremock backend.

use std::time::{Duration, Instant};

use secrecy::SecretString;
use serde_json::{Value, json};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crmdesk_api::ReportsClient;
use crmdesk_core::{
    BackendConfig, CoreError, FixedClock, RefreshOutcome, ReportsController, TlsVerification,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn dashboard_body(leads: u64) -> Value {
    json!({ "data": {
        "currentPeriod": { "leads": { "count": leads, "growth": 5 }, "expiringLicenses": 2 },
        "totals": { "leads": leads, "quotations": 4, "orders": 1 },
        "conversionRates": { "leadToQuotation": 0.4, "quotationToOrder": 0.25, "overall": 0.1 }
    }})
}

fn funnel_body() -> Value {
    json!({ "data": {
        "groupBy": "month",
        "totals": { "leads": 10, "quotations": 4, "orders": 1 },
        "breakdown": [ { "label": "Jan 2024", "leads": 10, "quotations": 4, "orders": 1 } ]
    }})
}

fn expiry_body() -> Value {
    json!({ "data": {
        "year": 2024,
        "totals": { "count": 2, "value": 1500, "months": 2 },
        "monthly": [
            { "month": 3, "label": "March", "byType": { "AMC": { "count": 1, "value": 1200 } },
              "licenses": [ { "customerName": "Acme", "productId": "P1", "totalPrice": 1200, "expiryDate": "2024-03-01" } ] },
            { "month": 7, "label": "July", "byType": { "ATS": { "count": 1, "value": 300 } },
              "licenses": [ { "customer": { "name": "Globex" }, "productId": "P2", "total": "300", "licenseExpiryDate": "2024-07-15" } ] }
        ]
    }})
}

async fn mount(server: &MockServer, route: &str, body: Value, delay: Duration) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body).set_delay(delay))
        .mount(server)
        .await;
}

/// Mount all four report endpoints with the same delay.
async fn mount_reports(server: &MockServer, delay: Duration) {
    mount(server, "/api/reports/dashboard", dashboard_body(10), delay).await;
    mount(server, "/api/reports/sales-funnel", funnel_body(), delay).await;
    mount(server, "/api/reports/license-expiry", expiry_body(), delay).await;
    mount(server, "/api/reports/expiring-licenses", json!({ "data": [] }), delay).await;
}

fn controller(server: &MockServer) -> ReportsController {
    let client = ReportsClient::from_reqwest(&server.uri(), reqwest::Client::new()).unwrap();
    ReportsController::with_client(client).with_clock(FixedClock(2024))
}

// ── Successful cycles ───────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_refresh_commits_all_three_view_models() {
    let server = MockServer::start().await;
    mount_reports(&server, Duration::ZERO).await;
    let controller = controller(&server);

    assert!(controller.snapshot().is_empty());
    let outcome = controller.refresh_reports().await;

    assert_eq!(outcome, RefreshOutcome::Applied);
    let snapshot = controller.snapshot();
    assert_eq!(snapshot.dashboard.as_ref().unwrap().totals.leads, 10);
    assert_eq!(snapshot.sales_funnel.as_ref().unwrap().breakdown.len(), 1);
    assert_eq!(snapshot.license_expiry.as_ref().unwrap().monthly.len(), 2);
    assert!(snapshot.refreshed_at.is_some());

    let rows = snapshot.license_rows();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].customer, "Acme");
    assert_eq!(rows[1].customer, "Globex");
    assert!(!controller.is_loading());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_queries_use_clock_year() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/reports/sales-funnel"))
        .and(query_param("startDate", "2024-01-01"))
        .and(query_param("endDate", "2024-12-31"))
        .and(query_param("groupBy", "month"))
        .respond_with(ResponseTemplate::new(200).set_body_json(funnel_body()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/reports/license-expiry"))
        .and(query_param("year", "2024"))
        .respond_with(ResponseTemplate::new(200).set_body_json(expiry_body()))
        .expect(1)
        .mount(&server)
        .await;
    mount(&server, "/api/reports/dashboard", dashboard_body(1), Duration::ZERO).await;
    mount(&server, "/api/reports/expiring-licenses", json!({ "data": [] }), Duration::ZERO).await;

    assert_eq!(controller(&server).refresh_reports().await, RefreshOutcome::Applied);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_loading_flag_spans_the_cycle() {
    let server = MockServer::start().await;
    mount_reports(&server, Duration::from_millis(300)).await;
    let controller = controller(&server);
    let mut loading = controller.loading();
    assert!(!*loading.borrow_and_update());

    let task = tokio::spawn({
        let controller = controller.clone();
        async move { controller.refresh_reports().await }
    });

    loading.changed().await.unwrap();
    assert!(*loading.borrow_and_update());

    assert_eq!(task.await.unwrap(), RefreshOutcome::Applied);
    assert!(!*loading.borrow_and_update());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_queries_run_concurrently() {
    let server = MockServer::start().await;
    mount_reports(&server, Duration::from_millis(400)).await;
    let controller = controller(&server);

    let started = Instant::now();
    assert_eq!(controller.refresh_reports().await, RefreshOutcome::Applied);
    // Sequential requests would need at least 1.6s.
    assert!(started.elapsed() < Duration::from_millis(1200));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_missing_data_payloads_still_apply() {
    let server = MockServer::start().await;
    mount(&server, "/api/reports/dashboard", json!({ "success": true }), Duration::ZERO).await;
    mount(&server, "/api/reports/sales-funnel", json!({ "data": {} }), Duration::ZERO).await;
    mount(&server, "/api/reports/license-expiry", json!({ "data": null }), Duration::ZERO).await;
    mount(
        &server,
        "/api/reports/expiring-licenses",
        json!({ "success": true, "data": null }),
        Duration::ZERO,
    )
    .await;
    let controller = controller(&server);

    assert_eq!(controller.refresh_reports().await, RefreshOutcome::Applied);
    let snapshot = controller.snapshot();
    assert_eq!(snapshot.dashboard.as_ref().unwrap().totals.leads, 0);
    assert!(snapshot.sales_funnel.as_ref().unwrap().breakdown.is_empty());
    assert!(snapshot.license_rows().is_empty());
}

// ── Failed cycles ───────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_one_failure_leaves_previous_state_untouched() {
    let server = MockServer::start().await;
    mount_reports(&server, Duration::ZERO).await;
    let controller = controller(&server);
    assert_eq!(controller.refresh_reports().await, RefreshOutcome::Applied);
    let before = controller.snapshot();

    server.reset().await;
    mount(&server, "/api/reports/dashboard", dashboard_body(99), Duration::ZERO).await;
    mount(&server, "/api/reports/sales-funnel", funnel_body(), Duration::ZERO).await;
    mount(&server, "/api/reports/expiring-licenses", json!({ "data": [] }), Duration::ZERO).await;
    Mock::given(method("GET"))
        .and(path("/api/reports/license-expiry"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "message": "expiry report unavailable" })),
        )
        .mount(&server)
        .await;

    let outcome = controller.refresh_reports().await;

    assert_eq!(outcome, RefreshOutcome::Failed("expiry report unavailable".into()));
    assert_eq!(controller.snapshot(), before);
    assert!(!controller.is_loading());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_failure_before_first_load_keeps_everything_empty() {
    let server = MockServer::start().await;
    mount(&server, "/api/reports/dashboard", dashboard_body(1), Duration::ZERO).await;
    mount(&server, "/api/reports/sales-funnel", funnel_body(), Duration::ZERO).await;
    mount(&server, "/api/reports/license-expiry", expiry_body(), Duration::ZERO).await;
    Mock::given(method("GET"))
        .and(path("/api/reports/expiring-licenses"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let controller = controller(&server);
    let outcome = controller.refresh_reports().await;

    assert!(matches!(outcome, RefreshOutcome::Failed(_)));
    let snapshot = controller.snapshot();
    assert!(snapshot.dashboard.is_none());
    assert!(snapshot.sales_funnel.is_none());
    assert!(snapshot.license_expiry.is_none());
    assert!(!controller.is_loading());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_failed_cycle_waits_for_sibling_queries() {
    let server = MockServer::start().await;
    let delay = Duration::from_millis(300);
    mount(&server, "/api/reports/dashboard", dashboard_body(1), delay).await;
    mount(&server, "/api/reports/sales-funnel", funnel_body(), delay).await;
    mount(&server, "/api/reports/license-expiry", expiry_body(), delay).await;
    Mock::given(method("GET"))
        .and(path("/api/reports/expiring-licenses"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let controller = controller(&server);

    let started = Instant::now();
    let outcome = controller.refresh_reports().await;

    assert!(matches!(outcome, RefreshOutcome::Failed(_)));
    // The failure settles first; the batch still waits for the slow siblings.
    assert!(started.elapsed() >= delay);
    assert!(controller.snapshot().is_empty());
    assert!(!controller.is_loading());
}

// ── Overlapping cycles ──────────────────────────────────────────────

/// Dashboard answers `slow_leads` after `slow` for the first request and
/// `fast_leads` after `fast` for every later one.
async fn mount_two_dashboards(
    server: &MockServer,
    (slow_leads, slow): (u64, Duration),
    (fast_leads, fast): (u64, Duration),
) {
    Mock::given(method("GET"))
        .and(path("/api/reports/dashboard"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(dashboard_body(slow_leads))
                .set_delay(slow),
        )
        .up_to_n_times(1)
        .with_priority(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/reports/dashboard"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(dashboard_body(fast_leads))
                .set_delay(fast),
        )
        .with_priority(2)
        .mount(server)
        .await;
    mount(server, "/api/reports/sales-funnel", funnel_body(), Duration::ZERO).await;
    mount(server, "/api/reports/license-expiry", expiry_body(), Duration::ZERO).await;
    mount(server, "/api/reports/expiring-licenses", json!({ "data": [] }), Duration::ZERO).await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_stale_cycle_settling_last_is_discarded() {
    let server = MockServer::start().await;
    mount_two_dashboards(
        &server,
        (1, Duration::from_millis(600)),
        (2, Duration::from_millis(50)),
    )
    .await;
    let controller = controller(&server);

    let first = tokio::spawn({
        let controller = controller.clone();
        async move { controller.refresh_reports().await }
    });
    tokio::time::sleep(Duration::from_millis(150)).await;

    assert_eq!(controller.refresh_reports().await, RefreshOutcome::Applied);
    assert_eq!(first.await.unwrap(), RefreshOutcome::Superseded);

    assert_eq!(controller.snapshot().dashboard.as_ref().unwrap().totals.leads, 2);
    assert!(!controller.is_loading());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_stale_cycle_settling_first_leaves_loading_set() {
    let server = MockServer::start().await;
    mount_two_dashboards(
        &server,
        (1, Duration::from_millis(200)),
        (2, Duration::from_millis(700)),
    )
    .await;
    let controller = controller(&server);

    let first = tokio::spawn({
        let controller = controller.clone();
        async move { controller.refresh_reports().await }
    });
    tokio::time::sleep(Duration::from_millis(100)).await;
    let second = tokio::spawn({
        let controller = controller.clone();
        async move { controller.refresh_reports().await }
    });

    assert_eq!(first.await.unwrap(), RefreshOutcome::Superseded);
    assert!(controller.is_loading());
    assert!(controller.snapshot().is_empty());

    assert_eq!(second.await.unwrap(), RefreshOutcome::Applied);
    assert!(!controller.is_loading());
    assert_eq!(controller.snapshot().dashboard.as_ref().unwrap().totals.leads, 2);
}

// ── Session ─────────────────────────────────────────────────────────

fn config(server: &MockServer) -> BackendConfig {
    BackendConfig {
        url: server.uri().parse().unwrap(),
        username: "admin".into(),
        password: SecretString::from("secret"),
        tls: TlsVerification::SystemDefaults,
        timeout: Duration::from_secs(5),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_connect_logs_in_and_loads() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "sid=s1; Path=/")
                .set_body_json(json!({ "success": true })),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_reports(&server, Duration::ZERO).await;

    let controller = ReportsController::new(config(&server)).with_clock(FixedClock(2024));
    assert_eq!(controller.connect().await.unwrap(), RefreshOutcome::Applied);
    assert_eq!(controller.snapshot().license_rows().len(), 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_connect_with_bad_credentials_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "bad password" })))
        .mount(&server)
        .await;

    let controller = ReportsController::new(config(&server));
    let err = controller.connect().await.unwrap_err();
    assert!(matches!(err, CoreError::AuthenticationFailed { .. }));
    assert!(controller.snapshot().is_empty());
}
