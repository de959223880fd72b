// Integration tests for `ReportsClient` using wiremock.

use secrecy::SecretString;
use serde_json::{Value, json};
use wiremock::matchers::{body_json, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crmdesk_api::{Error, FunnelQuery, ReportsClient, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ReportsClient) {
    let server = MockServer::start().await;
    let client = ReportsClient::from_reqwest(&server.uri(), reqwest::Client::new()).unwrap();
    (server, client)
}

// ── Happy-path tests ────────────────────────────────────────────────

#[tokio::test]
async fn test_dashboard_unwraps_data() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/reports/dashboard"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": { "totals": { "leads": 12 } }
        })))
        .mount(&server)
        .await;

    let data: Value = client.dashboard().await.unwrap();
    assert_eq!(data["totals"]["leads"], 12);
}

#[tokio::test]
async fn test_sales_funnel_sends_year_range() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/reports/sales-funnel"))
        .and(query_param("startDate", "2024-01-01"))
        .and(query_param("endDate", "2024-12-31"))
        .and(query_param("groupBy", "month"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "groupBy": "month", "breakdown": [] }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let query = FunnelQuery::calendar_year(2024).unwrap();
    let data: Value = client.sales_funnel(&query).await.unwrap();
    assert_eq!(data["groupBy"], "month");
}

#[tokio::test]
async fn test_license_expiry_sends_year() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/reports/license-expiry"))
        .and(query_param("year", "2025"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "year": 2025, "monthly": [] }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let data: Value = client.license_expiry(2025).await.unwrap();
    assert_eq!(data["year"], 2025);
}

#[tokio::test]
async fn test_login_sets_session_cookie_for_later_requests() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({ "username": "admin", "password": "hunter2" })))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "sid=abc123; Path=/")
                .set_body_json(json!({ "success": true })),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/reports/expiring-licenses"))
        .and(header_exists("cookie"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let client =
        ReportsClient::new(server.uri().parse().unwrap(), &TransportConfig::default()).unwrap();
    client
        .login("admin", &SecretString::from("hunter2"))
        .await
        .unwrap();

    let data: Vec<Value> = client.expiring_licenses().await.unwrap();
    assert!(data.is_empty());
}

// ── Failure tests ───────────────────────────────────────────────────

#[tokio::test]
async fn test_401_maps_to_authentication() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/reports/dashboard"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "Not logged in" })),
        )
        .mount(&server)
        .await;

    let err = client.dashboard::<Value>().await.unwrap_err();
    assert!(matches!(err, Error::Authentication { .. }));
    assert_eq!(err.message(), Some("Not logged in"));
}

#[tokio::test]
async fn test_server_error_carries_backend_message() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/reports/dashboard"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "message": "report store down" })),
        )
        .mount(&server)
        .await;

    let err = client.dashboard::<Value>().await.unwrap_err();
    match err {
        Error::Api { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message.as_deref(), Some("report store down"));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_success_false_is_failure() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/reports/license-expiry"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "message": "year out of range"
        })))
        .mount(&server)
        .await;

    let err = client.license_expiry::<Value>(1800).await.unwrap_err();
    assert_eq!(err.message(), Some("year out of range"));
}

#[tokio::test]
async fn test_non_json_body_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/reports/dashboard"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client.dashboard::<Value>().await.unwrap_err();
    match err {
        Error::Deserialization { body, .. } => assert_eq!(body, "<html>oops</html>"),
        other => panic!("expected Deserialization error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_login_rejected() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "Invalid credentials" })),
        )
        .mount(&server)
        .await;

    let err = client
        .login("admin", &SecretString::from("wrong"))
        .await
        .unwrap_err();
    assert!(err.is_auth_expired());
    assert_eq!(err.message(), Some("login failed: Invalid credentials"));
}
