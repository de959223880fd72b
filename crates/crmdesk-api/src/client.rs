// Reports backend HTTP client
//
// Wraps `reqwest::Client` with URL construction and envelope unwrapping.
// Endpoint methods live in `reports.rs`, session handling in `session.rs`.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::{Envelope, ErrorBody};
use crate::transport::TransportConfig;

/// HTTP client for the CRM backend.
///
/// All requests go through one `reqwest::Client` carrying the session
/// cookie jar, so a successful [`login`](Self::login) authenticates every
/// later report query. Methods return the unwrapped `data` payload.
#[derive(Debug, Clone)]
pub struct ReportsClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ReportsClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// A cookie jar is added when the config has none; session auth
    /// depends on it.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let config = if transport.cookie_jar.is_some() {
            transport.clone()
        } else {
            transport.clone().with_cookie_jar()
        };
        let http = config.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    ///
    /// Use this when the client already carries a session cookie, or in
    /// tests against a mock server.
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Url::parse(base_url)?;
        Ok(Self { http, base_url })
    }

    /// The underlying HTTP client.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// The backend base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Resolve an absolute API path (`/api/...`) against the base URL.
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and unwrap the envelope.
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<T, Error> {
        debug!(%url, "GET");

        let resp = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(Error::Transport)?;

        parse_envelope(resp).await
    }
}

/// Unwrap `{ success, message, data }`, returning `data` on success.
///
/// 401 maps to [`Error::Authentication`]; any other non-2xx status or a
/// `success: false` body maps to [`Error::Api`] carrying the backend's
/// `message` when it sent one.
pub(crate) async fn parse_envelope<T: DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, Error> {
    let status = resp.status();
    let body = resp.text().await.map_err(Error::Transport)?;

    if status == reqwest::StatusCode::UNAUTHORIZED {
        let message = error_message(&body)
            .unwrap_or_else(|| "session expired or invalid credentials".into());
        return Err(Error::Authentication { message });
    }

    if !status.is_success() {
        return Err(Error::Api {
            status: status.as_u16(),
            message: error_message(&body),
        });
    }

    let envelope: Envelope<T> =
        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body: body.clone(),
        })?;

    if envelope.success == Some(false) {
        return Err(Error::Api {
            status: status.as_u16(),
            message: envelope.message,
        });
    }

    match envelope.data {
        Some(data) => Ok(data),
        None => empty_payload(body),
    }
}

/// Payload for a successful response whose `data` is null or absent.
///
/// `T` is read from `null` first, then from `{}`, so loose values and
/// all-default view-models both come back empty instead of failing.
fn empty_payload<T: DeserializeOwned>(body: String) -> Result<T, Error> {
    serde_json::from_value(Value::Null)
        .or_else(|_| serde_json::from_value(Value::Object(Map::new())))
        .map_err(|e: serde_json::Error| Error::Deserialization {
            message: format!("response has no `data` payload: {e}"),
            body,
        })
}

/// Best-effort extraction of a `message` field from an error body.
pub(crate) fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(ErrorBody::into_message)
}
