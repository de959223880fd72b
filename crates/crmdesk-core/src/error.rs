// ── Core error types ──
//
// User-facing errors from crmdesk-core. Consumers never match on HTTP
// details; `From<crmdesk_api::Error>` folds transport failures into
// domain variants and keeps the backend's message when it sent one.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to backend at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Backend request timed out")]
    Timeout,

    #[error("Not connected -- log in before refreshing reports")]
    NotConnected,

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    #[error("Unexpected response from backend: {message}")]
    InvalidResponse { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl From<crmdesk_api::Error> for CoreError {
    fn from(err: crmdesk_api::Error) -> Self {
        match err {
            crmdesk_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            crmdesk_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            crmdesk_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("invalid backend URL: {e}"),
            },
            crmdesk_api::Error::Tls(message) => CoreError::Config { message },
            crmdesk_api::Error::Api { status, message } => CoreError::Api {
                message: message.unwrap_or_else(|| format!("HTTP {status}")),
                status: Some(status),
            },
            crmdesk_api::Error::Deserialization { message, .. } => {
                CoreError::InvalidResponse { message }
            }
        }
    }
}

/// Failures of the export pipeline.
///
/// Malformed field values never end up here; they resolve to defaults.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Export requested on an empty row set.
    #[error("No data to export")]
    NoData,

    /// The print surface could not be opened.
    #[error("Could not open a print view: {reason}")]
    SurfaceUnavailable { reason: String },

    #[error("Failed to write export: {0}")]
    Io(#[from] std::io::Error),
}
