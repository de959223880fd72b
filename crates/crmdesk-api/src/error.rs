use thiserror::Error;

/// Top-level error type for the `crmdesk-api` crate.
///
/// Every failure the backend adapter can produce. `crmdesk-core` catches
/// these at the aggregation boundary and turns them into diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login rejected, or the session cookie is missing/expired (HTTP 401).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Backend ─────────────────────────────────────────────────────
    /// The backend answered with a failure status or `success: false`.
    #[error("API error (HTTP {status}): {}", message.as_deref().unwrap_or("no message"))]
    Api {
        status: u16,
        message: Option<String>,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// The human-readable message the backend attached to the failure, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Authentication { message } => Some(message),
            Self::Api { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Returns `true` if re-authenticating might resolve this error.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    /// Returns `true` if this is a transient transport failure.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    /// Returns `true` if the request timed out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }

    /// HTTP status of a backend failure, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Authentication { .. } => Some(401),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display_falls_back_without_message() {
        let err = Error::Api {
            status: 500,
            message: None,
        };
        assert_eq!(err.to_string(), "API error (HTTP 500): no message");
        assert_eq!(err.message(), None);
    }

    #[test]
    fn message_exposes_backend_text() {
        let err = Error::Api {
            status: 400,
            message: Some("bad year".into()),
        };
        assert_eq!(err.message(), Some("bad year"));
        assert_eq!(err.status(), Some(400));
    }
}
