//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError`, `ExportError` and `ConfigError` variants into
//! user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use crmdesk_config::ConfigError;
use crmdesk_core::{CoreError, ExportError};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to backend at {url}")]
    #[diagnostic(
        code(crmdesk::connection_failed),
        help(
            "Check that the backend is running and reachable.\n\
             URL: {url}"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Connection setup failed: {message}")]
    #[diagnostic(
        code(crmdesk::setup_failed),
        help("Check the backend URL. For self-signed certificates use --insecure (-k) or set ca_cert in your profile.")
    )]
    Setup { message: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(crmdesk::auth_failed),
        help("Verify your credentials.\nRun: crmdesk config set-password --profile {profile}")
    )]
    AuthFailed { profile: String, message: String },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(crmdesk::no_credentials),
        help(
            "Configure credentials with: crmdesk config init\n\
             Or set CRMDESK_USERNAME and CRMDESK_PASSWORD."
        )
    )]
    NoCredentials { profile: String },

    // ── Reports ──────────────────────────────────────────────────────
    #[error("Report refresh failed: {message}")]
    #[diagnostic(
        code(crmdesk::refresh_failed),
        help("Nothing was retried. Run the command again to start a fresh refresh.")
    )]
    RefreshFailed { message: String },

    #[error("API error: {message}")]
    #[diagnostic(code(crmdesk::api_error))]
    Api { message: String },

    // ── Export ───────────────────────────────────────────────────────
    #[error("No licenses to export")]
    #[diagnostic(code(crmdesk::no_data), severity(Warning))]
    NoData,

    #[error("Could not open a print view: {reason}")]
    #[diagnostic(
        code(crmdesk::print_unavailable),
        help("Export a file instead: crmdesk export csv")
    )]
    PrintUnavailable { reason: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(crmdesk::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(crmdesk::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: crmdesk config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No backend configured")]
    #[diagnostic(
        code(crmdesk::no_config),
        help(
            "Create a profile with: crmdesk config init\n\
             Or pass --backend. Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(crmdesk::config))]
    Config(Box<figment::Error>),

    #[error("Keyring error: {0}")]
    #[diagnostic(code(crmdesk::keyring))]
    Keyring(String),

    // ── Timeout ──────────────────────────────────────────────────────
    #[error("Request timed out")]
    #[diagnostic(
        code(crmdesk::timeout),
        help("Increase timeout with --timeout or check backend responsiveness.")
    )]
    Timeout,

    // ── IO / Serialization ────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON serialization failed: {0}")]
    #[diagnostic(code(crmdesk::json))]
    Json(#[from] serde_json::Error),

    #[error("YAML serialization failed: {0}")]
    #[diagnostic(code(crmdesk::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::Setup { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::Timeout => exit_code::TIMEOUT,
            Self::Validation { .. }
            | Self::NoData
            | Self::ProfileNotFound { .. }
            | Self::NoConfig { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed { url, reason },
            CoreError::AuthenticationFailed { message } => CliError::AuthFailed {
                profile: "current".into(),
                message,
            },
            CoreError::Timeout => CliError::Timeout,
            CoreError::NotConnected => CliError::RefreshFailed {
                message: "no backend session".into(),
            },
            CoreError::Api { message, .. } | CoreError::InvalidResponse { message } => {
                CliError::Api { message }
            }
            CoreError::Config { message } => CliError::Setup { message },
        }
    }
}

impl From<ExportError> for CliError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::NoData => CliError::NoData,
            ExportError::SurfaceUnavailable { reason } => CliError::PrintUnavailable { reason },
            ExportError::Io(e) => CliError::Io(e),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::UnknownProfile { name } => CliError::ProfileNotFound {
                name,
                available: "(see: crmdesk config profiles)".into(),
            },
            ConfigError::Figment(e) => CliError::Config(e),
            ConfigError::Keyring(e) => CliError::Keyring(e.to_string()),
            ConfigError::Io(e) => CliError::Io(e),
            ConfigError::Serialization(e) => CliError::Validation {
                field: "config".into(),
                reason: e.to_string(),
            },
        }
    }
}
