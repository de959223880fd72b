//! All possible UI actions. Actions are the sole mechanism for state mutation.

use std::sync::Arc;

use crmdesk_core::{CanonicalLicenseRow, ReportSnapshot, SortColumn};

use crate::screen::ScreenId;

/// Notification severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A toast notification.
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
}

impl Notification {
    pub fn success(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Success,
        }
    }

    pub fn warning(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Warning,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Error,
        }
    }

    pub fn info(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Info,
        }
    }
}

/// Every state transition in the TUI is expressed as an Action.
#[derive(Debug, Clone)]
pub enum Action {
    // ── Lifecycle ──────────────────────────────────────────────────
    Quit,
    Tick,
    Render,
    Resize(u16, u16),

    // ── Navigation ────────────────────────────────────────────────
    SwitchScreen(ScreenId),
    GoBack,
    ToggleHelp,

    // ── Data Events (from the controller's watch channels) ────────
    ReportsUpdated(Arc<ReportSnapshot>),
    LoadingChanged(bool),
    Connected,
    Disconnected(String),

    // ── Reports ───────────────────────────────────────────────────
    RequestRefresh,

    // ── Licenses table ────────────────────────────────────────────
    /// Header click or `s` + digit on the license table.
    SortLicenses(SortColumn),
    /// Row activation: show the record detail.
    OpenLicense(Box<CanonicalLicenseRow>),
    CloseDetail,

    // ── Export ────────────────────────────────────────────────────
    /// Write the displayed rows to CSV.
    ExportCsv(Arc<Vec<CanonicalLicenseRow>>),
    /// Open the displayed rows in the browser print view.
    PrintLicenses(Arc<Vec<CanonicalLicenseRow>>),

    // ── Notifications ─────────────────────────────────────────────
    Notify(Notification),
    DismissNotification,
}
