//! Shared helpers for command handlers.

use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crmdesk_core::{RefreshOutcome, ReportSnapshot, ReportsController};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;

/// Spinner on stderr while a refresh cycle runs.
///
/// Hidden for `--quiet` and for structured output, where stderr noise
/// would get in the way of piping.
fn spinner(global: &GlobalOpts) -> ProgressBar {
    if global.quiet || global.output != OutputFormat::Table {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.magenta} {msg}") {
        bar.set_style(style);
    }
    bar.set_message("Loading reports…");
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

/// Log in, run one refresh cycle and return the committed snapshot.
pub async fn load_reports(
    controller: &ReportsController,
    global: &GlobalOpts,
) -> Result<Arc<ReportSnapshot>, CliError> {
    let bar = spinner(global);
    let outcome = controller.connect().await;
    bar.finish_and_clear();

    match outcome? {
        RefreshOutcome::Applied => Ok(controller.snapshot()),
        RefreshOutcome::Failed(message) => Err(CliError::RefreshFailed { message }),
        RefreshOutcome::Superseded => Err(CliError::RefreshFailed {
            message: "refresh was superseded".into(),
        }),
    }
}
