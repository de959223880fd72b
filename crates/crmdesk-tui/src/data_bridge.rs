//! Data bridge -- connects the [`ReportsController`] watch channels to TUI
//! actions.
//!
//! Logs in (which runs the initial refresh), then forwards every snapshot
//! and loading-flag change as an [`Action`] until cancelled. Refreshes after
//! the first are requested by the user; nothing here polls.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crmdesk_core::{RefreshOutcome, ReportsController};

use crate::action::{Action, Notification};

pub async fn spawn_data_bridge(
    controller: ReportsController,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
) {
    let mut reports = controller.reports();
    let mut loading = controller.loading();

    // Subscribed before connecting so the first cycle's loading flag is seen
    let forward = {
        let action_tx = action_tx.clone();
        let cancel = cancel.clone();
        async move {
            loop {
                tokio::select! {
                    biased;

                    () = cancel.cancelled() => break,

                    Ok(()) = reports.changed() => {
                        let snapshot = reports.borrow_and_update().clone();
                        debug!(rows = snapshot.license_rows().len(), "dispatching ReportsUpdated");
                        let _ = action_tx.send(Action::ReportsUpdated(snapshot));
                    }
                    Ok(()) = loading.changed() => {
                        let flag = *loading.borrow_and_update();
                        let _ = action_tx.send(Action::LoadingChanged(flag));
                    }
                    else => break,
                }
            }
        }
    };
    let forwarder = tokio::spawn(forward);

    // Quitting during login must not wait for the backend
    let connected = tokio::select! {
        () = cancel.cancelled() => None,
        result = controller.connect() => Some(result),
    };

    match connected {
        None => {}
        Some(Ok(outcome)) => {
            let _ = action_tx.send(Action::Connected);
            if let RefreshOutcome::Failed(message) = outcome {
                let _ = action_tx.send(Action::Notify(Notification::error(message)));
            }
        }
        Some(Err(e)) => {
            warn!(error = %e, "failed to connect to backend");
            let _ = action_tx.send(Action::Disconnected(e.to_string()));
        }
    }

    cancel.cancelled().await;
    let _ = forwarder.await;
    controller.disconnect().await;
    debug!("data bridge shut down");
}
