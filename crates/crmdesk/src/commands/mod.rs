//! Command dispatch: bridges CLI args -> report controller -> output formatting.

pub mod config_cmd;
pub mod export;
pub mod licenses;
pub mod reports;
pub mod util;

use crmdesk_core::ReportsController;

use crate::cli::{Command, GlobalOpts};
use crate::config::Defaults;
use crate::error::CliError;

/// Dispatch a backend-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    controller: &ReportsController,
    global: &GlobalOpts,
    defaults: &Defaults,
) -> Result<(), CliError> {
    let snapshot = util::load_reports(controller, global).await?;
    match cmd {
        Command::Reports(args) => reports::handle(&snapshot, args, global, defaults),
        Command::Licenses(args) => licenses::handle(&snapshot, args, global, defaults),
        Command::Export(args) => export::handle(&snapshot, args, global),
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
