//! `crmdesk-tui` -- terminal console for CRM reports and expiring licenses.
//!
//! Built on [ratatui](https://ratatui.rs) with state pushed from
//! `crmdesk-core`'s [`ReportsController`](crmdesk_core::ReportsController)
//! watch channels. Screens: Dashboard (1) and Licenses (2).
//!
//! Logs are written to a file (default `/tmp/crmdesk-tui.log`) to avoid
//! corrupting the terminal UI.

mod action;
mod app;
mod component;
mod data_bridge;
mod event;
mod screen;
mod screens;
mod theme;
mod tui;
mod widgets;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crmdesk_core::ReportsController;

use crate::app::{App, AppOptions};

/// Terminal console for CRM reports and license exports.
#[derive(Parser, Debug)]
#[command(name = "crmdesk-tui", version, about)]
struct Cli {
    /// Profile from the crmdesk config file
    #[arg(short = 'p', long, env = "CRMDESK_PROFILE")]
    profile: Option<String>,

    /// Directory CSV exports are written to
    #[arg(long, default_value = ".")]
    export_dir: PathBuf,

    /// Log file path (defaults to /tmp/crmdesk-tui.log)
    #[arg(long, default_value = "/tmp/crmdesk-tui.log")]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Set up file-based tracing. Nothing may log to stdout/stderr while the
/// terminal UI owns them. The returned guard flushes logs on drop.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("crmdesk_tui={log_level},crmdesk_core={log_level}"))
    });

    let log_dir = cli
        .log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(std::path::Path::new("/tmp"));
    let log_filename = cli
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("crmdesk-tui.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true),
        )
        .init();

    guard
}

/// Build a [`ReportsController`] from the shared config file.
fn build_controller(cli: &Cli) -> Result<(ReportsController, String)> {
    let cfg = crmdesk_config::load_config().wrap_err("could not load crmdesk configuration")?;
    let profile_name = cfg.profile_name(cli.profile.as_deref());
    let profile = cfg
        .profile(&profile_name)
        .wrap_err("run `crmdesk config init` to create a profile")?;
    let config = crmdesk_config::profile_to_backend_config(profile, &profile_name, &cfg.defaults)
        .wrap_err_with(|| format!("profile '{profile_name}' is incomplete"))?;
    Ok((ReportsController::new(config), cfg.defaults.currency))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Install panic/error hooks BEFORE entering the terminal
    tui::install_hooks()?;

    let _log_guard = setup_tracing(&cli);

    let (controller, currency) = build_controller(&cli)?;
    info!(
        backend = controller.config().map_or("(unset)", |c| c.url.as_str()),
        "starting crmdesk-tui"
    );

    let mut app = App::new(
        controller,
        AppOptions {
            currency,
            export_dir: cli.export_dir,
        },
    );
    app.run().await?;

    Ok(())
}
