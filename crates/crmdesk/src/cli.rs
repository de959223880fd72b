//! Clap derive structures for the `crmdesk` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crmdesk_core::SortColumn;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// crmdesk -- reports and license exports from the CRM console backend
#[derive(Debug, Parser)]
#[command(
    name = "crmdesk",
    version,
    about = "CRM console reports and license exports from the command line",
    long_about = "Pulls the dashboard, sales-funnel and license-expiry reports from the\n\
        CRM backend, lists expiring licenses, and exports them as CSV or a\n\
        printable HTML view.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Backend profile to use
    #[arg(long, short = 'p', env = "CRMDESK_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Backend URL (overrides profile)
    #[arg(long, short = 'b', env = "CRMDESK_BACKEND", global = true)]
    pub backend: Option<String>,

    /// Login name (overrides profile)
    #[arg(long, short = 'u', env = "CRMDESK_USERNAME", global = true)]
    pub username: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "CRMDESK_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "CRMDESK_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "CRMDESK_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show report view-models (dashboard, funnel, license expiry)
    #[command(alias = "r")]
    Reports(ReportsArgs),

    /// List expiring licenses
    #[command(alias = "lic")]
    Licenses(LicensesArgs),

    /// Export expiring licenses as CSV or a print view
    #[command(alias = "x")]
    Export(ExportArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Reports ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ReportsArgs {
    #[command(subcommand)]
    pub command: ReportsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ReportsCommand {
    /// Current-period counts, totals and conversion rates
    Dashboard,
    /// Sales funnel for the current year, by month
    Funnel,
    /// License expiry breakdown for the current year, by month
    Licenses,
}

// ── Licenses ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LicensesArgs {
    #[command(subcommand)]
    pub command: LicensesCommand,
}

#[derive(Debug, Subcommand)]
pub enum LicensesCommand {
    /// List expiring licenses of the current year
    #[command(alias = "ls")]
    List {
        /// Sort column: customer, product-id, description, expiry-date,
        /// license-type, value, purchase-order-id
        #[arg(long, short = 's', default_value = "expiry-date")]
        sort: SortColumn,

        /// Sort descending
        #[arg(long)]
        desc: bool,
    },
}

// ── Export ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ExportArgs {
    #[command(subcommand)]
    pub command: ExportCommand,
}

#[derive(Debug, Subcommand)]
pub enum ExportCommand {
    /// Write a CSV file
    Csv {
        /// Output path (default: licenses.csv)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Open a printable HTML view in the browser
    Print,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactive configuration wizard
    Init,
    /// Show the current configuration (secrets masked)
    Show,
    /// Set a value on the active profile
    Set {
        /// Key: backend, username, password_env, insecure, timeout, ca_cert, currency
        key: String,
        value: String,
    },
    /// List profiles
    Profiles,
    /// Set the default profile
    Use { name: String },
    /// Store a profile's password in the system keyring
    SetPassword {
        /// Profile name (default: active profile)
        #[arg(long)]
        profile: Option<String>,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_sort_flag() {
        let cli = Cli::try_parse_from(["crmdesk", "licenses", "list", "--sort", "value", "--desc"])
            .unwrap();
        match cli.command {
            Command::Licenses(LicensesArgs {
                command: LicensesCommand::List { sort, desc },
            }) => {
                assert_eq!(sort, SortColumn::Value);
                assert!(desc);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn default_sort_is_expiry() {
        let cli = Cli::try_parse_from(["crmdesk", "licenses", "list"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Licenses(LicensesArgs {
                command: LicensesCommand::List {
                    sort: SortColumn::ExpiryDate,
                    desc: false
                }
            })
        ));
    }
}
