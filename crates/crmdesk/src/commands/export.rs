//! Export handlers: CSV file and browser print view.

use crmdesk_core::ReportSnapshot;
use crmdesk_core::export::{self, BrowserSurface};

use crate::cli::{ExportArgs, ExportCommand, GlobalOpts};
use crate::error::CliError;

pub fn handle(snapshot: &ReportSnapshot, args: ExportArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let rows = snapshot.license_rows();

    match args.command {
        ExportCommand::Csv { out } => {
            let path = export::csv::write(&rows, out.as_deref())?;
            if !global.quiet {
                eprintln!("✓ Exported {} licenses to {}", rows.len(), path.display());
            }
        }
        ExportCommand::Print => {
            export::print::open(&rows, &BrowserSurface::default())?;
            if !global.quiet {
                eprintln!("✓ Print view opened ({} licenses)", rows.len());
            }
        }
    }
    Ok(())
}
