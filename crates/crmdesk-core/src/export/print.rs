// Print export.
//
// Builds a standalone HTML table and hands it to a print surface. The
// document calls `window.print()` from its own `load` event, so printing
// starts once layout is done rather than after a guessed delay.

use std::fmt::Write as _;
use std::io::Write as _;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use tracing::{debug, info};

use super::ToLicenseRow;
use crate::display;
use crate::error::ExportError;
use crate::model::CanonicalLicenseRow;

pub const HEADER: [&str; 7] = [
    "Customer",
    "ProductId",
    "Description",
    "ExpiryDate",
    "LicenseType",
    "Value",
    "PO",
];

/// Maximum description length in the printed table, in characters.
pub const DESCRIPTION_LIMIT: usize = 200;

const STYLE: &str = "body{font-family:sans-serif;margin:24px}\
table{border-collapse:collapse;width:100%}\
th,td{border:1px solid #ccc;padding:6px 8px;text-align:left;font-size:12px}\
th{background:#f3f3f3}";

/// Somewhere a print document can be shown.
pub trait PrintSurface {
    /// Present `document`. Fails with [`ExportError::SurfaceUnavailable`]
    /// when the platform refuses to open it.
    fn present(&self, document: &str) -> Result<(), ExportError>;
}

/// Opens the document in the system browser via the platform opener.
///
/// The HTML is written to a temp file that is kept after the process
/// exits, because the browser reads it asynchronously.
#[derive(Debug, Clone, Default)]
pub struct BrowserSurface {
    dir: Option<PathBuf>,
}

impl BrowserSurface {
    /// Write print documents into `dir` instead of the system temp dir.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    fn write_document(&self, document: &str) -> Result<PathBuf, ExportError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("crmdesk-print-").suffix(".html");
        let mut file = match &self.dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        file.write_all(document.as_bytes())?;
        let (_, path) = file.keep().map_err(|e| ExportError::Io(e.error))?;
        Ok(path)
    }
}

impl PrintSurface for BrowserSurface {
    fn present(&self, document: &str) -> Result<(), ExportError> {
        let path = self.write_document(document)?;
        debug!(path = %path.display(), "print document written");

        opener_command(&path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| ExportError::SurfaceUnavailable {
                reason: format!("cannot launch browser: {e}"),
            })?;

        info!(path = %path.display(), "opened print view");
        Ok(())
    }
}

#[cfg(target_os = "macos")]
fn opener_command(path: &std::path::Path) -> Command {
    let mut cmd = Command::new("open");
    cmd.arg(path);
    cmd
}

#[cfg(target_os = "windows")]
fn opener_command(path: &std::path::Path) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.args(["/C", "start", ""]).arg(path);
    cmd
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn opener_command(path: &std::path::Path) -> Command {
    let mut cmd = Command::new("xdg-open");
    cmd.arg(path);
    cmd
}

/// Render `records` as a print-ready HTML document.
pub fn render<R: ToLicenseRow>(records: &[R]) -> Result<String, ExportError> {
    if records.is_empty() {
        return Err(ExportError::NoData);
    }

    let mut html = String::with_capacity(1024 + records.len() * 256);
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>License Report</title>\n");
    let _ = writeln!(html, "<style>{STYLE}</style>");
    html.push_str("<script>window.addEventListener('load', function () { window.print(); });</script>\n");
    html.push_str("</head>\n<body>\n<h1>License Report</h1>\n<table>\n<thead>\n<tr>");
    for title in HEADER {
        let _ = write!(html, "<th>{title}</th>");
    }
    html.push_str("</tr>\n</thead>\n<tbody>\n");
    for record in records {
        push_row(&mut html, &record.to_license_row());
    }
    html.push_str("</tbody>\n</table>\n</body>\n</html>\n");
    Ok(html)
}

/// Render the document and present it on `surface`.
pub fn open<R: ToLicenseRow>(records: &[R], surface: &dyn PrintSurface) -> Result<(), ExportError> {
    let document = render(records)?;
    surface.present(&document)
}

fn push_row(html: &mut String, row: &CanonicalLicenseRow) {
    let cells = [
        escape(&row.customer),
        escape(&row.product_id),
        escape(display::truncate_chars(&row.description, DESCRIPTION_LIMIT)),
        escape(&display::short_date(&row.expiry_date)),
        escape(&row.license_type),
        escape(&display::money(row.value, "")),
        escape(&row.purchase_order_id),
    ];
    html.push_str("<tr>");
    for cell in cells {
        let _ = write!(html, "<td>{cell}</td>");
    }
    html.push_str("</tr>\n");
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
