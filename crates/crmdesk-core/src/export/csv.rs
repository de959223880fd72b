// CSV export.

use std::path::{Path, PathBuf};

use tracing::info;

use super::ToLicenseRow;
use crate::display;
use crate::error::ExportError;
use crate::model::CanonicalLicenseRow;

/// File name used when the caller does not pick one.
pub const DEFAULT_FILENAME: &str = "licenses.csv";

/// MIME type of the artifact.
pub const MIME_TYPE: &str = "text/csv";

pub const HEADER: [&str; 7] = [
    "Customer",
    "ProductId",
    "Description",
    "ExpiryDate",
    "LicenseType",
    "Value",
    "PurchaseOrderId",
];

/// Render `records` as CSV text.
///
/// Text fields are quote-wrapped with embedded quotes doubled; the value is
/// a bare number. Lines are joined with `\n` and there is no trailing
/// newline.
pub fn render<R: ToLicenseRow>(records: &[R]) -> Result<String, ExportError> {
    if records.is_empty() {
        return Err(ExportError::NoData);
    }

    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(HEADER.join(","));
    lines.extend(records.iter().map(|r| line(&r.to_license_row())));
    Ok(lines.join("\n"))
}

/// Render and write the CSV artifact, returning the path written.
///
/// `path` defaults to [`DEFAULT_FILENAME`] in the working directory.
pub fn write<R: ToLicenseRow>(records: &[R], path: Option<&Path>) -> Result<PathBuf, ExportError> {
    let text = render(records)?;
    let path = path.map_or_else(|| PathBuf::from(DEFAULT_FILENAME), Path::to_path_buf);
    std::fs::write(&path, text)?;
    info!(path = %path.display(), rows = records.len(), mime = MIME_TYPE, "wrote CSV export");
    Ok(path)
}

fn line(row: &CanonicalLicenseRow) -> String {
    [
        quote(&row.customer),
        quote(&row.product_id),
        quote(&row.single_line_description()),
        quote(&display::iso_timestamp(&row.expiry_date)),
        quote(&row.license_type),
        row.value.to_string(),
        quote(&row.purchase_order_id),
    ]
    .join(",")
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn renders_header_and_row() {
        let records = vec![json!({
            "customerName": "Acme",
            "productId": "P1",
            "description": "line1\nline2",
            "expiryDate": "2024-03-01",
            "licenseType": "AMC",
            "totalPrice": 1200,
            "purchaseOrderId": "PO1"
        })];

        let csv = render(&records).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines[0],
            "Customer,ProductId,Description,ExpiryDate,LicenseType,Value,PurchaseOrderId"
        );
        assert_eq!(
            lines[1],
            r#""Acme","P1","line1 line2","2024-03-01T00:00:00.000Z","AMC",1200,"PO1""#
        );
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn doubles_embedded_quotes_and_keeps_raw_dates() {
        let records = vec![json!({
            "customer": { "name": "Say \"Hi\" Ltd" },
            "expiry": "TBD",
            "total": "99.5"
        })];
        let csv = render(&records).unwrap();
        assert_eq!(
            csv.lines().nth(1).unwrap(),
            r#""Say ""Hi"" Ltd","","","TBD","",99.5,"""#
        );
    }

    #[test]
    fn empty_input_is_no_data() {
        let records: Vec<serde_json::Value> = Vec::new();
        assert!(matches!(render(&records), Err(ExportError::NoData)));
    }

    #[test]
    fn write_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let rows = vec![CanonicalLicenseRow {
            customer: "Acme".into(),
            ..CanonicalLicenseRow::default()
        }];
        let written = write(&rows, Some(&path)).unwrap();
        assert_eq!(written, path);
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("Customer,"));
        assert!(text.ends_with(r#""Acme","","","","",0,"""#));
    }

    #[test]
    fn empty_write_produces_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("none.csv");
        let rows: Vec<CanonicalLicenseRow> = Vec::new();
        assert!(matches!(write(&rows, Some(&path)), Err(ExportError::NoData)));
        assert!(!path.exists());
    }
}
