//! License listing handler.

use tabled::Tabled;

use crmdesk_core::display;
use crmdesk_core::{CanonicalLicenseRow, ReportSnapshot, SortDirection, sort_rows};

use crate::cli::{GlobalOpts, LicensesArgs, LicensesCommand};
use crate::config::Defaults;
use crate::error::CliError;
use crate::output;

const DESCRIPTION_WIDTH: usize = 48;

#[derive(Tabled)]
struct LicenseRow {
    #[tabled(rename = "Customer")]
    customer: String,
    #[tabled(rename = "Product ID")]
    product_id: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Expiry")]
    expiry: String,
    #[tabled(rename = "Type")]
    license_type: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "PO")]
    purchase_order_id: String,
}

fn license_row(r: &CanonicalLicenseRow, currency: &str) -> LicenseRow {
    let full = r.single_line_description();
    let description = if full.chars().count() > DESCRIPTION_WIDTH {
        format!("{}…", display::truncate_chars(&full, DESCRIPTION_WIDTH))
    } else {
        full
    };
    LicenseRow {
        customer: r.customer.clone(),
        product_id: r.product_id.clone(),
        description,
        expiry: display::short_date(&r.expiry_date),
        license_type: r.license_type.clone(),
        value: display::money(r.value, currency),
        purchase_order_id: r.purchase_order_id.clone(),
    }
}

pub fn handle(
    snapshot: &ReportSnapshot,
    args: LicensesArgs,
    global: &GlobalOpts,
    defaults: &Defaults,
) -> Result<(), CliError> {
    match args.command {
        LicensesCommand::List { sort, desc } => {
            let mut rows = snapshot.license_rows();
            let direction = if desc {
                SortDirection::Descending
            } else {
                SortDirection::Ascending
            };
            sort_rows(&mut rows, sort, direction);

            let currency = defaults.currency.as_str();
            let out = output::render_list(
                &global.output,
                &rows,
                |r| license_row(r, currency),
                |r| r.product_id.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
