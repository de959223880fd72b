// ── Caller-side sorting of license rows ──
//
// Renderers never reorder rows; they report which column was clicked and
// the caller sorts with `sort_rows`.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::model::CanonicalLicenseRow;

/// Sortable columns, in display order. `Display` gives the canonical name.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum SortColumn {
    #[strum(to_string = "Customer")]
    Customer,
    #[strum(to_string = "ProductId", serialize = "product-id")]
    ProductId,
    #[strum(to_string = "Description")]
    Description,
    #[default]
    #[strum(to_string = "ExpiryDate", serialize = "expiry-date", serialize = "expiry")]
    ExpiryDate,
    #[strum(to_string = "LicenseType", serialize = "license-type", serialize = "type")]
    LicenseType,
    #[strum(to_string = "Value")]
    Value,
    #[strum(to_string = "PurchaseOrderId", serialize = "purchase-order-id", serialize = "po")]
    PurchaseOrderId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display)]
pub enum SortDirection {
    #[default]
    #[strum(to_string = "asc")]
    Ascending,
    #[strum(to_string = "desc")]
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }

    /// Arrow shown next to the active column header.
    pub fn arrow(self) -> &'static str {
        match self {
            Self::Ascending => "▲",
            Self::Descending => "▼",
        }
    }
}

/// Current sort column and direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortState {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl SortState {
    /// Same column flips the direction; a new column starts ascending.
    pub fn toggle(&mut self, column: SortColumn) {
        if self.column == column {
            self.direction = self.direction.flipped();
        } else {
            self.column = column;
            self.direction = SortDirection::Ascending;
        }
    }
}

/// Stable sort of `rows` by `column`.
///
/// Text compares case-insensitively. Dates compare chronologically with
/// unparsable dates after parsable ones, then by raw text.
pub fn sort_rows(rows: &mut [CanonicalLicenseRow], column: SortColumn, direction: SortDirection) {
    rows.sort_by(|a, b| {
        let ord = compare(a, b, column);
        match direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });
}

fn compare(a: &CanonicalLicenseRow, b: &CanonicalLicenseRow, column: SortColumn) -> Ordering {
    match column {
        SortColumn::Customer => compare_text(&a.customer, &b.customer),
        SortColumn::ProductId => compare_text(&a.product_id, &b.product_id),
        SortColumn::Description => compare_text(&a.description, &b.description),
        SortColumn::LicenseType => compare_text(&a.license_type, &b.license_type),
        SortColumn::PurchaseOrderId => compare_text(&a.purchase_order_id, &b.purchase_order_id),
        SortColumn::Value => a.value.total_cmp(&b.value),
        SortColumn::ExpiryDate => match (a.expiry(), b.expiry()) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => a.expiry_date.cmp(&b.expiry_date),
        },
    }
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}
