// ── Export pipeline ──
//
// CSV and print-ready HTML built from the current row set. Both paths
// resolve fields through the row normalizer, so an export always matches
// what the table shows.

pub mod csv;
pub mod print;

use serde_json::{Map, Value};

use crate::model::{CanonicalLicenseRow, LicenseRecord};
use crate::normalize::{normalize, normalize_value};

pub use print::{BrowserSurface, PrintSurface};

/// Anything that can be resolved into a canonical license row.
pub trait ToLicenseRow {
    fn to_license_row(&self) -> CanonicalLicenseRow;
}

impl ToLicenseRow for CanonicalLicenseRow {
    fn to_license_row(&self) -> CanonicalLicenseRow {
        self.clone()
    }
}

impl ToLicenseRow for LicenseRecord {
    fn to_license_row(&self) -> CanonicalLicenseRow {
        normalize(&self.0)
    }
}

impl ToLicenseRow for Map<String, Value> {
    fn to_license_row(&self) -> CanonicalLicenseRow {
        normalize(self)
    }
}

impl ToLicenseRow for Value {
    fn to_license_row(&self) -> CanonicalLicenseRow {
        normalize_value(self)
    }
}

impl<T: ToLicenseRow + ?Sized> ToLicenseRow for &T {
    fn to_license_row(&self) -> CanonicalLicenseRow {
        (**self).to_license_row()
    }
}
