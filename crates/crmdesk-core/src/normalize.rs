// ── Row normalizer ──
//
// Maps one loosely-structured license record onto a `CanonicalLicenseRow`.
// Each logical field has an ordered alias list; the first alias present
// and non-null wins. This is the only place aliases are resolved.

use serde_json::{Map, Value};

use crate::model::CanonicalLicenseRow;
use crate::model::lenient;

/// A lookup path into a record: one key, or a key into a nested object.
#[derive(Debug, Clone, Copy)]
enum Alias {
    Field(&'static str),
    Nested(&'static str, &'static str),
}

const CUSTOMER: &[Alias] = &[Alias::Field("customerName"), Alias::Nested("customer", "name")];
const PURCHASE_ORDER: &[Alias] = &[
    Alias::Field("purchaseOrderId"),
    Alias::Field("poId"),
    Alias::Field("parentId"),
    Alias::Field("_id"),
    Alias::Field("id"),
];
const EXPIRY: &[Alias] = &[
    Alias::Field("expiryDate"),
    Alias::Field("licenseExpiryDate"),
    Alias::Field("expiry"),
];
const VALUE: &[Alias] = &[Alias::Field("totalPrice"), Alias::Field("total")];
const PRODUCT_ID: &[Alias] = &[Alias::Field("productId")];
const DESCRIPTION: &[Alias] = &[Alias::Field("description")];
const LICENSE_TYPE: &[Alias] = &[Alias::Field("licenseType")];

impl Alias {
    fn lookup(self, record: &Map<String, Value>) -> Option<&Value> {
        let found = match self {
            Self::Field(key) => record.get(key),
            Self::Nested(outer, inner) => record.get(outer)?.as_object()?.get(inner),
        };
        found.filter(|v| !v.is_null())
    }
}

fn resolve<'a>(record: &'a Map<String, Value>, aliases: &[Alias]) -> Option<&'a Value> {
    aliases.iter().find_map(|alias| alias.lookup(record))
}

fn resolve_text(record: &Map<String, Value>, aliases: &[Alias]) -> String {
    resolve(record, aliases).map(lenient::text).unwrap_or_default()
}

/// Resolve every field of `record` into a canonical row.
///
/// Never fails: absent fields become empty strings, and a value that is
/// missing, unparsable or negative becomes `0`.
pub fn normalize(record: &Map<String, Value>) -> CanonicalLicenseRow {
    CanonicalLicenseRow {
        customer: resolve_text(record, CUSTOMER),
        product_id: resolve_text(record, PRODUCT_ID),
        description: resolve_text(record, DESCRIPTION),
        expiry_date: resolve_text(record, EXPIRY),
        license_type: resolve_text(record, LICENSE_TYPE),
        value: resolve(record, VALUE).map_or(0.0, lenient::non_negative),
        purchase_order_id: resolve_text(record, PURCHASE_ORDER),
    }
}

/// Normalize an arbitrary JSON value; non-objects yield an empty row.
pub fn normalize_value(value: &Value) -> CanonicalLicenseRow {
    value.as_object().map(normalize).unwrap_or_default()
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use serde_json::json;

    use super::*;

    fn row(value: Value) -> CanonicalLicenseRow {
        normalize_value(&value)
    }

    #[test]
    fn customer_falls_back_to_nested_name() {
        assert_eq!(row(json!({ "customer": { "name": "Acme" } })).customer, "Acme");
    }

    #[test]
    fn explicit_customer_name_wins() {
        let r = row(json!({ "customerName": "Globex", "customer": { "name": "Acme" } }));
        assert_eq!(r.customer, "Globex");
    }

    #[test]
    fn null_alias_falls_through() {
        let r = row(json!({ "customerName": null, "customer": { "name": "Acme" } }));
        assert_eq!(r.customer, "Acme");
    }

    #[test]
    fn purchase_order_prefers_explicit_field() {
        let r = row(json!({ "purchaseOrderId": "PO1", "_id": "abc" }));
        assert_eq!(r.purchase_order_id, "PO1");
    }

    #[test]
    fn purchase_order_alias_chain() {
        assert_eq!(row(json!({ "poId": "PO2", "parentId": "X" })).purchase_order_id, "PO2");
        assert_eq!(row(json!({ "parentId": "X", "_id": "Y" })).purchase_order_id, "X");
        assert_eq!(row(json!({ "_id": "Y", "id": 7 })).purchase_order_id, "Y");
        assert_eq!(row(json!({ "id": 7 })).purchase_order_id, "7");
        assert_eq!(row(json!({})).purchase_order_id, "");
    }

    #[test]
    fn expiry_alias_chain() {
        assert_eq!(row(json!({ "licenseExpiryDate": "2025-01-01", "expiry": "x" })).expiry_date, "2025-01-01");
        assert_eq!(row(json!({ "expiry": "soon" })).expiry_date, "soon");
        assert_eq!(row(json!({})).expiry_date, "");
    }

    #[test]
    fn unparsable_or_missing_value_is_zero() {
        assert_eq!(row(json!({ "totalPrice": "abc" })).value, 0.0);
        assert_eq!(row(json!({})).value, 0.0);
        assert_eq!(row(json!({ "total": "250.5" })).value, 250.5);
        assert_eq!(row(json!({ "totalPrice": -5 })).value, 0.0);
    }

    #[test]
    fn unparsable_total_price_does_not_fall_back_to_total() {
        assert_eq!(row(json!({ "totalPrice": "abc", "total": 99 })).value, 0.0);
    }

    #[test]
    fn direct_fields_default_to_empty() {
        let r = row(json!({ "productId": "P1" }));
        assert_eq!(r.product_id, "P1");
        assert_eq!(r.description, "");
        assert_eq!(r.license_type, "");
    }

    #[test]
    fn non_object_is_empty_row() {
        assert_eq!(row(json!("nope")), CanonicalLicenseRow::default());
    }
}
