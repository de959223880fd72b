// Lenient field deserializers.
//
// The backend is loose about numbers: counts arrive as numbers, numeric
// strings or null. Everything funnels through `coerce` so the view-models
// and the row normalizer agree on what a number is.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Read a JSON value as a finite number, if it is one.
///
/// Numbers pass through; strings are trimmed and parsed (empty string is
/// zero). Anything else is `None`.
pub(crate) fn coerce(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() { 0.0 } else { s.parse().ok()? }
        }
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Non-negative amount: unparsable, missing or negative values become `0`.
pub(crate) fn non_negative(value: &Value) -> f64 {
    coerce(value).map_or(0.0, |n| n.max(0.0))
}

/// Non-negative whole count.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::as_conversions)]
pub(crate) fn whole(value: &Value) -> u64 {
    non_negative(value).round() as u64
}

/// Text form of a scalar; objects, arrays and null become empty.
pub(crate) fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

// ── serde adapters ──────────────────────────────────────────────────

pub(crate) fn count<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    Ok(whole(&Value::deserialize(d)?))
}

pub(crate) fn amount<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    Ok(non_negative(&Value::deserialize(d)?))
}

/// Signed number (growth deltas may be negative).
pub(crate) fn signed<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    Ok(coerce(&Value::deserialize(d)?).unwrap_or(0.0))
}

#[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
pub(crate) fn year<'de, D: Deserializer<'de>>(d: D) -> Result<i32, D::Error> {
    let n = coerce(&Value::deserialize(d)?).unwrap_or(0.0);
    Ok(n.clamp(0.0, 9999.0) as i32)
}

pub(crate) fn string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(text(&Value::deserialize(d)?))
}

/// `null` becomes the type's default.
pub(crate) fn or_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}
