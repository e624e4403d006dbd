//! Lenient field decoding shared by the JSON schema and the tabular loaders.
//!
//! Annotation files written by older tooling store some integers as floats
//! (`12.0`) and some optional strings as `""`. These helpers accept both
//! shapes while still rejecting values that cannot be represented exactly.

use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Text cells
// ---------------------------------------------------------------------------

/// Normalize a raw text cell: surrounding whitespace is trimmed and an empty
/// result is treated as absent.
pub fn normalize_cell(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// Convert a float to an integer when it has no fractional part.
pub fn float_to_int(value: f64) -> Option<i64> {
    if value.is_finite()
        && value.fract() == 0.0
        && value >= i64::MIN as f64
        && value < i64::MAX as f64
    {
        Some(value as i64)
    } else {
        None
    }
}

/// Parse integer text, accepting both `"42"` and `"42.0"`.
pub fn parse_int_text(text: &str, field: &str) -> Result<i64, CoreError> {
    let text = text.trim();
    if let Ok(v) = text.parse::<i64>() {
        return Ok(v);
    }
    text.parse::<f64>()
        .ok()
        .and_then(float_to_int)
        .ok_or_else(|| CoreError::Validation(format!("{field} must be an integer, got '{text}'")))
}

/// Parse float text, accepting integer and floating representations.
pub fn parse_float_text(text: &str, field: &str) -> Result<f64, CoreError> {
    let text = text.trim();
    match text.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(CoreError::Validation(format!(
            "{field} must be a number, got '{text}'"
        ))),
    }
}

/// Canonicalize an identifier that is stored as text but usually numeric.
///
/// `"2544.0"` becomes `"2544"`; anything that is not an integer is kept as-is.
pub fn canonical_id_text(text: &str) -> String {
    match parse_int_text(text, "id") {
        Ok(v) => v.to_string(),
        Err(_) => text.trim().to_string(),
    }
}

// ---------------------------------------------------------------------------
// Serde adapters
// ---------------------------------------------------------------------------

struct LenientInt;

impl<'de> Visitor<'de> for LenientInt {
    type Value = i64;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an integer or a float with no fractional part")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<i64, E> {
        Ok(v)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<i64, E> {
        i64::try_from(v).map_err(|_| E::custom(format!("integer {v} is out of range")))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<i64, E> {
        float_to_int(v).ok_or_else(|| E::custom(format!("expected an integer, got {v}")))
    }
}

/// Deserialize an integer that may have been written as `12.0`.
pub fn int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    deserializer.deserialize_any(LenientInt)
}

#[derive(Deserialize)]
struct IntField(#[serde(deserialize_with = "int")] i64);

/// Optional variant of [`int`]; `null` reads as `None`.
pub fn option_int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    Ok(Option::<IntField>::deserialize(deserializer)?.map(|f| f.0))
}

/// Optional string where `""` reads as `None`.
pub fn option_text<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?
        .and_then(|s| normalize_cell(&s).map(str::to_string)))
}

/// A list that may be written as `null`.
pub fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
