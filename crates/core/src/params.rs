//! Total helpers for reading effect parameters out of a `serde_json::Value`.
//!
//! Every helper takes the params object, a key and a default, and falls back
//! to the default when the key is missing or has the wrong type. They never
//! fail: effect construction has no error path for bad parameters.

use serde_json::Value;

use crate::color::Rgba;
use crate::palette::Palette;

/// Extracts an `f64`, accepting integers too.
pub fn param_f64(params: &Value, name: &str, default: f64) -> f64 {
    params.get(name).and_then(Value::as_f64).unwrap_or(default)
}

/// Extracts a finite, non-negative `f64`.
///
/// Negative, NaN or infinite values fall back to `default`. Used for speeds,
/// radii, distances and other magnitudes where a negative value has no
/// meaning.
pub fn param_magnitude(params: &Value, name: &str, default: f64) -> f64 {
    params
        .get(name)
        .and_then(Value::as_f64)
        .filter(|v| v.is_finite() && *v >= 0.0)
        .unwrap_or(default)
}

/// Extracts a non-negative integer as `usize`.
pub fn param_usize(params: &Value, name: &str, default: usize) -> usize {
    params
        .get(name)
        .and_then(Value::as_u64)
        .map(|v| v as usize)
        .unwrap_or(default)
}

pub fn param_bool(params: &Value, name: &str, default: bool) -> bool {
    params.get(name).and_then(Value::as_bool).unwrap_or(default)
}


/// Extracts an array of strings (CSS colors).
///
/// Non-string entries are dropped. Returns `None` when the key is missing or
/// not an array, so callers can keep their default palette.
pub fn param_colors(params: &Value, name: &str) -> Option<Vec<String>> {
    params.get(name).and_then(Value::as_array).map(|items| {
        items
            .iter()
            .filter_map(Value::as_str)
            .map(String::from)
            .collect()
    })
}

/// Extracts a single CSS color.
///
/// A missing key yields `default` silently; an unparseable string yields
/// `default` with a warning.
pub fn param_color(params: &Value, name: &str, default: Rgba) -> Rgba {
    match params.get(name).and_then(Value::as_str) {
        Some(css) => Rgba::parse(css).unwrap_or_else(|err| {
            tracing::warn!(param = name, %err, "using default color");
            default
        }),
        None => default,
    }
}

/// Extracts a palette from an array of CSS colors, skipping bad entries.
///
/// Falls back to `fallback` when the key is missing or nothing parses.
pub fn param_palette(params: &Value, name: &str, fallback: &Palette) -> Palette {
    match param_colors(params, name) {
        Some(colors) => Palette::from_css_lenient(&colors, fallback),
        None => fallback.clone(),
    }
}
