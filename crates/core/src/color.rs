//! CSS color parsing and HSL hue rotation.
//!
//! Effects receive their colors as CSS strings (`rgba(...)`, `rgb(...)` or
//! hex). They are parsed once into [`Rgba`], whose channels are `f64` in
//! [0, 1]. The hue-shift path ([`shift_color`]) works on strings and fails
//! open: anything it cannot parse is handed back untouched.

use crate::error::EffectError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Channels this close to an integer 0–255 value are written as that integer.
const CHANNEL_SNAP: f64 = 1e-9;

/// Straight (non-premultiplied) RGBA color with components in [0, 1].
///
/// Serializes as a CSS `rgba(r, g, b, a)` string. Channels that land on an
/// 8-bit step are written as integers, anything else (and alpha) with full
/// precision, so parsing the output gives back the same color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

/// HSL color with all components in [0, 1] (hue is a fraction of a turn).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    pub h: f64,
    pub s: f64,
    pub l: f64,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0.0, 0.0, 0.0, 0.0);
    pub const WHITE: Rgba = Rgba::new(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Rgba = Rgba::new(0.0, 0.0, 0.0, 1.0);

    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Builds a color from 8-bit channels and a unit alpha.
    pub fn from_rgba8(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self::new(
            r as f64 / 255.0,
            g as f64 / 255.0,
            b as f64 / 255.0,
            a.clamp(0.0, 1.0),
        )
    }

    /// Returns the same color with alpha replaced.
    pub fn with_alpha(self, a: f64) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Returns the same color with alpha multiplied by `factor`, clamped to [0, 1].
    pub fn fade(self, factor: f64) -> Self {
        self.with_alpha(self.a * factor)
    }

    /// Parses a CSS color: `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb(r, g, b)`,
    /// `rgba(r, g, b, a)` or `transparent`.
    ///
    /// Channel values are 0–255 (fractions allowed), alpha is 0–1; both are
    /// clamped like a browser would. Returns `EffectError::InvalidColor` for
    /// anything else.
    pub fn parse(input: &str) -> Result<Rgba, EffectError> {
        let s = input.trim().to_ascii_lowercase();
        if s == "transparent" {
            return Ok(Rgba::TRANSPARENT);
        }
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(|| EffectError::InvalidColor(input.to_string()));
        }
        let (body, has_alpha) = if let Some(rest) = s.strip_prefix("rgba(") {
            (rest, true)
        } else if let Some(rest) = s.strip_prefix("rgb(") {
            (rest, false)
        } else {
            return Err(EffectError::InvalidColor(input.to_string()));
        };
        let body = body
            .strip_suffix(')')
            .ok_or_else(|| EffectError::InvalidColor(input.to_string()))?;

        let parts: Vec<f64> = body
            .split(',')
            .map(|p| p.trim().parse::<f64>())
            .collect::<Result<_, _>>()
            .map_err(|_| EffectError::InvalidColor(input.to_string()))?;

        let expected = if has_alpha { 4 } else { 3 };
        if parts.len() != expected || parts.iter().any(|v| !v.is_finite()) {
            return Err(EffectError::InvalidColor(input.to_string()));
        }
        let channel = |v: f64| v.clamp(0.0, 255.0) / 255.0;
        Ok(Rgba {
            r: channel(parts[0]),
            g: channel(parts[1]),
            b: channel(parts[2]),
            a: parts.get(3).copied().unwrap_or(1.0).clamp(0.0, 1.0),
        })
    }

    /// Formats the color as `rgba(r, g, b, a)` on the 0–255 channel scale.
    pub fn to_css(self) -> String {
        let q = |c: f64| {
            let v = c.clamp(0.0, 1.0) * 255.0;
            let step = v.round();
            if (v - step).abs() < CHANNEL_SNAP {
                step
            } else {
                v
            }
        };
        format!(
            "rgba({}, {}, {}, {})",
            q(self.r),
            q(self.g),
            q(self.b),
            self.a.clamp(0.0, 1.0)
        )
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

impl Serialize for Rgba {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_css())
    }
}

impl<'de> Deserialize<'de> for Rgba {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Rgba::parse(&s).map_err(serde::de::Error::custom)
    }
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
    match hex.len() {
        3 => Some(Rgba::from_rgba8(nibble(0)?, nibble(1)?, nibble(2)?, 1.0)),
        6 => Some(Rgba::from_rgba8(byte(0)?, byte(2)?, byte(4)?, 1.0)),
        8 => Some(Rgba::from_rgba8(
            byte(0)?,
            byte(2)?,
            byte(4)?,
            byte(6)? as f64 / 255.0,
        )),
        _ => None,
    }
}

/// Converts RGB (alpha ignored) to HSL.
///
/// Achromatic colors get hue and saturation 0.
pub fn rgb_to_hsl(c: Rgba) -> Hsl {
    let max = c.r.max(c.g).max(c.b);
    let min = c.r.min(c.g).min(c.b);
    let l = (max + min) / 2.0;
    if max == min {
        return Hsl { h: 0.0, s: 0.0, l };
    }
    let d = max - min;
    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };
    let h = if max == c.r {
        (c.g - c.b) / d + if c.g < c.b { 6.0 } else { 0.0 }
    } else if max == c.g {
        (c.b - c.r) / d + 2.0
    } else {
        (c.r - c.g) / d + 4.0
    };
    Hsl { h: h / 6.0, s, l }
}

/// Converts HSL back to RGB with the given alpha.
pub fn hsl_to_rgb(c: Hsl, alpha: f64) -> Rgba {
    if c.s == 0.0 {
        return Rgba::new(c.l, c.l, c.l, alpha);
    }
    let q = if c.l < 0.5 {
        c.l * (1.0 + c.s)
    } else {
        c.l + c.s - c.l * c.s
    };
    let p = 2.0 * c.l - q;
    Rgba::new(
        hue_to_channel(p, q, c.h + 1.0 / 3.0),
        hue_to_channel(p, q, c.h),
        hue_to_channel(p, q, c.h - 1.0 / 3.0),
        alpha,
    )
}

fn hue_to_channel(p: f64, q: f64, t: f64) -> f64 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

/// Rotates the hue of `color` by `shift` turns (wrapping mod 1).
///
/// Saturation, lightness and alpha are preserved exactly.
pub fn shift_hue(color: Rgba, shift: f64) -> Rgba {
    let hsl = rgb_to_hsl(color);
    let h = (hsl.h + shift).rem_euclid(1.0);
    hsl_to_rgb(Hsl { h, ..hsl }, color.a)
}

/// Hue-shifts a CSS color string and re-emits it as `rgba(...)`.
///
/// A whole-turn shift, unparseable input or a non-finite shift hands the
/// input back unmodified.
pub fn shift_color(color: &str, shift: f64) -> String {
    if !shift.is_finite() || shift.rem_euclid(1.0) == 0.0 {
        return color.to_string();
    }
    match Rgba::parse(color) {
        Ok(parsed) => shift_hue(parsed, shift).to_css(),
        Err(_) => color.to_string(),
    }
}
