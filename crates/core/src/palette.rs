//! Ordered color palettes assigned cyclically to effect elements.
//!
//! Element `i` of a field takes `palette.cyclic(i)`, so a palette shorter
//! than the element count simply repeats.

use crate::color::Rgba;
use crate::error::EffectError;

/// Names of the built-in palettes, in listing order.
const PALETTE_NAMES: &[&str] = &["indigo", "fluid", "aurora", "ocean", "sunset", "mono"];

/// A non-empty ordered list of colors.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: Vec<Rgba>,
}

impl Palette {
    /// Creates a palette from parsed colors.
    ///
    /// Requires at least one color.
    pub fn new(colors: Vec<Rgba>) -> Result<Self, EffectError> {
        if colors.is_empty() {
            return Err(EffectError::InvalidPalette(
                "palette requires at least 1 color".to_string(),
            ));
        }
        Ok(Self { colors })
    }

    /// Parses every entry as a CSS color. Fails on the first bad entry.
    pub fn from_css<S: AsRef<str>>(colors: &[S]) -> Result<Self, EffectError> {
        let parsed: Result<Vec<Rgba>, EffectError> =
            colors.iter().map(|c| Rgba::parse(c.as_ref())).collect();
        Self::new(parsed?)
    }

    /// Parses what it can and skips the rest.
    ///
    /// Falls back to `fallback` when nothing parses. This is the path used
    /// for effect parameters, which must never fail.
    pub fn from_css_lenient<S: AsRef<str>>(colors: &[S], fallback: &Palette) -> Self {
        let parsed: Vec<Rgba> = colors
            .iter()
            .filter_map(|c| match Rgba::parse(c.as_ref()) {
                Ok(color) => Some(color),
                Err(err) => {
                    tracing::warn!(%err, "skipping palette entry");
                    None
                }
            })
            .collect();
        Self::new(parsed).unwrap_or_else(|_| fallback.clone())
    }

    /// Number of colors in the palette.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Always false for a constructed palette.
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// The colors in order.
    pub fn colors(&self) -> &[Rgba] {
        &self.colors
    }

    /// Color for element `index`, wrapping around the palette.
    pub fn cyclic(&self, index: usize) -> Rgba {
        self.colors[index % self.colors.len()]
    }

    pub fn first(&self) -> Rgba {
        self.colors[0]
    }

    pub fn last(&self) -> Rgba {
        self.colors[self.colors.len() - 1]
    }

    /// CSS strings for every color, for echoing back through `params()`.
    pub fn to_css(&self) -> Vec<String> {
        self.colors.iter().map(|c| c.to_css()).collect()
    }

    /// Looks up a built-in palette by name.
    pub fn from_name(name: &str) -> Result<Self, EffectError> {
        match name {
            "indigo" => Ok(Self::indigo()),
            "fluid" => Ok(Self::fluid()),
            "aurora" => Ok(Self::aurora()),
            "ocean" => Ok(Self::ocean()),
            "sunset" => Ok(Self::sunset()),
            "mono" => Ok(Self::mono()),
            _ => Err(EffectError::InvalidPalette(format!(
                "unknown palette '{name}'"
            ))),
        }
    }

    /// Names accepted by [`Palette::from_name`].
    pub fn list_names() -> &'static [&'static str] {
        PALETTE_NAMES
    }

    // -- Built-in palettes --

    /// Particle network default: translucent indigo.
    pub fn indigo() -> Self {
        Self::builtin(&["rgba(99, 102, 241, 0.8)", "rgba(99, 102, 241, 0.2)"])
    }

    /// Fluid blob default: periwinkle, violet, pink, sky.
    pub fn fluid() -> Self {
        Self::builtin(&["#667eea", "#764ba2", "#f093fb", "#4facfe"])
    }

    /// Aurora default: translucent cyan, violet, pink.
    pub fn aurora() -> Self {
        Self::builtin(&[
            "rgba(0, 255, 255, 0.3)",
            "rgba(138, 43, 226, 0.3)",
            "rgba(255, 105, 180, 0.3)",
        ])
    }

    /// Deep blues to teal.
    pub fn ocean() -> Self {
        Self::builtin(&["#001f3f", "#005f73", "#0a9396", "#94d2bd"])
    }

    /// Warm reds, oranges, golds.
    pub fn sunset() -> Self {
        Self::builtin(&["#ff6b6b", "#ff8e53", "#feca57", "#ff9ff3"])
    }

    /// Grays.
    pub fn mono() -> Self {
        Self::builtin(&["#ffffff", "#c0c0c0", "#808080"])
    }

    fn builtin(css: &[&str]) -> Self {
        let colors = css
            .iter()
            .map(|c| Rgba::parse(c).unwrap_or(Rgba::WHITE))
            .collect();
        Self { colors }
    }
}
