//! Compositing model shared by every surface: blend modes and layer styles.
//!
//! Effects group draw calls into layers so that a filter (blur) or a group
//! opacity applies to the group as a whole, the way CSS `filter` and
//! `opacity` apply to a container element.

use serde::{Deserialize, Serialize};

/// How a layer or a single fill is composited onto what is below it.
///
/// `Additive` corresponds to the canvas `lighter` composite operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    #[default]
    Normal,
    Additive,
    Multiply,
    Screen,
    Overlay,
}

impl BlendMode {
    /// The CSS `mix-blend-mode` / canvas composite keyword for this mode.
    pub fn css_keyword(self) -> &'static str {
        match self {
            BlendMode::Normal => "normal",
            BlendMode::Additive => "plus-lighter",
            BlendMode::Multiply => "multiply",
            BlendMode::Screen => "screen",
            BlendMode::Overlay => "overlay",
        }
    }
}

/// Group-level styling for a layer pushed onto a surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerStyle {
    blend_mode: BlendMode,
    opacity: f64,
    blur: f64,
}

impl Default for LayerStyle {
    fn default() -> Self {
        Self {
            blend_mode: BlendMode::Normal,
            opacity: 1.0,
            blur: 0.0,
        }
    }
}

impl LayerStyle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn blend_mode(&self) -> BlendMode {
        self.blend_mode
    }

    /// Group opacity in [0, 1].
    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    /// Gaussian-like blur radius in pixels, never negative.
    pub fn blur(&self) -> f64 {
        self.blur
    }

    pub fn with_blend_mode(mut self, mode: BlendMode) -> Self {
        self.blend_mode = mode;
        self
    }

    /// Sets the opacity, clamping to [0, 1].
    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = if opacity.is_nan() {
            0.0
        } else {
            opacity.clamp(0.0, 1.0)
        };
        self
    }

    /// Sets the blur radius; negative or NaN values mean no blur.
    pub fn with_blur(mut self, blur: f64) -> Self {
        self.blur = if blur.is_nan() { 0.0 } else { blur.max(0.0) };
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_mode_default_is_normal() {
        assert_eq!(BlendMode::default(), BlendMode::Normal);
    }

    #[test]
    fn blend_mode_serializes_as_snake_case() {
        assert_eq!(
            serde_json::to_string(&BlendMode::Additive).unwrap(),
            "\"additive\""
        );
        assert_eq!(
            serde_json::to_string(&BlendMode::Overlay).unwrap(),
            "\"overlay\""
        );
    }

    #[test]
    fn blend_mode_serde_round_trip() {
        for mode in [
            BlendMode::Normal,
            BlendMode::Additive,
            BlendMode::Multiply,
            BlendMode::Screen,
            BlendMode::Overlay,
        ] {
            let json = serde_json::to_string(&mode).unwrap();
            assert_eq!(serde_json::from_str::<BlendMode>(&json).unwrap(), mode);
        }
    }

    #[test]
    fn additive_maps_to_lighter_keyword() {
        assert_eq!(BlendMode::Additive.css_keyword(), "plus-lighter");
        assert_eq!(BlendMode::Screen.css_keyword(), "screen");
    }

    #[test]
    fn layer_style_defaults() {
        let style = LayerStyle::new();
        assert_eq!(style.blend_mode(), BlendMode::Normal);
        assert_eq!(style.opacity(), 1.0);
        assert_eq!(style.blur(), 0.0);
    }

    #[test]
    fn layer_style_builder_chain() {
        let style = LayerStyle::new()
            .with_blend_mode(BlendMode::Screen)
            .with_opacity(0.7)
            .with_blur(40.0);
        assert_eq!(style.blend_mode(), BlendMode::Screen);
        assert_eq!(style.opacity(), 0.7);
        assert_eq!(style.blur(), 40.0);
    }

    #[test]
    fn layer_style_clamps_inputs() {
        let style = LayerStyle::new().with_opacity(1.5).with_blur(-3.0);
        assert_eq!(style.opacity(), 1.0);
        assert_eq!(style.blur(), 0.0);
        let nan = LayerStyle::new().with_opacity(f64::NAN).with_blur(f64::NAN);
        assert_eq!(nan.opacity(), 0.0);
        assert_eq!(nan.blur(), 0.0);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn opacity_always_clamped(value in -10.0_f64..=10.0) {
                let style = LayerStyle::new().with_opacity(value);
                prop_assert!((0.0..=1.0).contains(&style.opacity()));
            }
        }
    }
}
