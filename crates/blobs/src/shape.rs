//! Shape strategy: blobs as absolutely positioned, percentage-sized elements.
//!
//! A host styling layer (the DOM, typically) positions one element per
//! [`BlobShape`] and applies [`BlobShape::css`]. The raster path in the crate
//! root draws the same layers onto a [`Surface`](backdrop_core::Surface).

use backdrop_core::color::Rgba;
use backdrop_core::layer::BlendMode;
use glam::DVec2;

/// Which of the two per-blob passes a shape belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeLayer {
    Core,
    Glow,
}

/// One soft-edged circle in percentage space.
#[derive(Debug, Clone, PartialEq)]
pub struct BlobShape {
    pub layer: ShapeLayer,
    /// Center, in percent of the container.
    pub center: DVec2,
    /// Diameter, in percent of the container.
    pub size: f64,
    /// Color at the center of the gradient.
    pub color: Rgba,
    /// Gradient position (0–1) at which the color has faded out.
    pub fade_at: f64,
    pub opacity: f64,
    /// Blur radius in pixels.
    pub blur: f64,
    pub blend: BlendMode,
}

impl BlobShape {
    /// Inline style for an absolutely positioned element.
    pub fn css(&self) -> String {
        format!(
            "position: absolute; left: {x}%; top: {y}%; width: {s}%; height: {s}%; \
             transform: translate(-50%, -50%); border-radius: 50%; \
             background: radial-gradient(circle, {color} 0%, transparent {fade}%); \
             filter: blur({blur}px); opacity: {opacity}; mix-blend-mode: {blend}",
            x = self.center.x,
            y = self.center.y,
            s = self.size,
            color = self.color.to_css(),
            fade = self.fade_at * 100.0,
            blur = self.blur,
            opacity = self.opacity,
            blend = self.blend.css_keyword(),
        )
    }
}

/// CSS `linear-gradient` with `first` and `last` at the given alpha.
pub fn overlay_css(angle_deg: f64, first: Rgba, last: Rgba, alpha: f64) -> String {
    format!(
        "linear-gradient({angle_deg}deg, {} 0%, {} 100%)",
        first.with_alpha(alpha).to_css(),
        last.with_alpha(alpha).to_css(),
    )
}

/// Endpoints of a CSS gradient line at `angle_deg` across a `width × height`
/// box: 0° points up, 90° right, and the line is long enough that the
/// corners get the end colors.
pub fn gradient_line(angle_deg: f64, width: f64, height: f64) -> (DVec2, DVec2) {
    let angle = angle_deg.to_radians();
    let dir = DVec2::new(angle.sin(), -angle.cos());
    let half = (width * angle.sin().abs() + height * angle.cos().abs()) / 2.0;
    let center = DVec2::new(width, height) / 2.0;
    (center - dir * half, center + dir * half)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape() -> BlobShape {
        BlobShape {
            layer: ShapeLayer::Core,
            center: DVec2::new(25.0, 75.0),
            size: 30.0,
            color: Rgba::new(1.0, 0.0, 0.0, 1.0),
            fade_at: 0.7,
            opacity: 0.7,
            blur: 40.0,
            blend: BlendMode::Screen,
        }
    }

    #[test]
    fn css_positions_and_sizes_in_percent() {
        let css = shape().css();
        assert!(css.contains("left: 25%"), "{css}");
        assert!(css.contains("top: 75%"), "{css}");
        assert!(css.contains("width: 30%; height: 30%"), "{css}");
        assert!(css.contains("translate(-50%, -50%)"), "{css}");
    }

    #[test]
    fn css_carries_gradient_filter_and_blend() {
        let css = shape().css();
        assert!(
            css.contains("radial-gradient(circle, rgba(255, 0, 0, 1) 0%, transparent 70%)"),
            "{css}"
        );
        assert!(css.contains("filter: blur(40px)"), "{css}");
        assert!(css.contains("opacity: 0.7"), "{css}");
        assert!(css.contains("mix-blend-mode: screen"), "{css}");
    }

    #[test]
    fn overlay_uses_same_alpha_for_both_ends() {
        let css = overlay_css(135.0, Rgba::WHITE, Rgba::BLACK, 0.5);
        assert_eq!(
            css,
            "linear-gradient(135deg, rgba(255, 255, 255, 0.5) 0%, rgba(0, 0, 0, 0.5) 100%)"
        );
    }

    #[test]
    fn diagonal_gradient_line_spans_corner_to_corner_of_square() {
        let (from, to) = gradient_line(135.0, 100.0, 100.0);
        assert!((from - DVec2::ZERO).length() < 1e-9, "{from:?}");
        assert!((to - DVec2::new(100.0, 100.0)).length() < 1e-9, "{to:?}");
    }

    #[test]
    fn vertical_gradient_line_runs_top_to_bottom() {
        let (from, to) = gradient_line(180.0, 40.0, 10.0);
        assert!((from - DVec2::new(20.0, 0.0)).length() < 1e-9);
        assert!((to - DVec2::new(20.0, 10.0)).length() < 1e-9);
    }
}
