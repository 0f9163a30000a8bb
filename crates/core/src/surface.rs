//! The drawing surface an effect renders into.
//!
//! [`Surface`] is implemented by the host: a browser canvas binding, the CPU
//! rasterizer in `backdrop-effects`, or [`RecordingSurface`], which simply
//! records every call and is what the tests render into.
//!
//! All geometry is in surface-local pixels, with the origin at the top-left
//! corner of [`Surface::bounds`].

use glam::DVec2;

use crate::color::Rgba;
use crate::layer::{BlendMode, LayerStyle};
use crate::texture::NoiseTexture;

/// A bounding rectangle in client (viewport) pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// A rectangle at the client origin.
    pub const fn sized(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    /// True when nothing can be drawn: zero, negative or non-finite area.
    pub fn is_empty(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0)
    }

    pub fn size(&self) -> DVec2 {
        DVec2::new(self.width, self.height)
    }

    /// Converts client coordinates to surface-local pixels.
    pub fn to_local(&self, client: DVec2) -> DVec2 {
        client - DVec2::new(self.left, self.top)
    }

    /// Converts client coordinates to [0, 1] fractions of the rectangle.
    ///
    /// Returns `None` for an empty rectangle.
    pub fn to_unit(&self, client: DVec2) -> Option<DVec2> {
        if self.is_empty() {
            return None;
        }
        Some(self.to_local(client) / self.size())
    }

    /// Converts client coordinates to 0–100 percentage space.
    pub fn to_percent(&self, client: DVec2) -> Option<DVec2> {
        self.to_unit(client).map(|u| u * 100.0)
    }
}

/// A color stop in a gradient; `offset` is in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    pub offset: f64,
    pub color: Rgba,
}

impl GradientStop {
    pub const fn new(offset: f64, color: Rgba) -> Self {
        Self { offset, color }
    }
}

/// A 2D drawing target.
///
/// `push_layer`/`pop_layer` calls nest; everything drawn in between is
/// composited as one group with the layer's blend mode, opacity and blur.
pub trait Surface {
    /// Current bounding rectangle in client pixels. Re-read every tick.
    fn bounds(&self) -> Rect;

    /// Resets the surface and fills it with `background` (may be transparent).
    fn clear(&mut self, background: Rgba);

    fn push_layer(&mut self, style: LayerStyle);

    fn pop_layer(&mut self);

    fn stroke_line(&mut self, from: DVec2, to: DVec2, width: f64, color: Rgba);

    fn fill_circle(&mut self, center: DVec2, radius: f64, color: Rgba);

    /// Fills a closed polygon with a flat color.
    fn fill_polygon(&mut self, points: &[DVec2], color: Rgba, blend: BlendMode);

    /// Fills a disc whose color follows `stops` from center (0) to edge (1).
    fn fill_radial_gradient(
        &mut self,
        center: DVec2,
        radius: f64,
        stops: &[GradientStop],
        blend: BlendMode,
    );

    /// Fills the whole surface with a gradient running from `from` to `to`.
    fn fill_linear_gradient(&mut self, from: DVec2, to: DVec2, stops: &[GradientStop]);

    /// Tiles a grain texture over the whole surface at the given opacity.
    fn fill_texture(&mut self, texture: &NoiseTexture, opacity: f64);
}

/// One recorded surface call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Rgba),
    PushLayer(LayerStyle),
    PopLayer,
    Line {
        from: DVec2,
        to: DVec2,
        width: f64,
        color: Rgba,
    },
    Circle {
        center: DVec2,
        radius: f64,
        color: Rgba,
    },
    Polygon {
        points: Vec<DVec2>,
        color: Rgba,
        blend: BlendMode,
    },
    RadialGradient {
        center: DVec2,
        radius: f64,
        stops: Vec<GradientStop>,
        blend: BlendMode,
    },
    LinearGradient {
        from: DVec2,
        to: DVec2,
        stops: Vec<GradientStop>,
    },
    Texture {
        opacity: f64,
    },
}

/// A surface that records calls instead of drawing.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    bounds: Rect,
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            commands: Vec::new(),
        }
    }

    /// Simulates a resize or scroll of the host element.
    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Number of recorded calls since creation or the last [`Self::take`].
    pub fn draw_call_count(&self) -> usize {
        self.commands.len()
    }

    /// Drains the recorded calls.
    pub fn take(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }
}

impl Surface for RecordingSurface {
    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn clear(&mut self, background: Rgba) {
        self.commands.push(DrawCommand::Clear(background));
    }

    fn push_layer(&mut self, style: LayerStyle) {
        self.commands.push(DrawCommand::PushLayer(style));
    }

    fn pop_layer(&mut self) {
        self.commands.push(DrawCommand::PopLayer);
    }

    fn stroke_line(&mut self, from: DVec2, to: DVec2, width: f64, color: Rgba) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            width,
            color,
        });
    }

    fn fill_circle(&mut self, center: DVec2, radius: f64, color: Rgba) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            color,
        });
    }

    fn fill_polygon(&mut self, points: &[DVec2], color: Rgba, blend: BlendMode) {
        self.commands.push(DrawCommand::Polygon {
            points: points.to_vec(),
            color,
            blend,
        });
    }

    fn fill_radial_gradient(
        &mut self,
        center: DVec2,
        radius: f64,
        stops: &[GradientStop],
        blend: BlendMode,
    ) {
        self.commands.push(DrawCommand::RadialGradient {
            center,
            radius,
            stops: stops.to_vec(),
            blend,
        });
    }

    fn fill_linear_gradient(&mut self, from: DVec2, to: DVec2, stops: &[GradientStop]) {
        self.commands.push(DrawCommand::LinearGradient {
            from,
            to,
            stops: stops.to_vec(),
        });
    }

    fn fill_texture(&mut self, _texture: &NoiseTexture, opacity: f64) {
        self.commands.push(DrawCommand::Texture { opacity });
    }
}
