//! CPU rasterizer implementing [`Surface`].
//!
//! Shapes and gradients are built as `kurbo` geometry and rasterized with
//! `vello_cpu`, one shape at a time over the pixel box it can touch; the
//! coverage is then composited into the current layer with the shape's blend
//! mode. Layers are kept as premultiplied RGBA in `f64`. Popping one blurs
//! it and composites it onto the layer below with the layer's blend mode and
//! opacity.
//!
//! This module is always available (no feature gate); the `png` snapshot path
//! only encodes what it produces.

use backdrop_core::color::Rgba;
use backdrop_core::error::EffectError;
use backdrop_core::layer::{BlendMode, LayerStyle};
use backdrop_core::surface::{GradientStop, Rect, Surface};
use backdrop_core::texture::NoiseTexture;
use glam::DVec2;
use kurbo::{Affine, BezPath, Cap, Circle, Line, Point, Shape, Stroke};
use vello_cpu::peniko::{Color, ColorStop, Gradient};
use vello_cpu::{Pixmap, RenderContext};

/// Premultiplied RGBA.
type Px = [f64; 4];

const CLEAR: Px = [0.0; 4];
/// Box passes approximating a Gaussian blur.
const BLUR_PASSES: usize = 3;

fn premultiply(c: Rgba) -> Px {
    [c.r * c.a, c.g * c.a, c.b * c.a, c.a]
}

fn unpremultiply(p: Px) -> Rgba {
    if p[3] <= 0.0 {
        return Rgba::TRANSPARENT;
    }
    Rgba::new(p[0] / p[3], p[1] / p[3], p[2] / p[3], p[3])
}

fn blend_channel(mode: BlendMode, cb: f64, cs: f64) -> f64 {
    match mode {
        BlendMode::Normal | BlendMode::Additive => cs,
        BlendMode::Multiply => cb * cs,
        BlendMode::Screen => cb + cs - cb * cs,
        BlendMode::Overlay => {
            if cb <= 0.5 {
                2.0 * cb * cs
            } else {
                1.0 - 2.0 * (1.0 - cb) * (1.0 - cs)
            }
        }
    }
}

/// Composites premultiplied `src` over `dst`.
fn composite(dst: Px, src: Px, mode: BlendMode) -> Px {
    let (ab, a_s) = (dst[3], src[3]);
    if a_s <= 0.0 {
        return dst;
    }
    if mode == BlendMode::Additive {
        return [
            (dst[0] + src[0]).min(1.0),
            (dst[1] + src[1]).min(1.0),
            (dst[2] + src[2]).min(1.0),
            (ab + a_s).min(1.0),
        ];
    }
    let backdrop = unpremultiply(dst);
    let source = unpremultiply(src);
    let mix = |i: usize, cb: f64, cs: f64| {
        src[i] * (1.0 - ab) + dst[i] * (1.0 - a_s) + a_s * ab * blend_channel(mode, cb, cs)
    };
    [
        mix(0, backdrop.r, source.r),
        mix(1, backdrop.g, source.g),
        mix(2, backdrop.b, source.b),
        a_s + ab - a_s * ab,
    ]
}

fn scale(p: Px, k: f64) -> Px {
    [p[0] * k, p[1] * k, p[2] * k, p[3] * k]
}

/// Radius of each box pass so that the passes together have a standard
/// deviation of about `sigma`.
fn box_radius(sigma: f64) -> usize {
    // A box of radius r has variance r(r + 1) / 3, so three passes add up to r(r + 1).
    (((1.0 + 4.0 * sigma * sigma).sqrt() - 1.0) / 2.0).round() as usize
}

/// One running-sum box pass along rows (`horizontal`) or columns.
fn box_pass(src: &[Px], width: usize, height: usize, radius: usize, horizontal: bool) -> Vec<Px> {
    let mut out = vec![CLEAR; src.len()];
    let (lines, len) = if horizontal { (height, width) } else { (width, height) };
    let index = |line: usize, k: usize| {
        if horizontal {
            line * width + k
        } else {
            k * width + line
        }
    };
    let span = (2 * radius + 1) as f64;
    for line in 0..lines {
        let mut sum = [0.0; 4];
        // Window [k - radius, k + radius], zero outside the buffer.
        for k in 0..radius.min(len) {
            add(&mut sum, src[index(line, k)], 1.0);
        }
        for k in 0..len {
            if k + radius < len {
                add(&mut sum, src[index(line, k + radius)], 1.0);
            }
            out[index(line, k)] = scale(sum, 1.0 / span);
            if k >= radius {
                add(&mut sum, src[index(line, k - radius)], -1.0);
            }
        }
    }
    out
}

fn add(sum: &mut [f64; 4], p: Px, sign: f64) {
    for (s, v) in sum.iter_mut().zip(p) {
        *s += v * sign;
    }
}


/// Flattening tolerance for curved outlines, in pixels.
const TOLERANCE: f64 = 0.1;

fn point(p: DVec2) -> Point {
    Point::new(p.x, p.y)
}

fn paint_color(c: Rgba) -> Color {
    let byte = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color::from_rgba8(byte(c.r), byte(c.g), byte(c.b), byte(c.a))
}

fn color_stops(stops: &[GradientStop]) -> Vec<ColorStop> {
    stops
        .iter()
        .map(|s| ColorStop::from((s.offset.clamp(0.0, 1.0) as f32, paint_color(s.color))))
        .collect()
}

/// Pixel-aligned part of the surface handed to the rasterizer.
#[derive(Debug, Clone, Copy)]
struct Region {
    x: usize,
    y: usize,
    width: u16,
    height: u16,
}

struct Layer {
    style: LayerStyle,
    pixels: Vec<Px>,
}

/// A raster surface in memory. Both sides are at most `u16::MAX` pixels.
pub struct PixelSurface {
    width: usize,
    height: usize,
    layers: Vec<Layer>,
}

impl PixelSurface {
    /// Creates a transparent surface.
    ///
    /// Returns `EffectError::InvalidDimensions` if either dimension is zero or
    /// larger than `u16::MAX`.
    pub fn new(width: usize, height: usize) -> Result<Self, EffectError> {
        let limit = usize::from(u16::MAX);
        if width == 0 || height == 0 || width > limit || height > limit {
            return Err(EffectError::InvalidDimensions);
        }
        Ok(Self {
            width,
            height,
            layers: vec![Layer {
                style: LayerStyle::new(),
                pixels: vec![CLEAR; width * height],
            }],
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of layers pushed and not yet popped.
    pub fn open_layers(&self) -> usize {
        self.layers.len() - 1
    }

    /// Color of the base layer at `(x, y)`.
    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(unpremultiply(self.layers[0].pixels[y * self.width + x]))
    }

    /// Base layer as straight-alpha RGBA8, row-major. Layers still open are
    /// not included.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let byte = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        self.layers[0]
            .pixels
            .iter()
            .flat_map(|&p| {
                let c = unpremultiply(p);
                [byte(c.r), byte(c.g), byte(c.b), byte(c.a)]
            })
            .collect()
    }

    fn top(&mut self) -> &mut [Px] {
        let last = self.layers.len() - 1;
        &mut self.layers[last].pixels
    }

    /// Whole pixels overlapping `[min, max]`, clipped to the surface.
    fn region(&self, min: DVec2, max: DVec2) -> Option<Region> {
        if !min.is_finite() || !max.is_finite() {
            return None;
        }
        let x0 = min.x.floor().max(0.0);
        let y0 = min.y.floor().max(0.0);
        let x1 = max.x.ceil().min(self.width as f64);
        let y1 = max.y.ceil().min(self.height as f64);
        if !(x0 < x1 && y0 < y1) {
            return None;
        }
        Some(Region {
            x: x0 as usize,
            y: y0 as usize,
            width: u16::try_from((x1 - x0) as usize).ok()?,
            height: u16::try_from((y1 - y0) as usize).ok()?,
        })
    }

    /// Runs `draw` on a render context that shares the surface's coordinate
    /// system, then composites what landed inside `region` onto the top
    /// layer.
    fn rasterize(&mut self, region: Region, mode: BlendMode, draw: impl FnOnce(&mut RenderContext)) {
        let mut ctx = RenderContext::new(region.width, region.height);
        ctx.set_transform(Affine::translate((-(region.x as f64), -(region.y as f64))));
        ctx.set_paint_transform(Affine::IDENTITY);
        draw(&mut ctx);
        ctx.flush();
        let mut pixmap = Pixmap::new(region.width, region.height);
        ctx.render_to_pixmap(&mut pixmap);

        let stride = self.width;
        let row = usize::from(region.width);
        let top = self.top();
        for (k, px) in pixmap.data_as_u8_slice().chunks_exact(4).enumerate() {
            if px[3] == 0 {
                continue;
            }
            let src = [
                f64::from(px[0]) / 255.0,
                f64::from(px[1]) / 255.0,
                f64::from(px[2]) / 255.0,
                f64::from(px[3]) / 255.0,
            ];
            let i = (region.y + k / row) * stride + region.x + k % row;
            top[i] = composite(top[i], src, mode);
        }
    }

    fn blur(&self, pixels: Vec<Px>, sigma: f64) -> Vec<Px> {
        let radius = box_radius(sigma);
        if radius == 0 {
            return pixels;
        }
        let mut out = pixels;
        for _ in 0..BLUR_PASSES {
            out = box_pass(&out, self.width, self.height, radius, true);
            out = box_pass(&out, self.width, self.height, radius, false);
        }
        out
    }
}

impl Surface for PixelSurface {
    fn bounds(&self) -> Rect {
        Rect::sized(self.width as f64, self.height as f64)
    }

    fn clear(&mut self, background: Rgba) {
        self.layers.truncate(1);
        let fill = premultiply(background);
        self.layers[0].pixels.fill(fill);
    }

    fn push_layer(&mut self, style: LayerStyle) {
        self.layers.push(Layer {
            style,
            pixels: vec![CLEAR; self.width * self.height],
        });
    }

    fn pop_layer(&mut self) {
        if self.layers.len() < 2 {
            tracing::warn!("pop_layer without a matching push_layer");
            return;
        }
        let Some(Layer { style, pixels }) = self.layers.pop() else {
            return;
        };
        let pixels = self.blur(pixels, style.blur());
        let below = self.top();
        for (dst, src) in below.iter_mut().zip(pixels) {
            *dst = composite(*dst, scale(src, style.opacity()), style.blend_mode());
        }
    }

    fn stroke_line(&mut self, from: DVec2, to: DVec2, width: f64, color: Rgba) {
        if width <= 0.0 {
            return;
        }
        let reach = width / 2.0 + 1.0;
        let Some(region) = self.region(from.min(to) - reach, from.max(to) + reach) else {
            return;
        };
        let path = Line::new(point(from), point(to)).to_path(TOLERANCE);
        self.rasterize(region, BlendMode::Normal, |ctx| {
            ctx.set_stroke(Stroke::new(width).with_caps(Cap::Round));
            ctx.set_paint(paint_color(color));
            ctx.stroke_path(&path);
        });
    }

    fn fill_circle(&mut self, center: DVec2, radius: f64, color: Rgba) {
        if radius <= 0.0 {
            return;
        }
        let Some(region) = self.region(center - (radius + 1.0), center + (radius + 1.0)) else {
            return;
        };
        let disc = Circle::new(point(center), radius).to_path(TOLERANCE);
        self.rasterize(region, BlendMode::Normal, |ctx| {
            ctx.set_paint(paint_color(color));
            ctx.fill_path(&disc);
        });
    }

    fn fill_polygon(&mut self, points: &[DVec2], color: Rgba, blend: BlendMode) {
        let [first, rest @ ..] = points else {
            return;
        };
        if rest.len() < 2 {
            return;
        }
        let min = points.iter().fold(DVec2::INFINITY, |m, p| m.min(*p));
        let max = points.iter().fold(DVec2::NEG_INFINITY, |m, p| m.max(*p));
        let Some(region) = self.region(min - 1.0, max + 1.0) else {
            return;
        };
        let mut outline = BezPath::new();
        outline.move_to(point(*first));
        for p in rest {
            outline.line_to(point(*p));
        }
        outline.close_path();
        self.rasterize(region, blend, |ctx| {
            ctx.set_paint(paint_color(color));
            ctx.fill_path(&outline);
        });
    }

    fn fill_radial_gradient(
        &mut self,
        center: DVec2,
        radius: f64,
        stops: &[GradientStop],
        blend: BlendMode,
    ) {
        if radius <= 0.0 || stops.is_empty() {
            return;
        }
        let Some(region) = self.region(center - (radius + 1.0), center + (radius + 1.0)) else {
            return;
        };
        let stops = color_stops(stops);
        let gradient =
            Gradient::new_radial(point(center), radius as f32).with_stops(stops.as_slice());
        let disc = Circle::new(point(center), radius).to_path(TOLERANCE);
        self.rasterize(region, blend, |ctx| {
            ctx.set_paint(gradient);
            ctx.fill_path(&disc);
        });
    }

    fn fill_linear_gradient(&mut self, from: DVec2, to: DVec2, stops: &[GradientStop]) {
        let [first_stop, ..] = stops else {
            return;
        };
        if !from.is_finite() || !to.is_finite() {
            return;
        }
        let size = DVec2::new(self.width as f64, self.height as f64);
        let Some(region) = self.region(DVec2::ZERO, size) else {
            return;
        };
        let area = kurbo::Rect::new(0.0, 0.0, size.x, size.y);
        if from == to {
            let flat = paint_color(first_stop.color);
            self.rasterize(region, BlendMode::Normal, |ctx| {
                ctx.set_paint(flat);
                ctx.fill_rect(&area);
            });
            return;
        }
        let stops = color_stops(stops);
        let gradient = Gradient::new_linear(point(from), point(to)).with_stops(stops.as_slice());
        self.rasterize(region, BlendMode::Normal, |ctx| {
            ctx.set_paint(gradient);
            ctx.fill_rect(&area);
        });
    }

    fn fill_texture(&mut self, texture: &NoiseTexture, opacity: f64) {
        let width = self.width;
        let top = self.top();
        for (i, dst) in top.iter_mut().enumerate() {
            let v = texture.sample((i % width) as f64, (i / width) as f64);
            *dst = composite(*dst, premultiply(Rgba::new(v, v, v, opacity)), BlendMode::Normal);
        }
    }
}
