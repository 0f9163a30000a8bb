#![deny(unsafe_code)]
//! Fluid blob effect.
//!
//! A handful of large, soft radial-gradient blobs drift in percentage space
//! (0–100 on both axes, independent of the surface resolution). Blobs bounce
//! off the nominal bounds with some energy loss and may travel a little past
//! them, optionally ease toward the pointer, and optionally morph their
//! radius toward a periodically re-randomized target. Blobs never interact
//! with each other.
//!
//! Two rendering strategies read the same simulation state: the raster path
//! ([`Effect::render`]) and the shape path ([`BlobField::shapes`]).

pub mod shape;

use backdrop_core::color::Rgba;
use backdrop_core::kinematics::{Body, Bounds, Kinematics, Recovery};
use backdrop_core::layer::{BlendMode, LayerStyle};
use backdrop_core::palette::Palette;
use backdrop_core::params::{param_bool, param_magnitude, param_palette, param_usize};
use backdrop_core::pointer::PointerSource;
use backdrop_core::prng::Xorshift64;
use backdrop_core::surface::{GradientStop, Rect, Surface};
use backdrop_core::texture::NoiseTexture;
use backdrop_core::Effect;
use glam::DVec2;
use serde_json::{json, Value};

pub use shape::{BlobShape, ShapeLayer};

/// Registry name.
pub const NAME: &str = "fluid-blobs";

const DEFAULT_COUNT: usize = 5;
const DEFAULT_SPEED: f64 = 5.0;
const DEFAULT_BLUR: f64 = 40.0;
const DEFAULT_POINTER_RADIUS: f64 = 200.0;
const DEFAULT_MORPH_SPEED: f64 = 0.02;
const DEFAULT_GLOW_INTENSITY: f64 = 0.5;

/// Radius band, in percent, for initial and re-picked radii.
const MIN_RADIUS: f64 = 20.0;
const MAX_RADIUS: f64 = 50.0;
/// Initial morph target spread around the starting radius.
const MORPH_SPREAD: f64 = 7.5;
/// Fraction of the eased gap closed each tick.
const MORPH_BLEND: f64 = 0.1;
/// Initial velocity components are uniform in `±VELOCITY_FACTOR · speed`.
const VELOCITY_FACTOR: f64 = 0.1;
/// Pointer radius is given in pixels-ish units; the threshold in percent is a tenth of it.
const POINTER_SCALE: f64 = 10.0;
const ATTRACTION_GAIN: f64 = 0.8;
const OVERSCAN: f64 = 10.0;
const BOUNCE_DAMPING: f64 = 0.9;
const FRICTION: f64 = 0.985;
const FLOOR_FACTOR: f64 = 0.05;
const RECOVERY_RATE: f64 = 0.05;

const CORE_OPACITY: f64 = 0.7;
const CORE_FADE: f64 = 0.7;
const GLOW_SCALE: f64 = 1.2;
const GLOW_BLUR_SCALE: f64 = 1.5;
const GLOW_ALPHA: f64 = 0.8;
const GLOW_FADE: f64 = 0.6;
const OVERLAY_ANGLE: f64 = 135.0;
/// `0x15` hex alpha suffix on the overlay colors.
const OVERLAY_ALPHA: f64 = 0x15 as f64 / 255.0;
const OVERLAY_OPACITY: f64 = 0.2;
const TEXTURE_OPACITY: f64 = 0.05;

/// Construction parameters for [`BlobField`].
#[derive(Debug, Clone, PartialEq)]
pub struct BlobParams {
    pub count: usize,
    pub speed: f64,
    /// Core blur radius in pixels; the glow uses 1.5×.
    pub blur: f64,
    pub interactive: bool,
    /// Pointer influence radius; the attraction threshold is a tenth of it,
    /// in percent.
    pub pointer_radius: f64,
    pub palette: Palette,
    pub morphing: bool,
    /// Morph progress added per tick.
    pub morph_speed: f64,
    pub glow: bool,
    /// Opacity of the glow layer.
    pub glow_intensity: f64,
    /// Draw the static grain texture.
    pub noise: bool,
}

impl Default for BlobParams {
    fn default() -> Self {
        Self {
            count: DEFAULT_COUNT,
            speed: DEFAULT_SPEED,
            blur: DEFAULT_BLUR,
            interactive: true,
            pointer_radius: DEFAULT_POINTER_RADIUS,
            palette: Palette::fluid(),
            morphing: true,
            morph_speed: DEFAULT_MORPH_SPEED,
            glow: true,
            glow_intensity: DEFAULT_GLOW_INTENSITY,
            noise: true,
        }
    }
}

impl BlobParams {
    /// Extracts parameters from a JSON object, falling back to defaults.
    pub fn from_json(params: &Value) -> Self {
        Self {
            count: param_usize(params, "blob_count", DEFAULT_COUNT),
            speed: param_magnitude(params, "speed", DEFAULT_SPEED),
            blur: param_magnitude(params, "blur", DEFAULT_BLUR),
            interactive: param_bool(params, "interactive", true),
            pointer_radius: param_magnitude(params, "pointer_radius", DEFAULT_POINTER_RADIUS),
            palette: param_palette(params, "colors", &Palette::fluid()),
            morphing: param_bool(params, "morphing", true),
            morph_speed: param_magnitude(params, "morph_speed", DEFAULT_MORPH_SPEED),
            glow: param_bool(params, "glow", true),
            glow_intensity: param_magnitude(params, "glow_intensity", DEFAULT_GLOW_INTENSITY)
                .min(1.0),
            noise: param_bool(params, "noise", true),
        }
    }

    fn kinematics(&self) -> Kinematics {
        Kinematics {
            bounds: Bounds::percent(),
            overscan: OVERSCAN,
            restitution: BOUNCE_DAMPING,
            friction: FRICTION,
            floor: self.speed * FLOOR_FACTOR,
            recovery: Recovery::Blend {
                rate: RECOVERY_RATE,
                min_factor: 2.0,
                max_factor: 3.0,
            },
        }
    }
}

/// Quadratic ease-in-out on [0, 1].
pub fn ease_in_out_quad(t: f64) -> f64 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

/// Cubic ease-out on [0, 1]: `1 − (1 − t)³`.
pub fn ease_out_cubic(t: f64) -> f64 {
    1.0 - (1.0 - t).powi(3)
}

/// One blob. Position, velocity and radius are in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Blob {
    pub body: Body,
    pub radius: f64,
    /// Set only when morphing.
    pub target_radius: Option<f64>,
    /// In [0, 1).
    pub morph_progress: f64,
    pub color: Rgba,
}

impl Blob {
    pub fn new(pos: DVec2, vel: DVec2, radius: f64, color: Rgba) -> Self {
        Self {
            body: Body::new(pos, vel),
            radius,
            target_radius: None,
            morph_progress: 0.0,
            color,
        }
    }

    pub fn pos(&self) -> DVec2 {
        self.body.pos
    }
}

/// The fluid blob field.
pub struct BlobField {
    params: BlobParams,
    kinematics: Kinematics,
    blobs: Vec<Blob>,
    rng: Xorshift64,
    texture: Option<NoiseTexture>,
    pointer: Option<Box<dyn PointerSource>>,
    disposed: bool,
}

impl BlobField {
    /// Creates a field with `params.count` blobs placed at random.
    pub fn new(params: BlobParams, seed: u64) -> Self {
        let mut rng = Xorshift64::new(seed);
        let blobs = (0..params.count)
            .map(|i| {
                let pos = DVec2::new(rng.next_range(0.0, 100.0), rng.next_range(0.0, 100.0));
                let radius = rng.next_range(MIN_RADIUS, MAX_RADIUS);
                let vel = rng.next_centered_vec() * (2.0 * VELOCITY_FACTOR * params.speed);
                let mut blob = Blob::new(pos, vel, radius, params.palette.cyclic(i));
                if params.morphing {
                    blob.target_radius =
                        Some(radius + rng.next_range(-MORPH_SPREAD, MORPH_SPREAD));
                }
                blob
            })
            .collect();
        tracing::debug!(count = params.count, seed, "blob field created");
        Self::with_blobs(params, rng, seed, blobs)
    }

    pub fn from_json(params: &Value, seed: u64) -> Self {
        Self::new(BlobParams::from_json(params), seed)
    }

    /// Creates a field from explicit blobs.
    ///
    /// `params.count` is replaced by the number of blobs given.
    pub fn from_blobs(params: BlobParams, seed: u64, blobs: Vec<Blob>) -> Self {
        let params = BlobParams {
            count: blobs.len(),
            ..params
        };
        Self::with_blobs(params, Xorshift64::new(seed), seed, blobs)
    }

    fn with_blobs(params: BlobParams, rng: Xorshift64, seed: u64, blobs: Vec<Blob>) -> Self {
        let texture = params
            .noise
            .then(|| NoiseTexture::fractal((seed ^ (seed >> 32)) as u32));
        Self {
            kinematics: params.kinematics(),
            params,
            blobs,
            rng,
            texture,
            pointer: None,
            disposed: false,
        }
    }

    pub fn blobs(&self) -> &[Blob] {
        &self.blobs
    }

    pub fn config(&self) -> &BlobParams {
        &self.params
    }

    /// The shape-strategy view of the current frame: every core shape, then
    /// every glow shape when glow is on.
    pub fn shapes(&self) -> Vec<BlobShape> {
        let cores = self.blobs.iter().map(|b| BlobShape {
            layer: ShapeLayer::Core,
            center: b.pos(),
            size: b.radius,
            color: b.color,
            fade_at: CORE_FADE,
            opacity: CORE_OPACITY,
            blur: self.params.blur,
            blend: BlendMode::Screen,
        });
        let glows = self
            .blobs
            .iter()
            .filter(|_| self.params.glow)
            .map(|b| BlobShape {
                layer: ShapeLayer::Glow,
                center: b.pos(),
                size: b.radius * GLOW_SCALE,
                color: b.color.with_alpha(GLOW_ALPHA),
                fade_at: GLOW_FADE,
                opacity: self.params.glow_intensity,
                blur: self.params.blur * GLOW_BLUR_SCALE,
                blend: BlendMode::Overlay,
            });
        cores.chain(glows).collect()
    }

    /// CSS background for the static cross-fade overlay.
    pub fn overlay_css(&self) -> String {
        shape::overlay_css(
            OVERLAY_ANGLE,
            self.params.palette.first(),
            self.params.palette.last(),
            OVERLAY_ALPHA,
        )
    }

    fn attract(&self, blob: &mut Blob, pointer: DVec2) {
        let threshold = self.params.pointer_radius / POINTER_SCALE;
        let delta = pointer - blob.body.pos;
        let distance = delta.length();
        if distance > 0.0 && distance < threshold {
            let proximity = (threshold - distance) / threshold;
            blob.body.vel += delta / distance * ease_out_cubic(proximity) * ATTRACTION_GAIN;
        }
    }

    fn morph(&mut self, index: usize) {
        let speed = self.params.morph_speed;
        let blob = &mut self.blobs[index];
        let Some(mut target) = blob.target_radius else {
            return;
        };
        blob.morph_progress += speed;
        if blob.morph_progress >= 1.0 {
            blob.morph_progress = 0.0;
            target = self.rng.next_range(MIN_RADIUS, MAX_RADIUS);
            blob.target_radius = Some(target);
        }
        blob.radius += (target - blob.radius) * ease_in_out_quad(blob.morph_progress) * MORPH_BLEND;
    }

    fn draw_layer(
        &self,
        surface: &mut dyn Surface,
        style: LayerStyle,
        scale: f64,
        stops: impl Fn(Rgba) -> [GradientStop; 2],
    ) {
        let bounds = surface.bounds();
        let size = bounds.size();
        let extent = (bounds.width + bounds.height) / 2.0;
        surface.push_layer(style);
        for blob in &self.blobs {
            let center = blob.pos() / 100.0 * size;
            let radius = blob.radius / 100.0 * extent * scale / 2.0;
            surface.fill_radial_gradient(center, radius, &stops(blob.color), BlendMode::Normal);
        }
        surface.pop_layer();
    }
}

impl Effect for BlobField {
    fn name(&self) -> &'static str {
        NAME
    }

    fn update(&mut self, bounds: Rect) {
        if self.disposed || bounds.is_empty() {
            return;
        }
        let pointer = if self.params.interactive {
            self.pointer
                .as_mut()
                .and_then(|p| p.read())
                .and_then(|s| s.percent(&bounds))
        } else {
            None
        };
        for i in 0..self.blobs.len() {
            let mut blob = self.blobs[i];
            if let Some(p) = pointer {
                self.attract(&mut blob, p);
            }
            self.blobs[i] = blob;
            self.morph(i);
            self.kinematics.step(&mut self.blobs[i].body, &mut self.rng);
        }
    }

    fn render(&self, surface: &mut dyn Surface) {
        if self.disposed || surface.bounds().is_empty() {
            return;
        }
        surface.clear(Rgba::TRANSPARENT);

        let core = LayerStyle::new()
            .with_blur(self.params.blur)
            .with_blend_mode(BlendMode::Screen)
            .with_opacity(CORE_OPACITY);
        self.draw_layer(surface, core, 1.0, |color| {
            [
                GradientStop::new(0.0, color),
                GradientStop::new(CORE_FADE, color.with_alpha(0.0)),
            ]
        });

        if self.params.glow {
            let glow = LayerStyle::new()
                .with_blur(self.params.blur * GLOW_BLUR_SCALE)
                .with_blend_mode(BlendMode::Overlay)
                .with_opacity(self.params.glow_intensity);
            self.draw_layer(surface, glow, GLOW_SCALE, |color| {
                [
                    GradientStop::new(0.0, color.with_alpha(GLOW_ALPHA)),
                    GradientStop::new(GLOW_FADE, color.with_alpha(0.0)),
                ]
            });
        }

        let bounds = surface.bounds();
        let (from, to) = shape::gradient_line(OVERLAY_ANGLE, bounds.width, bounds.height);
        let palette = &self.params.palette;
        surface.push_layer(
            LayerStyle::new()
                .with_blend_mode(BlendMode::Multiply)
                .with_opacity(OVERLAY_OPACITY),
        );
        surface.fill_linear_gradient(
            from,
            to,
            &[
                GradientStop::new(0.0, palette.first().with_alpha(OVERLAY_ALPHA)),
                GradientStop::new(1.0, palette.last().with_alpha(OVERLAY_ALPHA)),
            ],
        );
        surface.pop_layer();

        if let Some(texture) = &self.texture {
            surface.fill_texture(texture, TEXTURE_OPACITY);
        }
    }

    fn attach_pointer(&mut self, source: Box<dyn PointerSource>) -> bool {
        if !self.params.interactive || self.disposed {
            return false;
        }
        self.pointer = Some(source);
        true
    }

    fn params(&self) -> Value {
        json!({
            "blob_count": self.params.count,
            "speed": self.params.speed,
            "blur": self.params.blur,
            "interactive": self.params.interactive,
            "pointer_radius": self.params.pointer_radius,
            "colors": self.params.palette.to_css(),
            "morphing": self.params.morphing,
            "morph_speed": self.params.morph_speed,
            "glow": self.params.glow,
            "glow_intensity": self.params.glow_intensity,
            "noise": self.params.noise,
        })
    }

    fn param_schema(&self) -> Value {
        json!({
            "blob_count": {
                "type": "integer",
                "default": DEFAULT_COUNT,
                "min": 0,
                "max": 20,
                "description": "Number of blobs"
            },
            "speed": {
                "type": "number",
                "default": DEFAULT_SPEED,
                "min": 0.0,
                "max": 10.0,
                "description": "Drift speed; initial velocity components are within ±0.1·speed percent per tick"
            },
            "blur": {
                "type": "number",
                "default": DEFAULT_BLUR,
                "min": 0.0,
                "max": 200.0,
                "description": "Core layer blur in px"
            },
            "interactive": {
                "type": "boolean",
                "default": true,
                "description": "Ease blobs toward the pointer"
            },
            "pointer_radius": {
                "type": "number",
                "default": DEFAULT_POINTER_RADIUS,
                "min": 0.0,
                "max": 1000.0,
                "description": "Pointer influence radius; a tenth of it is the attraction threshold in percent"
            },
            "colors": {
                "type": "colors",
                "default": Palette::fluid().to_css(),
                "description": "Blob colors, assigned cyclically"
            },
            "morphing": {
                "type": "boolean",
                "default": true,
                "description": "Morph each blob's radius toward a periodically re-picked target"
            },
            "morph_speed": {
                "type": "number",
                "default": DEFAULT_MORPH_SPEED,
                "min": 0.0,
                "max": 1.0,
                "description": "Morph progress added per tick"
            },
            "glow": {
                "type": "boolean",
                "default": true,
                "description": "Draw the larger, softer glow layer"
            },
            "glow_intensity": {
                "type": "number",
                "default": DEFAULT_GLOW_INTENSITY,
                "min": 0.0,
                "max": 1.0,
                "description": "Glow layer opacity"
            },
            "noise": {
                "type": "boolean",
                "default": true,
                "description": "Overlay a static grain texture"
            }
        })
    }

    fn dispose(&mut self) {
        self.pointer = None;
        self.disposed = true;
        tracing::debug!(count = self.blobs.len(), "blob field disposed");
    }

    fn is_disposed(&self) -> bool {
        self.disposed
    }
}
