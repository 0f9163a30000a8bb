#![deny(unsafe_code)]
//! Aurora wave effect.
//!
//! A few analytic sine-wave generators, each filled from its curve down to
//! the bottom edge, blurred together over a dark background. The pointer
//! shifts the bands horizontally (later bands further) and vertically. An
//! optional starfield twinkles behind the waves, and an optional hue shift
//! slowly rotates every band's color.

pub mod stars;

use std::f64::consts::TAU;

use backdrop_core::color::{shift_hue, Rgba};
use backdrop_core::layer::{BlendMode, LayerStyle};
use backdrop_core::palette::Palette;
use backdrop_core::params::{
    param_bool, param_color, param_magnitude, param_palette, param_usize,
};
use backdrop_core::pointer::PointerSource;
use backdrop_core::prng::Xorshift64;
use backdrop_core::surface::{Rect, Surface};
use backdrop_core::Effect;
use glam::DVec2;
use serde_json::{json, Value};

pub use stars::Star;

/// Registry name.
pub const NAME: &str = "aurora-waves";

const DEFAULT_SPEED: f64 = 5.0;
const DEFAULT_AMPLITUDE: f64 = 100.0;
const DEFAULT_WAVE_COUNT: usize = 3;
const DEFAULT_BLUR: f64 = 30.0;
const DEFAULT_PARALLAX_INTENSITY: f64 = 0.3;
const DEFAULT_BACKGROUND: Rgba = Rgba::new(10.0 / 255.0, 10.0 / 255.0, 35.0 / 255.0, 1.0);
const DEFAULT_STAR_COUNT: usize = 100;
const DEFAULT_COLOR_SHIFT_SPEED: f64 = 0.01;
const DEFAULT_TIME_STEP: f64 = 0.05;

/// Horizontal distance between curve samples, in pixels.
pub const SAMPLE_STEP: f64 = 5.0;
const GLOW_OPACITY: f64 = 0.3;
const SHIMMER_OPACITY: f64 = 0.2;

/// Construction parameters for [`WaveField`].
#[derive(Debug, Clone, PartialEq)]
pub struct WaveParams {
    pub wave_count: usize,
    /// Angular speed scale; each generator runs at `speed/100 · U(0.5, 1)`.
    pub speed: f64,
    /// Peak displacement in pixels; also scales the vertical parallax.
    pub amplitude: f64,
    /// Blur of the wave layer, in pixels.
    pub blur: f64,
    pub palette: Palette,
    pub background: Rgba,
    pub parallax: bool,
    /// In [0, 1].
    pub parallax_intensity: f64,
    /// Additive second fill of every band.
    pub glow: bool,
    pub shimmer: bool,
    pub stars: bool,
    pub star_count: usize,
    pub color_shift: bool,
    /// Hue turns per unit of time.
    pub color_shift_speed: f64,
    /// Time added per tick.
    pub time_step: f64,
}

impl Default for WaveParams {
    fn default() -> Self {
        Self {
            wave_count: DEFAULT_WAVE_COUNT,
            speed: DEFAULT_SPEED,
            amplitude: DEFAULT_AMPLITUDE,
            blur: DEFAULT_BLUR,
            palette: Palette::aurora(),
            background: DEFAULT_BACKGROUND,
            parallax: true,
            parallax_intensity: DEFAULT_PARALLAX_INTENSITY,
            glow: true,
            shimmer: false,
            stars: false,
            star_count: DEFAULT_STAR_COUNT,
            color_shift: false,
            color_shift_speed: DEFAULT_COLOR_SHIFT_SPEED,
            time_step: DEFAULT_TIME_STEP,
        }
    }
}

impl WaveParams {
    /// Extracts parameters from a JSON object, falling back to defaults.
    pub fn from_json(params: &Value) -> Self {
        Self {
            wave_count: param_usize(params, "wave_count", DEFAULT_WAVE_COUNT),
            speed: param_magnitude(params, "speed", DEFAULT_SPEED),
            amplitude: param_magnitude(params, "amplitude", DEFAULT_AMPLITUDE),
            blur: param_magnitude(params, "blur", DEFAULT_BLUR),
            palette: param_palette(params, "colors", &Palette::aurora()),
            background: param_color(params, "background", DEFAULT_BACKGROUND),
            parallax: param_bool(params, "parallax", true),
            parallax_intensity: param_magnitude(
                params,
                "parallax_intensity",
                DEFAULT_PARALLAX_INTENSITY,
            )
            .min(1.0),
            glow: param_bool(params, "glow", true),
            shimmer: param_bool(params, "shimmer", false),
            stars: param_bool(params, "stars", false),
            star_count: param_usize(params, "star_count", DEFAULT_STAR_COUNT),
            color_shift: param_bool(params, "color_shift", false),
            color_shift_speed: param_magnitude(
                params,
                "color_shift_speed",
                DEFAULT_COLOR_SHIFT_SPEED,
            ),
            time_step: param_magnitude(params, "time_step", DEFAULT_TIME_STEP),
        }
    }
}

/// One sine-wave band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveGenerator {
    pub phase: f64,
    /// Spatial frequency in radians per pixel.
    pub frequency: f64,
    pub amplitude: f64,
    /// Angular speed in radians per unit of time.
    pub angular_speed: f64,
    pub color: Rgba,
    pub opacity: f64,
}

impl WaveGenerator {
    fn random(index: usize, params: &WaveParams, rng: &mut Xorshift64) -> Self {
        Self {
            phase: rng.next_range(0.0, TAU),
            frequency: 0.01 + rng.next_range(0.0, 0.02),
            amplitude: params.amplitude * rng.next_range(0.5, 1.0),
            angular_speed: params.speed / 100.0 * rng.next_range(0.5, 1.0),
            color: params.palette.cyclic(index),
            opacity: 0.3 + rng.next_range(0.0, 0.4),
        }
    }

    /// Displacement from the baseline at `x` and time `t`: a primary
    /// harmonic plus a half-amplitude secondary at 1.5× frequency.
    pub fn displacement(&self, x: f64, t: f64) -> f64 {
        let primary = (x * self.frequency + self.phase + t * self.angular_speed).sin();
        let secondary = (x * self.frequency * 1.5 + self.phase * 1.3
            + t * self.angular_speed * 0.7)
            .sin();
        primary * self.amplitude + secondary * self.amplitude * 0.5
    }
}

/// Vertical offset for a pointer at fraction `pointer_y` of the height.
/// Zero at the center.
pub fn vertical_parallax(pointer_y: f64, amplitude: f64, intensity: f64) -> f64 {
    (pointer_y - 0.5) * amplitude * intensity
}

/// Horizontal offset of generator `index` of `count` for a pointer at
/// fraction `pointer_x` of the width. Later generators move further.
pub fn horizontal_parallax(
    pointer_x: f64,
    width: f64,
    intensity: f64,
    index: usize,
    count: usize,
) -> f64 {
    if count == 0 {
        return 0.0;
    }
    (pointer_x - 0.5) * width * intensity * (index + 1) as f64 / count as f64
}

/// Opacity of the shimmer overlay for generator `index` at time `t`.
pub fn shimmer_opacity(opacity: f64, t: f64, index: usize) -> f64 {
    opacity * SHIMMER_OPACITY * (0.5 + 0.5 * (t * 2.0 + index as f64).sin())
}

/// The aurora wave field.
pub struct WaveField {
    params: WaveParams,
    generators: Vec<WaveGenerator>,
    stars: Vec<Star>,
    ticks: u64,
    time: f64,
    /// Pointer as a fraction of the surface, read this tick.
    pointer: DVec2,
    source: Option<Box<dyn PointerSource>>,
    disposed: bool,
}

impl WaveField {
    pub fn new(params: WaveParams, seed: u64) -> Self {
        let mut rng = Xorshift64::new(seed);
        let generators = (0..params.wave_count)
            .map(|i| WaveGenerator::random(i, &params, &mut rng))
            .collect();
        let stars = if params.stars {
            stars::scatter(params.star_count, &mut rng)
        } else {
            Vec::new()
        };
        tracing::debug!(waves = params.wave_count, stars = params.stars, seed, "wave field created");
        Self::with_generators(params, generators, stars)
    }

    pub fn from_json(params: &Value, seed: u64) -> Self {
        Self::new(WaveParams::from_json(params), seed)
    }

    /// Creates a field from explicit generators and no stars.
    pub fn from_generators(params: WaveParams, generators: Vec<WaveGenerator>) -> Self {
        let params = WaveParams {
            wave_count: generators.len(),
            ..params
        };
        Self::with_generators(params, generators, Vec::new())
    }

    fn with_generators(params: WaveParams, generators: Vec<WaveGenerator>, stars: Vec<Star>) -> Self {
        Self {
            params,
            generators,
            stars,
            ticks: 0,
            time: 0.0,
            pointer: DVec2::splat(0.5),
            source: None,
            disposed: false,
        }
    }

    pub fn generators(&self) -> &[WaveGenerator] {
        &self.generators
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn config(&self) -> &WaveParams {
        &self.params
    }

    /// Time of the current frame. The first tick renders at 0.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Pointer used by the current frame, as a fraction of the surface.
    pub fn pointer(&self) -> DVec2 {
        self.pointer
    }

    /// Color of generator `index` at the current time.
    pub fn band_color(&self, index: usize) -> Rgba {
        let base = self.generators[index].color;
        if self.params.color_shift {
            shift_hue(base, (self.time * self.params.color_shift_speed).rem_euclid(1.0))
        } else {
            base
        }
    }

    /// Closed outline of generator `index` for a `width × height` surface:
    /// bottom-left corner, one sample every [`SAMPLE_STEP`] pixels, then the
    /// bottom-right corner.
    pub fn band_outline(&self, index: usize, width: f64, height: f64) -> Vec<DVec2> {
        let generator = &self.generators[index];
        let intensity = self.params.parallax_intensity;
        let (dx, dy) = if self.params.parallax {
            (
                horizontal_parallax(self.pointer.x, width, intensity, index, self.generators.len()),
                vertical_parallax(self.pointer.y, self.params.amplitude, intensity),
            )
        } else {
            (0.0, 0.0)
        };
        let baseline = height / 2.0;
        let samples = (width / SAMPLE_STEP).floor() as usize + 1;

        let mut outline = Vec::with_capacity(samples + 2);
        outline.push(DVec2::new(0.0, height));
        outline.extend((0..samples).map(|k| {
            let x = k as f64 * SAMPLE_STEP;
            DVec2::new(x + dx, baseline + generator.displacement(x, self.time) + dy)
        }));
        outline.push(DVec2::new(width, height));
        outline
    }
}

impl Effect for WaveField {
    fn name(&self) -> &'static str {
        NAME
    }

    fn update(&mut self, bounds: Rect) {
        if self.disposed || bounds.is_empty() {
            return;
        }
        if self.params.parallax {
            self.pointer = self
                .source
                .as_mut()
                .and_then(|s| s.read())
                .and_then(|s| s.unit(&bounds))
                .map(|p| p.clamp(DVec2::ZERO, DVec2::ONE))
                .unwrap_or(DVec2::splat(0.5));
        }
        self.time = self.ticks as f64 * self.params.time_step;
        self.ticks += 1;
    }

    fn render(&self, surface: &mut dyn Surface) {
        if self.disposed {
            return;
        }
        let bounds = surface.bounds();
        if bounds.is_empty() {
            return;
        }
        surface.clear(self.params.background);
        stars::draw(&self.stars, self.time, surface);

        surface.push_layer(LayerStyle::new().with_blur(self.params.blur));
        for (i, generator) in self.generators.iter().enumerate() {
            let outline = self.band_outline(i, bounds.width, bounds.height);
            let color = self.band_color(i);
            surface.fill_polygon(&outline, color.fade(generator.opacity), BlendMode::Normal);
            if self.params.glow {
                surface.fill_polygon(
                    &outline,
                    color.fade(generator.opacity * GLOW_OPACITY),
                    BlendMode::Additive,
                );
            }
            if self.params.shimmer {
                let opacity = shimmer_opacity(generator.opacity, self.time, i);
                surface.fill_polygon(&outline, color.fade(opacity), BlendMode::Screen);
            }
        }
        surface.pop_layer();
    }

    fn attach_pointer(&mut self, source: Box<dyn PointerSource>) -> bool {
        if !self.params.parallax || self.disposed {
            return false;
        }
        self.source = Some(source);
        true
    }

    fn params(&self) -> Value {
        json!({
            "wave_count": self.params.wave_count,
            "speed": self.params.speed,
            "amplitude": self.params.amplitude,
            "blur": self.params.blur,
            "colors": self.params.palette.to_css(),
            "background": self.params.background.to_css(),
            "parallax": self.params.parallax,
            "parallax_intensity": self.params.parallax_intensity,
            "glow": self.params.glow,
            "shimmer": self.params.shimmer,
            "stars": self.params.stars,
            "star_count": self.params.star_count,
            "color_shift": self.params.color_shift,
            "color_shift_speed": self.params.color_shift_speed,
            "time_step": self.params.time_step,
        })
    }

    fn param_schema(&self) -> Value {
        json!({
            "wave_count": {
                "type": "integer",
                "default": DEFAULT_WAVE_COUNT,
                "min": 0,
                "max": 10,
                "description": "Number of wave bands"
            },
            "speed": {
                "type": "number",
                "default": DEFAULT_SPEED,
                "min": 0.0,
                "max": 10.0,
                "description": "Wave animation speed"
            },
            "amplitude": {
                "type": "number",
                "default": DEFAULT_AMPLITUDE,
                "min": 0.0,
                "max": 500.0,
                "description": "Peak wave displacement in px"
            },
            "blur": {
                "type": "number",
                "default": DEFAULT_BLUR,
                "min": 0.0,
                "max": 100.0,
                "description": "Blur of the wave layer in px; stars stay sharp"
            },
            "colors": {
                "type": "colors",
                "default": Palette::aurora().to_css(),
                "description": "Band colors, assigned cyclically"
            },
            "background": {
                "type": "color",
                "default": DEFAULT_BACKGROUND.to_css(),
                "description": "Fill under everything"
            },
            "parallax": {
                "type": "boolean",
                "default": true,
                "description": "Shift bands with the pointer"
            },
            "parallax_intensity": {
                "type": "number",
                "default": DEFAULT_PARALLAX_INTENSITY,
                "min": 0.0,
                "max": 1.0,
                "description": "Strength of the pointer shift"
            },
            "glow": {
                "type": "boolean",
                "default": true,
                "description": "Additive second fill at 0.3× opacity"
            },
            "shimmer": {
                "type": "boolean",
                "default": false,
                "description": "Oscillating screen-blended overlay"
            },
            "stars": {
                "type": "boolean",
                "default": false,
                "description": "Twinkling starfield behind the waves"
            },
            "star_count": {
                "type": "integer",
                "default": DEFAULT_STAR_COUNT,
                "min": 0,
                "max": 1000,
                "description": "Number of stars"
            },
            "color_shift": {
                "type": "boolean",
                "default": false,
                "description": "Rotate band hues over time"
            },
            "color_shift_speed": {
                "type": "number",
                "default": DEFAULT_COLOR_SHIFT_SPEED,
                "min": 0.0,
                "max": 1.0,
                "description": "Hue turns per unit of time"
            },
            "time_step": {
                "type": "number",
                "default": DEFAULT_TIME_STEP,
                "min": 0.0,
                "max": 1.0,
                "description": "Time added per tick"
            }
        })
    }

    fn dispose(&mut self) {
        self.source = None;
        self.disposed = true;
        tracing::debug!(ticks = self.ticks, "wave field disposed");
    }

    fn is_disposed(&self) -> bool {
        self.disposed
    }
}
