//! Twinkling starfield drawn behind the waves.

use backdrop_core::color::Rgba;
use backdrop_core::prng::Xorshift64;
use backdrop_core::surface::Surface;
use glam::DVec2;

const MIN_SIZE: f64 = 0.5;
const MAX_SIZE: f64 = 2.0;
const MIN_OPACITY: f64 = 0.2;
const MAX_OPACITY: f64 = 0.9;
const MIN_TWINKLE_SPEED: f64 = 0.5;
const MAX_TWINKLE_SPEED: f64 = 2.0;

/// A fixed point of light. Only its rendered opacity changes over time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Star {
    /// Position in percent of the surface.
    pub pos: DVec2,
    /// Disc radius in pixels.
    pub size: f64,
    pub opacity: f64,
    pub twinkle_speed: f64,
    pub twinkle_offset: f64,
}

impl Star {
    pub fn random(rng: &mut Xorshift64) -> Self {
        Self {
            pos: DVec2::new(rng.next_range(0.0, 100.0), rng.next_range(0.0, 100.0)),
            size: rng.next_range(MIN_SIZE, MAX_SIZE),
            opacity: rng.next_range(MIN_OPACITY, MAX_OPACITY),
            twinkle_speed: rng.next_range(MIN_TWINKLE_SPEED, MAX_TWINKLE_SPEED),
            twinkle_offset: rng.next_angle(),
        }
    }

    /// `opacity × (0.5 + 0.5·sin(t·speed + offset))`, always within
    /// `[0, opacity]`.
    pub fn opacity_at(&self, t: f64) -> f64 {
        self.opacity * (0.5 + 0.5 * (t * self.twinkle_speed + self.twinkle_offset).sin())
    }
}

pub(crate) fn scatter(count: usize, rng: &mut Xorshift64) -> Vec<Star> {
    (0..count).map(|_| Star::random(rng)).collect()
}

pub(crate) fn draw(stars: &[Star], t: f64, surface: &mut dyn Surface) {
    let size = surface.bounds().size();
    for star in stars {
        let center = star.pos / 100.0 * size;
        surface.fill_circle(center, star.size, Rgba::WHITE.with_alpha(star.opacity_at(t)));
    }
}
