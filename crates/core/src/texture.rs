//! Static fractal-noise texture used as a grain overlay.
//!
//! Generated once when an effect is built and drawn unchanged every frame.

use noise::{Fbm, MultiFractal, NoiseFn, Perlin};

/// Display size of one texture tile in surface pixels.
const DEFAULT_TILE_PX: f64 = 100.0;
/// Cells per texture side.
const DEFAULT_CELLS: usize = 64;
/// Base frequency in noise units per cell; high enough to read as grain.
const GRAIN_FREQUENCY: f64 = 0.9;
const GRAIN_OCTAVES: usize = 4;

/// A square grid of grain values in [0, 1], tiled across the surface.
#[derive(Debug, Clone, PartialEq)]
pub struct NoiseTexture {
    cells: usize,
    tile_px: f64,
    values: Vec<f64>,
}

impl NoiseTexture {
    /// Builds a 64×64 fractal-noise tile displayed at 100×100 px.
    pub fn fractal(seed: u32) -> Self {
        Self::with_size(seed, DEFAULT_CELLS, DEFAULT_TILE_PX)
    }

    /// Builds a `cells`×`cells` tile displayed at `tile_px` pixels.
    ///
    /// `cells` is raised to at least 1 and `tile_px` to at least 1 pixel.
    pub fn with_size(seed: u32, cells: usize, tile_px: f64) -> Self {
        let cells = cells.max(1);
        let fbm = Fbm::<Perlin>::new(seed)
            .set_octaves(GRAIN_OCTAVES)
            .set_frequency(GRAIN_FREQUENCY);
        let values = (0..cells * cells)
            .map(|i| {
                let x = (i % cells) as f64;
                let y = (i / cells) as f64;
                (fbm.get([x, y]) * 0.5 + 0.5).clamp(0.0, 1.0)
            })
            .collect();
        Self {
            cells,
            tile_px: if tile_px.is_finite() { tile_px.max(1.0) } else { DEFAULT_TILE_PX },
            values,
        }
    }

    pub fn cells(&self) -> usize {
        self.cells
    }

    pub fn tile_px(&self) -> f64 {
        self.tile_px
    }

    /// Grain value at surface pixel `(x, y)`, tiling in both directions.
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        let scale = self.cells as f64 / self.tile_px;
        let cx = ((x * scale).floor() as i64).rem_euclid(self.cells as i64) as usize;
        let cy = ((y * scale).floor() as i64).rem_euclid(self.cells as i64) as usize;
        self.values[cy * self.cells + cx]
    }
}
