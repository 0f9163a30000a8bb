#![deny(unsafe_code)]
//! Effect registry: maps effect names to implementations and renders scenes
//! headlessly.
//!
//! This crate sits between `backdrop-core` (which defines the `Effect` trait)
//! and the individual effect crates. The CLI depends on it so that name
//! dispatch and headless rendering live in one place.

pub mod pixel;

#[cfg(feature = "png")]
pub mod snapshot;

use backdrop_aurora::WaveField;
use backdrop_blobs::BlobField;
use backdrop_core::error::EffectError;
use backdrop_core::pointer::{PointerSource, ScriptedPointer};
use backdrop_core::scheduler::{FrameScheduler, ManualRefresh};
use backdrop_core::surface::{Rect, Surface};
use backdrop_core::{Effect, Scene};
use backdrop_particles::ParticleField;
use serde_json::Value;

use crate::pixel::PixelSurface;

/// All available effect names.
const EFFECT_NAMES: &[&str] = &[
    backdrop_particles::NAME,
    backdrop_blobs::NAME,
    backdrop_aurora::NAME,
];

/// Every registered effect.
///
/// Wraps each implementation and delegates `Effect` trait methods.
/// Use [`EffectKind::from_name`] for string-based construction.
pub enum EffectKind {
    Particles(ParticleField),
    Blobs(BlobField),
    Aurora(WaveField),
}

impl EffectKind {
    /// Constructs an effect by name.
    ///
    /// Returns `EffectError::UnknownEffect` if the name is not recognized.
    #[tracing::instrument(skip(params))]
    pub fn from_name(name: &str, seed: u64, params: &Value) -> Result<Self, EffectError> {
        match name {
            backdrop_particles::NAME => Ok(Self::Particles(ParticleField::from_json(params, seed))),
            backdrop_blobs::NAME => Ok(Self::Blobs(BlobField::from_json(params, seed))),
            backdrop_aurora::NAME => Ok(Self::Aurora(WaveField::from_json(params, seed))),
            _ => Err(EffectError::UnknownEffect(name.to_string())),
        }
    }

    /// Validates the scene and constructs its effect.
    pub fn from_scene(scene: &Scene) -> Result<Self, EffectError> {
        scene.validate()?;
        Self::from_name(&scene.effect, scene.seed, &scene.params)
    }

    /// Returns a slice of all recognized effect names.
    pub fn list_effects() -> &'static [&'static str] {
        EFFECT_NAMES
    }

    fn inner(&self) -> &dyn Effect {
        match self {
            Self::Particles(e) => e,
            Self::Blobs(e) => e,
            Self::Aurora(e) => e,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Effect {
        match self {
            Self::Particles(e) => e,
            Self::Blobs(e) => e,
            Self::Aurora(e) => e,
        }
    }
}

impl Effect for EffectKind {
    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn update(&mut self, bounds: Rect) {
        self.inner_mut().update(bounds)
    }

    fn render(&self, surface: &mut dyn Surface) {
        self.inner().render(surface)
    }

    fn attach_pointer(&mut self, source: Box<dyn PointerSource>) -> bool {
        self.inner_mut().attach_pointer(source)
    }

    fn params(&self) -> Value {
        self.inner().params()
    }

    fn param_schema(&self) -> Value {
        self.inner().param_schema()
    }

    fn dispose(&mut self) {
        self.inner_mut().dispose()
    }

    fn is_disposed(&self) -> bool {
        self.inner().is_disposed()
    }
}

/// Runs a scene for `scene.ticks` frames (at least one) on a fresh
/// [`PixelSurface`] and returns the surface.
///
/// `pointer`, in surface pixels, is held fixed for the whole run.
pub fn render_scene(scene: &Scene, pointer: Option<(f64, f64)>) -> Result<PixelSurface, EffectError> {
    let mut effect = EffectKind::from_scene(scene)?;
    if let Some((x, y)) = pointer {
        if !effect.attach_pointer(Box::new(ScriptedPointer::fixed(x, y))) {
            tracing::debug!(effect = effect.name(), "pointer ignored by non-interactive effect");
        }
    }
    let mut surface = PixelSurface::new(scene.width, scene.height)?;
    let mut refresh = ManualRefresh::new();
    let mut scheduler = FrameScheduler::new(effect);
    let frames = scene.ticks.max(1);
    let rendered = scheduler.run(&mut refresh, &mut surface, frames);
    scheduler.dispose(&mut refresh);
    tracing::debug!(effect = %scene.effect, frames, rendered, "scene rendered");
    Ok(surface)
}
