#![deny(unsafe_code)]
//! Core types and traits for the backdrop animation effects.
//!
//! Provides the `Effect` trait, the `Surface` drawing abstraction with its
//! `RecordingSurface` test double, CSS color parsing and hue rotation,
//! `Palette`, the `Xorshift64` PRNG, shared bounded kinematics, pointer
//! input sources, the `FrameScheduler` tick loop, `Scene`, and parameter
//! helpers.

pub mod color;
pub mod effect;
pub mod error;
pub mod kinematics;
pub mod layer;
pub mod palette;
pub mod params;
pub mod pointer;
pub mod prng;
pub mod scene;
pub mod scheduler;
pub mod surface;
pub mod texture;

pub use color::{shift_color, shift_hue, Hsl, Rgba};
pub use effect::Effect;
pub use error::EffectError;
pub use kinematics::{Body, Bounds, Kinematics, Recovery};
pub use layer::{BlendMode, LayerStyle};
pub use palette::Palette;
pub use pointer::{PointerBinding, PointerHub, PointerSnapshot, PointerSource, ScriptedPointer};
pub use prng::Xorshift64;
pub use scene::Scene;
pub use scheduler::{DisplayRefresh, FrameRequest, FrameScheduler, ManualRefresh, SchedulerState, TickOutcome};
pub use surface::{DrawCommand, GradientStop, RecordingSurface, Rect, Surface};
pub use texture::NoiseTexture;
