//! Reproducible description of a headless run.
//!
//! A [`Scene`] captures everything needed to replay an effect: name, surface
//! size, parameters, PRNG seed, and tick count.

use crate::error::EffectError;
use serde::{Deserialize, Serialize};

/// Reproducible description of a headless run.
///
/// Two identical `Scene` values run through the same binary (with the same
/// scripted pointer input) produce identical frames.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scene {
    pub effect: String,
    pub width: usize,
    pub height: usize,
    #[serde(default = "empty_params")]
    pub params: serde_json::Value,
    pub seed: u64,
    #[serde(default)]
    pub ticks: usize,
}

fn empty_params() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

impl Scene {
    /// Creates a scene with empty params (`{}`) and zero ticks.
    pub fn new(effect: &str, width: usize, height: usize, seed: u64) -> Self {
        Self {
            effect: effect.to_string(),
            width,
            height,
            params: empty_params(),
            seed,
            ticks: 0,
        }
    }

    /// Checks that both dimensions are non-zero and that `width * height`
    /// does not overflow.
    pub fn validate(&self) -> Result<(), EffectError> {
        if self.width == 0 || self.height == 0 {
            return Err(EffectError::InvalidDimensions);
        }
        self.width
            .checked_mul(self.height)
            .ok_or(EffectError::InvalidDimensions)?;
        Ok(())
    }
}
