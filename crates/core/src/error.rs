//! Error types for backdrop.
//!
//! Only construction-time and tooling operations are fallible. The per-tick
//! update and render paths never return errors: degraded input makes a tick
//! a no-op instead.

use thiserror::Error;

/// Errors produced by effect construction, color parsing, and snapshot tooling.
#[derive(Debug, Error)]
pub enum EffectError {
    /// Width or height was zero when creating a raster surface or scene.
    #[error("invalid dimensions: width and height must be non-zero")]
    InvalidDimensions,

    /// A color string could not be parsed.
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// A palette could not be constructed from the given colors.
    #[error("invalid palette: {0}")]
    InvalidPalette(String),

    /// No effect is registered under the requested name.
    #[error("unknown effect: {0}")]
    UnknownEffect(String),

    /// Reading a scene or writing a snapshot failed.
    #[error("i/o error: {0}")]
    Io(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_dimensions_displays_readable_message() {
        let msg = EffectError::InvalidDimensions.to_string();
        assert!(
            msg.contains("width") && msg.contains("height"),
            "expected message mentioning width and height, got: {msg}"
        );
    }

    #[test]
    fn invalid_color_includes_input() {
        let msg = EffectError::InvalidColor("rgba(1,2)".into()).to_string();
        assert!(msg.contains("rgba(1,2)"), "missing input in: {msg}");
    }

    #[test]
    fn invalid_palette_includes_message() {
        let msg = EffectError::InvalidPalette("empty".into()).to_string();
        assert!(msg.contains("empty"), "missing message in: {msg}");
    }

    #[test]
    fn unknown_effect_includes_name() {
        let msg = EffectError::UnknownEffect("lava-lamp".into()).to_string();
        assert!(msg.contains("lava-lamp"), "missing name in: {msg}");
    }

    #[test]
    fn io_includes_message() {
        let msg = EffectError::Io("disk full".into()).to_string();
        assert!(msg.contains("disk full"), "missing message in: {msg}");
    }

    #[test]
    fn effect_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<EffectError>();
    }

    #[test]
    fn effect_error_implements_std_error() {
        fn assert_std_error<T: std::error::Error>() {}
        assert_std_error::<EffectError>();
    }
}
