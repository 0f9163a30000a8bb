//! PNG output of a [`PixelSurface`].
//!
//! Feature-gated behind `png` (default on) so hosts that draw into their own
//! surface do not pull in the `image` crate. Rasterizing lives in
//! [`crate::pixel`] and is always available.

use backdrop_core::error::EffectError;
use std::path::Path;

use crate::pixel::PixelSurface;

/// Writes the surface's base layer as a PNG image.
///
/// Returns `EffectError::InvalidDimensions` if the surface dimensions overflow
/// `u32`, or `EffectError::Io` on write failure.
pub fn write_png(surface: &PixelSurface, path: &Path) -> Result<(), EffectError> {
    let w = u32::try_from(surface.width()).map_err(|_| EffectError::InvalidDimensions)?;
    let h = u32::try_from(surface.height()).map_err(|_| EffectError::InvalidDimensions)?;
    let img = image::RgbaImage::from_raw(w, h, surface.to_rgba8())
        .ok_or_else(|| EffectError::Io("RGBA buffer size mismatch".into()))?;
    img.save(path).map_err(|e| EffectError::Io(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use backdrop_core::color::Rgba;
    use backdrop_core::surface::Surface;

    #[test]
    fn write_png_round_trip() {
        let mut surface = PixelSurface::new(16, 8).unwrap();
        surface.clear(Rgba::new(1.0, 0.0, 0.0, 1.0));
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");

        write_png(&surface, &path).unwrap();

        let img = image::open(&path).unwrap().to_rgba8();
        assert_eq!(img.width(), 16);
        assert_eq!(img.height(), 8);
        assert_eq!(img.get_pixel(3, 3).0, [255, 0, 0, 255]);
    }

    #[test]
    fn write_png_into_missing_directory_is_io_error() {
        let surface = PixelSurface::new(2, 2).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("frame.png");
        assert!(matches!(write_png(&surface, &path), Err(EffectError::Io(_))));
    }
}
