//! Image preprocessing
//!
//! Downsizes decoded rasters to fit within a maximum dimension while
//! preserving aspect ratio. Images already within bounds pass through
//! untouched, so repeated preprocessing never accumulates resampling loss.

use crate::error::{CutoutError, Result};
use image::{DynamicImage, GenericImageView};

/// Shared image preprocessing utilities
pub struct Preprocessor;

impl Preprocessor {
    /// Downsize `image` so both axes fit within `max_dimension`
    ///
    /// A single scale factor `s = min(max/width, max/height)` is applied to
    /// both axes, so the aspect ratio is preserved by construction. Output
    /// dimensions are `(round(width * s), round(height * s))` with a floor of
    /// one pixel per axis, resampled with Lanczos3. Images already within
    /// bounds are returned unchanged without resampling.
    ///
    /// # Errors
    ///
    /// Returns `CutoutError::InvalidImage` when either input dimension is
    /// zero; such a raster is undefined input and must not reach the scale
    /// computation.
    pub fn fit_within(image: DynamicImage, max_dimension: u32) -> Result<DynamicImage> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(CutoutError::invalid_image(format!(
                "decoded raster has zero dimension ({width}x{height})"
            )));
        }

        if width <= max_dimension && height <= max_dimension {
            return Ok(image);
        }

        let max_f64 = f64::from(max_dimension);
        let scale = (max_f64 / f64::from(width)).min(max_f64 / f64::from(height));
        let new_width = ((f64::from(width) * scale).round() as u32).max(1);
        let new_height = ((f64::from(height) * scale).round() as u32).max(1);

        log::debug!("resizing {width}x{height} -> {new_width}x{new_height} (scale {scale:.4})");

        Ok(image.resize_exact(
            new_width,
            new_height,
            image::imageops::FilterType::Lanczos3,
        ))
    }
}
