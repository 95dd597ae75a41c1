//! Core types for the background removal pipeline

use crate::error::Result;
use image::{DynamicImage, RgbaImage};
use instant::Duration;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Conventional filename for the exported cutout
pub const EXPORT_FILE_NAME: &str = "no-background.png";

/// MIME type of the exported cutout
pub const EXPORT_MIME_TYPE: &str = "image/png";

/// The pair of rasters computed for one distinct input
///
/// Shared between the result cache and returned outcomes via `Arc`; immutable
/// once constructed.
#[derive(Debug, Clone)]
pub struct ImagePair {
    /// The decoded original, untouched by resizing
    pub original: DynamicImage,

    /// The background-removed raster, at the dimensions handed to the removal
    /// call, with an alpha channel isolating foreground content
    pub cutout: RgbaImage,
}

/// Per-stage timing breakdown for one request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageTimings {
    /// Decoding the upload bytes into a raster
    pub decode_ms: u64,

    /// Downsizing to the configured maximum dimension (zero on the identity
    /// path and on cache hits)
    pub resize_ms: u64,

    /// The removal collaborator call (zero on cache hits)
    pub removal_ms: u64,

    /// Total end-to-end time for the request
    pub total_ms: u64,
}

impl StageTimings {
    /// Time not accounted for by the measured stages
    #[must_use]
    pub fn overhead_ms(&self) -> u64 {
        self.total_ms
            .saturating_sub(self.decode_ms + self.resize_ms + self.removal_ms)
    }
}

/// Result of one pipeline request
#[derive(Debug, Clone)]
pub struct RemovalOutcome {
    images: Arc<ImagePair>,

    /// Wall-clock time for the request; near zero on cache hits
    pub elapsed: Duration,

    /// Whether the result was served from the cache
    pub cache_hit: bool,

    /// Per-stage timing breakdown
    pub timings: StageTimings,
}

impl RemovalOutcome {
    /// Assemble an outcome from a computed or cached image pair
    #[must_use]
    pub fn new(
        images: Arc<ImagePair>,
        elapsed: Duration,
        cache_hit: bool,
        timings: StageTimings,
    ) -> Self {
        Self {
            images,
            elapsed,
            cache_hit,
            timings,
        }
    }

    /// The decoded original image
    #[must_use]
    pub fn original(&self) -> &DynamicImage {
        &self.images.original
    }

    /// The background-removed image
    #[must_use]
    pub fn cutout(&self) -> &RgbaImage {
        &self.images.cutout
    }

    /// The shared image pair, as stored in the cache
    #[must_use]
    pub fn images(&self) -> &Arc<ImagePair> {
        &self.images
    }

    /// Elapsed wall time in seconds, for display alongside the results
    #[must_use]
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    /// Dimensions of the cutout raster
    #[must_use]
    pub fn cutout_dimensions(&self) -> (u32, u32) {
        self.images.cutout.dimensions()
    }

    /// Encode the cutout as a PNG byte sequence with alpha channel
    ///
    /// This is the export artifact served under [`EXPORT_FILE_NAME`] with
    /// [`EXPORT_MIME_TYPE`].
    ///
    /// # Errors
    ///
    /// Returns an error if PNG encoding fails.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut buffer);
        self.images
            .cutout
            .write_to(&mut cursor, image::ImageFormat::Png)?;
        Ok(buffer)
    }

    /// Save the cutout as a PNG file with alpha channel
    ///
    /// # Errors
    ///
    /// Returns an error on encoding or file I/O failures.
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = self.to_png_bytes()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GenericImageView;

    fn outcome_with_cutout(width: u32, height: u32) -> RemovalOutcome {
        let original = DynamicImage::new_rgb8(width, height);
        let mut cutout = RgbaImage::new(width, height);
        for (x, _, pixel) in cutout.enumerate_pixels_mut() {
            *pixel = image::Rgba([10, 20, 30, if x % 2 == 0 { 255 } else { 0 }]);
        }
        RemovalOutcome::new(
            Arc::new(ImagePair { original, cutout }),
            Duration::from_millis(42),
            false,
            StageTimings::default(),
        )
    }

    #[test]
    fn test_png_export_round_trips_with_alpha() {
        let outcome = outcome_with_cutout(8, 4);
        let bytes = outcome.to_png_bytes().unwrap();

        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), (8, 4));
        assert!(decoded.color().has_alpha());
        // Alternating alpha survives the encode/decode pass.
        let rgba = decoded.into_rgba8();
        assert_eq!(rgba.get_pixel(0, 0)[3], 255);
        assert_eq!(rgba.get_pixel(1, 0)[3], 0);
    }

    #[test]
    fn test_export_conventions() {
        assert_eq!(EXPORT_FILE_NAME, "no-background.png");
        assert_eq!(EXPORT_MIME_TYPE, "image/png");
    }

    #[test]
    fn test_elapsed_seconds() {
        let outcome = outcome_with_cutout(2, 2);
        assert!((outcome.elapsed_seconds() - 0.042).abs() < 1e-9);
    }

    #[test]
    fn test_stage_timings_overhead() {
        let timings = StageTimings {
            decode_ms: 10,
            resize_ms: 5,
            removal_ms: 100,
            total_ms: 120,
        };
        assert_eq!(timings.overhead_ms(), 5);

        // Overhead never underflows when stages outweigh the total.
        let skewed = StageTimings {
            decode_ms: 50,
            total_ms: 20,
            ..StageTimings::default()
        };
        assert_eq!(skewed.overhead_ms(), 0);
    }

    #[test]
    fn test_timings_serialize() {
        let timings = StageTimings {
            decode_ms: 1,
            resize_ms: 2,
            removal_ms: 3,
            total_ms: 7,
        };
        let json = serde_json::to_string(&timings).unwrap();
        let back: StageTimings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, timings);
    }
}
