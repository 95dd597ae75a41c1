//! Mock matting backend for testing and debugging

use crate::backends::MattingBackend;
use crate::error::{CutoutError, Result};
use image::{DynamicImage, RgbaImage};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Mock backend for testing and debugging purposes
///
/// Produces a luminance-keyed alpha channel: bright pixels are kept as
/// foreground, dark pixels become transparent. Deterministic, model-free, and
/// cheap, so tests can exercise the full pipeline without real inference.
/// Every invocation is counted and its input dimensions recorded, which lets
/// tests assert that the collaborator was (or was not) reached and what it
/// received.
pub struct MockMatting {
    threshold: u8,
    calls: AtomicUsize,
    seen_dimensions: Mutex<Vec<(u32, u32)>>,
}

impl MockMatting {
    /// Create a mock keeping pixels with luminance above 127
    #[must_use]
    pub fn new() -> Self {
        Self::with_threshold(127)
    }

    /// Create a mock keeping pixels with luminance above `threshold`
    #[must_use]
    pub fn with_threshold(threshold: u8) -> Self {
        Self {
            threshold,
            calls: AtomicUsize::new(0),
            seen_dimensions: Mutex::new(Vec::new()),
        }
    }

    /// Number of times `remove_background` has been invoked
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Input dimensions observed by each invocation, in call order
    #[must_use]
    pub fn seen_dimensions(&self) -> Vec<(u32, u32)> {
        self.seen_dimensions.lock().unwrap().clone()
    }
}

impl Default for MockMatting {
    fn default() -> Self {
        Self::new()
    }
}

impl MattingBackend for MockMatting {
    fn name(&self) -> &str {
        "mock"
    }

    fn remove_background(&self, image: &DynamicImage) -> Result<RgbaImage> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen_dimensions
            .lock()
            .unwrap()
            .push((image.width(), image.height()));

        let rgba = image.to_rgba8();
        let mut result = RgbaImage::new(rgba.width(), rgba.height());

        for (x, y, pixel) in rgba.enumerate_pixels() {
            // Integer Rec.601 luma approximation as mock segmentation.
            let luma = (u32::from(pixel[0]) * 299
                + u32::from(pixel[1]) * 587
                + u32::from(pixel[2]) * 114)
                / 1000;

            let alpha = if luma > u32::from(self.threshold) {
                pixel[3]
            } else {
                0
            };
            result.put_pixel(x, y, image::Rgba([pixel[0], pixel[1], pixel[2], alpha]));
        }

        Ok(result)
    }
}

/// Backend that always fails, for exercising removal failure paths
pub struct FailingMatting {
    message: String,
    calls: AtomicUsize,
}

impl FailingMatting {
    /// Create a backend failing with the given diagnostic message
    #[must_use]
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self {
            message: message.into(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of times `remove_background` has been invoked
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl MattingBackend for FailingMatting {
    fn name(&self) -> &str {
        "failing"
    }

    fn remove_background(&self, _image: &DynamicImage) -> Result<RgbaImage> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(CutoutError::removal_failed(self.message.clone()))
    }
}

/// Backend that fails on its first N calls, then delegates to [`MockMatting`]
///
/// Used to verify that failed attempts never poison the cache: the retry must
/// re-run the full pipeline.
pub struct FlakyMatting {
    failures_remaining: AtomicUsize,
    inner: MockMatting,
}

impl FlakyMatting {
    /// Create a backend that fails its first `failures` calls
    #[must_use]
    pub fn new(failures: usize) -> Self {
        Self {
            failures_remaining: AtomicUsize::new(failures),
            inner: MockMatting::new(),
        }
    }

    /// Number of times `remove_background` has been invoked
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.inner.call_count()
    }
}

impl MattingBackend for FlakyMatting {
    fn name(&self) -> &str {
        "flaky"
    }

    fn remove_background(&self, image: &DynamicImage) -> Result<RgbaImage> {
        let result = self.inner.remove_background(image);
        let remaining = self.failures_remaining.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures_remaining.store(remaining - 1, Ordering::SeqCst);
            return Err(CutoutError::removal_failed("transient matting failure"));
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    fn half_bright_image() -> DynamicImage {
        // Left half bright, right half dark.
        let img: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::from_fn(10, 4, |x, _| {
            if x < 5 {
                Rgb([250, 250, 250])
            } else {
                Rgb([5, 5, 5])
            }
        });
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn test_mock_preserves_dimensions() {
        let backend = MockMatting::new();
        let result = backend.remove_background(&half_bright_image()).unwrap();
        assert_eq!(result.dimensions(), (10, 4));
    }

    #[test]
    fn test_mock_keys_alpha_by_luminance() {
        let backend = MockMatting::new();
        let result = backend.remove_background(&half_bright_image()).unwrap();

        assert_eq!(result.get_pixel(0, 0)[3], 255);
        assert_eq!(result.get_pixel(9, 0)[3], 0);
    }

    #[test]
    fn test_mock_counts_calls_and_dimensions() {
        let backend = MockMatting::new();
        assert_eq!(backend.call_count(), 0);

        backend.remove_background(&half_bright_image()).unwrap();
        backend.remove_background(&half_bright_image()).unwrap();

        assert_eq!(backend.call_count(), 2);
        assert_eq!(backend.seen_dimensions(), vec![(10, 4), (10, 4)]);
    }

    #[test]
    fn test_failing_backend_preserves_message() {
        let backend = FailingMatting::new("gpu fell off the bus");
        let err = backend.remove_background(&half_bright_image()).unwrap_err();
        assert!(err.to_string().contains("gpu fell off the bus"));
        assert_eq!(backend.call_count(), 1);
    }

    #[test]
    fn test_flaky_backend_recovers() {
        let backend = FlakyMatting::new(1);
        let image = half_bright_image();

        assert!(backend.remove_background(&image).is_err());
        assert!(backend.remove_background(&image).is_ok());
        assert_eq!(backend.call_count(), 2);
    }
}
