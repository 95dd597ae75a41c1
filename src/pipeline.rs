//! Background removal pipeline
//!
//! Orchestrates one request end to end: guard → decode → cache lookup →
//! resize → removal call → cache insert, with wall-clock timing and the three
//! advisory progress milestones. Failures are terminal for the request and
//! never write to the cache.

use crate::{
    backends::MattingBackend,
    cache::{CacheStats, ResultCache},
    config::PipelineConfig,
    error::{CutoutError, Result},
    guard::UploadGuard,
    preprocess::Preprocessor,
    progress::{NoOpProgressReporter, ProcessingStage, ProgressReporter, ProgressTracker},
    types::{ImagePair, RemovalOutcome, StageTimings},
};
use image::GenericImageView;
use instant::Instant;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Background removal pipeline
///
/// Holds the configuration, the matting backend, the result cache, and the
/// progress reporter. One instance serves many requests; it is `Send + Sync`
/// and callable from concurrent tasks, with the cache as the only shared
/// mutable state.
pub struct RemovalPipeline {
    config: PipelineConfig,
    guard: UploadGuard,
    backend: Arc<dyn MattingBackend>,
    cache: ResultCache,
    reporter: Arc<dyn ProgressReporter>,
}

impl RemovalPipeline {
    /// Create a pipeline with the given configuration and backend
    ///
    /// Progress updates are discarded; use [`with_reporter`] to observe them.
    ///
    /// [`with_reporter`]: RemovalPipeline::with_reporter
    #[must_use]
    pub fn new(config: PipelineConfig, backend: Arc<dyn MattingBackend>) -> Self {
        Self::with_reporter(config, backend, Arc::new(NoOpProgressReporter))
    }

    /// Create a pipeline reporting milestones through `reporter`
    #[must_use]
    pub fn with_reporter(
        config: PipelineConfig,
        backend: Arc<dyn MattingBackend>,
        reporter: Arc<dyn ProgressReporter>,
    ) -> Self {
        let guard = UploadGuard::new(config.max_upload_bytes);
        let cache = ResultCache::new(config.cache_capacity);
        Self {
            config,
            guard,
            backend,
            cache,
            reporter,
        }
    }

    /// The pipeline configuration
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Snapshot of the result cache statistics
    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Process one upload
    ///
    /// Runs the full algorithm: size guard, decode, cache lookup by content
    /// identity, bounded resize, the offloaded removal call, and the cache
    /// insert. Returns the decoded original, the cutout, and the measured
    /// elapsed time. Byte-identical resubmissions are served from the cache
    /// with a near-zero elapsed time and no recomputation.
    ///
    /// # Errors
    ///
    /// - `CutoutError::UploadTooLarge` before any decode attempt
    /// - `CutoutError::InvalidImage` for undecodable or zero-dimension input
    /// - `CutoutError::RemovalFailed` when the collaborator errors or returns
    ///   a raster of the wrong dimensions
    /// - `CutoutError::RemovalTimedOut` when the bounded wait expires
    ///
    /// No retries are performed and no partial cache entry is written on any
    /// failure path.
    #[instrument(skip(self, bytes), fields(backend = %self.backend.name(), len = bytes.len()))]
    pub async fn process(&self, bytes: &[u8]) -> Result<RemovalOutcome> {
        let mut tracker = ProgressTracker::new(Arc::clone(&self.reporter));
        match self.run(bytes, &mut tracker).await {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                tracker.report_error(&err.to_string());
                Err(err)
            },
        }
    }

    async fn run(&self, bytes: &[u8], tracker: &mut ProgressTracker) -> Result<RemovalOutcome> {
        let total_start = Instant::now();
        let mut timings = StageTimings::default();

        // Size check happens before any decode work.
        self.guard.check(bytes.len())?;
        tracker.report_stage(ProcessingStage::Started);

        let decode_start = Instant::now();
        let original = image::load_from_memory(bytes)
            .map_err(|e| CutoutError::invalid_image(e.to_string()))?;
        let (width, height) = original.dimensions();
        if width == 0 || height == 0 {
            return Err(CutoutError::invalid_image(
                "decoded raster has zero dimension",
            ));
        }
        timings.decode_ms = decode_start.elapsed().as_millis() as u64;
        debug!(width, height, "decoded upload");

        let key = ResultCache::content_key(bytes);
        if let Some(pair) = self.cache.get(&key) {
            tracker.report_stage(ProcessingStage::ResultsReady);
            tracker.report_stage(ProcessingStage::Completed);
            let elapsed = total_start.elapsed();
            timings.total_ms = elapsed.as_millis() as u64;
            info!(elapsed_ms = timings.total_ms, "served from cache");
            return Ok(RemovalOutcome::new(pair, elapsed, true, timings));
        }

        let resize_start = Instant::now();
        let resized = Preprocessor::fit_within(original.clone(), self.config.max_dimension)?;
        let resized_dimensions = resized.dimensions();
        timings.resize_ms = resize_start.elapsed().as_millis() as u64;

        let removal_start = Instant::now();
        let cutout = self.invoke_backend(resized).await?;
        timings.removal_ms = removal_start.elapsed().as_millis() as u64;

        if cutout.dimensions() != resized_dimensions {
            return Err(CutoutError::removal_failed(format!(
                "backend '{}' returned {}x{} for {}x{} input",
                self.backend.name(),
                cutout.width(),
                cutout.height(),
                resized_dimensions.0,
                resized_dimensions.1,
            )));
        }
        tracker.report_stage(ProcessingStage::ResultsReady);

        let pair = Arc::new(ImagePair { original, cutout });
        self.cache.insert(key, Arc::clone(&pair));

        tracker.report_stage(ProcessingStage::Completed);
        let elapsed = total_start.elapsed();
        timings.total_ms = elapsed.as_millis() as u64;
        info!(
            elapsed_ms = timings.total_ms,
            removal_ms = timings.removal_ms,
            "background removed"
        );

        Ok(RemovalOutcome::new(pair, elapsed, false, timings))
    }

    /// Run the removal call on a blocking worker, bounded by the configured
    /// timeout
    ///
    /// The collaborator call cannot be interrupted once started; on timeout
    /// the worker is detached and its eventual result discarded.
    async fn invoke_backend(&self, image: image::DynamicImage) -> Result<image::RgbaImage> {
        let backend = Arc::clone(&self.backend);
        let worker = tokio::task::spawn_blocking(move || backend.remove_background(&image));

        let joined = match self.config.removal_timeout {
            Some(limit) => tokio::time::timeout(limit, worker)
                .await
                .map_err(|_| CutoutError::RemovalTimedOut(limit))?,
            None => worker.await,
        };

        match joined {
            Ok(result) => result.map_err(CutoutError::into_removal_failure),
            Err(join_err) => Err(CutoutError::removal_failed(format!(
                "removal worker terminated abnormally: {join_err}"
            ))),
        }
    }
}

impl std::fmt::Debug for RemovalPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemovalPipeline")
            .field("config", &self.config)
            .field("backend", &self.backend.name())
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::MockMatting;
    use image::{ImageBuffer, Rgb};
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img: ImageBuffer<Rgb<u8>, Vec<u8>> =
            ImageBuffer::from_pixel(width, height, Rgb([230, 230, 230]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn pipeline_with_mock() -> (RemovalPipeline, Arc<MockMatting>) {
        let backend = Arc::new(MockMatting::new());
        let pipeline = RemovalPipeline::new(
            PipelineConfig::default(),
            Arc::clone(&backend) as Arc<dyn MattingBackend>,
        );
        (pipeline, backend)
    }

    #[tokio::test]
    async fn test_process_returns_original_and_cutout() {
        let (pipeline, _) = pipeline_with_mock();
        let outcome = pipeline.process(&png_bytes(64, 48)).await.unwrap();

        assert_eq!(outcome.original().dimensions(), (64, 48));
        assert_eq!(outcome.cutout_dimensions(), (64, 48));
        assert!(!outcome.cache_hit);
    }

    #[tokio::test]
    async fn test_invalid_bytes_never_reach_backend() {
        let (pipeline, backend) = pipeline_with_mock();
        let err = pipeline.process(b"definitely not an image").await.unwrap_err();

        assert!(matches!(err, CutoutError::InvalidImage(_)));
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_cache_stats_through_pipeline() {
        let (pipeline, _) = pipeline_with_mock();
        let bytes = png_bytes(32, 32);

        pipeline.process(&bytes).await.unwrap();
        pipeline.process(&bytes).await.unwrap();

        let stats = pipeline.cache_stats();
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }
}
