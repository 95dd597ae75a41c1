#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]

//! # Cutout
//!
//! A background removal pipeline: submit raw image bytes, get back the decoded
//! original, a copy with the background removed, and the elapsed wall time.
//! The removal algorithm itself (a pretrained matting/segmentation model) is
//! an external collaborator behind the [`MattingBackend`] trait; this crate
//! supplies everything around it.
//!
//! ## Features
//!
//! - **Upload guarding**: oversized uploads are rejected before any decoding
//! - **Bounded resizing**: rasters are downsized to fit a maximum dimension,
//!   preserving aspect ratio, with no resampling for images already in bounds
//! - **Result caching**: byte-identical resubmissions are served from a
//!   bounded LRU cache keyed by content hash, skipping the expensive removal
//!   call entirely
//! - **Bounded removal calls**: the blocking collaborator runs on a worker
//!   thread under a configurable timeout
//! - **Progress milestones**: three advisory, monotonic milestones per request
//! - **PNG export**: the cutout encodes to a transparent PNG for download
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cutout::{MattingBackend, PipelineConfig, RemovalPipeline};
//! use std::sync::Arc;
//!
//! # async fn example(backend: Arc<dyn MattingBackend>, upload: Vec<u8>) -> cutout::Result<()> {
//! let config = PipelineConfig::builder()
//!     .max_dimension(2000)
//!     .build()?;
//! let pipeline = RemovalPipeline::new(config, backend);
//!
//! let outcome = pipeline.process(&upload).await?;
//! println!("done in {:.2}s", outcome.elapsed_seconds());
//! outcome.save_png(cutout::EXPORT_FILE_NAME)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Progress reporting
//!
//! ```rust,no_run
//! use cutout::{LogProgressReporter, PipelineConfig, RemovalPipeline};
//! use std::sync::Arc;
//!
//! # fn example(backend: std::sync::Arc<dyn cutout::MattingBackend>) -> cutout::Result<()> {
//! let _pipeline = RemovalPipeline::with_reporter(
//!     PipelineConfig::default(),
//!     backend,
//!     Arc::new(LogProgressReporter::new(false)),
//! );
//! # Ok(())
//! # }
//! ```

pub mod backends;
pub mod cache;
pub mod config;
pub mod error;
pub mod guard;
pub mod pipeline;
pub mod preprocess;
pub mod progress;
pub mod samples;
pub mod types;

// Internal imports for lib functions
use std::sync::Arc;
use tokio::io::AsyncRead;

// Public API exports
pub use backends::{FailingMatting, FlakyMatting, MattingBackend, MockMatting};
pub use cache::{CacheStats, ContentKey, ResultCache};
pub use config::{
    PipelineConfig, PipelineConfigBuilder, DEFAULT_CACHE_CAPACITY, DEFAULT_MAX_DIMENSION,
    DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_REMOVAL_TIMEOUT,
};
pub use error::{CutoutError, Result};
pub use guard::UploadGuard;
pub use pipeline::RemovalPipeline;
pub use preprocess::Preprocessor;
pub use progress::{
    LogProgressReporter, NoOpProgressReporter, ProcessingStage, ProgressReporter, ProgressTracker,
    ProgressUpdate,
};
pub use samples::SampleLibrary;
pub use types::{ImagePair, RemovalOutcome, StageTimings, EXPORT_FILE_NAME, EXPORT_MIME_TYPE};

/// Remove the background from an image provided as bytes
///
/// One-shot convenience over [`RemovalPipeline`]: constructs a pipeline for a
/// single request. Callers serving repeated requests should hold a pipeline
/// instead, so byte-identical uploads hit its cache.
///
/// # Arguments
///
/// * `image_bytes` - Raw image data as bytes (PNG or JPEG)
/// * `backend` - The matting backend to invoke
/// * `config` - Configuration for the operation
///
/// # Examples
///
/// ```rust,no_run
/// use cutout::{remove_background_from_bytes, PipelineConfig};
///
/// # async fn example(upload: Vec<u8>, backend: std::sync::Arc<dyn cutout::MattingBackend>) -> cutout::Result<()> {
/// let outcome = remove_background_from_bytes(&upload, backend, &PipelineConfig::default()).await?;
/// let _png = outcome.to_png_bytes()?;
/// # Ok(())
/// # }
/// ```
pub async fn remove_background_from_bytes(
    image_bytes: &[u8],
    backend: Arc<dyn MattingBackend>,
    config: &PipelineConfig,
) -> Result<RemovalOutcome> {
    let pipeline = RemovalPipeline::new(config.clone(), backend);
    pipeline.process(image_bytes).await
}

/// Remove the background from an image read from an async stream
///
/// Reads the stream fully into memory, then behaves like
/// [`remove_background_from_bytes`]. The upload guard applies to the total
/// number of bytes read.
///
/// # Examples
///
/// ```rust,no_run
/// use cutout::{remove_background_from_reader, PipelineConfig};
/// use tokio::fs::File;
///
/// # async fn example(backend: std::sync::Arc<dyn cutout::MattingBackend>) -> cutout::Result<()> {
/// let file = File::open("input.jpg").await?;
/// let outcome = remove_background_from_reader(file, backend, &PipelineConfig::default()).await?;
/// outcome.save_png("no-background.png")?;
/// # Ok(())
/// # }
/// ```
pub async fn remove_background_from_reader<R: AsyncRead + Unpin>(
    mut reader: R,
    backend: Arc<dyn MattingBackend>,
    config: &PipelineConfig,
) -> Result<RemovalOutcome> {
    let mut buffer = Vec::new();
    tokio::io::AsyncReadExt::read_to_end(&mut reader, &mut buffer).await?;

    remove_background_from_bytes(&buffer, backend, config).await
}
