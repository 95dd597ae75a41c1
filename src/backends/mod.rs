//! Matting backend abstraction
//!
//! The background-removal algorithm is an external collaborator behind a
//! stable call contract; this crate orchestrates it but never reimplements it.

pub mod mock;

pub use mock::{FailingMatting, FlakyMatting, MockMatting};

use crate::error::Result;
use image::{DynamicImage, RgbaImage};

/// Trait for background removal collaborators
///
/// Implementations take a decoded raster and return a raster of identical
/// pixel dimensions whose alpha channel isolates foreground content. The call
/// is treated as long-running, synchronous, and un-cancelable once started;
/// the pipeline offloads it to a blocking worker and bounds the wait.
///
/// Implementations must be `Send + Sync`: one backend instance serves every
/// request of a pipeline, potentially from concurrent tasks.
pub trait MattingBackend: Send + Sync {
    /// Short name for logs and diagnostics
    fn name(&self) -> &str;

    /// Segment `image` into foreground and background
    ///
    /// # Errors
    /// - Model inference failures
    /// - Resource exhaustion inside the collaborator
    ///
    /// Any error returned here is converted by the pipeline into a removal
    /// failure; the message is preserved for diagnostics.
    fn remove_background(&self, image: &DynamicImage) -> Result<RgbaImage>;
}
