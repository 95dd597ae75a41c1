//! Error types for the background removal pipeline

use instant::Duration;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, CutoutError>;

/// Error types for the background removal pipeline
#[derive(Error, Debug)]
pub enum CutoutError {
    /// Declared upload size exceeds the configured limit; detected before decode
    #[error("upload of {size} bytes exceeds the {limit} byte limit")]
    UploadTooLarge {
        /// Declared byte length of the rejected upload
        size: usize,
        /// Configured maximum upload size in bytes
        limit: usize,
    },

    /// Bytes could not be decoded as a supported raster format
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// The removal collaborator raised an error or returned an unusable result
    #[error("background removal failed: {0}")]
    RemovalFailed(String),

    /// The removal call did not complete within the configured timeout
    #[error("background removal timed out after {0:?}")]
    RemovalTimedOut(Duration),

    /// A selected sample image has no backing file
    #[error("sample '{0}' has no backing file")]
    MissingSample(String),

    /// Invalid configuration or parameters
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Image encoding errors during export
    #[error("image encoding error: {0}")]
    Encode(#[from] image::ImageError),

    /// Input/output errors (sample file reads, result export)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CutoutError {
    /// Create a new invalid image error
    pub fn invalid_image<S: Into<String>>(msg: S) -> Self {
        Self::InvalidImage(msg.into())
    }

    /// Create a new removal failure error, preserving the collaborator's message
    pub fn removal_failed<S: Into<String>>(msg: S) -> Self {
        Self::RemovalFailed(msg.into())
    }

    /// Create a new missing sample error
    pub fn missing_sample<S: Into<String>>(name: S) -> Self {
        Self::MissingSample(name.into())
    }

    /// Create a new invalid configuration error
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Wrap a collaborator error as `RemovalFailed`, keeping removal errors as-is
    ///
    /// The pipeline converts every error that escapes the matting backend into
    /// a removal failure so that callers see a single terminal error kind for
    /// that stage. Errors that already carry removal semantics pass through
    /// unchanged to avoid nesting their messages.
    #[must_use]
    pub fn into_removal_failure(self) -> Self {
        match self {
            err @ (Self::RemovalFailed(_) | Self::RemovalTimedOut(_)) => err,
            other => Self::RemovalFailed(other.to_string()),
        }
    }

    /// Whether this error represents an informational state rather than a failure
    ///
    /// A missing sample means there is simply no image to process; callers
    /// should present it as an empty state, not as an error.
    #[must_use]
    pub fn is_informational(&self) -> bool {
        matches!(self, Self::MissingSample(_))
    }

    /// Short message suitable for direct display to end users
    ///
    /// Removal failures deliberately collapse to a generic message; the
    /// detailed cause stays available through `Display` and the logs.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::UploadTooLarge { .. } => "file too large",
            Self::InvalidImage(_) => "the upload could not be read as a PNG or JPEG image",
            Self::RemovalFailed(_) | Self::RemovalTimedOut(_) => "background removal failed",
            Self::MissingSample(_) => "no image to process",
            Self::InvalidConfig(_) | Self::Encode(_) | Self::Io(_) => "internal error",
        }
    }
}
