//! Configuration for the background removal pipeline

use crate::error::{CutoutError, Result};
use instant::Duration;
use serde::{Deserialize, Serialize};

/// Default maximum upload size: 10 MiB
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Default maximum post-resize dimension on either axis, in pixels
pub const DEFAULT_MAX_DIMENSION: u32 = 2000;

/// Default result cache capacity, in entries
pub const DEFAULT_CACHE_CAPACITY: usize = 32;

/// Default bound on the removal call
pub const DEFAULT_REMOVAL_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration for a [`RemovalPipeline`](crate::pipeline::RemovalPipeline)
///
/// All limits are fixed at construction time; there is no runtime mutation.
/// Use [`PipelineConfig::builder`] for fluent construction with validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Maximum accepted upload size in bytes
    pub max_upload_bytes: usize,

    /// Maximum post-resize dimension on either axis, in pixels
    pub max_dimension: u32,

    /// Maximum number of cached results before least-recently-used eviction
    pub cache_capacity: usize,

    /// Bound on the removal call; `None` waits indefinitely
    pub removal_timeout: Option<Duration>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            max_dimension: DEFAULT_MAX_DIMENSION,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            removal_timeout: Some(DEFAULT_REMOVAL_TIMEOUT),
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration builder
    #[must_use]
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::new()
    }
}

/// Builder for [`PipelineConfig`]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
        }
    }

    /// Set the maximum accepted upload size in bytes
    #[must_use]
    pub fn max_upload_bytes(mut self, bytes: usize) -> Self {
        self.config.max_upload_bytes = bytes;
        self
    }

    /// Set the maximum post-resize dimension on either axis
    #[must_use]
    pub fn max_dimension(mut self, pixels: u32) -> Self {
        self.config.max_dimension = pixels;
        self
    }

    /// Set the result cache capacity in entries
    #[must_use]
    pub fn cache_capacity(mut self, entries: usize) -> Self {
        self.config.cache_capacity = entries;
        self
    }

    /// Bound the removal call to the given duration
    #[must_use]
    pub fn removal_timeout(mut self, timeout: Duration) -> Self {
        self.config.removal_timeout = Some(timeout);
        self
    }

    /// Wait indefinitely on the removal call
    #[must_use]
    pub fn no_removal_timeout(mut self) -> Self {
        self.config.removal_timeout = None;
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    ///
    /// Returns `CutoutError::InvalidConfig` for:
    /// - a zero upload limit
    /// - a zero maximum dimension
    /// - a zero cache capacity
    /// - a zero-duration removal timeout
    pub fn build(self) -> Result<PipelineConfig> {
        if self.config.max_upload_bytes == 0 {
            return Err(CutoutError::invalid_config(
                "max upload size must be at least 1 byte",
            ));
        }
        if self.config.max_dimension == 0 {
            return Err(CutoutError::invalid_config(
                "max dimension must be at least 1 pixel",
            ));
        }
        if self.config.cache_capacity == 0 {
            return Err(CutoutError::invalid_config(
                "cache capacity must be at least 1 entry",
            ));
        }
        if self.config.removal_timeout == Some(Duration::ZERO) {
            return Err(CutoutError::invalid_config(
                "removal timeout must be non-zero",
            ));
        }

        Ok(self.config)
    }
}

impl Default for PipelineConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let config = PipelineConfig::default();
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
        assert_eq!(config.max_dimension, 2000);
        assert_eq!(config.cache_capacity, DEFAULT_CACHE_CAPACITY);
        assert_eq!(config.removal_timeout, Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_builder_chain() {
        let config = PipelineConfig::builder()
            .max_upload_bytes(1024)
            .max_dimension(512)
            .cache_capacity(4)
            .removal_timeout(Duration::from_secs(5))
            .build()
            .unwrap();

        assert_eq!(config.max_upload_bytes, 1024);
        assert_eq!(config.max_dimension, 512);
        assert_eq!(config.cache_capacity, 4);
        assert_eq!(config.removal_timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_builder_rejects_zero_limits() {
        assert!(PipelineConfig::builder().max_upload_bytes(0).build().is_err());
        assert!(PipelineConfig::builder().max_dimension(0).build().is_err());
        assert!(PipelineConfig::builder().cache_capacity(0).build().is_err());
        assert!(PipelineConfig::builder()
            .removal_timeout(Duration::ZERO)
            .build()
            .is_err());
    }

    #[test]
    fn test_no_removal_timeout() {
        let config = PipelineConfig::builder().no_removal_timeout().build().unwrap();
        assert_eq!(config.removal_timeout, None);
    }

    #[test]
    fn test_config_serde_round_trip() {
        let config = PipelineConfig::builder()
            .max_dimension(1024)
            .build()
            .unwrap();
        let json = serde_json::to_string(&config).unwrap();
        let back: PipelineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
