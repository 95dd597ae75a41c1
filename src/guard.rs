//! Upload size guard
//!
//! Rejects oversized uploads before any bytes are decoded, so clearly invalid
//! input never reaches the image decoder.

use crate::error::{CutoutError, Result};

/// Pure size predicate applied at the ingestion boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadGuard {
    limit: usize,
}

impl UploadGuard {
    /// Create a guard with the given upload limit in bytes
    #[must_use]
    pub const fn new(limit: usize) -> Self {
        Self { limit }
    }

    /// The configured upload limit in bytes
    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }

    /// Accept or reject an upload by its declared byte length
    ///
    /// Accepts iff `declared_len <= limit`. No side effects.
    ///
    /// # Errors
    ///
    /// Returns `CutoutError::UploadTooLarge` when the declared length exceeds
    /// the limit.
    pub fn check(&self, declared_len: usize) -> Result<()> {
        if declared_len <= self.limit {
            Ok(())
        } else {
            Err(CutoutError::UploadTooLarge {
                size: declared_len,
                limit: self.limit,
            })
        }
    }
}
