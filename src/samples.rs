//! Built-in sample images
//!
//! A registry of named sample images backed by files on disk, so a caller can
//! offer "try one of these" inputs without an upload. A missing backing file
//! is an informational "no image to process" state, not a hard failure; the
//! front end decides how to present it.

use crate::error::{CutoutError, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Registry of sample name to backing file path
#[derive(Debug, Clone, Default)]
pub struct SampleLibrary {
    entries: BTreeMap<String, PathBuf>,
}

impl SampleLibrary {
    /// Create an empty library
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sample under `name`, backed by `path`
    ///
    /// The file is not touched here; absence only surfaces on [`load`].
    /// Registering the same name twice replaces the earlier path.
    ///
    /// [`load`]: SampleLibrary::load
    pub fn register<S: Into<String>, P: Into<PathBuf>>(&mut self, name: S, path: P) {
        self.entries.insert(name.into(), path.into());
    }

    /// Registered sample names, sorted
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// Backing path of a registered sample
    #[must_use]
    pub fn path_of(&self, name: &str) -> Option<&Path> {
        self.entries.get(name).map(PathBuf::as_path)
    }

    /// Whether the library has no samples
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Load the raw bytes of a sample
    ///
    /// The returned bytes feed the same ingestion boundary as an upload.
    ///
    /// # Errors
    ///
    /// Returns `CutoutError::MissingSample` when the name is unknown or its
    /// backing file does not exist (`is_informational()` is true for both),
    /// and `CutoutError::Io` for other read failures.
    pub fn load(&self, name: &str) -> Result<Vec<u8>> {
        let path = self
            .entries
            .get(name)
            .ok_or_else(|| CutoutError::missing_sample(name))?;

        match std::fs::read(path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::warn!("sample '{}' backing file {} is absent", name, path.display());
                Err(CutoutError::missing_sample(name))
            },
            Err(e) => Err(CutoutError::Io(e)),
        }
    }
}
