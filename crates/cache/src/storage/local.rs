//! Plain temp file storage below a root directory

use super::traits::TempFileStorage;
use crate::errors::{CacheError, Result};
use ocflstore_core::VersionedPath;
use std::path::{Path, PathBuf};

/// Stores `owner/version/relative-path` directly below `root`
#[derive(Debug, Clone)]
pub struct LocalTempFileStorage {
    root: PathBuf,
}

impl LocalTempFileStorage {
    /// Create the storage, creating `root` if needed
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        match std::fs::create_dir_all(&root) {
            Ok(()) => {}
            Err(e) => return Err(CacheError::io(&root, "create storage root", e)),
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl TempFileStorage for LocalTempFileStorage {
    fn to_physical_path(&self, path: &VersionedPath) -> Result<PathBuf> {
        Ok(self.root.join(path.to_relative_physical()))
    }
}
