//! Temp file storage trait

use super::attributes::FileAttributes;
use super::channel::ByteChannel;
use super::options::{CopyOptions, OpenOptionSet};
use super::physical;
use crate::errors::Result;
use ocflstore_core::VersionedPath;
use std::path::PathBuf;

/// Local storage addressed by versioned paths
///
/// Implementors only decide where a versioned path lives on disk; the
/// default operations are thin wrappers over the file system that create
/// missing parent directories on write.
pub trait TempFileStorage: Send + Sync {
    /// Physical location of `path`
    fn to_physical_path(&self, path: &VersionedPath) -> Result<PathBuf>;

    fn exists(&self, path: &VersionedPath) -> Result<bool> {
        Ok(self.to_physical_path(path)?.exists())
    }

    fn new_byte_channel(&self, path: &VersionedPath, options: OpenOptionSet) -> Result<ByteChannel> {
        let physical = self.to_physical_path(path)?;
        physical::open_channel(&physical, options, &path.to_string())
    }

    fn copy(&self, source: &VersionedPath, target: &VersionedPath, options: CopyOptions) -> Result<()> {
        let from = self.to_physical_path(source)?;
        let to = self.to_physical_path(target)?;
        physical::copy_file(&from, &to, options, &source.to_string()).map(|_| ())
    }

    fn move_file(
        &self,
        source: &VersionedPath,
        target: &VersionedPath,
        options: CopyOptions,
    ) -> Result<()> {
        let from = self.to_physical_path(source)?;
        let to = self.to_physical_path(target)?;
        physical::move_file(&from, &to, options, &source.to_string())
    }

    /// Returns whether something was deleted
    fn delete_if_exists(&self, path: &VersionedPath) -> Result<bool> {
        physical::delete_if_exists(&self.to_physical_path(path)?)
    }

    fn create_directories(&self, path: &VersionedPath) -> Result<()> {
        physical::create_directories(&self.to_physical_path(path)?)
    }

    fn size(&self, path: &VersionedPath) -> Result<u64> {
        Ok(self.read_attributes(path)?.size)
    }

    fn read_attributes(&self, path: &VersionedPath) -> Result<FileAttributes> {
        physical::attributes(&self.to_physical_path(path)?, &path.to_string())
    }
}
