//! Physical file operations shared by every storage tier
//!
//! These map I/O failures onto `CacheError`, turning a missing source into
//! `NotFound` keyed by the logical address the caller used.

use super::attributes::FileAttributes;
use super::channel::ByteChannel;
use super::options::{CopyOptions, OpenOptionSet};
use crate::errors::{CacheError, Result};
use std::fs;
use std::io;
use std::path::Path;

pub(crate) fn open_channel(physical: &Path, options: OpenOptionSet, key: &str) -> Result<ByteChannel> {
    if options.is_writing() {
        ocflstore_utils::ensure_parent_dir(physical)?;
    }
    match options.to_open_options().open(physical) {
        Ok(file) => Ok(ByteChannel::new(file, physical)),
        Err(e) => Err(CacheError::io_or_not_found(physical, "open byte channel", e, key)),
    }
}

pub(crate) fn copy_file(source: &Path, target: &Path, options: CopyOptions, key: &str) -> Result<u64> {
    ocflstore_utils::ensure_parent_dir(target)?;
    match ocflstore_utils::stream_copy(source, target, options.replace_existing) {
        Ok(copied) => Ok(copied),
        Err(e) if e.kind() == io::ErrorKind::NotFound && !source.exists() => {
            Err(CacheError::not_found(key))
        }
        Err(e) => Err(CacheError::io(target, "copy file", e)),
    }
}

pub(crate) fn move_file(source: &Path, target: &Path, options: CopyOptions, key: &str) -> Result<()> {
    if !source.exists() {
        return Err(CacheError::not_found(key));
    }
    if !options.replace_existing && target.exists() {
        return Err(CacheError::io(
            target,
            "move file",
            io::Error::new(io::ErrorKind::AlreadyExists, "target already exists"),
        ));
    }
    ocflstore_utils::ensure_parent_dir(target)?;
    match fs::rename(source, target) {
        Ok(()) => Ok(()),
        Err(e) => Err(CacheError::io_or_not_found(source, "move file", e, key)),
    }
}

/// Delete a file or an empty directory; absence is not an error
pub(crate) fn delete_if_exists(physical: &Path) -> Result<bool> {
    let metadata = match fs::symlink_metadata(physical) {
        Ok(m) => m,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(CacheError::io(physical, "stat file", e)),
    };
    let removed = if metadata.is_dir() {
        fs::remove_dir(physical)
    } else {
        fs::remove_file(physical)
    };
    match removed {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(CacheError::io(physical, "delete file", e)),
    }
}

pub(crate) fn create_directories(physical: &Path) -> Result<()> {
    match fs::create_dir_all(physical) {
        Ok(()) => Ok(()),
        Err(e) => Err(CacheError::io(physical, "create directories", e)),
    }
}

pub(crate) fn attributes(physical: &Path, key: &str) -> Result<FileAttributes> {
    match fs::metadata(physical) {
        Ok(metadata) => Ok(FileAttributes::from(&metadata)),
        Err(e) => Err(CacheError::io_or_not_found(physical, "read attributes", e, key)),
    }
}
