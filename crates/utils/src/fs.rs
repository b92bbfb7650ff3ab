//! File system helpers shared by the storage tiers

use ocflstore_core::{Error, Result, IO_BUFFER_SIZE};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

/// Create the parent directory of `path` if it has one
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| Error::file_system(parent, "create parent directory", e))?;
    }
    Ok(())
}

/// Recursively delete a directory; a missing directory is not an error
///
/// Returns whether anything was removed.
pub fn remove_dir_all_if_exists(path: &Path) -> Result<bool> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::file_system(path, "remove directory tree", e)),
    }
}

/// Delete a file, logging instead of failing
///
/// Used where an index is authoritative and the file system may lag behind
/// it; a file that cannot be removed simply becomes an orphan.
pub fn remove_file_best_effort(path: &Path) -> bool {
    match fs::remove_file(path) {
        Ok(()) => true,
        Err(e) if e.kind() == io::ErrorKind::NotFound => false,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to delete file, leaving orphan");
            false
        }
    }
}

/// Stream-copy `source` into a freshly created `target`
///
/// Unlike a rename this never touches the source, and unlike `fs::copy` it
/// does not carry permissions over from the source.
pub fn stream_copy(source: &Path, target: &Path, replace_existing: bool) -> io::Result<u64> {
    let input = File::open(source)?;
    let mut options = OpenOptions::new();
    options.write(true);
    if replace_existing {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }
    let output = options.open(target)?;

    let mut reader = BufReader::with_capacity(IO_BUFFER_SIZE, input);
    let mut writer = BufWriter::with_capacity(IO_BUFFER_SIZE, output);
    let copied = io::copy(&mut reader, &mut writer)?;
    writer.flush()?;
    Ok(copied)
}

/// A regular file found while scanning a directory tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedFile {
    pub path: PathBuf,
    pub size: u64,
    pub modified: SystemTime,
}

/// All regular files below `root`, least recently modified first
///
/// Unreadable entries are logged and skipped.
pub fn files_by_modification(root: &Path) -> Vec<ScannedFile> {
    let mut files: Vec<ScannedFile> = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(root = %root.display(), error = %e, "skipping unreadable entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| {
            let metadata = entry.metadata().ok()?;
            Some(ScannedFile {
                path: entry.into_path(),
                size: metadata.len(),
                modified: metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
            })
        })
        .collect();

    files.sort_by(|a, b| a.modified.cmp(&b.modified).then_with(|| a.path.cmp(&b.path)));
    files
}
