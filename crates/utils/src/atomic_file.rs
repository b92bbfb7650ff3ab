//! Atomic file replacement so readers never observe a half-written file

use ocflstore_core::{Error, Result};
use std::fs::{self, File, OpenOptions};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Stream content produced by `fill` into `path` atomically
///
/// The temporary file lives next to the target so the final rename never
/// crosses a file system boundary.
pub fn write_atomic_with<F>(path: &Path, fill: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> std::io::Result<()>,
{
    let parent = path.parent().ok_or_else(|| {
        Error::configuration(format!(
            "Invalid file path: no parent directory for {}",
            path.display()
        ))
    })?;

    fs::create_dir_all(parent)
        .map_err(|e| Error::file_system(parent, "create parent directory", e))?;

    let temp_path = temp_sibling(path);

    let result = (|| -> Result<()> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&temp_path)
            .map_err(|e| Error::file_system(&temp_path, "create temporary file", e))?;

        let mut writer = BufWriter::new(file);
        fill(&mut writer)
            .map_err(|e| Error::file_system(&temp_path, "write to temporary file", e))?;

        let file = writer.into_inner().map_err(|e| {
            Error::file_system(&temp_path, "flush temporary file", e.into_error())
        })?;
        file.sync_all()
            .map_err(|e| Error::file_system(&temp_path, "sync temporary file", e))?;

        Ok(())
    })();

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
        return result;
    }

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        Error::file_system(path, "atomic rename", e)
    })?;

    Ok(())
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.{}.tmp", Uuid::new_v4()))
}
