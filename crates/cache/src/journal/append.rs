//! Journal append operations

use crate::errors::{CacheError, Result};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Open `path` for appending, creating it and its parent directory
pub fn open_for_append(path: &Path) -> Result<BufWriter<File>> {
    ocflstore_utils::ensure_parent_dir(path)?;
    let file = match OpenOptions::new().create(true).append(true).open(path) {
        Ok(f) => f,
        Err(e) => return Err(CacheError::io(path, "open journal for append", e)),
    };
    Ok(BufWriter::new(file))
}

/// Swap `slot` over to a fresh append handle on `path`
///
/// The old handle is dropped first. If the reopen fails the slot is left
/// empty, so later appends fail instead of writing to a replaced file.
pub fn reopen_for_append(path: &Path, slot: &mut Option<BufWriter<File>>) -> Result<()> {
    *slot = None;
    *slot = Some(open_for_append(path)?);
    Ok(())
}

/// Write one terminated line and flush it
///
/// Holding the writer lock for the whole write is what gives the journal a
/// single total order of events.
pub fn append_line(path: &Path, writer: &Mutex<Option<BufWriter<File>>>, line: &str) -> Result<()> {
    let mut guard = writer.lock();
    let writer = match guard.as_mut() {
        Some(w) => w,
        None => {
            return Err(CacheError::invalid_state(
                "journal",
                format!("append to {} before it was opened", path.display()),
            ));
        }
    };

    match writer.write_all(line.as_bytes()) {
        Ok(()) => {}
        Err(e) => return Err(CacheError::io(path, "write journal entry", e)),
    }
    match writer.write_all(b"\n") {
        Ok(()) => {}
        Err(e) => return Err(CacheError::io(path, "write journal entry", e)),
    }
    match writer.flush() {
        Ok(()) => {}
        Err(e) => return Err(CacheError::io(path, "flush journal", e)),
    }

    Ok(())
}
