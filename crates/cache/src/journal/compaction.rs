//! Journal compaction

use super::append::reopen_for_append;
use super::codec::JournalCodec;
use crate::errors::{CacheError, Result};
use parking_lot::Mutex;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Replace the journal with `snapshot`, then reopen it for append
///
/// The writer lock is held throughout, so no append can land in the old
/// file after the snapshot was taken. The new content is written to a
/// temporary sibling and renamed over the journal.
pub fn compact_into<E, C, I>(
    path: &Path,
    codec: &C,
    writer: &Mutex<Option<BufWriter<File>>>,
    snapshot: impl FnOnce() -> I,
) -> Result<u64>
where
    C: JournalCodec<E> + ?Sized,
    I: IntoIterator<Item = E>,
{
    let mut guard = writer.lock();
    let current = match guard.as_mut() {
        Some(w) => w,
        None => {
            return Err(CacheError::invalid_state(
                "journal",
                format!("compact {} before it was opened", path.display()),
            ));
        }
    };
    match current.flush() {
        Ok(()) => {}
        Err(e) => return Err(CacheError::io(path, "flush journal", e)),
    }

    let lines: Vec<String> = snapshot().into_iter().map(|e| codec.encode(&e)).collect();
    let written = lines.len() as u64;

    // The old handle stays usable if the rewrite fails
    ocflstore_utils::write_atomic_with(path, |out| {
        for line in &lines {
            out.write_all(line.as_bytes())?;
            out.write_all(b"\n")?;
        }
        Ok(())
    })?;

    reopen_for_append(path, &mut guard)?;

    tracing::info!(path = %path.display(), events = written, "journal compacted");
    Ok(written)
}
