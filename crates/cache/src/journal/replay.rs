//! Journal replay

use super::codec::JournalCodec;
use crate::errors::{CacheError, RecoveryHint, Result};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Replay every event stored in `path`, in file order
///
/// A missing file replays nothing. Blank lines are skipped. The first line
/// that fails to decode aborts the replay with a `Deserialization` error;
/// events before it have already been handed to `rebuild`.
pub fn replay_from_file<E, C, F>(path: &Path, codec: &C, mut rebuild: F) -> Result<u64>
where
    C: JournalCodec<E> + ?Sized,
    F: FnMut(E),
{
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(CacheError::io(path, "open journal for replay", e)),
    };

    let reader = BufReader::new(file);
    let mut replayed = 0u64;

    for (index, line) in reader.lines().enumerate() {
        let line_number = index + 1;
        let line = match line {
            Ok(line) => line,
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                return Err(corrupt_line(path, line_number, String::new(), e.to_string()));
            }
            Err(e) => return Err(CacheError::io(path, "read journal", e)),
        };

        if line.trim().is_empty() {
            continue;
        }

        match codec.decode(&line) {
            Ok(event) => {
                rebuild(event);
                replayed += 1;
            }
            Err(e) => return Err(corrupt_line(path, line_number, line, e.reason)),
        }
    }

    tracing::debug!(path = %path.display(), events = replayed, "journal replayed");
    Ok(replayed)
}

fn corrupt_line(path: &Path, line_number: usize, line: String, reason: String) -> CacheError {
    CacheError::Deserialization {
        path: path.to_path_buf(),
        line_number,
        line,
        reason,
        recovery_hint: RecoveryHint::ClearAndRetry,
    }
}
