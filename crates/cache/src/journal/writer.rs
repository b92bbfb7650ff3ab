//! Journal handle

use super::append::{append_line, open_for_append};
use super::codec::JournalCodec;
use super::compaction::compact_into;
use super::replay::replay_from_file;
use crate::errors::{CacheError, Result};
use parking_lot::Mutex;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Append-only event journal backed by a single file
pub struct Journal<E, C> {
    /// Path to the journal file
    path: PathBuf,
    codec: C,
    /// Append handle, `None` until opened and after close
    writer: Mutex<Option<BufWriter<File>>>,
    /// Events appended since the last open or compaction
    appended: AtomicU64,
    _event: PhantomData<fn() -> E>,
}

impl<E, C> Journal<E, C>
where
    C: JournalCodec<E>,
{
    /// Create a closed journal for `path`; nothing touches the disk yet
    pub fn new(path: impl Into<PathBuf>, codec: C) -> Self {
        Self {
            path: path.into(),
            codec,
            writer: Mutex::new(None),
            appended: AtomicU64::new(0),
            _event: PhantomData,
        }
    }

    /// Replay existing events into `rebuild`, then open for append
    ///
    /// Returns the number of replayed events. A corrupt line is returned as
    /// a `Deserialization` error and leaves the journal closed.
    pub fn open<F>(&self, rebuild: F) -> Result<u64>
    where
        F: FnMut(E),
    {
        let mut guard = self.writer.lock();
        if guard.is_some() {
            return Err(CacheError::invalid_state(
                "journal",
                format!("{} is already open", self.path.display()),
            ));
        }

        let replayed = replay_from_file(&self.path, &self.codec, rebuild)?;
        *guard = Some(open_for_append(&self.path)?);
        self.appended.store(0, Ordering::Release);
        Ok(replayed)
    }

    /// Durably record one event
    pub fn append(&self, event: &E) -> Result<()> {
        let line = self.codec.encode(event);
        append_line(&self.path, &self.writer, &line)?;
        self.appended.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }

    /// Rewrite the journal so it holds exactly the events of `snapshot`
    pub fn compact<I>(&self, snapshot: impl FnOnce() -> I) -> Result<u64>
    where
        I: IntoIterator<Item = E>,
    {
        let written = compact_into(&self.path, &self.codec, &self.writer, snapshot)?;
        self.appended.store(0, Ordering::Release);
        Ok(written)
    }

    /// Flush and release the append handle; closing twice is harmless
    pub fn close(&self) -> Result<()> {
        let taken = self.writer.lock().take();
        if let Some(mut writer) = taken {
            match writer.flush() {
                Ok(()) => {}
                Err(e) => return Err(CacheError::io(&self.path, "flush journal", e)),
            }
        }
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.writer.lock().is_some()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries_since_compaction(&self) -> u64 {
        self.appended.load(Ordering::Acquire)
    }
}

impl<E, C> Drop for Journal<E, C> {
    fn drop(&mut self) {
        if let Some(writer) = self.writer.get_mut().as_mut() {
            if let Err(e) = writer.flush() {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to flush journal on drop");
            }
        }
    }
}

impl<E, C> std::fmt::Debug for Journal<E, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Journal")
            .field("path", &self.path)
            .field("appended", &self.appended.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}
