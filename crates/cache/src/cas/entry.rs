//! Two-phase streaming writes

use super::ContentAddressableCache;
use crate::errors::{CacheError, Result};
use crate::storage::ByteChannel;
use ocflstore_core::Digest;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Streams content into a private staging file until committed or aborted
///
/// Nothing is visible in the cache before [`commit`](Self::commit). A writer
/// dropped without either call deletes its staging file.
#[derive(Debug)]
pub struct CacheEntryWriter<'a> {
    cache: &'a ContentAddressableCache,
    channel: Option<ByteChannel>,
    staged: PathBuf,
    original_file_name: String,
    finished: bool,
}

impl<'a> CacheEntryWriter<'a> {
    pub(crate) fn create(
        cache: &'a ContentAddressableCache,
        staged: PathBuf,
        original_file_name: &str,
    ) -> Result<Self> {
        let file = match OpenOptions::new().write(true).create_new(true).open(&staged) {
            Ok(f) => f,
            Err(e) => return Err(CacheError::io(&staged, "create staging file", e)),
        };
        Ok(Self {
            cache,
            channel: Some(ByteChannel::new(file, &staged)),
            staged,
            original_file_name: original_file_name.to_string(),
            finished: false,
        })
    }

    /// Channel bound to the staging file
    ///
    /// Returns `None` once the caller has closed it with
    /// [`close_channel`](Self::close_channel).
    pub fn channel(&mut self) -> Option<&mut ByteChannel> {
        self.channel.as_mut()
    }

    /// Close the staging channel; later writes fail
    pub fn close_channel(&mut self) -> Result<()> {
        if let Some(channel) = self.channel.take() {
            match channel.close() {
                Ok(()) => {}
                Err(e) => return Err(CacheError::io(&self.staged, "close staging file", e)),
            }
        }
        Ok(())
    }

    pub fn staging_path(&self) -> &Path {
        &self.staged
    }

    /// Hash the staged content and add it to the cache
    ///
    /// Content that is already cached is discarded and the existing entry
    /// is refreshed; either way the content's digest is returned.
    pub fn commit(mut self) -> Result<Digest> {
        self.finished = true;
        let committed = self.commit_staged();
        if committed.is_err() {
            ocflstore_utils::remove_file_best_effort(&self.staged);
        }
        committed
    }

    fn commit_staged(&mut self) -> Result<Digest> {
        self.close_channel()?;

        let cache = self.cache;
        let digest = cache.calculator.digest_file(&self.staged)?;
        if cache.touch_existing(&digest)? {
            ocflstore_utils::remove_file_best_effort(&self.staged);
            tracing::debug!(digest = %digest, "streamed entry already cached");
            return Ok(digest);
        }

        let size = match std::fs::metadata(&self.staged) {
            Ok(metadata) => metadata.len(),
            Err(e) => return Err(CacheError::io(&self.staged, "stat staging file", e)),
        };
        cache.register(digest, &self.staged, size, &self.original_file_name)
    }

    /// Discard the staged content; the cache is left untouched
    pub fn abort(mut self) -> Result<()> {
        self.finished = true;
        self.channel = None;
        match std::fs::remove_file(&self.staged) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CacheError::io(&self.staged, "delete staging file", e)),
        }
    }
}

impl Write for CacheEntryWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.channel.as_mut() {
            Some(channel) => channel.write(buf),
            None => Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "staging channel already closed",
            )),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.channel.as_mut() {
            Some(channel) => channel.flush(),
            None => Ok(()),
        }
    }
}

impl Drop for CacheEntryWriter<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.channel = None;
            if ocflstore_utils::remove_file_best_effort(&self.staged) {
                tracing::debug!(path = %self.staged.display(), "discarded uncommitted cache entry");
            }
        }
    }
}
