//! Reads and writes of cached content

use super::entry::CacheEntryWriter;
use super::events::CacheEvent;
use super::{content_type, ContentAddressableCache, STAGING_PREFIX};
use crate::errors::{CacheError, Result};
use crate::storage::{ByteChannel, CopyOptions};
use ocflstore_core::{Digest, FileInfo};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

impl ContentAddressableCache {
    pub fn exists(&self, digest: &Digest) -> bool {
        self.index.contains(digest)
    }

    /// Cache `bytes`, returning their digest
    ///
    /// Identical content is stored once no matter the name; a hit only
    /// refreshes the entry's recency.
    pub fn write(&self, original_file_name: &str, bytes: &[u8]) -> Result<Digest> {
        let digest = self.calculator.digest_bytes(bytes);
        if self.touch_existing(&digest)? {
            tracing::debug!(digest = %digest, "write hit");
            return Ok(digest);
        }

        let staged = self.staging_path();
        let written = (|| -> std::io::Result<()> {
            let mut file = OpenOptions::new().write(true).create_new(true).open(&staged)?;
            file.write_all(bytes)?;
            file.sync_all()
        })();
        if let Err(e) = written {
            ocflstore_utils::remove_file_best_effort(&staged);
            return Err(CacheError::io(&staged, "write staging file", e));
        }

        self.register(digest, &staged, bytes.len() as u64, original_file_name)
    }

    /// Cache a copy of the file at `source`
    ///
    /// The file is copied into staging as a stream and the staged copy is
    /// hashed, so the stored bytes always match their digest even if the
    /// source changes meanwhile. The source file name is kept for content
    /// type probing.
    pub fn import_file(&self, source: &Path) -> Result<Digest> {
        let staged = self.staging_path();
        let size = match ocflstore_utils::stream_copy(source, &staged, false) {
            Ok(size) => size,
            Err(e) => {
                ocflstore_utils::remove_file_best_effort(&staged);
                return Err(CacheError::io_or_not_found(
                    source,
                    "import file",
                    e,
                    source.display().to_string(),
                ));
            }
        };

        let digest = match self.calculator.digest_file(&staged) {
            Ok(digest) => digest,
            Err(e) => {
                ocflstore_utils::remove_file_best_effort(&staged);
                return Err(e.into());
            }
        };
        match self.touch_existing(&digest) {
            Ok(false) => {}
            hit => {
                ocflstore_utils::remove_file_best_effort(&staged);
                hit?;
                tracing::debug!(digest = %digest, source = %source.display(), "import hit");
                return Ok(digest);
            }
        }

        let name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.register(digest, &staged, size, &name)
    }

    /// Open the cached content of `digest` for reading
    pub fn read_byte_channel(&self, digest: &Digest) -> Result<ByteChannel> {
        let physical = self.require(digest)?;
        let file = match File::open(&physical) {
            Ok(f) => f,
            Err(e) => {
                self.stats.record_miss();
                return Err(CacheError::io_or_not_found(
                    &physical,
                    "open cached file",
                    e,
                    digest.to_string(),
                ));
            }
        };
        self.touch_existing(digest)?;
        self.stats.record_hit();
        Ok(ByteChannel::new(file, physical))
    }

    /// Copy the cached content of `digest` to `target`
    pub fn export_file(&self, digest: &Digest, target: &Path, options: CopyOptions) -> Result<u64> {
        let physical = self.require(digest)?;
        ocflstore_utils::ensure_parent_dir(target)?;
        let copied = match ocflstore_utils::stream_copy(&physical, target, options.replace_existing)
        {
            Ok(copied) => copied,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && !physical.exists() => {
                self.stats.record_miss();
                return Err(CacheError::not_found(digest.to_string()));
            }
            Err(e) => return Err(CacheError::io(target, "export cached file", e)),
        };
        self.touch_existing(digest)?;
        self.stats.record_hit();
        Ok(copied)
    }

    /// Guess the MIME type of a cached file
    ///
    /// The original file name's extension is consulted first, then the
    /// stored bytes are sniffed. `None` means the type is unknown.
    pub fn probe_content_type(&self, digest: &Digest) -> Result<Option<String>> {
        let info = match self.index.get(digest) {
            Some(info) => info,
            None => {
                self.stats.record_miss();
                return Err(CacheError::not_found(digest.to_string()));
            }
        };
        self.touch_existing(digest)?;
        Ok(content_type::probe(
            &info.original_file_name,
            &self.physical_path(digest),
        ))
    }

    /// Start a two-phase streaming write
    pub fn new_cache_entry(&self, original_file_name: &str) -> Result<CacheEntryWriter<'_>> {
        CacheEntryWriter::create(self, self.staging_path(), original_file_name)
    }

    /// Drop `digest` from the cache; returns whether it was present
    pub fn remove(&self, digest: &Digest) -> Result<bool> {
        {
            let _placement = self.placement.lock();
            let Some(info) = self.index.remove(digest) else {
                return Ok(false);
            };
            self.journal.append(&CacheEvent::Remove(info.digest))?;
            ocflstore_utils::remove_file_best_effort(&self.physical_path(digest));
        }
        tracing::debug!(digest = %digest, "removed from cache");
        self.maybe_compact();
        Ok(true)
    }

    pub(crate) fn staging_path(&self) -> PathBuf {
        self.root.join(format!("{STAGING_PREFIX}{}", Uuid::new_v4()))
    }

    /// Physical path of an indexed digest, or `NotFound`
    fn require(&self, digest: &Digest) -> Result<PathBuf> {
        if self.index.contains(digest) {
            Ok(self.physical_path(digest))
        } else {
            self.stats.record_miss();
            tracing::debug!(digest = %digest, "cache miss");
            Err(CacheError::not_found(digest.to_string()))
        }
    }

    /// Refresh recency of an indexed digest and journal the touch
    pub(crate) fn touch_existing(&self, digest: &Digest) -> Result<bool> {
        if !self.index.touch(digest) {
            return Ok(false);
        }
        self.journal.append(&CacheEvent::Touch(digest.clone()))?;
        self.maybe_compact();
        Ok(true)
    }

    /// Move a fully written staging file into place and index it
    ///
    /// Must only be called with `staged` holding exactly the bytes of
    /// `digest`. A concurrent writer of the same content may have placed it
    /// first, in which case this call degrades to a hit.
    pub(crate) fn register(
        &self,
        digest: Digest,
        staged: &Path,
        size: u64,
        original_file_name: &str,
    ) -> Result<Digest> {
        let physical = self.physical_path(&digest);
        let placement = self.placement.lock();
        if let Err(e) = ocflstore_utils::ensure_parent_dir(&physical) {
            ocflstore_utils::remove_file_best_effort(staged);
            return Err(e.into());
        }

        let info = FileInfo::new(digest.clone(), size, original_file_name);
        if self.index.contains(&digest) {
            drop(placement);
            ocflstore_utils::remove_file_best_effort(staged);
            self.touch_existing(&digest)?;
            return Ok(digest);
        }
        if let Err(e) = fs::rename(staged, &physical) {
            ocflstore_utils::remove_file_best_effort(staged);
            return Err(CacheError::io(&physical, "move staging file into place", e));
        }
        self.index.insert_if_absent(info.clone());

        if let Err(e) = self.journal.append(&CacheEvent::Add(info)) {
            self.index.remove(&digest);
            ocflstore_utils::remove_file_best_effort(&physical);
            return Err(e);
        }
        drop(placement);

        self.stats.record_write();
        tracing::debug!(digest = %digest, size, "cached new content");
        // Add is durable here, so an eviction failure does not fail the write
        if let Err(e) = self.roll_over() {
            tracing::warn!(digest = %digest, error = %e, "eviction after write failed");
        }
        self.maybe_compact();
        Ok(digest)
    }
}
