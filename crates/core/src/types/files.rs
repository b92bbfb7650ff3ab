//! Metadata kept for each cached file

use crate::types::Digest;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Digest, size and original name of a cached file
///
/// The original file name is kept only so content types can be guessed from
/// its extension; the physical file is named after the digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    pub digest: Digest,
    pub size: u64,
    pub original_file_name: String,
}

impl FileInfo {
    pub fn new(digest: Digest, size: u64, original_file_name: impl Into<String>) -> Self {
        Self {
            digest,
            size,
            original_file_name: original_file_name.into(),
        }
    }

    /// Extension of the original file name, if any
    pub fn extension(&self) -> Option<&str> {
        Path::new(&self.original_file_name)
            .extension()
            .and_then(|ext| ext.to_str())
    }
}
