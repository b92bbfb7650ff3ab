//! Basic file attributes

use std::fs::Metadata;
use std::time::SystemTime;

/// Snapshot of the attributes of a stored file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAttributes {
    pub size: u64,
    pub modified: Option<SystemTime>,
    pub created: Option<SystemTime>,
    pub is_directory: bool,
    pub is_regular_file: bool,
}

impl From<&Metadata> for FileAttributes {
    fn from(metadata: &Metadata) -> Self {
        Self {
            size: metadata.len(),
            modified: metadata.modified().ok(),
            created: metadata.created().ok(),
            is_directory: metadata.is_dir(),
            is_regular_file: metadata.is_file(),
        }
    }
}
