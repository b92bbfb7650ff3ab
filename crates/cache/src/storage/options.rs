//! Open and copy options for storage operations

use std::fs::OpenOptions;
use std::ops::BitOr;

/// Set of options controlling how a byte channel is opened
///
/// An empty set, or one holding only `READ`, opens the file read-only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct OpenOptionSet {
    bits: u8,
}

impl OpenOptionSet {
    pub const READ: Self = Self { bits: 1 };
    pub const WRITE: Self = Self { bits: 1 << 1 };
    pub const APPEND: Self = Self { bits: 1 << 2 };
    pub const CREATE: Self = Self { bits: 1 << 3 };
    pub const CREATE_NEW: Self = Self { bits: 1 << 4 };
    pub const TRUNCATE_EXISTING: Self = Self { bits: 1 << 5 };

    pub const fn empty() -> Self {
        Self { bits: 0 }
    }

    pub const fn contains(self, other: Self) -> bool {
        self.bits & other.bits == other.bits
    }

    #[must_use]
    pub const fn with(self, other: Self) -> Self {
        Self {
            bits: self.bits | other.bits,
        }
    }

    #[must_use]
    pub const fn without(self, other: Self) -> Self {
        Self {
            bits: self.bits & !other.bits,
        }
    }

    pub const fn is_empty(self) -> bool {
        self.bits == 0
    }

    /// No option other than `READ` is present
    pub const fn is_read_only(self) -> bool {
        self.bits & !Self::READ.bits == 0
    }

    pub const fn is_writing(self) -> bool {
        self.bits & (Self::WRITE.bits | Self::APPEND.bits) != 0
    }

    /// Read-write channel that creates the file and replaces its content
    pub const fn create_truncate() -> Self {
        Self::WRITE.with(Self::CREATE).with(Self::TRUNCATE_EXISTING)
    }

    /// Translate into `std::fs::OpenOptions`
    ///
    /// Creation flags only apply to writing channels and truncation is
    /// ignored when appending.
    pub fn to_open_options(self) -> OpenOptions {
        let mut options = OpenOptions::new();
        let writing = self.is_writing();
        options.read(self.contains(Self::READ) || !writing);

        if self.contains(Self::APPEND) {
            options.append(true);
        } else if self.contains(Self::WRITE) {
            options.write(true);
            if self.contains(Self::TRUNCATE_EXISTING) {
                options.truncate(true);
            }
        }

        if writing {
            if self.contains(Self::CREATE_NEW) {
                options.create_new(true);
            } else if self.contains(Self::CREATE) {
                options.create(true);
            }
        }
        options
    }
}

impl BitOr for OpenOptionSet {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.with(rhs)
    }
}

/// Options for copy and move operations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyOptions {
    /// Overwrite the target if it already exists
    pub replace_existing: bool,
}

impl CopyOptions {
    pub const REPLACE_EXISTING: Self = Self {
        replace_existing: true,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_only_classification() {
        assert!(OpenOptionSet::empty().is_read_only());
        assert!(OpenOptionSet::READ.is_read_only());
        assert!(!(OpenOptionSet::READ | OpenOptionSet::WRITE).is_read_only());
        assert!(!OpenOptionSet::APPEND.is_read_only());
        assert!(!OpenOptionSet::CREATE.is_read_only());
    }

    #[test]
    fn test_with_and_without() {
        let options = OpenOptionSet::WRITE | OpenOptionSet::TRUNCATE_EXISTING;
        let downgraded = options
            .without(OpenOptionSet::TRUNCATE_EXISTING)
            .with(OpenOptionSet::CREATE);

        assert!(downgraded.contains(OpenOptionSet::WRITE));
        assert!(downgraded.contains(OpenOptionSet::CREATE));
        assert!(!downgraded.contains(OpenOptionSet::TRUNCATE_EXISTING));
    }

    #[test]
    fn test_append_opens_existing_file_for_append() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("f");
        std::fs::write(&path, b"ab").unwrap();

        let mut file = (OpenOptionSet::APPEND | OpenOptionSet::TRUNCATE_EXISTING)
            .to_open_options()
            .open(&path)
            .unwrap();
        std::io::Write::write_all(&mut file, b"cd").unwrap();
        drop(file);

        assert_eq!(std::fs::read(&path).unwrap(), b"abcd");
    }
}
