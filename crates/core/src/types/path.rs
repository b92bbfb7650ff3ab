//! Addresses of files inside versioned objects

use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

/// Version of an object, rendered as `v<N>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VersionNumber(u32);

impl VersionNumber {
    /// The version unspecified paths resolve to
    pub const FIRST: VersionNumber = VersionNumber(1);

    pub fn new(number: u32) -> Result<Self> {
        if number == 0 {
            return Err(Error::configuration("version numbers start at 1"));
        }
        Ok(Self(number))
    }

    pub fn number(&self) -> u32 {
        self.0
    }

    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl Display for VersionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl FromStr for VersionNumber {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let digits = s.strip_prefix('v').unwrap_or(s);
        let number = digits
            .parse::<u32>()
            .map_err(|_| Error::configuration(format!("invalid version '{s}'")))?;
        VersionNumber::new(number)
    }
}

/// `(owner, version | head, relative-path)` address of a stored file
///
/// Only the mapping to a physical location matters to the storage layer, so
/// the relative path is validated to stay below its root and is otherwise
/// taken as given.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionedPath {
    owner: String,
    version: Option<VersionNumber>,
    relative_path: PathBuf,
}

impl VersionedPath {
    pub fn new(
        owner: impl Into<String>,
        version: Option<VersionNumber>,
        relative_path: impl Into<PathBuf>,
    ) -> Result<Self> {
        let owner = owner.into();
        let relative_path = relative_path.into();

        if owner.is_empty() || owner.contains(['/', '\\']) || owner == "." || owner == ".." {
            return Err(Error::invalid_path(
                &relative_path,
                format!("owner '{owner}' is not a single path segment"),
            ));
        }
        validate_relative(&relative_path)?;

        Ok(Self {
            owner,
            version,
            relative_path,
        })
    }

    /// Address a file in the head (unspecified) version
    pub fn head(owner: impl Into<String>, relative_path: impl Into<PathBuf>) -> Result<Self> {
        Self::new(owner, None, relative_path)
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn version(&self) -> Option<VersionNumber> {
        self.version
    }

    /// Version used for physical placement; unspecified means the first version
    pub fn resolved_version(&self) -> VersionNumber {
        self.version.unwrap_or(VersionNumber::FIRST)
    }

    pub fn relative_path(&self) -> &Path {
        &self.relative_path
    }

    /// `owner/version/relative-path` below some storage root
    pub fn to_relative_physical(&self) -> PathBuf {
        PathBuf::from(&self.owner)
            .join(self.resolved_version().to_string())
            .join(&self.relative_path)
    }

    /// Sibling address with the same owner and version
    pub fn with_relative_path(&self, relative_path: impl Into<PathBuf>) -> Result<Self> {
        Self::new(self.owner.clone(), self.version, relative_path)
    }
}

impl Display for VersionedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.version {
            Some(version) => write!(
                f,
                "{}/{}/{}",
                self.owner,
                version,
                self.relative_path.display()
            ),
            None => write!(f, "{}/head/{}", self.owner, self.relative_path.display()),
        }
    }
}

fn validate_relative(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(Error::invalid_path(path, "relative path is empty"));
    }

    for component in path.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            Component::ParentDir => {
                return Err(Error::invalid_path(path, "parent components are not allowed"))
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(Error::invalid_path(path, "path must be relative"))
            }
        }
    }

    Ok(())
}
