//! Content digests used as cache keys

use crate::constants::SHARD_PREFIX_LEN;
use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;

/// Hash algorithm that produced a digest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    Sha256,
    Sha512,
}

impl DigestAlgorithm {
    /// Stable name used in the `algorithm:hex` encoding
    pub const fn as_str(&self) -> &'static str {
        match self {
            DigestAlgorithm::Sha256 => "sha256",
            DigestAlgorithm::Sha512 => "sha512",
        }
    }

    /// Number of hex characters in a digest of this algorithm
    pub const fn hex_len(&self) -> usize {
        match self {
            DigestAlgorithm::Sha256 => 64,
            DigestAlgorithm::Sha512 => 128,
        }
    }
}

impl Default for DigestAlgorithm {
    fn default() -> Self {
        DigestAlgorithm::Sha512
    }
}

impl Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DigestAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sha256" | "sha-256" => Ok(DigestAlgorithm::Sha256),
            "sha512" | "sha-512" => Ok(DigestAlgorithm::Sha512),
            other => Err(Error::unsupported_algorithm(other)),
        }
    }
}

/// An immutable `(algorithm, hex-value)` pair identifying content
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Digest {
    algorithm: DigestAlgorithm,
    value: String,
}

impl Digest {
    /// Create a digest, validating the hex value against the algorithm
    pub fn new(algorithm: DigestAlgorithm, value: impl Into<String>) -> Result<Self> {
        let value = value.into().to_ascii_lowercase();

        if value.len() != algorithm.hex_len() {
            return Err(Error::invalid_digest(
                value.clone(),
                format!(
                    "expected {} hex characters for {}, found {}",
                    algorithm.hex_len(),
                    algorithm,
                    value.len()
                ),
            ));
        }

        if !value.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(Error::invalid_digest(value, "value is not hexadecimal"));
        }

        Ok(Self { algorithm, value })
    }

    /// Build a digest from raw hash output
    pub fn from_bytes(algorithm: DigestAlgorithm, bytes: &[u8]) -> Result<Self> {
        Self::new(algorithm, hex::encode(bytes))
    }

    /// Wrap hash output whose length is already known to match the algorithm
    pub(crate) fn from_hash_output(algorithm: DigestAlgorithm, bytes: &[u8]) -> Self {
        Self {
            algorithm,
            value: hex::encode(bytes),
        }
    }

    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    /// Lowercase hex value without the algorithm prefix
    pub fn hex(&self) -> &str {
        &self.value
    }

    /// Leading characters used as the shard directory name
    pub fn shard(&self) -> &str {
        &self.value[..SHARD_PREFIX_LEN]
    }
}

impl Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.value)
    }
}

impl FromStr for Digest {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (algorithm, value) = s
            .split_once(':')
            .ok_or_else(|| Error::invalid_digest(s, "expected 'algorithm:hex'"))?;
        Digest::new(algorithm.parse()?, value)
    }
}

impl TryFrom<String> for Digest {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Digest> for String {
    fn from(digest: Digest) -> Self {
        digest.to_string()
    }
}
