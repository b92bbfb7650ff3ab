//! Digest calculation over bytes, readers and files

use crate::constants::IO_BUFFER_SIZE;
use crate::errors::{Error, Result};
use crate::types::{Digest, DigestAlgorithm};
use sha2::{Digest as _, Sha256, Sha512};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// Computes content digests with one fixed algorithm
pub trait DigestCalculator: Send + Sync {
    fn algorithm(&self) -> DigestAlgorithm;

    /// Digest of an in-memory buffer
    fn digest_bytes(&self, bytes: &[u8]) -> Digest;

    /// Digest of everything a reader yields
    fn digest_reader(&self, reader: &mut dyn Read) -> io::Result<Digest>;

    /// Digest of a file, streamed so large files are never held in memory
    fn digest_file(&self, path: &Path) -> Result<Digest> {
        let file = File::open(path)
            .map_err(|e| Error::file_system(path, "open file for hashing", e))?;
        let mut reader = BufReader::with_capacity(IO_BUFFER_SIZE, file);
        self.digest_reader(&mut reader)
            .map_err(|e| Error::file_system(path, "read file for hashing", e))
    }
}

/// SHA-2 family calculator
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha2Calculator {
    algorithm: DigestAlgorithm,
}

impl Sha2Calculator {
    pub fn new(algorithm: DigestAlgorithm) -> Self {
        Self { algorithm }
    }

    pub fn sha256() -> Self {
        Self::new(DigestAlgorithm::Sha256)
    }

    pub fn sha512() -> Self {
        Self::new(DigestAlgorithm::Sha512)
    }

    fn finish(&self, bytes: &[u8]) -> Digest {
        Digest::from_hash_output(self.algorithm, bytes)
    }
}

impl DigestCalculator for Sha2Calculator {
    fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    fn digest_bytes(&self, bytes: &[u8]) -> Digest {
        match self.algorithm {
            DigestAlgorithm::Sha256 => self.finish(&Sha256::digest(bytes)),
            DigestAlgorithm::Sha512 => self.finish(&Sha512::digest(bytes)),
        }
    }

    fn digest_reader(&self, reader: &mut dyn Read) -> io::Result<Digest> {
        match self.algorithm {
            DigestAlgorithm::Sha256 => {
                let mut hasher = Sha256::new();
                stream_into(reader, |chunk| hasher.update(chunk))?;
                Ok(self.finish(&hasher.finalize()))
            }
            DigestAlgorithm::Sha512 => {
                let mut hasher = Sha512::new();
                stream_into(reader, |chunk| hasher.update(chunk))?;
                Ok(self.finish(&hasher.finalize()))
            }
        }
    }
}

fn stream_into(reader: &mut dyn Read, mut update: impl FnMut(&[u8])) -> io::Result<()> {
    let mut buffer = [0u8; IO_BUFFER_SIZE];
    loop {
        match reader.read(&mut buffer) {
            Ok(0) => return Ok(()),
            Ok(n) => update(&buffer[..n]),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}
