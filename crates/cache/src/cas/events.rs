//! Journal events of the content-addressable cache
//!
//! Line format: `COMMAND|algorithm:hex[|size|originalFileName]`. The file
//! name is the last field and lines are split into at most four fields, so a
//! `|` inside a name survives without escaping.

use crate::journal::{DeserializationError, JournalCodec};
use ocflstore_core::{Digest, FileInfo};

const ADD: &str = "ADD";
const REMOVE: &str = "REMOVE";
const TOUCH: &str = "TOUCH";
const SEPARATOR: char = '|';

/// State change recorded in the cache journal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEvent {
    /// An entry was inserted or overwritten
    Add(FileInfo),
    /// An entry was evicted or deleted
    Remove(Digest),
    /// An entry was used; affects recency only
    Touch(Digest),
}

impl CacheEvent {
    pub fn digest(&self) -> &Digest {
        match self {
            Self::Add(info) => &info.digest,
            Self::Remove(digest) | Self::Touch(digest) => digest,
        }
    }
}

/// Pipe-delimited codec for [`CacheEvent`]
#[derive(Debug, Default, Clone, Copy)]
pub struct CacheEventCodec;

impl JournalCodec<CacheEvent> for CacheEventCodec {
    fn encode(&self, event: &CacheEvent) -> String {
        match event {
            CacheEvent::Add(info) => format!(
                "{ADD}{SEPARATOR}{}{SEPARATOR}{}{SEPARATOR}{}",
                info.digest,
                info.size,
                single_line(&info.original_file_name)
            ),
            CacheEvent::Remove(digest) => format!("{REMOVE}{SEPARATOR}{digest}"),
            CacheEvent::Touch(digest) => format!("{TOUCH}{SEPARATOR}{digest}"),
        }
    }

    fn decode(&self, line: &str) -> Result<CacheEvent, DeserializationError> {
        let mut fields = line.splitn(4, SEPARATOR);
        let command = fields.next().unwrap_or_default();
        let digest = fields
            .next()
            .ok_or_else(|| DeserializationError::new(line, "missing digest"))?;
        let digest: Digest = digest
            .parse()
            .map_err(|e: ocflstore_core::Error| DeserializationError::new(line, e.to_string()))?;

        match command {
            ADD => {
                let size = fields
                    .next()
                    .ok_or_else(|| DeserializationError::new(line, "missing size"))?
                    .parse::<u64>()
                    .map_err(|e| DeserializationError::new(line, format!("invalid size: {e}")))?;
                let name = fields
                    .next()
                    .ok_or_else(|| DeserializationError::new(line, "missing file name"))?;
                Ok(CacheEvent::Add(FileInfo::new(digest, size, name)))
            }
            REMOVE | TOUCH => {
                if fields.next().is_some() {
                    return Err(DeserializationError::new(
                        line,
                        format!("unexpected fields after {command}"),
                    ));
                }
                if command == REMOVE {
                    Ok(CacheEvent::Remove(digest))
                } else {
                    Ok(CacheEvent::Touch(digest))
                }
            }
            other => Err(DeserializationError::new(
                line,
                format!("unknown command '{other}'"),
            )),
        }
    }
}

fn single_line(name: &str) -> String {
    name.replace(['\n', '\r'], "_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use ocflstore_core::{DigestCalculator, Sha2Calculator};

    fn digest() -> Digest {
        Sha2Calculator::sha256().digest_bytes(b"hello")
    }

    #[test]
    fn test_line_format() {
        let codec = CacheEventCodec;
        let line = codec.encode(&CacheEvent::Add(FileInfo::new(digest(), 5, "a.txt")));
        assert_eq!(
            line,
            "ADD|sha256:2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824|5|a.txt"
        );
        assert!(codec
            .encode(&CacheEvent::Touch(digest()))
            .starts_with("TOUCH|sha256:"));
        assert!(codec
            .encode(&CacheEvent::Remove(digest()))
            .starts_with("REMOVE|sha256:"));
    }

    #[test]
    fn test_pipe_in_file_name_survives() {
        let codec = CacheEventCodec;
        let event = CacheEvent::Add(FileInfo::new(digest(), 5, "odd|name|.txt"));
        assert_eq!(codec.decode(&codec.encode(&event)).unwrap(), event);
    }

    #[test]
    fn test_newline_in_file_name_is_replaced() {
        let codec = CacheEventCodec;
        let line = codec.encode(&CacheEvent::Add(FileInfo::new(digest(), 5, "a\nb\r.txt")));
        assert!(!line.contains('\n'));
        match codec.decode(&line).unwrap() {
            CacheEvent::Add(info) => assert_eq!(info.original_file_name, "a_b_.txt"),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_malformed_lines_are_rejected() {
        let codec = CacheEventCodec;
        for line in [
            "garbage",
            "ADD|sha256:zz|1|a",
            "FROB|sha256:2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824",
            "ADD|sha256:2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824|x|a",
            "ADD|sha256:2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824|1",
            "TOUCH|sha256:2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824|extra",
        ] {
            assert!(codec.decode(line).is_err(), "accepted {line}");
        }
    }
}
