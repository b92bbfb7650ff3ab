//! Conversion implementations for error types

use super::types::Error;
use std::path::PathBuf;

// Kept by hand so callers can attach a path and operation instead of #[from]
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::FileSystem {
            path: PathBuf::new(),
            operation: "unknown".to_string(),
            source: error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_conversion_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        let err: Error = io.into();
        match err {
            Error::FileSystem { source, .. } => {
                assert_eq!(source.kind(), std::io::ErrorKind::PermissionDenied)
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_display_includes_context() {
        let err = Error::file_system(
            "/tmp/x",
            "open file",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        let text = err.to_string();
        assert!(text.contains("open file"));
        assert!(text.contains("/tmp/x"));
    }
}
