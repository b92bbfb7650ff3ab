//! Content type probing
//!
//! The original file name decides when its extension is in the table below;
//! otherwise the first bytes of the stored file are sniffed for common
//! signatures.

use std::fs::File;
use std::io::Read;
use std::path::Path;

const SNIFF_LEN: usize = 512;

const SIGNATURES: &[(&[u8], &str)] = &[
    (b"%PDF-", "application/pdf"),
    (b"\x89PNG\r\n\x1a\n", "image/png"),
    (b"\xff\xd8\xff", "image/jpeg"),
    (b"GIF87a", "image/gif"),
    (b"GIF89a", "image/gif"),
    (b"PK\x03\x04", "application/zip"),
    (b"\x1f\x8b", "application/gzip"),
    (b"<?xml", "application/xml"),
];

pub(crate) fn probe(original_file_name: &str, physical: &Path) -> Option<String> {
    let extension = Path::new(original_file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    if let Some(mime) = extension.as_deref().and_then(content_type_for_ext) {
        return Some(mime.to_string());
    }

    let mut head = Vec::with_capacity(SNIFF_LEN);
    match File::open(physical) {
        Ok(file) => {
            if let Err(e) = file.take(SNIFF_LEN as u64).read_to_end(&mut head) {
                tracing::debug!(path = %physical.display(), error = %e, "cannot sniff content type");
                return None;
            }
        }
        Err(e) => {
            tracing::debug!(path = %physical.display(), error = %e, "cannot sniff content type");
            return None;
        }
    }
    sniff(&head).map(str::to_string)
}

fn content_type_for_ext(ext: &str) -> Option<&'static str> {
    let mime = match ext {
        "txt" | "text" | "log" => "text/plain",
        "csv" => "text/csv",
        "htm" | "html" => "text/html",
        "css" => "text/css",
        "md" => "text/markdown",
        "xml" => "application/xml",
        "json" => "application/json",
        "js" => "text/javascript",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "gz" | "tgz" => "application/gzip",
        "tar" => "application/x-tar",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "tif" | "tiff" => "image/tiff",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "mp4" => "video/mp4",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        _ => return None,
    };
    Some(mime)
}

pub(crate) fn sniff(head: &[u8]) -> Option<&'static str> {
    if head.is_empty() {
        return None;
    }
    if let Some((_, mime)) = SIGNATURES.iter().find(|(magic, _)| head.starts_with(magic)) {
        return Some(mime);
    }

    let text = match std::str::from_utf8(head) {
        Ok(text) => text,
        // A multi-byte character may be cut at the sniff boundary
        Err(e) if e.error_len().is_none() => std::str::from_utf8(&head[..e.valid_up_to()]).ok()?,
        Err(_) => return None,
    };
    if text.contains('\0') {
        return None;
    }

    let trimmed = text.trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        Some("application/json")
    } else if trimmed.starts_with('<') {
        Some("application/xml")
    } else {
        Some("text/plain")
    }
}
