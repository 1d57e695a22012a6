//! Upload type checks and PDF detection.

use crate::error::{Error, Result};
use crate::model::ImageSource;
use std::path::Path;

/// The only accepted upload type.
pub const PDF_MIME_TYPE: &str = "application/pdf";

/// Advisory upload size limit (20 MB). Larger files are logged, not rejected.
pub const MAX_UPLOAD_BYTES: u64 = 20 * 1024 * 1024;

/// Message shown when a non-PDF file is selected.
pub const INVALID_TYPE_MESSAGE: &str = "Please upload a valid PDF file.";

/// PDF format information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfFormat {
    /// PDF version (e.g., "1.7", "2.0")
    pub version: String,
}

impl std::fmt::Display for PdfFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PDF {}", self.version)
    }
}

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";
const PDF_MAGIC_LEN: usize = 5;
const VERSION_LEN: usize = 3; // e.g., "1.7"

/// Check whether a declared MIME type is accepted for upload.
///
/// The check is exact: only `application/pdf` passes.
pub fn is_accepted_type(mime_type: &str) -> bool {
    mime_type == PDF_MIME_TYPE
}

/// Guess a MIME type from a file extension.
///
/// Used by callers that only have a path and need to declare a type.
pub fn mime_type_from_path<P: AsRef<Path>>(path: P) -> Option<&'static str> {
    let ext = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "pdf" => Some(PDF_MIME_TYPE),
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "bmp" => Some("image/bmp"),
        "webp" => Some("image/webp"),
        "txt" => Some("text/plain"),
        "csv" => Some("text/csv"),
        "doc" => Some("application/msword"),
        "html" | "htm" => Some("text/html"),
        "json" => Some("application/json"),
        _ => None,
    }
}

/// Sniff a MIME type from leading bytes.
pub fn sniff_mime_type(data: &[u8]) -> Option<&'static str> {
    if data.starts_with(PDF_MAGIC) {
        return Some(PDF_MIME_TYPE);
    }
    ImageSource::detect_mime_type(data)
}

/// Detect the PDF version from the file header.
pub fn detect_format_from_bytes(data: &[u8]) -> Result<PdfFormat> {
    if data.len() < PDF_MAGIC_LEN + VERSION_LEN || !data.starts_with(PDF_MAGIC) {
        return Err(Error::Validation("data does not start with a PDF header".to_string()));
    }

    // Extract version string (e.g., "1.7" from "%PDF-1.7")
    let version_bytes = &data[PDF_MAGIC_LEN..PDF_MAGIC_LEN + VERSION_LEN];
    let version = String::from_utf8_lossy(version_bytes).to_string();

    if !is_valid_version(&version) {
        return Err(Error::Validation(format!(
            "unsupported PDF version '{}'",
            version
        )));
    }

    Ok(PdfFormat { version })
}

fn is_valid_version(version: &str) -> bool {
    let bytes = version.as_bytes();
    bytes.len() == 3 && bytes[0].is_ascii_digit() && bytes[1] == b'.' && bytes[2].is_ascii_digit()
}

/// Check if bytes start with a PDF header.
pub fn is_pdf_bytes(data: &[u8]) -> bool {
    detect_format_from_bytes(data).is_ok()
}

/// Check whether a size exceeds the advisory upload limit.
pub fn exceeds_advisory_size(size: u64) -> bool {
    size > MAX_UPLOAD_BYTES
}
