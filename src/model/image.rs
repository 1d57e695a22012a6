//! Embedded image types (ordinary pictures and signatures).

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// Default rendered height of a signature image, in CSS pixels.
pub const SIGNATURE_HEIGHT_PX: u32 = 60;

/// Identifier of an image node, unique within one content model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ImageId(pub u64);

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "img{}", self.0)
    }
}

/// Provenance of an image.
///
/// Both kinds behave the same in the model; they differ only in default
/// sizing (signatures render inline at a small fixed height, ordinary
/// images as full-width blocks).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    /// Picture uploaded by the user
    #[default]
    Ordinary,
    /// Hand-drawn signature
    Signature,
}

impl ImageKind {
    /// Alt text used in markup output.
    pub fn alt_text(self) -> &'static str {
        match self {
            ImageKind::Ordinary => "image",
            ImageKind::Signature => "signature",
        }
    }
}

/// Encoded image bytes with their MIME type.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageSource {
    data: Vec<u8>,
    mime_type: String,
}

impl ImageSource {
    /// Create an image source from raw bytes, sniffing the format.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let mime_type = Self::detect_mime_type(&data)
            .ok_or_else(|| Error::Image("unrecognized image format".to_string()))?;
        Ok(Self {
            data,
            mime_type: mime_type.to_string(),
        })
    }

    /// Parse a `data:<mime>;base64,<payload>` URI.
    ///
    /// Sniffed bytes win over the declared MIME type when they disagree.
    pub fn from_data_uri(uri: &str) -> Result<Self> {
        let rest = uri
            .trim()
            .strip_prefix("data:")
            .ok_or_else(|| Error::Image("not a data URI".to_string()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| Error::Image("data URI has no payload".to_string()))?;
        let declared = header
            .strip_suffix(";base64")
            .ok_or_else(|| Error::Image("only base64 data URIs are supported".to_string()))?;

        let data = STANDARD
            .decode(payload.trim())
            .map_err(|e| Error::Image(format!("invalid base64 payload: {}", e)))?;

        let mime_type = match Self::detect_mime_type(&data) {
            Some(sniffed) => sniffed.to_string(),
            None if declared.starts_with("image/") => declared.to_string(),
            None => {
                return Err(Error::Image(format!(
                    "unsupported data URI type '{}'",
                    declared
                )))
            }
        };

        Ok(Self { data, mime_type })
    }

    /// Encode as a base64 data URI.
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.data))
    }

    /// Raw encoded bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// MIME type (e.g., "image/png").
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Size of the encoded data in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// File extension for the MIME type.
    pub fn extension(&self) -> &str {
        match self.mime_type.as_str() {
            "image/jpeg" => "jpg",
            "image/png" => "png",
            "image/gif" => "gif",
            "image/bmp" => "bmp",
            "image/webp" => "webp",
            _ => "bin",
        }
    }

    /// Detect an image MIME type from magic bytes.
    pub fn detect_mime_type(data: &[u8]) -> Option<&'static str> {
        if data.len() < 4 {
            return None;
        }

        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some("image/jpeg");
        }

        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some("image/png");
        }

        if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
            return Some("image/gif");
        }

        if data.starts_with(b"BM") {
            return Some("image/bmp");
        }

        // RIFF....WEBP
        if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
            return Some("image/webp");
        }

        None
    }
}

/// An image placed inline in a paragraph.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageNode {
    /// Node identifier
    pub id: ImageId,

    /// Encoded image
    pub source: ImageSource,

    /// Ordinary or signature
    pub kind: ImageKind,

    /// Width as a percentage of the content width, set by resizing
    pub width_percent: Option<u8>,
}

impl ImageNode {
    /// Create a new image node with default sizing.
    pub fn new(id: ImageId, source: ImageSource, kind: ImageKind) -> Self {
        Self {
            id,
            source,
            kind,
            width_percent: None,
        }
    }

    /// Check if this is a signature image.
    pub fn is_signature(&self) -> bool {
        self.kind == ImageKind::Signature
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn test_detect_mime_type() {
        let jpeg_data = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46];
        assert_eq!(ImageSource::detect_mime_type(&jpeg_data), Some("image/jpeg"));
        assert_eq!(ImageSource::detect_mime_type(&PNG_MAGIC), Some("image/png"));
        assert_eq!(ImageSource::detect_mime_type(b"GIF89a.."), Some("image/gif"));
        assert_eq!(ImageSource::detect_mime_type(&[0, 0, 0, 0]), None);
    }

    #[test]
    fn test_from_bytes_rejects_unknown() {
        assert!(ImageSource::from_bytes(vec![1, 2, 3, 4, 5]).is_err());
        let src = ImageSource::from_bytes(PNG_MAGIC.to_vec()).unwrap();
        assert_eq!(src.mime_type(), "image/png");
        assert_eq!(src.extension(), "png");
    }

    #[test]
    fn test_data_uri_round_trip() {
        let src = ImageSource::from_bytes(PNG_MAGIC.to_vec()).unwrap();
        let uri = src.to_data_uri();
        assert!(uri.starts_with("data:image/png;base64,"));

        let parsed = ImageSource::from_data_uri(&uri).unwrap();
        assert_eq!(parsed, src);
    }

    #[test]
    fn test_data_uri_errors() {
        assert!(ImageSource::from_data_uri("http://example.com/a.png").is_err());
        assert!(ImageSource::from_data_uri("data:image/png,rawtext").is_err());
        assert!(ImageSource::from_data_uri("data:image/png;base64,@@@").is_err());
        assert!(ImageSource::from_data_uri("data:text/plain;base64,aGVsbG8=").is_err());
    }

    #[test]
    fn test_image_kind() {
        assert_eq!(ImageKind::default(), ImageKind::Ordinary);
        assert_eq!(ImageKind::Signature.alt_text(), "signature");
        assert_eq!(ImageId(3).to_string(), "img3");
    }
}
