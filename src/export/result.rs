//! Export artifacts and warnings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// A non-fatal problem reported alongside an artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExportWarning {
    /// Structured rendering failed; the artifact holds the plain text only,
    /// without decoration.
    RenderDegradation {
        /// Why structured rendering failed
        reason: String,
    },

    /// Characters outside the PDF font encoding were drawn as `?`.
    CharacterSubstitution {
        /// Number of replaced characters
        count: usize,
    },
}

impl fmt::Display for ExportWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportWarning::RenderDegradation { reason } => {
                write!(f, "rendered as plain text ({})", reason)
            }
            ExportWarning::CharacterSubstitution { count } => {
                write!(f, "{} character(s) could not be drawn and were replaced with '?'", count)
            }
        }
    }
}

/// A named file produced by an exporter.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    /// File contents
    pub bytes: Vec<u8>,

    /// MIME type of the contents
    pub mime_type: &'static str,

    /// Default download filename
    pub filename: String,

    /// Number of pages (paginated formats only)
    pub page_count: Option<usize>,

    /// Non-fatal problems
    pub warnings: Vec<ExportWarning>,
}

impl ExportArtifact {
    /// Create a new artifact.
    pub fn new(bytes: Vec<u8>, mime_type: &'static str, filename: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type,
            filename: filename.into(),
            page_count: None,
            warnings: Vec::new(),
        }
    }

    /// Set the page count.
    pub fn with_page_count(mut self, pages: usize) -> Self {
        self.page_count = Some(pages);
        self
    }

    /// Add a warning.
    pub fn with_warning(mut self, warning: ExportWarning) -> Self {
        self.warnings.push(warning);
        self
    }

    /// Size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Check if the artifact is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Check if structured rendering was abandoned.
    pub fn is_degraded(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w, ExportWarning::RenderDegradation { .. }))
    }

    /// Contents as UTF-8 text, for the textual formats.
    pub fn as_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.bytes).ok()
    }

    /// Write the artifact into a directory under its default filename.
    pub fn save_to_dir<P: AsRef<Path>>(&self, dir: P) -> Result<PathBuf> {
        let path = dir.as_ref().join(&self.filename);
        std::fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_builder() {
        let artifact = ExportArtifact::new(b"abc".to_vec(), "text/plain", "out.txt")
            .with_page_count(1)
            .with_warning(ExportWarning::RenderDegradation {
                reason: "x".into(),
            });

        assert_eq!(artifact.len(), 3);
        assert_eq!(artifact.as_text(), Some("abc"));
        assert_eq!(artifact.page_count, Some(1));
        assert!(artifact.is_degraded());
    }

    #[test]
    fn test_save_to_dir() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = ExportArtifact::new(b"hello".to_vec(), "text/plain", "a.txt");
        let path = artifact.save_to_dir(dir.path()).unwrap();
        assert_eq!(std::fs::read(path).unwrap(), b"hello");
    }

    #[test]
    fn test_warning_serialization() {
        let warning = ExportWarning::RenderDegradation {
            reason: "bad glyph".into(),
        };
        let json = serde_json::to_string(&warning).unwrap();
        assert_eq!(json, r#"{"type":"render_degradation","reason":"bad glyph"}"#);
    }
}
