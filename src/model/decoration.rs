//! Page decoration settings for paginated export.

use serde::{Deserialize, Serialize};

/// Watermark, header, footer and page numbering.
///
/// Purely declarative: only the PDF exporter reads it. Empty strings mean
/// "not drawn".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageDecoration {
    /// Diagonal watermark text
    pub watermark: String,

    /// Header text at the top of each page
    pub header: String,

    /// Footer text at the bottom of each page
    pub footer: String,

    /// Draw "Page i of N" at the bottom right
    pub show_page_numbers: bool,
}

impl PageDecoration {
    /// Create an empty decoration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the watermark text.
    pub fn with_watermark(mut self, text: impl Into<String>) -> Self {
        self.watermark = text.into();
        self
    }

    /// Set the header text.
    pub fn with_header(mut self, text: impl Into<String>) -> Self {
        self.header = text.into();
        self
    }

    /// Set the footer text.
    pub fn with_footer(mut self, text: impl Into<String>) -> Self {
        self.footer = text.into();
        self
    }

    /// Enable or disable page numbers.
    pub fn with_page_numbers(mut self, enabled: bool) -> Self {
        self.show_page_numbers = enabled;
        self
    }

    /// Watermark text, if one should be drawn.
    pub fn watermark_text(&self) -> Option<&str> {
        non_blank(&self.watermark)
    }

    /// Header text, if one should be drawn.
    pub fn header_text(&self) -> Option<&str> {
        non_blank(&self.header)
    }

    /// Footer text, if one should be drawn.
    pub fn footer_text(&self) -> Option<&str> {
        non_blank(&self.footer)
    }

    /// Check if nothing would be drawn.
    pub fn is_empty(&self) -> bool {
        self.watermark_text().is_none()
            && self.header_text().is_none()
            && self.footer_text().is_none()
            && !self.show_page_numbers
    }
}

fn non_blank(s: &str) -> Option<&str> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_empty() {
        assert!(PageDecoration::default().is_empty());
        assert!(PageDecoration::new().with_watermark("   ").is_empty());
    }

    #[test]
    fn test_from_camel_case_json() {
        let deco: PageDecoration =
            serde_json::from_str(r#"{"watermark": "DRAFT", "showPageNumbers": true}"#).unwrap();
        assert_eq!(deco.watermark_text(), Some("DRAFT"));
        assert!(deco.show_page_numbers);
        assert!(deco.header_text().is_none());
    }
}
