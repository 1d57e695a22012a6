//! Export options and page geometry.

use serde::{Deserialize, Serialize};

use crate::model::PageDecoration;

/// Points per millimetre.
pub const MM_TO_PT: f32 = 72.0 / 25.4;

/// Physical page layout used by the PDF exporter, in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    /// Page width
    pub width: f32,

    /// Page height
    pub height: f32,

    /// Left and right margin
    pub margin_x: f32,

    /// Distance from the top edge to the first text line's top
    pub margin_top: f32,

    /// Distance from the bottom edge to the last text line's bottom
    pub margin_bottom: f32,

    /// Baseline of the header, measured from the top edge
    pub header_offset: f32,

    /// Baseline of the footer and page number, measured from the bottom edge
    pub footer_offset: f32,

    /// Body font size
    pub font_size: f32,

    /// Distance between baselines
    pub line_height: f32,
}

impl PageGeometry {
    /// A4 portrait with 15 mm side margins and 11 pt text.
    pub fn a4() -> Self {
        Self {
            width: 210.0 * MM_TO_PT,
            height: 297.0 * MM_TO_PT,
            ..Self::base()
        }
    }

    /// US Letter portrait with the same margins as A4.
    pub fn letter() -> Self {
        Self {
            width: 612.0,
            height: 792.0,
            ..Self::base()
        }
    }

    fn base() -> Self {
        Self {
            width: 0.0,
            height: 0.0,
            margin_x: 15.0 * MM_TO_PT,
            margin_top: 20.0 * MM_TO_PT,
            margin_bottom: 20.0 * MM_TO_PT,
            header_offset: 10.0 * MM_TO_PT,
            footer_offset: 10.0 * MM_TO_PT,
            font_size: 11.0,
            line_height: 17.0,
        }
    }

    /// Width available for text.
    pub fn content_width(&self) -> f32 {
        self.width - 2.0 * self.margin_x
    }

    /// Height available for text.
    pub fn content_height(&self) -> f32 {
        self.height - self.margin_top - self.margin_bottom
    }

    /// Set the body font size, scaling the line height with it.
    pub fn with_font_size(mut self, size: f32) -> Self {
        self.line_height = self.line_height * size / self.font_size;
        self.font_size = size;
        self
    }

    /// Set the side margins in millimetres.
    pub fn with_margin_mm(mut self, mm: f32) -> Self {
        self.margin_x = mm * MM_TO_PT;
        self
    }

    /// Check if the page is in landscape orientation.
    pub fn is_landscape(&self) -> bool {
        self.width > self.height
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::a4()
    }
}

/// Options shared by all exporters.
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    /// Page decoration (PDF only)
    pub decoration: PageDecoration,

    /// Page geometry (PDF only)
    pub geometry: PageGeometry,

    /// Document title written to PDF metadata
    pub title: Option<String>,
}

impl ExportOptions {
    /// Create default options (A4, no decoration).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page decoration.
    pub fn with_decoration(mut self, decoration: PageDecoration) -> Self {
        self.decoration = decoration;
        self
    }

    /// Set the page geometry.
    pub fn with_geometry(mut self, geometry: PageGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    /// Set the watermark text.
    pub fn with_watermark(mut self, text: impl Into<String>) -> Self {
        self.decoration.watermark = text.into();
        self
    }

    /// Set the header text.
    pub fn with_header(mut self, text: impl Into<String>) -> Self {
        self.decoration.header = text.into();
        self
    }

    /// Set the footer text.
    pub fn with_footer(mut self, text: impl Into<String>) -> Self {
        self.decoration.footer = text.into();
        self
    }

    /// Enable or disable page numbers.
    pub fn with_page_numbers(mut self, enabled: bool) -> Self {
        self.decoration.show_page_numbers = enabled;
        self
    }

    /// Set the document title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_a4_geometry() {
        let g = PageGeometry::a4();
        assert!((g.width - 595.28).abs() < 0.01);
        assert!((g.height - 841.89).abs() < 0.01);
        assert!((g.content_width() - (595.28 - 85.04)).abs() < 0.01);
        assert!(!g.is_landscape());
    }

    #[test]
    fn test_font_size_scales_leading() {
        let g = PageGeometry::a4().with_font_size(22.0);
        assert_eq!(g.font_size, 22.0);
        assert_eq!(g.line_height, 34.0);
    }

    #[test]
    fn test_options_builder() {
        let options = ExportOptions::new()
            .with_watermark("DRAFT")
            .with_header("Acme")
            .with_page_numbers(true)
            .with_geometry(PageGeometry::letter());

        assert_eq!(options.decoration.watermark_text(), Some("DRAFT"));
        assert_eq!(options.decoration.header_text(), Some("Acme"));
        assert!(options.decoration.show_page_numbers);
        assert_eq!(options.geometry.width, 612.0);
    }
}
