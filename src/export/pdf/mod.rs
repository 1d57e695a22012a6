//! Paginated PDF export.
//!
//! Rendering runs in two phases: the layout pass breaks lines and assigns
//! content to pages, then the writer draws each page plus its decoration.
//! Text uses the standard Helvetica faces with WinAnsi encoding, so no font
//! files are embedded.
//!
//! Characters outside WinAnsi are drawn as `?` and reported with
//! [`ExportWarning::CharacterSubstitution`](super::ExportWarning); the page
//! decoration is still drawn. When structured rendering fails (an image that
//! cannot be decoded) the exporter falls back to the plain-text projection
//! without decoration and reports
//! [`ExportWarning::RenderDegradation`](super::ExportWarning).

mod fonts;
mod images;
mod layout;
mod writer;

use std::collections::HashMap;

use crate::error::Result;
use crate::model::{Block, ContentModel, InlineContent, PageDecoration};

use super::{ExportArtifact, ExportFormat, ExportInput, ExportOptions, ExportWarning, Exporter};
use writer::WriteSettings;

/// PDF exporter.
#[derive(Debug, Default)]
pub struct PdfExporter;

impl PdfExporter {
    /// Create a new PDF exporter.
    pub fn new() -> Self {
        Self
    }

    fn render_structured(
        &self,
        content: &ContentModel,
        options: &ExportOptions,
    ) -> Result<(Vec<u8>, usize)> {
        let images = images::prepare_all(content)?;
        let pages = layout::layout(content, &options.geometry, &images)?;
        let decoration = (!options.decoration.is_empty()).then_some(&options.decoration);
        let bytes = writer::write_pdf(
            &pages,
            &images,
            WriteSettings {
                geometry: &options.geometry,
                decoration,
                title: options.title.as_deref(),
            },
        )?;
        Ok((bytes, pages.len()))
    }

    fn render_plain(&self, text: &str, options: &ExportOptions) -> Result<(Vec<u8>, usize)> {
        let plain = ContentModel::from_text(text);
        let no_images = HashMap::new();
        let pages = layout::layout(&plain, &options.geometry, &no_images)?;
        let bytes = writer::write_pdf(
            &pages,
            &no_images,
            WriteSettings {
                geometry: &options.geometry,
                decoration: None,
                title: options.title.as_deref(),
            },
        )?;
        Ok((bytes, pages.len()))
    }
}

/// Characters of the body and the decoration that will be drawn as `?`.
fn substitutions(content: &ContentModel, decoration: &PageDecoration) -> usize {
    let body: usize = content
        .blocks()
        .iter()
        .filter_map(Block::as_paragraph)
        .flat_map(|p| p.content.iter())
        .map(|item| match item {
            InlineContent::Text(run) => fonts::unencodable_count(&run.text),
            InlineContent::Image(_) => 0,
        })
        .sum();
    let decoration: usize = [&decoration.header, &decoration.footer, &decoration.watermark]
        .iter()
        .map(|text| fonts::unencodable_count(text))
        .sum();
    body + decoration
}

impl Exporter for PdfExporter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Pdf
    }

    fn export(&self, input: &ExportInput<'_>, options: &ExportOptions) -> Result<ExportArtifact> {
        let (bytes, pages, warning) = match self.render_structured(input.content, options) {
            Ok((bytes, pages)) => {
                let count = substitutions(input.content, &options.decoration);
                let warning = (count > 0).then_some(ExportWarning::CharacterSubstitution { count });
                (bytes, pages, warning)
            }
            Err(e) => {
                log::warn!("structured PDF rendering failed, using plain text: {}", e);
                let (bytes, pages) = self.render_plain(&input.content.plain_text(), options)?;
                let warning = ExportWarning::RenderDegradation {
                    reason: e.to_string(),
                };
                (bytes, pages, Some(warning))
            }
        };

        let mut artifact = ExportArtifact::new(
            bytes,
            ExportFormat::Pdf.mime_type(),
            ExportFormat::Pdf.default_filename(),
        )
        .with_page_count(pages);
        if let Some(warning) = warning {
            artifact = artifact.with_warning(warning);
        }
        Ok(artifact)
    }
}
