//! Word-compatible HTML export.

use crate::error::Result;

use super::markup::to_markup;
use super::{ExportArtifact, ExportFormat, ExportInput, ExportOptions, Exporter};

const DOC_HEADER: &str = "<html xmlns:o='urn:schemas-microsoft-com:office:office' \
xmlns:w='urn:schemas-microsoft-com:office:word' \
xmlns='http://www.w3.org/TR/REC-html40'>\
<head><meta charset='utf-8'><title>Export HTML To Doc</title></head><body>";

const DOC_FOOTER: &str = "</body></html>";

/// Wraps the markup snapshot in an HTML document that word processors open
/// as a `.doc` file. Page decoration is ignored.
#[derive(Debug, Default)]
pub struct DocExporter;

impl DocExporter {
    /// Create a new office exporter.
    pub fn new() -> Self {
        Self
    }
}

impl Exporter for DocExporter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Doc
    }

    fn export(&self, input: &ExportInput<'_>, _options: &ExportOptions) -> Result<ExportArtifact> {
        let body = to_markup(input.content);
        let mut html = String::with_capacity(DOC_HEADER.len() + body.len() + 128);
        html.push_str(DOC_HEADER);
        html.push_str("<div style=\"font-family: Arial; font-size: 11pt;\">");
        html.push_str(&body);
        html.push_str("</div>");
        html.push_str(DOC_FOOTER);

        Ok(ExportArtifact::new(
            html.into_bytes(),
            ExportFormat::Doc.mime_type(),
            ExportFormat::Doc.default_filename(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ContentModel;

    #[test]
    fn test_doc_wrapper() {
        let content = ContentModel::from_text("Café <ok>");
        let artifact = DocExporter::new()
            .export(
                &ExportInput::new(&content),
                &ExportOptions::new().with_watermark("IGNORED"),
            )
            .unwrap();
        let html = artifact.as_text().unwrap();

        assert!(html.starts_with("<html xmlns:o='urn:schemas-microsoft-com:office:office'"));
        assert!(html.contains("<meta charset='utf-8'>"));
        assert!(html.contains("font-family: Arial; font-size: 11pt;"));
        assert!(html.contains("<p>Café &lt;ok&gt;</p>"));
        assert!(!html.contains("IGNORED"));
        assert!(html.ends_with("</body></html>"));
        assert_eq!(artifact.mime_type, "application/vnd.ms-word");
        assert_eq!(artifact.filename, "smart-pdf-edit.doc");
    }
}
