//! Plain text export.

use crate::error::Result;

use super::{ExportArtifact, ExportFormat, ExportInput, ExportOptions, Exporter};

/// Exports exactly the plain-text projection.
#[derive(Debug, Default)]
pub struct TextExporter;

impl TextExporter {
    /// Create a new text exporter.
    pub fn new() -> Self {
        Self
    }
}

impl Exporter for TextExporter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Text
    }

    fn export(&self, input: &ExportInput<'_>, _options: &ExportOptions) -> Result<ExportArtifact> {
        let text = input.content.plain_text();
        Ok(ExportArtifact::new(
            text.into_bytes(),
            ExportFormat::Text.mime_type(),
            ExportFormat::Text.default_filename(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ContentModel, DocRange, MarkKind};

    #[test]
    fn test_text_is_projection() {
        let mut content = ContentModel::from_text("Hello\n\nWorld");
        content.apply_mark(DocRange::within(0, 0, 5), MarkKind::Redact);

        let artifact = TextExporter::new()
            .export(&ExportInput::new(&content), &ExportOptions::default())
            .unwrap();

        assert_eq!(artifact.as_text(), Some("Hello\n\nWorld"));
        assert_eq!(artifact.filename, "smart-pdf-edit.txt");
        assert_eq!(artifact.mime_type, "text/plain");
    }
}
