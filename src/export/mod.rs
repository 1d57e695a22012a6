//! Export engine with a pluggable exporter registry.
//!
//! Each exporter turns the content model (plus the analysis, for CSV) into a
//! named artifact. Exporters are read-only on their inputs.
//!
//! # Example
//!
//! ```
//! use smartpdf::export::{ExportFormat, ExportInput, ExportOptions, ExporterRegistry};
//! use smartpdf::model::ContentModel;
//!
//! fn main() -> smartpdf::Result<()> {
//!     let registry = ExporterRegistry::with_defaults();
//!     let content = ContentModel::from_text("Hello");
//!
//!     let artifact = registry.export(
//!         ExportFormat::Text,
//!         &ExportInput::new(&content),
//!         &ExportOptions::default(),
//!     )?;
//!     assert_eq!(artifact.bytes, b"Hello");
//!     Ok(())
//! }
//! ```

mod csv;
mod doc;
pub mod markup;
mod options;
mod pdf;
mod result;
mod text;

pub use self::csv::{to_csv, CsvExporter};
pub use doc::DocExporter;
pub use options::{ExportOptions, PageGeometry, MM_TO_PT};
pub use pdf::PdfExporter;
pub use result::{ExportArtifact, ExportWarning};
pub use text::TextExporter;

use crate::error::{Error, Result};
use crate::model::{AnalysisResult, ContentModel};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    /// Paginated PDF with decoration
    Pdf,
    /// Word-compatible HTML
    Doc,
    /// Analysis data and edited text
    Csv,
    /// Plain text projection
    Text,
}

impl ExportFormat {
    /// All formats.
    pub const ALL: [ExportFormat; 4] = [
        ExportFormat::Pdf,
        ExportFormat::Doc,
        ExportFormat::Csv,
        ExportFormat::Text,
    ];

    /// Short name.
    pub fn name(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Doc => "doc",
            ExportFormat::Csv => "csv",
            ExportFormat::Text => "txt",
        }
    }

    /// File extensions the format is registered under.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            ExportFormat::Pdf => &["pdf"],
            ExportFormat::Doc => &["doc", "html"],
            ExportFormat::Csv => &["csv"],
            ExportFormat::Text => &["txt", "text"],
        }
    }

    /// MIME type of the artifact.
    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Doc => "application/vnd.ms-word",
            ExportFormat::Csv => "text/csv",
            ExportFormat::Text => "text/plain",
        }
    }

    /// Default download filename.
    pub fn default_filename(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "smart-pdf-edit.pdf",
            ExportFormat::Doc => "smart-pdf-edit.doc",
            ExportFormat::Csv => "smart-pdf-data.csv",
            ExportFormat::Text => "smart-pdf-edit.txt",
        }
    }

    /// Whether the format needs an analysis result.
    pub fn needs_analysis(self) -> bool {
        matches!(self, ExportFormat::Csv)
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().trim_start_matches('.').to_lowercase();
        ExportFormat::ALL
            .into_iter()
            .find(|f| f.name() == lower || f.extensions().contains(&lower.as_str()))
            .ok_or_else(|| Error::UnsupportedFormat(s.to_string()))
    }
}

/// Inputs shared by all exporters.
#[derive(Debug, Clone, Copy)]
pub struct ExportInput<'a> {
    /// Content to export
    pub content: &'a ContentModel,

    /// Analysis result, required by CSV
    pub analysis: Option<&'a AnalysisResult>,
}

impl<'a> ExportInput<'a> {
    /// Input with content only.
    pub fn new(content: &'a ContentModel) -> Self {
        Self {
            content,
            analysis: None,
        }
    }

    /// Attach the analysis result.
    pub fn with_analysis(mut self, analysis: &'a AnalysisResult) -> Self {
        self.analysis = Some(analysis);
        self
    }
}

/// Trait for exporters.
///
/// Implement this trait to add a new output format.
pub trait Exporter: Send + Sync {
    /// The format this exporter produces.
    fn format(&self) -> ExportFormat;

    /// Name used for lookup. Defaults to the format name.
    fn name(&self) -> &str {
        self.format().name()
    }

    /// Extensions used for lookup. Lowercase, without the leading dot.
    fn supported_extensions(&self) -> &[&str] {
        self.format().extensions()
    }

    /// Produce the artifact.
    fn export(&self, input: &ExportInput<'_>, options: &ExportOptions) -> Result<ExportArtifact>;

    /// Check if this exporter handles the given extension.
    fn supports_extension(&self, ext: &str) -> bool {
        let ext_lower = ext.to_lowercase();
        self.supported_extensions().iter().any(|e| *e == ext_lower)
    }
}

/// Registry of exporters keyed by name and extension.
pub struct ExporterRegistry {
    by_extension: HashMap<String, Arc<dyn Exporter>>,
    by_name: HashMap<String, Arc<dyn Exporter>>,
    by_format: HashMap<ExportFormat, Arc<dyn Exporter>>,
}

impl ExporterRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            by_extension: HashMap::new(),
            by_name: HashMap::new(),
            by_format: HashMap::new(),
        }
    }

    /// Create a registry with the four built-in exporters.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(PdfExporter::new()));
        registry.register(Arc::new(DocExporter::new()));
        registry.register(Arc::new(CsvExporter::new()));
        registry.register(Arc::new(TextExporter::new()));
        registry
    }

    /// Register an exporter, replacing any previous one for the same keys.
    pub fn register(&mut self, exporter: Arc<dyn Exporter>) {
        for ext in exporter.supported_extensions() {
            self.by_extension
                .insert(ext.to_lowercase(), exporter.clone());
        }
        self.by_name
            .insert(exporter.name().to_lowercase(), exporter.clone());
        self.by_format.insert(exporter.format(), exporter);
    }

    /// Get an exporter by format.
    pub fn get(&self, format: ExportFormat) -> Option<Arc<dyn Exporter>> {
        self.by_format.get(&format).cloned()
    }

    /// Get an exporter by file extension.
    pub fn get_by_extension(&self, ext: &str) -> Option<Arc<dyn Exporter>> {
        self.by_extension.get(&ext.to_lowercase()).cloned()
    }

    /// Get an exporter by name.
    pub fn get_by_name(&self, name: &str) -> Option<Arc<dyn Exporter>> {
        self.by_name.get(&name.to_lowercase()).cloned()
    }

    /// Check if an extension is supported.
    pub fn supports(&self, ext: &str) -> bool {
        self.by_extension.contains_key(&ext.to_lowercase())
    }

    /// All registered extensions.
    pub fn supported_extensions(&self) -> Vec<&str> {
        self.by_extension.keys().map(|s| s.as_str()).collect()
    }

    /// Export with the exporter registered for a format.
    pub fn export(
        &self,
        format: ExportFormat,
        input: &ExportInput<'_>,
        options: &ExportOptions,
    ) -> Result<ExportArtifact> {
        let exporter = self
            .get(format)
            .ok_or_else(|| Error::UnsupportedFormat(format.to_string()))?;

        let artifact = exporter.export(input, options)?;
        log::info!(
            "exported {} ({} bytes{})",
            artifact.filename,
            artifact.len(),
            artifact
                .page_count
                .map(|n| format!(", {} page(s)", n))
                .unwrap_or_default()
        );
        for warning in &artifact.warnings {
            log::warn!("{}: {}", artifact.filename, warning);
        }
        Ok(artifact)
    }

    /// Export with the exporter registered for an extension or name.
    pub fn export_as(
        &self,
        key: &str,
        input: &ExportInput<'_>,
        options: &ExportOptions,
    ) -> Result<ExportArtifact> {
        let exporter = self
            .get_by_extension(key)
            .or_else(|| self.get_by_name(key))
            .ok_or_else(|| Error::UnsupportedFormat(key.to_string()))?;
        self.export(exporter.format(), input, options)
    }
}

impl Default for ExporterRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Export with the built-in exporters.
pub fn export(
    format: ExportFormat,
    input: &ExportInput<'_>,
    options: &ExportOptions,
) -> Result<ExportArtifact> {
    ExporterRegistry::with_defaults().export(format, input, options)
}
