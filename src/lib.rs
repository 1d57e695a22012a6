//! # smartpdf
//!
//! PDF analysis, AI-assisted editing and multi-format export.
//!
//! A PDF is sent to a generative-AI service that extracts its text and
//! summary statistics. The text becomes an editable rich-text
//! [`ContentModel`], which can be reworked with AI actions (summarize,
//! translate, redact, ...) and exported as PDF, Word-compatible HTML, CSV or
//! plain text.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use smartpdf::export::{ExportFormat, ExportOptions};
//! use smartpdf::gateway::{Action, GeminiClient};
//! use smartpdf::session::{Session, UploadedFile};
//!
//! #[tokio::main]
//! async fn main() -> smartpdf::Result<()> {
//!     let session = Session::new(Arc::new(GeminiClient::from_env()?));
//!     session.select_file(UploadedFile::from_path("report.pdf")).await?;
//!
//!     session.transform(&Action::Summarize).await?;
//!
//!     let options = ExportOptions::new()
//!         .with_watermark("CONFIDENTIAL")
//!         .with_page_numbers(true);
//!     let pdf = session.export(ExportFormat::Pdf, &options)?;
//!     pdf.save_to_dir(".")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Rich-text model**: marks, links, alignment and inline images with
//!   explicit range-based editing
//! - **AI actions**: 27 fixed instructions over one service contract
//! - **Export**: paginated PDF with header, footer, page numbers and
//!   watermark; `.doc` HTML; CSV statistics; plain text
//! - **Gemini client**: REST implementation of [`AiService`] (feature
//!   `gemini`, on by default)

pub mod detect;
pub mod error;
pub mod export;
pub mod gateway;
pub mod model;
pub mod session;

// Re-export commonly used types
pub use detect::{detect_format_from_bytes, is_accepted_type, is_pdf_bytes, PdfFormat};
pub use error::{Error, ErrorKind, Result};
pub use export::{
    ExportArtifact, ExportFormat, ExportInput, ExportOptions, ExportWarning, Exporter,
    ExporterRegistry, PageGeometry,
};
pub use gateway::{Action, ActionGroup, AiService, TransformGateway};
#[cfg(feature = "gemini")]
pub use gateway::{GeminiClient, GeminiConfig};
pub use model::{
    Alignment, AnalysisResult, Block, ChartItem, ContentModel, DocRange, ImageKind, MarkKind,
    PageDecoration, Position,
};
pub use session::{Session, SessionStatus, UploadedFile};

use std::path::Path;

/// Analyze a PDF file with an AI service.
///
/// The file must start with the PDF signature.
///
/// # Example
///
/// ```no_run
/// use smartpdf::{analyze_file, GeminiClient};
///
/// # async fn run() -> smartpdf::Result<()> {
/// let client = GeminiClient::from_env()?;
/// let analysis = analyze_file(&client, "report.pdf").await?;
/// println!("{}", analysis.summary());
/// # Ok(())
/// # }
/// ```
pub async fn analyze_file<S, P>(service: &S, path: P) -> Result<AnalysisResult>
where
    S: AiService + ?Sized,
    P: AsRef<Path>,
{
    let data = tokio::fs::read(path.as_ref()).await?;
    analyze_bytes(service, &data).await
}

/// Analyze PDF bytes with an AI service.
pub async fn analyze_bytes<S>(service: &S, data: &[u8]) -> Result<AnalysisResult>
where
    S: AiService + ?Sized,
{
    let format = detect_format_from_bytes(data)?;
    log::debug!("analyzing {} ({} bytes)", format, data.len());
    service.analyze(data).await
}

/// Export plain text in a format.
///
/// The text is segmented into paragraphs the same way extracted text is.
///
/// # Example
///
/// ```
/// use smartpdf::{export_text, ExportFormat, ExportOptions};
///
/// let artifact = export_text("Hello\nWorld", ExportFormat::Text, &ExportOptions::default())?;
/// assert_eq!(artifact.bytes, b"Hello\nWorld");
/// # Ok::<(), smartpdf::Error>(())
/// ```
pub fn export_text(
    text: &str,
    format: ExportFormat,
    options: &ExportOptions,
) -> Result<ExportArtifact> {
    let content = ContentModel::from_text(text);
    export::export(format, &ExportInput::new(&content), options)
}

/// Export an analysis result, using its extracted text as the content.
///
/// This is the only convenience function that can produce CSV.
pub fn export_analysis(
    analysis: &AnalysisResult,
    format: ExportFormat,
    options: &ExportOptions,
) -> Result<ExportArtifact> {
    let content = ContentModel::from_text(analysis.full_text());
    export::export(
        format,
        &ExportInput::new(&content).with_analysis(analysis),
        options,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_text_formats() {
        let options = ExportOptions::default();
        let txt = export_text("a\n\nb", ExportFormat::Text, &options).unwrap();
        assert_eq!(txt.as_text(), Some("a\n\nb"));

        let doc = export_text("a", ExportFormat::Doc, &options).unwrap();
        assert!(doc.as_text().unwrap().contains("<p>a</p>"));

        assert!(export_text("a", ExportFormat::Csv, &options).is_err());
    }

    #[test]
    fn test_export_analysis_csv() {
        let analysis = AnalysisResult::new("body", "sum");
        let csv = export_analysis(&analysis, ExportFormat::Csv, &ExportOptions::default()).unwrap();
        let text = csv.as_text().unwrap();
        assert!(text.starts_with("\"Summary\",\"sum\""));
        assert!(text.ends_with("\"Edited Text\",\"body\""));
    }
}
