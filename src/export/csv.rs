//! CSV export of the analysis together with the edited text.

use crate::error::{Error, Result};
use crate::model::AnalysisResult;

use super::{ExportArtifact, ExportFormat, ExportInput, ExportOptions, Exporter};

/// Writes summary statistics, keyword and topic tables and the edited text.
///
/// Every cell is quoted with internal quotes doubled; cells are joined by
/// `,` and rows by `\n`.
#[derive(Debug, Default)]
pub struct CsvExporter;

impl CsvExporter {
    /// Create a new CSV exporter.
    pub fn new() -> Self {
        Self
    }
}

impl Exporter for CsvExporter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Csv
    }

    fn export(&self, input: &ExportInput<'_>, _options: &ExportOptions) -> Result<ExportArtifact> {
        let analysis = input.analysis.ok_or_else(|| {
            Error::Validation("CSV export requires an analysis result".to_string())
        })?;
        let csv = to_csv(analysis, &input.content.plain_text());
        Ok(ExportArtifact::new(
            csv.into_bytes(),
            ExportFormat::Csv.mime_type(),
            ExportFormat::Csv.default_filename(),
        ))
    }
}

/// Build the CSV document.
pub fn to_csv(analysis: &AnalysisResult, edited_text: &str) -> String {
    let mut rows: Vec<Vec<String>> = vec![
        vec!["Summary".into(), analysis.summary().into()],
        vec![
            "Reading Time".into(),
            format!("{} min", analysis.reading_time_min()),
        ],
        vec![
            "Sentiment".into(),
            format!(
                "{} ({}%)",
                analysis.sentiment_label(),
                analysis.sentiment_score()
            ),
        ],
        vec!["Entity Count".into(), analysis.entity_count().to_string()],
        Vec::new(),
        vec!["Keyword".into(), "Frequency".into()],
    ];
    rows.extend(
        analysis
            .keywords()
            .iter()
            .map(|k| vec![k.name.clone(), k.value.to_string()]),
    );
    rows.push(Vec::new());
    rows.push(vec!["Topic".into(), "Relevance".into()]);
    rows.extend(
        analysis
            .topics()
            .iter()
            .map(|t| vec![t.name.clone(), t.value.to_string()]),
    );
    rows.push(Vec::new());
    rows.push(vec!["Edited Text".into(), edited_text.into()]);

    rows.iter()
        .map(|row| {
            row.iter()
                .map(|cell| quote(cell))
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn quote(cell: &str) -> String {
    format!("\"{}\"", cell.replace('"', "\"\""))
}
