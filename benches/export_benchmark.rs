//! Benchmarks for smartpdf export performance.
//!
//! Run with: cargo bench
//!
//! These benchmarks export synthetic content of increasing size.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use smartpdf::export::{ExportFormat, ExportInput, ExportOptions, ExporterRegistry};
use smartpdf::model::{AnalysisResult, ChartItem, ContentModel, DocRange, MarkKind};

/// Creates synthetic text with the given number of paragraphs.
fn create_test_text(paragraphs: usize) -> String {
    (0..paragraphs)
        .map(|i| {
            format!(
                "Paragraph {} - benchmark content for smartpdf export measurement. \
                 It is long enough to wrap across several lines of an A4 page.",
                i + 1
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn create_test_content(paragraphs: usize) -> ContentModel {
    let mut content = ContentModel::from_text(&create_test_text(paragraphs));
    for block in (0..content.block_count()).step_by(4) {
        content.apply_mark(DocRange::within(block, 0, 9), MarkKind::Bold);
    }
    content
}

/// Benchmark plain-text segmentation.
fn bench_from_text(c: &mut Criterion) {
    let text = create_test_text(200);
    c.bench_function("content_from_text", |b| {
        b.iter(|| ContentModel::from_text(black_box(&text)));
    });
}

/// Benchmark PDF export at various sizes.
fn bench_pdf_export(c: &mut Criterion) {
    let registry = ExporterRegistry::with_defaults();
    let options = ExportOptions::new()
        .with_watermark("CONFIDENTIAL")
        .with_header("Benchmark")
        .with_page_numbers(true);
    let mut group = c.benchmark_group("pdf_export");

    for paragraphs in [10, 100, 500].iter() {
        let content = create_test_content(*paragraphs);

        group.bench_function(format!("{}_paragraphs", paragraphs), |b| {
            b.iter(|| {
                registry
                    .export(ExportFormat::Pdf, &ExportInput::new(black_box(&content)), &options)
                    .unwrap()
            });
        });
    }

    group.finish();
}

/// Benchmark the text-based formats.
fn bench_text_formats(c: &mut Criterion) {
    let registry = ExporterRegistry::with_defaults();
    let options = ExportOptions::default();
    let content = create_test_content(200);
    let analysis = AnalysisResult::new(content.plain_text(), "summary")
        .with_keywords(vec![ChartItem::new("benchmark", 12.0)])
        .with_topics(vec![ChartItem::new("Performance", 100.0)]);
    let input = ExportInput::new(&content).with_analysis(&analysis);

    for format in [ExportFormat::Doc, ExportFormat::Csv, ExportFormat::Text] {
        c.bench_function(&format!("export_{}", format), |b| {
            b.iter(|| registry.export(format, black_box(&input), &options).unwrap());
        });
    }
}

criterion_group!(benches, bench_from_text, bench_pdf_export, bench_text_formats);
criterion_main!(benches);
