//! smartpdf CLI - AI-assisted PDF analysis and export tool

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use smartpdf::export::{ExportFormat, ExportInput, ExportOptions, ExporterRegistry, PageGeometry};
use smartpdf::gateway::{Action, ActionGroup, GeminiClient, GeminiConfig};
use smartpdf::model::{AnalysisResult, ContentModel, PageDecoration};
use smartpdf::session::{Session, SessionStatus, UploadedFile};

#[derive(Parser)]
#[command(name = "smartpdf")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Analyze PDFs with AI, rework the text and export it", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract text and statistics from a PDF
    Analyze {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Save the analysis as JSON
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        #[command(flatten)]
        service: ServiceArgs,
    },

    /// Analyze a PDF, apply actions in order and export the result
    Process {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Action label (e.g. "Summarize", "Translate (Spanish)"); repeatable
        #[arg(short, long = "action", value_name = "LABEL")]
        actions: Vec<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "all")]
        format: FormatArg,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        #[command(flatten)]
        page: PageArgs,

        #[command(flatten)]
        service: ServiceArgs,
    },

    /// Export a saved analysis without calling the AI service
    Export {
        /// Analysis JSON written by `analyze -o`
        #[arg(long, value_name = "FILE")]
        analysis: PathBuf,

        /// Edited text to export instead of the extracted text
        #[arg(long, value_name = "FILE")]
        text: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "all")]
        format: FormatArg,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        #[command(flatten)]
        page: PageArgs,
    },

    /// List the available actions
    Actions,

    /// Show version information
    Version,
}

#[derive(Args)]
struct ServiceArgs {
    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Gemini model name
    #[arg(long, value_name = "MODEL")]
    model: Option<String>,
}

#[derive(Args)]
struct PageArgs {
    /// Page setup JSON (watermark, header, footer, showPageNumbers)
    #[arg(long, value_name = "FILE")]
    page_setup: Option<PathBuf>,

    /// Watermark text
    #[arg(long)]
    watermark: Option<String>,

    /// Header text
    #[arg(long)]
    header: Option<String>,

    /// Footer text
    #[arg(long)]
    footer: Option<String>,

    /// Print "Page i of N" on every page
    #[arg(long)]
    page_numbers: bool,

    /// Use US Letter instead of A4
    #[arg(long)]
    letter: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    /// Paginated PDF
    Pdf,
    /// Word-compatible HTML
    Doc,
    /// Analysis statistics and edited text
    Csv,
    /// Plain text
    Txt,
    /// Every format
    All,
}

impl FormatArg {
    fn formats(self) -> Vec<ExportFormat> {
        match self {
            FormatArg::Pdf => vec![ExportFormat::Pdf],
            FormatArg::Doc => vec![ExportFormat::Doc],
            FormatArg::Csv => vec![ExportFormat::Csv],
            FormatArg::Txt => vec![ExportFormat::Text],
            FormatArg::All => ExportFormat::ALL.to_vec(),
        }
    }
}

type CmdResult = Result<(), Box<dyn std::error::Error>>;

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Analyze {
            input,
            output,
            service,
        }) => cmd_analyze(&input, output.as_deref(), &service),
        Some(Commands::Process {
            input,
            actions,
            format,
            output,
            page,
            service,
        }) => cmd_process(&input, &actions, format, output.as_deref(), &page, &service),
        Some(Commands::Export {
            analysis,
            text,
            format,
            output,
            page,
        }) => cmd_export(&analysis, text.as_deref(), format, output.as_deref(), &page),
        Some(Commands::Actions) => {
            cmd_actions();
            Ok(())
        }
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            println!("{}", "Usage: smartpdf <COMMAND>".yellow());
            println!("       smartpdf --help for more information");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn build_session(args: &ServiceArgs) -> Result<Session, Box<dyn std::error::Error>> {
    let mut config = GeminiConfig::from_env();
    if let Some(key) = &args.api_key {
        config = config.with_api_key(key.clone());
    }
    if let Some(model) = &args.model {
        config = config.with_model(model.clone());
    }
    let client = GeminiClient::new(config)?;
    Ok(Session::new(Arc::new(client)))
}

fn export_options(
    page: &PageArgs,
    title: Option<&str>,
) -> Result<ExportOptions, Box<dyn std::error::Error>> {
    let mut decoration = match &page.page_setup {
        Some(path) => serde_json::from_str::<PageDecoration>(&fs::read_to_string(path)?)?,
        None => PageDecoration::default(),
    };
    if let Some(text) = &page.watermark {
        decoration.watermark = text.clone();
    }
    if let Some(text) = &page.header {
        decoration.header = text.clone();
    }
    if let Some(text) = &page.footer {
        decoration.footer = text.clone();
    }
    if page.page_numbers {
        decoration.show_page_numbers = true;
    }

    let geometry = if page.letter {
        PageGeometry::letter()
    } else {
        PageGeometry::a4()
    };
    let mut options = ExportOptions::new()
        .with_decoration(decoration)
        .with_geometry(geometry);
    if let Some(title) = title {
        options = options.with_title(title);
    }
    Ok(options)
}

/// Upload and analyze, feeding the session's progress into a bar.
async fn run_extraction(session: &Session, input: &Path) -> CmdResult {
    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}% {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    let task = {
        let session = session.clone();
        let file = UploadedFile::from_path(input);
        tokio::spawn(async move { session.select_file(file).await })
    };

    while !task.is_finished() {
        pb.set_message(match session.status() {
            SessionStatus::Uploading => "Reading file...",
            SessionStatus::Analyzing => "Analyzing with AI...",
            _ => "",
        });
        pb.set_position(session.progress() as u64);
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    let outcome = task.await?;
    match outcome {
        Ok(SessionStatus::Ready) => {
            pb.set_position(100);
            pb.finish_with_message("Done!");
            Ok(())
        }
        Ok(_) => {
            pb.abandon();
            let message = session
                .validation_message()
                .unwrap_or_else(|| "File was not processed".to_string());
            Err(message.into())
        }
        Err(e) => {
            pb.abandon();
            Err(e.user_message().into())
        }
    }
}

fn cmd_analyze(input: &Path, output: Option<&Path>, service: &ServiceArgs) -> CmdResult {
    let session = build_session(service)?;
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run_extraction(&session, input))?;

    let analysis = session
        .analysis()
        .ok_or("analysis finished without a result")?;
    print_analysis(input, &analysis);

    if let Some(path) = output {
        fs::write(path, analysis.to_json()?)?;
        println!("\n{} {}", "Saved to".green(), path.display());
    }
    Ok(())
}

fn cmd_process(
    input: &Path,
    actions: &[String],
    format: FormatArg,
    output: Option<&Path>,
    page: &PageArgs,
    service: &ServiceArgs,
) -> CmdResult {
    let session = build_session(service)?;
    let options = export_options(page, input.file_stem().and_then(|s| s.to_str()))?;
    let rt = tokio::runtime::Runtime::new()?;

    rt.block_on(async {
        run_extraction(&session, input).await?;
        log::debug!("applying {} action(s)", actions.len());

        for label in actions {
            let action = Action::parse(label);
            if matches!(action, Action::Other(_)) {
                println!(
                    "{} unknown action '{}', using the default instruction",
                    "Warning:".yellow(),
                    label
                );
            }
            let spinner = ProgressBar::new_spinner();
            spinner.enable_steady_tick(Duration::from_millis(100));
            spinner.set_message(format!("{}...", action.label()));
            session.transform(&action).await?;
            spinner.finish_with_message(format!("{} {}", "✓".green(), action.label()));
        }
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;

    let output_dir = output_dir(input, output);
    write_artifacts(&output_dir, format.formats(), |f| session.export(f, &options))
}

fn cmd_export(
    analysis_path: &Path,
    text: Option<&Path>,
    format: FormatArg,
    output: Option<&Path>,
    page: &PageArgs,
) -> CmdResult {
    let analysis = AnalysisResult::from_json(&fs::read_to_string(analysis_path)?)?;
    let options = export_options(page, None)?;

    let content = match text {
        Some(path) => ContentModel::from_text(&fs::read_to_string(path)?),
        None => ContentModel::from_text(analysis.full_text()),
    };
    log::debug!("exporting {} block(s) offline", content.block_count());

    let registry = ExporterRegistry::with_defaults();
    let input = ExportInput::new(&content).with_analysis(&analysis);
    let output_dir = output_dir(analysis_path, output);
    write_artifacts(&output_dir, format.formats(), |f| {
        registry.export(f, &input, &options)
    })
}

fn output_dir(input: &Path, output: Option<&Path>) -> PathBuf {
    output.map(|p| p.to_path_buf()).unwrap_or_else(|| {
        let stem = input.file_stem().unwrap_or_default().to_string_lossy();
        PathBuf::from(format!("{}_output", stem))
    })
}

fn write_artifacts(
    dir: &Path,
    formats: Vec<ExportFormat>,
    export: impl Fn(ExportFormat) -> smartpdf::Result<smartpdf::ExportArtifact>,
) -> CmdResult {
    fs::create_dir_all(dir)?;

    println!("\n{}", "Output files:".green().bold());
    let last = formats.len().saturating_sub(1);
    for (i, format) in formats.into_iter().enumerate() {
        let artifact = export(format)?;
        artifact.save_to_dir(dir)?;

        let branch = if i == last { "└─" } else { "├─" };
        let pages = artifact
            .page_count
            .map(|n| format!(" ({} page{})", n, if n == 1 { "" } else { "s" }))
            .unwrap_or_default();
        println!("  {} {}{}", branch.dimmed(), artifact.filename, pages);
        for warning in &artifact.warnings {
            println!("     {} {}", "Warning:".yellow(), warning);
        }
    }
    println!("\n{} {}", "Saved to".green(), dir.display());
    Ok(())
}

fn print_analysis(input: &Path, analysis: &AnalysisResult) {
    println!();
    println!("{}", "Document Analysis".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Summary".bold(), analysis.summary());
    println!(
        "{}: {} ({}%)",
        "Sentiment".bold(),
        analysis.sentiment_label(),
        analysis.sentiment_score()
    );
    println!("{}: {} min", "Reading time".bold(), analysis.reading_time_min());
    println!("{}: {}", "Entities".bold(), analysis.entity_count());

    if !analysis.keywords().is_empty() {
        println!();
        println!("{}", "Keywords".cyan().bold());
        for k in analysis.keywords() {
            println!("  {} {}", k.name, k.value.to_string().dimmed());
        }
    }
    if !analysis.topics().is_empty() {
        println!();
        println!("{}", "Topics".cyan().bold());
        for t in analysis.topics() {
            println!("  {} {}%", t.name, t.value);
        }
    }

    let stats = ContentModel::from_text(analysis.full_text()).stats();
    println!();
    println!("{}", "Content Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "Words".bold(), stats.words);
    println!("{}: {}", "Characters".bold(), stats.characters);
    println!("{}: {}", "Paragraphs".bold(), stats.paragraphs);
}

fn cmd_actions() {
    for group in ActionGroup::ALL {
        println!("{}", group.label().cyan().bold());
        for action in group.actions() {
            println!("  {:<24} {}", action.label(), action.instruction().dimmed());
        }
        println!();
    }
}

fn cmd_version() {
    println!("{} {}", "smartpdf".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("AI-assisted PDF analysis and export tool");
    println!();
    println!("Repository: {}", "https://github.com/iyulab/smartpdf".dimmed());
    println!("License: MIT");
}
