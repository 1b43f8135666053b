//! Bidscope command-line interface

mod report;

use anyhow::{Context, Result, anyhow};
use bidscope::export::{CSV_FALLBACK_STEM, JSON_FALLBACK_STEM, file_stem, line_items_csv, to_json_pretty};
use bidscope::{
    AnalyzeOptions, BidAnalysis, BidscopeConfig, BidscopeError, ExtractionClient, GeminiCapability, Session,
    SessionEvent, UploadedDocument, aggregate, bid_analysis_schema,
};
use chrono::NaiveDate;
use clap::{ArgGroup, Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "bidscope")]
#[command(about = "Structured analysis of government bid solicitations", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (TOML, YAML, or JSON); default: discover bidscope.toml
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze bid text or documents and print a report
    #[command(group(ArgGroup::new("input").required(true).args(["files", "text", "text_file", "stdin"])))]
    Analyze {
        /// Documents to analyze (PDF, DOCX, XLSX, XLS, TXT, MD)
        files: Vec<PathBuf>,

        /// Bid text to analyze
        #[arg(long)]
        text: Option<String>,

        /// Read bid text from a file
        #[arg(long)]
        text_file: Option<PathBuf>,

        /// Read bid text from standard input
        #[arg(long)]
        stdin: bool,

        /// Send a single non-text document as-is instead of decoding it
        #[arg(long)]
        inline: bool,

        /// Reference date for deadline checks (YYYY-MM-DD, default: today UTC)
        #[arg(long, value_parser = parse_date)]
        reference_date: Option<NaiveDate>,

        /// Write the full analysis as JSON (file or directory)
        #[arg(long)]
        json_out: Option<PathBuf>,

        /// Write the line items as CSV (file or directory)
        #[arg(long)]
        csv_out: Option<PathBuf>,
    },

    /// Print the combined text of documents without calling the model
    Decode {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Print the response schema declared to the model
    Schema,
}

fn parse_date(value: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {}", e))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Analyze {
            files,
            text,
            text_file,
            stdin,
            inline,
            reference_date,
            json_out,
            csv_out,
        } => {
            let mut session = Session::new(config.clone());

            let text = if let Some(text) = text {
                Some(text)
            } else if let Some(path) = text_file {
                Some(
                    tokio::fs::read_to_string(&path)
                        .await
                        .with_context(|| format!("Failed to read {}", path.display()))?,
                )
            } else if stdin {
                let mut buffer = String::new();
                std::io::stdin()
                    .read_to_string(&mut buffer)
                    .context("Failed to read standard input")?;
                Some(buffer)
            } else {
                None
            };

            match text {
                Some(text) => session.apply(SessionEvent::EnterText(text))?,
                None => session.apply(SessionEvent::AttachFiles(read_uploads(&files).await?))?,
            }

            let client = ExtractionClient::new(GeminiCapability::from_config(&config)?);
            let options = AnalyzeOptions {
                inline_single_file: inline,
                reference_date,
            };

            let outcome = session.analyze(&client, &options).await;
            for failure in session.last_decode_failures() {
                eprintln!("warning: skipped {}", failure);
            }

            let analysis = match outcome {
                Ok(analysis) => analysis,
                Err(error) => {
                    if let BidscopeError::NoDecodedDocuments { failures } = error.as_ref() {
                        for failure in failures {
                            eprintln!("error: {}", failure);
                        }
                    }
                    return Err(anyhow!("{}", error));
                }
            };

            print!("{}", report::render(&analysis)?);
            write_exports(&analysis, json_out.as_deref(), csv_out.as_deref()).await?;
            Ok(())
        }

        Commands::Decode { files } => {
            let outcome = aggregate(read_uploads(&files).await?, &config).await;
            for failure in &outcome.failures {
                eprintln!("warning: skipped {}", failure);
            }
            let text = outcome
                .combined_text()
                .ok_or_else(|| anyhow!("None of the {} document(s) could be read", files.len()))?;
            println!("{}", text);
            Ok(())
        }

        Commands::Schema => {
            println!("{}", serde_json::to_string_pretty(bid_analysis_schema())?);
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<BidscopeConfig> {
    let config = match path {
        Some(path) => BidscopeConfig::from_file(path)?,
        None => BidscopeConfig::discover()?.unwrap_or_default(),
    };
    tracing::debug!(model = %config.model, base_url = %config.base_url, "Loaded configuration");
    Ok(config)
}

/// Read local files as uploads, guessing the declared type from the extension.
async fn read_uploads(paths: &[PathBuf]) -> Result<Vec<UploadedDocument>> {
    let mut uploads = Vec::with_capacity(paths.len());
    for path in paths {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let declared_type = mime_guess::from_path(path)
            .first()
            .map(|mime| mime.essence_str().to_string())
            .unwrap_or_default();
        uploads.push(UploadedDocument::new(name, bytes, declared_type));
    }
    Ok(uploads)
}

async fn write_exports(analysis: &BidAnalysis, json_out: Option<&Path>, csv_out: Option<&Path>) -> Result<()> {
    if let Some(target) = json_out {
        let path = export_path(target, &file_stem(analysis, JSON_FALLBACK_STEM), "json");
        tokio::fs::write(&path, to_json_pretty(analysis)?)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        eprintln!("wrote {}", path.display());
    }

    if let Some(target) = csv_out {
        match line_items_csv(analysis) {
            Some(csv) => {
                let path = export_path(target, &file_stem(analysis, CSV_FALLBACK_STEM), "csv");
                tokio::fs::write(&path, csv)
                    .await
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                eprintln!("wrote {}", path.display());
            }
            None => eprintln!("no line items; CSV not written"),
        }
    }

    Ok(())
}

/// A directory target receives `<stem>.<extension>`; any other path is used as given.
fn export_path(target: &Path, stem: &str, extension: &str) -> PathBuf {
    if target.is_dir() {
        target.join(format!("{}.{}", stem, extension))
    } else {
        target.to_path_buf()
    }
}
