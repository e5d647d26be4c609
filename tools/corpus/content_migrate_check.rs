//! Convert stored HTML files to Markdown and flag the ones that need review
//!
//! Usage:
//!   content-migrate-check article.html
//!   content-migrate-check --json --style house.toml exports/*.html
//!
//! Exits 1 when any file fails the conversion or Markdown checks, 2 on
//! usage or I/O errors.

use clap::Parser;
use cms_markdown_converter::validator::validate_markdown;
use cms_markdown_converter::{ConversionOptions, ConversionReport, MarkdownConverter};
use serde::Serialize;
use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(version, about = "Convert HTML files to Markdown and report conversion confidence")]
struct Cli {
    /// HTML files to convert
    #[arg(required = true, value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Print one JSON report per file instead of the Markdown
    #[arg(long)]
    json: bool,

    /// TOML file with Markdown style options
    #[arg(short, long, value_name = "TOML")]
    style: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FileReport<'a> {
    file: String,
    needs_review: bool,
    report: &'a ConversionReport,
    markdown_errors: &'a [String],
    html_bytes: usize,
    markdown_bytes: usize,
    savings_percent: f64,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    let config = ConfigBuilder::new().build();
    if let Err(e) = TermLogger::init(level, config, TerminalMode::Stderr, ColorChoice::Auto) {
        eprintln!("failed to initialize logger: {e}");
    }

    let options = match &cli.style {
        Some(path) => match ConversionOptions::from_toml_file(path) {
            Ok(options) => options,
            Err(e) => {
                log::error!("{}: {}", path.display(), e);
                return ExitCode::from(2);
            }
        },
        None => ConversionOptions::default(),
    };
    let converter = MarkdownConverter::with_options(options);

    let mut flagged = 0usize;
    for (index, path) in cli.files.iter().enumerate() {
        let html = match std::fs::read_to_string(path) {
            Ok(html) => html,
            Err(e) => {
                log::error!("{}: {}", path.display(), e);
                return ExitCode::from(2);
            }
        };

        let conversion = converter.convert(Some(&html));
        let report = ConversionReport::from_conversion(&html, &conversion);
        let markdown = conversion.into_markdown();
        let markdown_check = validate_markdown(Some(&markdown));
        let needs_review = !report.is_valid || !markdown_check.is_valid;

        if needs_review {
            flagged += 1;
            log::warn!(
                "{}: needs review ({}% similarity)",
                path.display(),
                report.similarity_percent()
            );
            for warning in report.warnings.iter().chain(&markdown_check.errors) {
                log::warn!("{}:   {}", path.display(), warning);
            }
        } else {
            log::info!(
                "{}: converted ({}% similarity)",
                path.display(),
                report.similarity_percent()
            );
        }

        if cli.json {
            let file_report = FileReport {
                file: path.display().to_string(),
                needs_review,
                report: &report,
                markdown_errors: &markdown_check.errors,
                html_bytes: html.len(),
                markdown_bytes: markdown.len(),
                savings_percent: savings_percent(html.len(), markdown.len()),
            };
            match serde_json::to_string(&file_report) {
                Ok(line) => println!("{line}"),
                Err(e) => {
                    log::error!("{}: {}", path.display(), e);
                    return ExitCode::from(2);
                }
            }
        } else {
            if cli.files.len() > 1 {
                if index > 0 {
                    println!();
                }
                println!("==> {} <==", path.display());
            }
            println!("{markdown}");
        }
    }

    log::info!("{} of {} files need review", flagged, cli.files.len());

    if flagged > 0 {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}

fn savings_percent(html_bytes: usize, markdown_bytes: usize) -> f64 {
    if html_bytes == 0 {
        return 0.0;
    }
    let saved = html_bytes.saturating_sub(markdown_bytes) as f64 / html_bytes as f64;
    (saved * 1000.0).round() / 10.0
}
