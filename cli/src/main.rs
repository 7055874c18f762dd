//! pdfnotes CLI - PDF annotation export tool

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdfnotes::export::{self, default_output_path};
use pdfnotes::{
    pipeline, ExportFormat, ExportOptions, ExtractOptions, Extraction, ExtractionSummary,
    HeadingStrategy, JsonFormat, LopdfBackend,
};

#[derive(Parser)]
#[command(name = "pdfnotes")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Export PDF annotations with the headings that contain them", long_about = None)]
struct Cli {
    /// Input PDF file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output file
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract annotations and export them
    Extract {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (<name>_annotations.<ext> next to the input if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "csv")]
        format: FormatArg,

        /// Heading source
        #[arg(long, value_enum, default_value = "auto")]
        headings: StrategyArg,

        /// Deepest heading level inferred from fonts (1-6)
        #[arg(long, default_value = "6", value_parser = clap::value_parser!(u8).range(1..=6))]
        max_level: u8,

        /// Separator between heading path levels
        #[arg(long, default_value = " > ")]
        separator: String,

        /// Drop annotations with neither comment nor highlighted text
        #[arg(long)]
        skip_empty: bool,

        /// Keep links, form widgets and other non-markup annotations
        #[arg(long)]
        include_non_markup: bool,

        /// Print to stdout instead of writing a file
        #[arg(long)]
        stdout: bool,

        /// Disable parallel processing
        #[arg(long)]
        sequential: bool,
    },

    /// Show the recovered heading outline
    Headings {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Heading source
        #[arg(long, value_enum, default_value = "auto")]
        headings: StrategyArg,

        /// Deepest heading level inferred from fonts (1-6)
        #[arg(long, default_value = "6", value_parser = clap::value_parser!(u8).range(1..=6))]
        max_level: u8,

        /// Print the headings as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    /// Comma-separated values
    Csv,
    /// Tab-separated values
    Tsv,
    /// JSON with headings, records and summary
    Json,
}

impl From<FormatArg> for ExportFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Csv => ExportFormat::Csv,
            FormatArg::Tsv => ExportFormat::Tsv,
            FormatArg::Json => ExportFormat::Json(JsonFormat::Pretty),
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum StrategyArg {
    /// Bookmarks when present, font heuristic otherwise
    Auto,
    /// Bookmarks only
    Outline,
    /// Font heuristic only
    Fonts,
}

impl From<StrategyArg> for HeadingStrategy {
    fn from(strategy: StrategyArg) -> Self {
        match strategy {
            StrategyArg::Auto => HeadingStrategy::Auto,
            StrategyArg::Outline => HeadingStrategy::Outline,
            StrategyArg::Fonts => HeadingStrategy::Fonts,
        }
    }
}

/// Settings of one `extract` run.
struct ExtractArgs {
    output: Option<PathBuf>,
    format: ExportFormat,
    separator: String,
    stdout: bool,
    options: ExtractOptions,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Extract {
            input,
            output,
            format,
            headings,
            max_level,
            separator,
            skip_empty,
            include_non_markup,
            stdout,
            sequential,
        }) => {
            let options = ExtractOptions::new()
                .lenient()
                .with_heading_strategy(headings.into())
                .with_max_level(max_level)
                .skip_empty(skip_empty)
                .include_non_markup(include_non_markup)
                .with_parallel(!sequential);
            cmd_extract(
                &input,
                ExtractArgs {
                    output,
                    format: format.into(),
                    separator,
                    stdout,
                    options,
                },
            )
        }
        Some(Commands::Headings {
            input,
            headings,
            max_level,
            json,
        }) => cmd_headings(&input, headings, max_level, json),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: extract to CSV if input is provided
            if let Some(input) = cli.input {
                let format = cli
                    .output
                    .as_deref()
                    .and_then(ExportFormat::from_path)
                    .unwrap_or_default();
                cmd_extract(
                    &input,
                    ExtractArgs {
                        output: cli.output,
                        format,
                        separator: export::DEFAULT_PATH_SEPARATOR.to_string(),
                        stdout: false,
                        options: ExtractOptions::new().lenient(),
                    },
                )
            } else {
                println!("{}", "Usage: pdfnotes <FILE> [OUTPUT]".yellow());
                println!("       pdfnotes --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(message);
    pb
}

fn cmd_extract(input: &Path, args: ExtractArgs) -> Result<(), Box<dyn std::error::Error>> {
    let pb = spinner("Reading PDF...");
    let backend = LopdfBackend::load_file(input)?;

    pb.set_message("Mapping annotations...");
    let extraction = pipeline::extract(&backend, &args.options)?;

    let export_options = ExportOptions::for_format(args.format).with_path_separator(args.separator);
    let content = export::render(&extraction, args.format, &export_options)?;
    pb.finish_and_clear();
    log::debug!("Rendered {} records as {}", extraction.records.len(), args.format.extension());

    if args.stdout {
        print!("{}", content);
        return Ok(());
    }

    let path = args
        .output
        .unwrap_or_else(|| default_output_path(input, args.format.extension()));
    fs::write(&path, &content)?;

    print_summary(&extraction);
    println!("{} {}", "Saved to".green(), path.display());

    Ok(())
}

fn print_summary(extraction: &Extraction) {
    let ExtractionSummary {
        page_count,
        heading_count,
        heading_source,
        annotation_count,
        skipped_annotations,
        ignored_annotations,
        empty_annotations,
        dropped_headings,
        unreadable_pages,
    } = &extraction.summary;

    println!("{}", "Extraction Summary".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "Pages".bold(), page_count);
    match heading_source {
        Some(source) => println!("{}: {} (from {})", "Headings".bold(), heading_count, source),
        None => println!("{}: {}", "Headings".bold(), "none".yellow()),
    }
    println!("{}: {}", "Annotations".bold(), annotation_count);

    let notes = [
        (*skipped_annotations, "annotations without position skipped"),
        (*ignored_annotations, "links, popups and widgets ignored"),
        (*empty_annotations, "empty annotations dropped"),
        (*dropped_headings, "bookmarks with no target dropped"),
        (*unreadable_pages, "unreadable pages skipped"),
    ];
    for (count, what) in notes {
        if count > 0 {
            println!("  {} {} {}", "•".dimmed(), count.to_string().yellow(), what);
        }
    }
    println!();
}

fn cmd_headings(
    input: &Path,
    strategy: StrategyArg,
    max_level: u8,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let backend = LopdfBackend::load_file(input)?;
    let options = ExtractOptions::new()
        .lenient()
        .with_heading_strategy(strategy.into())
        .with_max_level(max_level);
    let resolution = pipeline::headings(&backend, &options)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&resolution.headings)?);
        return Ok(());
    }

    match resolution.source {
        Some(source) => println!(
            "{} {}",
            "Headings from".cyan().bold(),
            source.to_string().cyan().bold()
        ),
        None => {
            println!("{}", "No headings found".yellow());
            return Ok(());
        }
    }
    println!("{}", "─".repeat(40).dimmed());

    for heading in &resolution.headings {
        let indent = "  ".repeat(heading.level.saturating_sub(1) as usize);
        println!(
            "{}{} {}",
            indent,
            heading.title,
            format!("(p. {})", heading.page() + 1).dimmed()
        );
    }

    if resolution.dropped > 0 {
        println!(
            "\n{} {} bookmarks with no target dropped",
            "•".dimmed(),
            resolution.dropped.to_string().yellow()
        );
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "pdfnotes".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("PDF annotation export tool");
    println!();
    println!("License: MIT");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_level_range() {
        let parsed = Cli::try_parse_from(["pdfnotes", "extract", "a.pdf", "--max-level", "3"]);
        match parsed.map(|cli| cli.command) {
            Ok(Some(Commands::Extract { max_level, .. })) => assert_eq!(max_level, 3),
            _ => panic!("expected an extract command"),
        }

        for bad in ["0", "7"] {
            assert!(Cli::try_parse_from(["pdfnotes", "extract", "a.pdf", "--max-level", bad]).is_err());
            assert!(Cli::try_parse_from(["pdfnotes", "headings", "a.pdf", "--max-level", bad]).is_err());
        }
    }
}
