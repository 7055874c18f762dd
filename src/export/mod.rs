//! Export of extraction results.
//!
//! One row per annotation with a fixed column order. Delimited text goes
//! through the `csv` crate, full extractions through `serde_json`. Output is
//! built in memory first so a failed run never leaves a partial file.

mod delimited;
mod json;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{AnnotatedRecord, Extraction};

pub use delimited::{to_csv_string, write_csv};
pub use json::{to_json, JsonFormat};

/// Column headers, in output order.
pub const COLUMNS: [&str; 7] = [
    "Page",
    "Type",
    "Heading Path",
    "Highlighted Text",
    "Comment",
    "Author",
    "Created At",
];

/// Default separator between heading path levels.
pub const DEFAULT_PATH_SEPARATOR: &str = " > ";

/// One exported row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRecord {
    /// 1-based page number
    #[serde(rename = "Page")]
    pub page: usize,
    #[serde(rename = "Type")]
    pub kind: String,
    #[serde(rename = "Heading Path")]
    pub heading_path: String,
    #[serde(rename = "Highlighted Text")]
    pub highlighted_text: String,
    #[serde(rename = "Comment")]
    pub comment: String,
    #[serde(rename = "Author")]
    pub author: String,
    /// RFC 3339, empty when unknown
    #[serde(rename = "Created At")]
    pub created_at: String,
}

impl ExportRecord {
    /// Flatten an annotated record.
    pub fn from_record(record: &AnnotatedRecord, path_separator: &str) -> Self {
        let annotation = &record.annotation;
        Self {
            page: annotation.page() + 1,
            kind: annotation.kind.label().to_string(),
            heading_path: record.path.join(path_separator),
            highlighted_text: annotation.highlighted_text.clone(),
            comment: annotation.comment_text.clone(),
            author: annotation.author.clone(),
            created_at: annotation
                .created_at
                .map(|t| t.to_rfc3339())
                .unwrap_or_default(),
        }
    }
}

/// Output format of an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// Comma-separated values
    #[default]
    Csv,
    /// Tab-separated values
    Tsv,
    /// Full extraction as JSON
    Json(JsonFormat),
}

impl ExportFormat {
    /// File extension, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Tsv => "tsv",
            ExportFormat::Json(_) => "json",
        }
    }

    /// Guess the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(ExportFormat::Csv),
            "tsv" | "tab" => Some(ExportFormat::Tsv),
            "json" => Some(ExportFormat::Json(JsonFormat::Pretty)),
            _ => None,
        }
    }
}

/// Options for delimited export.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Field delimiter
    pub delimiter: u8,
    /// Separator between heading path levels
    pub path_separator: String,
    /// Write the header row
    pub include_header: bool,
}

impl ExportOptions {
    /// Create new export options with defaults (CSV).
    pub fn new() -> Self {
        Self::default()
    }

    /// Tab-separated output.
    pub fn tsv() -> Self {
        Self {
            delimiter: b'\t',
            ..Self::default()
        }
    }

    /// Options matching a format.
    pub fn for_format(format: ExportFormat) -> Self {
        match format {
            ExportFormat::Tsv => Self::tsv(),
            _ => Self::default(),
        }
    }

    /// Set the field delimiter.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set the heading path separator.
    pub fn with_path_separator(mut self, separator: impl Into<String>) -> Self {
        self.path_separator = separator.into();
        self
    }

    /// Enable or disable the header row.
    pub fn with_header(mut self, include: bool) -> Self {
        self.include_header = include;
        self
    }
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            path_separator: DEFAULT_PATH_SEPARATOR.to_string(),
            include_header: true,
        }
    }
}

/// Rows of an extraction, in document order.
pub fn export_records(extraction: &Extraction, options: &ExportOptions) -> Vec<ExportRecord> {
    extraction
        .records
        .iter()
        .map(|record| ExportRecord::from_record(record, &options.path_separator))
        .collect()
}

/// Render an extraction in the given format.
pub fn render(extraction: &Extraction, format: ExportFormat, options: &ExportOptions) -> Result<String> {
    match format {
        ExportFormat::Csv | ExportFormat::Tsv => to_csv_string(extraction, options),
        ExportFormat::Json(json) => to_json(extraction, json),
    }
}

/// Render and write an extraction to a file in one step.
pub fn write_file(
    extraction: &Extraction,
    path: impl AsRef<Path>,
    format: ExportFormat,
    options: &ExportOptions,
) -> Result<()> {
    let content = render(extraction, format, options)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// `<input stem>_annotations.<ext>` next to the input file.
pub fn default_output_path(input: &Path, extension: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    input.with_file_name(format!("{}_annotations.{}", stem, extension))
}
