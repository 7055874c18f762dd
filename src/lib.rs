//! # pdfnotes
//!
//! Extract annotations from PDF documents and place each one under the
//! headings that contain it.
//!
//! Headings come from the document's bookmarks when it has them and are
//! inferred from font size and weight otherwise. Every highlight, underline
//! or note is then given a breadcrumb path such as
//! `Chapter 2 > Methods > Sampling`, and the result is exported as CSV, TSV
//! or JSON.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfnotes::{extract_file, export, ExportOptions};
//!
//! fn main() -> pdfnotes::Result<()> {
//!     let extraction = extract_file("paper.pdf")?;
//!
//!     for record in &extraction.records {
//!         println!("{}: {}", record.path.join(" > "), record.annotation.comment_text);
//!     }
//!
//!     let csv = export::to_csv_string(&extraction, &ExportOptions::default())?;
//!     std::fs::write("paper_annotations.csv", csv)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Outline first**: bookmarks with named and explicit destinations
//! - **Font heuristic**: body style statistics, running header filtering
//! - **Breadcrumbs**: nearest preceding heading per level, no gap filling
//! - **Covered text**: the page text under highlight quads
//! - **Parallel processing**: Uses Rayon for the read-only stages
//! - **CJK support**: no spurious spaces inside Chinese or Japanese text

pub mod annotations;
pub mod error;
pub mod export;
pub mod index;
pub mod mapper;
pub mod model;
pub mod outline;
pub mod parser;
pub mod pipeline;
pub mod text;

// Re-export commonly used types
pub use annotations::AnnotationExtractor;
pub use error::{Error, Result};
pub use export::{ExportFormat, ExportOptions, ExportRecord, JsonFormat};
pub use index::PositionIndex;
pub use mapper::{map_annotation, HeadingMapper};
pub use model::{
    AnnotatedRecord, Annotation, AnnotationKind, Extraction, ExtractionSummary, Heading,
    HeadingPath, HeadingSource, Position, Rect, UNCATEGORIZED,
};
pub use outline::{DetectorConfig, FontHeadingDetector, OutlineResolver};
pub use parser::{ErrorMode, ExtractOptions, HeadingStrategy, LopdfBackend, PdfSource};

use std::io::Read;
use std::path::Path;

/// Extract annotations from a PDF file.
///
/// # Example
///
/// ```no_run
/// use pdfnotes::extract_file;
///
/// let extraction = extract_file("paper.pdf").unwrap();
/// println!("{} annotations", extraction.records.len());
/// ```
pub fn extract_file<P: AsRef<Path>>(path: P) -> Result<Extraction> {
    extract_file_with_options(path, &ExtractOptions::default())
}

/// Extract annotations from a PDF file with custom options.
///
/// # Example
///
/// ```no_run
/// use pdfnotes::{extract_file_with_options, ExtractOptions, HeadingStrategy};
///
/// let options = ExtractOptions::new()
///     .lenient()
///     .with_heading_strategy(HeadingStrategy::Fonts);
/// let extraction = extract_file_with_options("paper.pdf", &options).unwrap();
/// ```
pub fn extract_file_with_options<P: AsRef<Path>>(
    path: P,
    options: &ExtractOptions,
) -> Result<Extraction> {
    let backend = LopdfBackend::load_file(path)?;
    pipeline::extract(&backend, options)
}

/// Extract annotations from PDF bytes.
pub fn extract_bytes(data: &[u8]) -> Result<Extraction> {
    extract_bytes_with_options(data, &ExtractOptions::default())
}

/// Extract annotations from PDF bytes with custom options.
pub fn extract_bytes_with_options(data: &[u8], options: &ExtractOptions) -> Result<Extraction> {
    let backend = LopdfBackend::load_bytes(data)?;
    pipeline::extract(&backend, options)
}

/// Extract annotations from a reader.
pub fn extract_reader<R: Read>(reader: R, options: &ExtractOptions) -> Result<Extraction> {
    let backend = LopdfBackend::load_reader(reader)?;
    pipeline::extract(&backend, options)
}

/// Extract annotations and write them next to the input as
/// `<name>_annotations.csv`. Returns the path written.
///
/// Nothing is written when extraction fails.
pub fn export_file<P: AsRef<Path>>(path: P) -> Result<std::path::PathBuf> {
    let path = path.as_ref();
    let extraction = extract_file(path)?;
    let format = ExportFormat::Csv;
    let output = export::default_output_path(path, format.extension());
    export::write_file(&extraction, &output, format, &ExportOptions::default())?;
    Ok(output)
}

/// Builder for extracting and exporting annotations.
///
/// # Example
///
/// ```no_run
/// use pdfnotes::PdfNotes;
///
/// let csv = PdfNotes::new()
///     .lenient()
///     .skip_empty()
///     .with_path_separator(" / ")
///     .extract("paper.pdf")?
///     .to_csv()?;
/// # Ok::<(), pdfnotes::Error>(())
/// ```
pub struct PdfNotes {
    extract_options: ExtractOptions,
    export_options: ExportOptions,
}

impl PdfNotes {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            extract_options: ExtractOptions::default(),
            export_options: ExportOptions::default(),
        }
    }

    /// Skip unreadable pages instead of failing.
    pub fn lenient(mut self) -> Self {
        self.extract_options = self.extract_options.lenient();
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.extract_options = self.extract_options.sequential();
        self
    }

    /// Choose where headings come from.
    pub fn with_heading_strategy(mut self, strategy: HeadingStrategy) -> Self {
        self.extract_options = self.extract_options.with_heading_strategy(strategy);
        self
    }

    /// Deepest level assigned by the font heuristic.
    pub fn with_max_level(mut self, level: u8) -> Self {
        self.extract_options = self.extract_options.with_max_level(level);
        self
    }

    /// Drop annotations without comment or covered text.
    pub fn skip_empty(mut self) -> Self {
        self.extract_options = self.extract_options.skip_empty(true);
        self
    }

    /// Keep links, widgets and other non-markup annotations.
    pub fn include_non_markup(mut self) -> Self {
        self.extract_options = self.extract_options.include_non_markup(true);
        self
    }

    /// Separator between heading path levels in exports.
    pub fn with_path_separator(mut self, separator: impl Into<String>) -> Self {
        self.export_options = self.export_options.with_path_separator(separator);
        self
    }

    /// Extract from a PDF file.
    pub fn extract<P: AsRef<Path>>(self, path: P) -> Result<PdfNotesResult> {
        let extraction = extract_file_with_options(path, &self.extract_options)?;
        Ok(PdfNotesResult {
            extraction,
            export_options: self.export_options,
        })
    }

    /// Extract from PDF bytes.
    pub fn extract_bytes(self, data: &[u8]) -> Result<PdfNotesResult> {
        let extraction = extract_bytes_with_options(data, &self.extract_options)?;
        Ok(PdfNotesResult {
            extraction,
            export_options: self.export_options,
        })
    }

    /// Extract from any [`PdfSource`].
    pub fn extract_source<S: PdfSource + ?Sized>(self, source: &S) -> Result<PdfNotesResult> {
        let extraction = pipeline::extract(source, &self.extract_options)?;
        Ok(PdfNotesResult {
            extraction,
            export_options: self.export_options,
        })
    }
}

impl Default for PdfNotes {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of an extraction run with its export settings.
pub struct PdfNotesResult {
    /// The extraction
    pub extraction: Extraction,
    export_options: ExportOptions,
}

impl PdfNotesResult {
    /// Convert to CSV.
    pub fn to_csv(&self) -> Result<String> {
        export::to_csv_string(&self.extraction, &self.export_options)
    }

    /// Convert to TSV.
    pub fn to_tsv(&self) -> Result<String> {
        let options = self.export_options.clone().with_delimiter(b'\t');
        export::to_csv_string(&self.extraction, &options)
    }

    /// Convert to JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        export::to_json(&self.extraction, format)
    }

    /// Write to a file, picking the format from its extension (CSV when
    /// unknown).
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let format = ExportFormat::from_path(path).unwrap_or_default();
        let options = match format {
            ExportFormat::Tsv => self.export_options.clone().with_delimiter(b'\t'),
            _ => self.export_options.clone(),
        };
        export::write_file(&self.extraction, path, format, &options)
    }

    /// Flattened export rows.
    pub fn records(&self) -> Vec<ExportRecord> {
        export::export_records(&self.extraction, &self.export_options)
    }

    /// Run statistics.
    pub fn summary(&self) -> &ExtractionSummary {
        &self.extraction.summary
    }

    /// Recovered headings.
    pub fn headings(&self) -> &[Heading] {
        &self.extraction.headings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdfnotes_builder() {
        let builder = PdfNotes::new()
            .lenient()
            .skip_empty()
            .with_heading_strategy(HeadingStrategy::Outline)
            .with_path_separator(" / ");

        assert!(matches!(
            builder.extract_options.error_mode,
            parser::ErrorMode::Lenient
        ));
        assert!(builder.extract_options.skip_empty);
        assert_eq!(builder.extract_options.heading_strategy, HeadingStrategy::Outline);
        assert_eq!(builder.export_options.path_separator, " / ");
    }

    #[test]
    fn test_pdfnotes_builder_default() {
        let builder = PdfNotes::default();
        assert!(builder.extract_options.parallel);
        assert!(!builder.extract_options.include_non_markup);
        assert_eq!(builder.export_options.path_separator, " > ");
    }

    #[test]
    fn test_pdfnotes_builder_chained() {
        let builder = PdfNotes::new()
            .sequential()
            .include_non_markup()
            .with_max_level(2);
        assert!(!builder.extract_options.parallel);
        assert!(builder.extract_options.include_non_markup);
        assert_eq!(builder.extract_options.detector.max_level, 2);
    }

    // ==================== Edge Case Tests ====================

    #[test]
    fn test_extract_bytes_empty_data() {
        let data: [u8; 0] = [];
        assert!(matches!(extract_bytes(&data), Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_extract_bytes_unknown_magic() {
        let data = b"<!DOCTYPE html><html></html>";
        assert!(matches!(extract_bytes(data), Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_extract_bytes_truncated_pdf() {
        let result = extract_bytes(b"%PDF-1.7\n%broken");
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_invalid_bytes() {
        let result = PdfNotes::new().extract_bytes(b"not a pdf");
        assert!(result.is_err());
    }

    #[test]
    fn test_extract_missing_file() {
        let result = extract_file("/nonexistent/definitely/missing.pdf");
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
