//! CSV and TSV output.

use std::io::Write;

use crate::error::{Error, Result};
use crate::model::Extraction;

use super::{export_records, ExportOptions, COLUMNS};

/// Write an extraction as delimited text.
///
/// The header row is written even when there are no annotations.
pub fn write_csv<W: Write>(writer: W, extraction: &Extraction, options: &ExportOptions) -> Result<()> {
    let mut wtr = ::csv::WriterBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(false)
        .from_writer(writer);

    if options.include_header {
        wtr.write_record(COLUMNS)?;
    }
    for record in export_records(extraction, options) {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Delimited text as a string.
pub fn to_csv_string(extraction: &Extraction, options: &ExportOptions) -> Result<String> {
    let mut buffer = Vec::new();
    write_csv(&mut buffer, extraction, options)?;
    String::from_utf8(buffer).map_err(|e| Error::Export(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::tests::sample_extraction;

    #[test]
    fn test_csv_layout() {
        let csv = to_csv_string(&sample_extraction(), &ExportOptions::default()).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("Page,Type,Heading Path,Highlighted Text,Comment,Author,Created At")
        );
        // Multi-line comments are quoted
        assert!(csv.contains("\"line one\nline two\""));
        assert!(csv.contains(
            "2,Highlight,Chapter 1 > Scope,key finding,\"see also, p. 4\",Reviewer,2024-03-15T10:30:00+02:00"
        ));
    }

    #[test]
    fn test_tsv_without_header() {
        let options = ExportOptions::tsv().with_header(false);
        let tsv = to_csv_string(&sample_extraction(), &options).unwrap();
        assert!(tsv.starts_with("1\tComment\tUncategorized\t\t"));
        assert!(!tsv.contains("Heading Path"));
    }

    #[test]
    fn test_empty_extraction_has_header_only() {
        let csv = to_csv_string(&Extraction::default(), &ExportOptions::default()).unwrap();
        assert_eq!(csv, "Page,Type,Heading Path,Highlighted Text,Comment,Author,Created At\n");
    }

    #[test]
    fn test_output_is_stable() {
        let extraction = sample_extraction();
        let first = to_csv_string(&extraction, &ExportOptions::default()).unwrap();
        let second = to_csv_string(&extraction, &ExportOptions::default()).unwrap();
        assert_eq!(first, second);
    }
}
