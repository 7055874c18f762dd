//! One extraction run over a document.
//!
//! Stages run in a fixed order: read every page, gather font statistics,
//! resolve headings, normalize annotations, map them to heading paths.
//! Each stage finishes before the next one starts, so the heading list and
//! the annotation list are complete before any mapping happens.

use crate::annotations::AnnotationExtractor;
use crate::error::{Error, Result};
use crate::mapper::HeadingMapper;
use crate::model::{Extraction, ExtractionSummary, PageText, RawAnnotation};
use crate::outline::{FontStatistics, OutlineResolver, Resolution};
use crate::parser::{ErrorMode, ExtractOptions, OutlineEntry, PdfSource};

/// Everything read from the source before the core stages run.
struct SourceData {
    text: PageText,
    annotations: Vec<RawAnnotation>,
    outline: Vec<OutlineEntry>,
    unreadable_pages: usize,
}

/// Run a full extraction.
///
/// Only a document that cannot be read at all is an error (and, in strict
/// mode, a single unreadable page). Everything else is recovered and
/// counted in the summary.
pub fn extract<S: PdfSource + ?Sized>(source: &S, options: &ExtractOptions) -> Result<Extraction> {
    let data = read_source(source, options, true)?;

    let resolution = resolve(&data, options);

    let extractor = AnnotationExtractor::new().include_non_markup(options.include_non_markup);
    let mut normalized = extractor.normalize_all(&data.annotations, &data.text, options.parallel);

    let mut empty_annotations = 0;
    if options.skip_empty {
        let before = normalized.annotations.len();
        normalized.annotations.retain(|a| !a.is_empty());
        empty_annotations = before - normalized.annotations.len();
        if empty_annotations > 0 {
            log::debug!("Dropped {} empty annotations", empty_annotations);
        }
    }

    if normalized.skipped > 0 {
        log::warn!("Skipped {} annotations without geometry", normalized.skipped);
    }

    let records = HeadingMapper::new(&resolution.headings).map_all(normalized.annotations);

    let summary = ExtractionSummary {
        page_count: data.text.page_count(),
        heading_count: resolution.headings.len(),
        heading_source: resolution.source,
        annotation_count: records.len(),
        skipped_annotations: normalized.skipped,
        ignored_annotations: normalized.ignored,
        empty_annotations,
        dropped_headings: resolution.dropped,
        unreadable_pages: data.unreadable_pages,
    };

    log::info!(
        "Extracted {} annotations under {} headings from {} pages",
        summary.annotation_count,
        summary.heading_count,
        summary.page_count
    );

    Ok(Extraction {
        headings: resolution.headings,
        records,
        summary,
    })
}

/// Resolve the heading list only, without reading annotations.
pub fn headings<S: PdfSource + ?Sized>(source: &S, options: &ExtractOptions) -> Result<Resolution> {
    let data = read_source(source, options, false)?;
    Ok(resolve(&data, options))
}

fn resolve(data: &SourceData, options: &ExtractOptions) -> Resolution {
    let stats = FontStatistics::collect(&data.text, options.parallel);
    if let Some(body) = stats.body_style() {
        log::debug!("Body text style: {}", body);
    }

    let resolution = OutlineResolver::from_options(options).resolve(&data.outline, &data.text, &stats);
    match resolution.source {
        Some(source) => log::info!(
            "Resolved {} headings from {}",
            resolution.headings.len(),
            source
        ),
        None => log::info!("No headings found, annotations will be uncategorized"),
    }
    resolution
}

/// Read pages, annotations and the outline.
///
/// Sources are read sequentially; the backend need not be thread-safe.
fn read_source<S: PdfSource + ?Sized>(
    source: &S,
    options: &ExtractOptions,
    with_annotations: bool,
) -> Result<SourceData> {
    let page_count = source.page_count();
    let mut pages = Vec::with_capacity(page_count);
    let mut annotations = Vec::new();
    let mut unreadable_pages = 0;

    for page in 0..page_count {
        let mut readable = true;

        match source.page_fragments(page) {
            Ok(fragments) => pages.push(fragments),
            Err(e) => {
                page_failure(options, page, "text", e)?;
                pages.push(Vec::new());
                readable = false;
            }
        }

        if with_annotations {
            match source.page_annotations(page) {
                Ok(raws) => annotations.extend(raws),
                Err(e) => {
                    page_failure(options, page, "annotations", e)?;
                    readable = false;
                }
            }
        }

        if !readable {
            unreadable_pages += 1;
        }
    }

    let outline = match source.outline() {
        Ok(outline) => outline,
        Err(e) if options.error_mode == ErrorMode::Lenient => {
            log::warn!("Failed to read the outline: {}", e);
            Vec::new()
        }
        Err(e) => return Err(e),
    };

    Ok(SourceData {
        text: PageText::new(pages),
        annotations,
        outline,
        unreadable_pages,
    })
}

/// Abort in strict mode, log and carry on in lenient mode.
fn page_failure(options: &ExtractOptions, page: usize, what: &str, err: Error) -> Result<()> {
    match options.error_mode {
        ErrorMode::Strict => Err(err),
        ErrorMode::Lenient => {
            log::warn!("Failed to read {} of page {}: {}", what, page + 1, err);
            Ok(())
        }
    }
}
