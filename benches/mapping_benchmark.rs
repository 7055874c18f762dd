//! Benchmarks for heading detection and annotation mapping.
//!
//! Run with: cargo bench
//!
//! These benchmarks use synthetic documents built in memory.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use pdfnotes::model::{
    Annotation, AnnotationKind, Heading, HeadingSource, PageText, Position, TextFragment,
};
use pdfnotes::outline::{FontHeadingDetector, FontStatistics};
use pdfnotes::HeadingMapper;

/// Three heading levels per page, cycling through nested sections.
fn synthetic_headings(pages: usize) -> Vec<Heading> {
    let mut headings = Vec::with_capacity(pages * 3);
    for page in 0..pages {
        for (i, level) in [1u8, 2, 3].iter().enumerate() {
            headings.push(Heading::new(
                *level,
                format!("Heading {}.{}", page, i),
                Position::new(page, 50.0 + i as f32 * 200.0, 72.0),
                HeadingSource::FromOutline,
            ));
        }
    }
    headings
}

fn synthetic_annotations(pages: usize, per_page: usize) -> Vec<Annotation> {
    (0..pages)
        .flat_map(|page| {
            (0..per_page).map(move |i| Annotation {
                kind: AnnotationKind::Highlight,
                position: Position::new(page, 20.0 + i as f32 * 35.0, 90.0),
                quads: Vec::new(),
                highlighted_text: String::new(),
                comment_text: format!("note {}", i),
                author: String::new(),
                created_at: None,
            })
        })
        .collect()
}

/// A page of body text with a title and two subtitles.
fn synthetic_text(pages: usize) -> PageText {
    PageText::new(
        (0..pages)
            .map(|page| {
                let mut fragments = vec![
                    TextFragment::new(format!("Chapter {}", page), 72.0, 40.0, 20.0, "Times-Bold"),
                    TextFragment::new("Overview", 72.0, 200.0, 14.0, "Times-Bold"),
                    TextFragment::new("Details", 72.0, 450.0, 14.0, "Times-Bold"),
                ];
                for line in 0..40 {
                    fragments.push(TextFragment::new(
                        format!("Body text line {} on page {}", line, page),
                        72.0,
                        80.0 + line as f32 * 16.0,
                        10.0,
                        "Times-Roman",
                    ));
                }
                fragments
            })
            .collect(),
    )
}

/// Benchmark path lookup at various document sizes.
fn bench_mapping(c: &mut Criterion) {
    let mut group = c.benchmark_group("mapping");

    for pages in [10, 100, 1000].iter() {
        let headings = synthetic_headings(*pages);
        let annotations = synthetic_annotations(*pages, 20);

        group.bench_function(format!("{}_pages", pages), |b| {
            b.iter(|| {
                let mapper = HeadingMapper::new(black_box(&headings));
                mapper.map_all(black_box(annotations.clone()))
            });
        });
    }

    group.finish();
}

/// Benchmark font heuristic detection.
fn bench_detection(c: &mut Criterion) {
    let mut group = c.benchmark_group("font_heuristic");
    let text = synthetic_text(50);
    let detector = FontHeadingDetector::default();

    group.bench_function("statistics", |b| {
        b.iter(|| FontStatistics::collect(black_box(&text), false));
    });

    group.bench_function("detect_sequential", |b| {
        b.iter(|| detector.detect_text(black_box(&text), false));
    });

    group.bench_function("detect_parallel", |b| {
        b.iter(|| detector.detect_text(black_box(&text), true));
    });

    group.finish();
}

criterion_group!(benches, bench_mapping, bench_detection);
criterion_main!(benches);
