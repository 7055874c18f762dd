//! Page `/Annots` reader.

use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};

use crate::error::{Error, Result};
use crate::model::{RawAnnotation, Rect};

use super::backend::{get_number, get_string_from_dict, resolve, PageBox};

/// Read the annotation dictionaries of a page.
///
/// Entries that are not dictionaries are skipped; everything else is
/// returned with whatever fields could be read, geometry already flipped
/// to top-down page space.
pub(crate) fn extract_annotations(
    doc: &LopdfDocument,
    page_id: ObjectId,
    page: usize,
    page_box: &PageBox,
) -> Result<Vec<RawAnnotation>> {
    let page_dict = doc
        .get_dictionary(page_id)
        .map_err(|e| Error::PdfParse(format!("failed to get page dictionary: {}", e)))?;

    let annots = match page_dict.get(b"Annots") {
        Ok(obj) => resolve(doc, obj),
        Err(_) => return Ok(Vec::new()),
    };

    let annots = match annots {
        Object::Array(arr) => arr,
        Object::Null => return Ok(Vec::new()),
        _ => {
            return Err(Error::PdfParse(format!(
                "Page {}: /Annots is not an array",
                page + 1
            )))
        }
    };

    Ok(annots
        .iter()
        .filter_map(|entry| resolve(doc, entry).as_dict().ok())
        .map(|dict| read_annotation(doc, dict, page, page_box))
        .collect())
}

fn read_annotation(
    doc: &LopdfDocument,
    dict: &Dictionary,
    page: usize,
    page_box: &PageBox,
) -> RawAnnotation {
    let subtype = match dict.get(b"Subtype").map(|o| resolve(doc, o)) {
        Ok(Object::Name(name)) => Some(String::from_utf8_lossy(name).into_owned()),
        _ => None,
    };

    let rect = numbers(doc, dict, b"Rect").and_then(|v| {
        if v.len() < 4 {
            return None;
        }
        let (x0, y0) = page_box.to_top_down(v[0], v[1]);
        let (x1, y1) = page_box.to_top_down(v[2], v[3]);
        Some(Rect::new(x0, y0, x1, y1)).filter(Rect::is_finite)
    });

    // Eight numbers per quad; the corner order varies between producers
    let quads = numbers(doc, dict, b"QuadPoints")
        .map(|v| {
            v.chunks_exact(8)
                .filter_map(|q| {
                    let corners: Vec<(f32, f32)> = q
                        .chunks_exact(2)
                        .map(|p| page_box.to_top_down(p[0], p[1]))
                        .collect();
                    Rect::bounding(&corners).filter(Rect::is_finite)
                })
                .collect()
        })
        .unwrap_or_default();

    RawAnnotation {
        page,
        subtype,
        rect,
        quads,
        contents: get_string_from_dict(doc, dict, b"Contents"),
        author: get_string_from_dict(doc, dict, b"T"),
        creation_date: get_string_from_dict(doc, dict, b"CreationDate"),
        modified_date: get_string_from_dict(doc, dict, b"M"),
    }
}

/// Numeric array stored under `key`.
///
/// `None` when absent, not an array, or holding any non-numeric entry.
fn numbers(doc: &LopdfDocument, dict: &Dictionary, key: &[u8]) -> Option<Vec<f32>> {
    let arr = resolve(doc, dict.get(key).ok()?).as_array().ok()?;
    arr.iter().map(|o| get_number(resolve(doc, o))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    fn page_with_annots(annots: Vec<Object>) -> (LopdfDocument, ObjectId) {
        let mut doc = LopdfDocument::with_version("1.5");
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Annots" => annots,
        });
        (doc, page_id)
    }

    #[test]
    fn test_read_highlight_with_quads() {
        let annot = dictionary! {
            "Type" => "Annot",
            "Subtype" => "Highlight",
            "Rect" => vec![70.into(), 690.into(), 200.into(), 712.into()],
            "QuadPoints" => vec![
                72.into(), 710.into(), 198.into(), 710.into(),
                72.into(), 698.into(), 198.into(), 698.into(),
            ],
            "Contents" => Object::string_literal("Check this"),
            "T" => Object::string_literal("Reviewer"),
            "CreationDate" => Object::string_literal("D:20240115103000Z"),
        };
        let (doc, page_id) = page_with_annots(vec![annot.into()]);

        let annots = extract_annotations(&doc, page_id, 0, &PageBox::letter()).unwrap();
        assert_eq!(annots.len(), 1);
        let raw = &annots[0];
        assert_eq!(raw.subtype.as_deref(), Some("Highlight"));
        assert_eq!(raw.quads.len(), 1);
        assert_eq!(raw.quads[0], Rect::new(72.0, 82.0, 198.0, 94.0));
        assert_eq!(raw.rect, Some(Rect::new(70.0, 80.0, 200.0, 102.0)));
        assert_eq!(raw.contents.as_deref(), Some("Check this"));
        assert_eq!(raw.author.as_deref(), Some("Reviewer"));
        assert_eq!(raw.creation_date.as_deref(), Some("D:20240115103000Z"));
        assert!(raw.modified_date.is_none());
    }

    #[test]
    fn test_missing_fields_are_kept_as_none() {
        let annot = dictionary! { "Type" => "Annot" };
        let (doc, page_id) = page_with_annots(vec![annot.into(), Object::Integer(3)]);

        let annots = extract_annotations(&doc, page_id, 4, &PageBox::letter()).unwrap();
        assert_eq!(annots.len(), 1);
        assert_eq!(annots[0].page, 4);
        assert!(annots[0].subtype.is_none());
        assert!(annots[0].rect.is_none());
        assert!(annots[0].quads.is_empty());
    }

    #[test]
    fn test_no_annots() {
        let mut doc = LopdfDocument::with_version("1.5");
        let page_id = doc.add_object(dictionary! { "Type" => "Page" });
        let annots = extract_annotations(&doc, page_id, 0, &PageBox::letter()).unwrap();
        assert!(annots.is_empty());
    }

    #[test]
    fn test_non_numeric_geometry_is_dropped() {
        let annot = dictionary! {
            "Subtype" => "Highlight",
            "Rect" => vec![70.into(), Object::Null, 200.into(), 712.into()],
            "QuadPoints" => vec![
                72.into(), 710.into(), 198.into(), Object::string_literal("x"),
                72.into(), 698.into(), 198.into(), 698.into(),
            ],
        };
        let (doc, page_id) = page_with_annots(vec![annot.into()]);
        let annots = extract_annotations(&doc, page_id, 0, &PageBox::letter()).unwrap();
        assert!(annots[0].rect.is_none());
        assert!(annots[0].quads.is_empty());
    }

    #[test]
    fn test_partial_quad_ignored() {
        let annot = dictionary! {
            "Subtype" => "Underline",
            "QuadPoints" => vec![1.into(), 2.into(), 3.into()],
        };
        let (doc, page_id) = page_with_annots(vec![annot.into()]);
        let annots = extract_annotations(&doc, page_id, 0, &PageBox::letter()).unwrap();
        assert!(annots[0].quads.is_empty());
    }
}
