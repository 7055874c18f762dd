//! Bookmark outline reader.
//!
//! Walks the `/Outlines` tree through `/First` and `/Next` links and resolves
//! each item's destination (`/Dest`, or `/A` of a GoTo action) to a page
//! index and, where the destination type carries one, a top coordinate.

use std::collections::{HashMap, HashSet};

use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};

use super::backend::{
    decode_text_simple, get_number, get_string_from_dict, resolve, Destination, OutlineEntry,
    PageBox,
};

/// Nesting guard against malformed or cyclic trees.
const MAX_DEPTH: usize = 64;

/// Upper bound on siblings walked at one level.
const MAX_SIBLINGS: usize = 10_000;

/// Name-tree recursion guard.
const MAX_NAME_TREE_DEPTH: usize = 32;

struct OutlineWalker<'a> {
    doc: &'a LopdfDocument,
    page_index: HashMap<ObjectId, usize>,
    boxes: &'a [PageBox],
    visited: HashSet<ObjectId>,
    entries: Vec<OutlineEntry>,
}

/// Flatten the document outline in document (pre-order) order.
///
/// Returns an empty list when the document has no outline.
pub(crate) fn extract_outline(
    doc: &LopdfDocument,
    pages: &[ObjectId],
    boxes: &[PageBox],
) -> Vec<OutlineEntry> {
    let Some(first) = catalog(doc)
        .and_then(|c| c.get(b"Outlines").ok())
        .and_then(|o| resolve(doc, o).as_dict().ok())
        .and_then(|d| d.get(b"First").ok())
        .and_then(|o| o.as_reference().ok())
    else {
        return Vec::new();
    };

    let mut walker = OutlineWalker {
        doc,
        page_index: pages.iter().enumerate().map(|(i, id)| (*id, i)).collect(),
        boxes,
        visited: HashSet::new(),
        entries: Vec::new(),
    };
    walker.walk(first, 1);

    log::debug!("Read {} outline entries", walker.entries.len());
    walker.entries
}

fn catalog(doc: &LopdfDocument) -> Option<&Dictionary> {
    doc.trailer
        .get(b"Root")
        .ok()
        .and_then(|o| resolve(doc, o).as_dict().ok())
}

impl OutlineWalker<'_> {
    fn walk(&mut self, first: ObjectId, level: usize) {
        if level > MAX_DEPTH {
            log::warn!("Outline nesting deeper than {} levels, truncated", MAX_DEPTH);
            return;
        }

        let doc = self.doc;
        let mut current = Some(first);
        let mut siblings = 0;

        while let Some(node_id) = current {
            // Cycle protection across the whole tree
            if !self.visited.insert(node_id) || siblings >= MAX_SIBLINGS {
                break;
            }
            siblings += 1;

            let Ok(node) = doc.get_dictionary(node_id) else {
                break;
            };

            let title = get_string_from_dict(doc, node, b"Title").unwrap_or_default();
            let destination = self.item_destination(node);
            self.entries
                .push(OutlineEntry::new(level as u8, title, destination));

            if let Ok(Object::Reference(child)) = node.get(b"First") {
                self.walk(*child, level + 1);
            }

            current = match node.get(b"Next") {
                Ok(Object::Reference(next)) => Some(*next),
                _ => None,
            };
        }
    }

    /// `/Dest` first, then a GoTo `/A` action.
    fn item_destination(&self, node: &Dictionary) -> Option<Destination> {
        if let Ok(dest) = node.get(b"Dest") {
            if let Some(resolved) = self.resolve_dest(dest, 0) {
                return Some(resolved);
            }
        }

        let action = node
            .get(b"A")
            .ok()
            .and_then(|o| resolve(self.doc, o).as_dict().ok())?;
        let is_goto = action
            .get(b"S")
            .ok()
            .and_then(|o| o.as_name().ok())
            .is_some_and(|s| s == b"GoTo");
        if !is_goto {
            return None;
        }
        self.resolve_dest(action.get(b"D").ok()?, 0)
    }

    fn resolve_dest(&self, dest: &Object, depth: usize) -> Option<Destination> {
        if depth > MAX_NAME_TREE_DEPTH {
            return None;
        }

        match resolve(self.doc, dest) {
            Object::Array(arr) => self.explicit_dest(arr),
            Object::Dictionary(d) => self.resolve_dest(d.get(b"D").ok()?, depth + 1),
            Object::String(bytes, _) => {
                let name = decode_text_simple(bytes);
                let target = self.named_dest(&name)?;
                self.resolve_dest(target, depth + 1)
            }
            Object::Name(name) => {
                let name = String::from_utf8_lossy(name).to_string();
                let target = self.named_dest(&name)?;
                self.resolve_dest(target, depth + 1)
            }
            _ => None,
        }
    }

    /// `[page /XYZ left top zoom]`, `[page /FitH top]`, `[page /Fit]`...
    fn explicit_dest(&self, arr: &[Object]) -> Option<Destination> {
        let page = match arr.first()? {
            Object::Reference(id) => *self.page_index.get(id)?,
            // Remote-style destinations carry a page number
            Object::Integer(n) if *n >= 0 => *n as usize,
            _ => return None,
        };

        let kind = arr.get(1).and_then(|o| o.as_name().ok()).unwrap_or(b"Fit");
        let (left, top) = match kind {
            b"XYZ" => (
                arr.get(2).and_then(get_number),
                arr.get(3).and_then(get_number),
            ),
            b"FitH" | b"FitBH" => (None, arr.get(2).and_then(get_number)),
            b"FitR" => (
                arr.get(2).and_then(get_number),
                arr.get(5).and_then(get_number),
            ),
            _ => (None, None),
        };

        let page_box = self.boxes.get(page).copied().unwrap_or_else(PageBox::letter);
        Some(Destination {
            page,
            top: top.map(|t| page_box.top - t),
            left: left.map(|l| l - page_box.left),
        })
    }

    /// Look a name up in `/Names /Dests`, then in the legacy `/Dests`.
    fn named_dest(&self, name: &str) -> Option<&Object> {
        let doc = self.doc;
        let catalog = catalog(doc)?;

        let tree = catalog
            .get(b"Names")
            .ok()
            .and_then(|o| resolve(doc, o).as_dict().ok())
            .and_then(|d| d.get(b"Dests").ok())
            .and_then(|o| resolve(doc, o).as_dict().ok());
        if let Some(found) = tree.and_then(|t| lookup_name_tree(doc, t, name, 0)) {
            return Some(found);
        }

        catalog
            .get(b"Dests")
            .ok()
            .and_then(|o| resolve(doc, o).as_dict().ok())
            .and_then(|d| d.get(name.as_bytes()).ok())
    }
}

/// Search a name tree (`/Names` leaves, `/Kids` intermediates).
fn lookup_name_tree<'a>(
    doc: &'a LopdfDocument,
    node: &'a Dictionary,
    name: &str,
    depth: usize,
) -> Option<&'a Object> {
    if depth > MAX_NAME_TREE_DEPTH {
        return None;
    }

    if let Some(names) = node
        .get(b"Names")
        .ok()
        .and_then(|o| resolve(doc, o).as_array().ok())
    {
        for pair in names.chunks(2) {
            if let [key, value] = pair {
                if let Object::String(bytes, _) = resolve(doc, key) {
                    if decode_text_simple(bytes) == name {
                        return Some(value);
                    }
                }
            }
        }
    }

    let kids = node
        .get(b"Kids")
        .ok()
        .and_then(|o| resolve(doc, o).as_array().ok())?;
    kids.iter()
        .filter_map(|kid| resolve(doc, kid).as_dict().ok())
        .find_map(|kid| lookup_name_tree(doc, kid, name, depth + 1))
}
