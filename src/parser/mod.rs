//! PDF reading: the backend trait, the lopdf implementation and options.

mod annots;
pub mod backend;
mod content;
mod date;
mod options;
mod outline;

pub use backend::{decode_text_simple, Destination, LopdfBackend, OutlineEntry, PageBox, PdfSource};
pub use date::parse_pdf_date;
pub use options::{ErrorMode, ExtractOptions, HeadingStrategy};
