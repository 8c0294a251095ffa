pub mod pdf_parser;

pub use pdf_parser::{extract_pages, extract_pages_from_mem, PdfContent};
