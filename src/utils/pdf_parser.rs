use anyhow::{Context, Result};
use std::fs;
use std::panic;
use std::path::Path;
use tracing::{info, warn};

/// Page text extracted from a PDF
#[derive(Debug, Clone, Default)]
pub struct PdfContent {
    pub text: String,
    pub pages: Vec<String>,
    pub has_text: bool,
}

impl PdfContent {
    /// Build content from already-extracted text, one page per form feed
    pub fn from_text(text: String) -> Self {
        let has_text = !text.trim().is_empty();

        let pages: Vec<String> = if has_text {
            text.split('\x0C').map(|s| s.to_string()).collect()
        } else {
            Vec::new()
        };

        Self {
            text,
            pages,
            has_text,
        }
    }
}

/// Extract page text from a PDF file.
///
/// Only reading the file can fail. A document the extractor cannot handle
/// comes back as empty content.
pub fn extract_pages(path: &Path) -> Result<PdfContent> {
    info!("Extracting text from PDF: {:?}", path);

    let bytes = fs::read(path).with_context(|| format!("Failed to read PDF: {:?}", path))?;
    let content = extract_pages_from_mem(&bytes);

    if content.has_text {
        info!("Extracted {} pages from PDF", content.pages.len());
    } else {
        warn!("PDF appears to be scanned or has no extractable text: {:?}", path);
    }

    Ok(content)
}

pub fn extract_pages_from_mem(bytes: &[u8]) -> PdfContent {
    // pdf-extract panics on some malformed documents.
    let extracted = panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes));

    match extracted {
        Ok(Ok(text)) => PdfContent::from_text(text),
        Ok(Err(e)) => {
            warn!("Text extraction failed: {}", e);
            PdfContent::default()
        }
        Err(_) => {
            warn!("Text extraction panicked");
            PdfContent::default()
        }
    }
}
