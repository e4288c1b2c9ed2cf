//! PDF text-layer extraction
//!
//! Pages are read through a [`PageTextLayer`], normalized, and laid out as
//! `--- Page N ---` blocks. Only the first [`MAX_PDF_PAGES`] pages are parsed.

/// Maximum number of pages turned into text
pub const MAX_PDF_PAGES: usize = 50;

/// Text read from the leading pages of a document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PdfPages {
    /// Page count of the whole document
    pub total_pages: usize,
    /// Raw text of the pages that were read, in page order; blank when a page failed
    pub pages: Vec<String>,
}

/// Source of per-page text for a PDF document
pub trait PageTextLayer: Send + Sync {
    /// Read at most `max_pages` pages; later pages are never parsed
    fn page_texts(&self, bytes: &[u8], max_pages: usize) -> Result<PdfPages, String>;
}

/// Text layer backed by the pure Rust `pdf-extract` crate
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfExtractLayer;

impl PdfExtractLayer {
    fn load(bytes: &[u8]) -> Result<pdf_extract::Document, String> {
        let mut doc = pdf_extract::Document::load_mem(bytes).map_err(|e| e.to_string())?;
        if doc.is_encrypted() {
            doc.decrypt("")
                .map_err(|e| format!("encrypted PDF could not be opened: {}", e))?;
        }
        Ok(doc)
    }

    fn page_text(doc: &pdf_extract::Document, page_num: u32) -> Result<String, String> {
        let mut text = String::new();
        {
            let mut output = pdf_extract::PlainTextOutput::new(&mut text);
            pdf_extract::output_doc_page(doc, &mut output, page_num).map_err(|e| e.to_string())?;
        }
        Ok(text)
    }
}

impl PageTextLayer for PdfExtractLayer {
    /// Wrapped in catch_unwind to handle panics from malformed PDFs
    fn page_texts(&self, bytes: &[u8], max_pages: usize) -> Result<PdfPages, String> {
        tracing::debug!("[PdfExtract] PDF size: {} bytes", bytes.len());

        // pdf_extract (and its cff-parser dependency) can panic on certain fonts/glyphs
        let doc = match std::panic::catch_unwind(|| Self::load(bytes)) {
            Ok(loaded) => loaded?,
            Err(_panic) => {
                return Err("PDF parser panicked - likely contains malformed fonts".to_string())
            }
        };

        let numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
        let mut pages = Vec::with_capacity(numbers.len().min(max_pages));

        for &page_num in numbers.iter().take(max_pages) {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                Self::page_text(&doc, page_num)
            }))
            .unwrap_or_else(|_| Err("parser panicked".to_string()));

            match result {
                Ok(text) => pages.push(text),
                Err(e) => {
                    // Keep the slot so later pages keep their numbers
                    tracing::warn!("[PdfExtract] Page {} unreadable: {}", page_num, e);
                    pages.push(String::new());
                }
            }
        }

        Ok(PdfPages {
            total_pages: numbers.len(),
            pages,
        })
    }
}

/// Collapse whitespace runs to single spaces and trim
pub fn normalize_page_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lay out extracted pages as the text handed to the model
///
/// A document over the cap with no text in its leading pages yields the
/// cap note alone.
pub fn assemble_pages(file_name: &str, document: &PdfPages) -> String {
    let mut parts: Vec<String> = document
        .pages
        .iter()
        .take(MAX_PDF_PAGES)
        .enumerate()
        .filter_map(|(index, raw)| {
            let text = normalize_page_text(raw);
            (!text.is_empty()).then(|| format!("--- Page {} ---\n{}", index + 1, text))
        })
        .collect();

    if document.total_pages > MAX_PDF_PAGES {
        parts.push(format!(
            "\n[Note: Document has {} pages. Only first {} pages were processed.]",
            document.total_pages, MAX_PDF_PAGES
        ));
    }

    if parts.is_empty() {
        return no_text_placeholder(file_name);
    }

    parts.join("\n\n")
}

/// Returned when no page carries a text layer (scanned or image-only PDFs)
pub fn no_text_placeholder(file_name: &str) -> String {
    format!(
        "[PDF Document: {}]\n\nThis PDF appears to contain no extractable text (may be scanned/image-based). Please use a text-based document for best results.",
        file_name
    )
}

/// Returned when the text layer could not be read at all
pub fn extraction_failed_placeholder(file_name: &str, error: &str) -> String {
    format!(
        "[PDF Document: {}]\n\nFailed to extract text from PDF: {}. Please try a different document format.",
        file_name, error
    )
}
