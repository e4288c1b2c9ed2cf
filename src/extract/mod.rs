//! Content Extractor
//!
//! Turns an uploaded file into the plain text handed to the model.
//!
//! ## Supported Formats
//! - Text: text/plain, `.md`, `.txt` (verbatim UTF-8)
//! - PDF: per-page text layer via pdf-extract, first 50 pages
//! - Word: .docx is not parsed, a fixed note asks for another format
//! - Anything else: read as UTF-8 text
//!
//! Read failures are errors. PDF parsing failures are not: they become a
//! descriptive placeholder so generation can still go ahead.

pub mod pdf;

use async_trait::async_trait;
use pdf::{PageTextLayer, PdfExtractLayer, MAX_PDF_PAGES};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

use crate::generation::error::GenerationError;

pub const MIME_PLAIN_TEXT: &str = "text/plain";
pub const MIME_PDF: &str = "application/pdf";
pub const MIME_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Upload formats offered to the user
pub const ACCEPTED_EXTENSIONS: [&str; 4] = ["pdf", "md", "docx", "txt"];

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("{name}: {message}")]
    Read { name: String, message: String },
}

impl From<ExtractError> for GenerationError {
    fn from(err: ExtractError) -> Self {
        GenerationError::FileRead(err.to_string())
    }
}

#[derive(Debug, Clone)]
enum FileSource {
    Path(PathBuf),
    Bytes(Arc<[u8]>),
}

/// A user-supplied document: a name, a MIME type and its bytes on disk or in memory
#[derive(Debug, Clone)]
pub struct UploadedFile {
    name: String,
    mime_type: String,
    source: FileSource,
}

impl UploadedFile {
    /// Reference a file on disk; the name is taken from the last path component
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        let mime_type = guess_mime(&name);

        Self {
            name,
            mime_type,
            source: FileSource::Path(path),
        }
    }

    /// Wrap bytes already in memory
    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        let name = name.into();
        let bytes: Vec<u8> = bytes.into();
        let mime_type = guess_mime(&name);

        Self {
            name,
            mime_type,
            source: FileSource::Bytes(Arc::from(bytes)),
        }
    }

    /// Override the guessed MIME type with the one reported by the uploader
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn kind(&self) -> DocumentKind {
        let name = self.name.to_lowercase();

        if self.mime_type == MIME_PLAIN_TEXT || name.ends_with(".md") || name.ends_with(".txt") {
            DocumentKind::PlainText
        } else if self.mime_type == MIME_PDF {
            DocumentKind::Pdf
        } else if self.mime_type == MIME_DOCX {
            DocumentKind::Docx
        } else {
            DocumentKind::Other
        }
    }

    pub async fn read_bytes(&self) -> Result<Vec<u8>, ExtractError> {
        match &self.source {
            FileSource::Bytes(bytes) => Ok(bytes.to_vec()),
            FileSource::Path(path) => {
                tokio::fs::read(path).await.map_err(|e| ExtractError::Read {
                    name: self.name.clone(),
                    message: e.to_string(),
                })
            }
        }
    }
}

fn guess_mime(name: &str) -> String {
    mime_guess::from_path(name)
        .first_raw()
        .unwrap_or_default()
        .to_string()
}

/// How an upload is turned into text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    PlainText,
    Pdf,
    Docx,
    Other,
}

/// Anything that can turn an upload into model input
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, file: &UploadedFile) -> Result<String, ExtractError>;
}

/// Default extractor used by the pipeline
#[derive(Clone)]
pub struct ContentExtractor {
    pdf_layer: Arc<dyn PageTextLayer>,
}

impl ContentExtractor {
    pub fn new() -> Self {
        Self::with_pdf_layer(Arc::new(PdfExtractLayer))
    }

    pub fn with_pdf_layer(pdf_layer: Arc<dyn PageTextLayer>) -> Self {
        Self { pdf_layer }
    }

    async fn extract_pdf(&self, file: &UploadedFile) -> Result<String, ExtractError> {
        let bytes = file.read_bytes().await?;
        let layer = Arc::clone(&self.pdf_layer);

        tracing::info!(
            "[Extractor] Starting PDF extraction: {} ({} bytes)",
            file.name(),
            bytes.len()
        );

        // Parsing is CPU bound, keep it off the async workers
        let pages = tokio::task::spawn_blocking(move || layer.page_texts(&bytes, MAX_PDF_PAGES))
            .await
            .unwrap_or_else(|e| Err(format!("extraction task failed: {}", e)));

        match pages {
            Ok(document) => {
                tracing::info!(
                    "[Extractor] PDF loaded: {} pages, {} read",
                    document.total_pages,
                    document.pages.len()
                );
                let text = pdf::assemble_pages(file.name(), &document);
                tracing::debug!("[Extractor] Extracted {} characters from PDF", text.len());
                Ok(text)
            }
            Err(e) => {
                tracing::warn!("[Extractor] PDF extraction FAILED for {}: {}", file.name(), e);
                Ok(pdf::extraction_failed_placeholder(file.name(), &e))
            }
        }
    }
}

impl Default for ContentExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextExtractor for ContentExtractor {
    async fn extract(&self, file: &UploadedFile) -> Result<String, ExtractError> {
        match file.kind() {
            DocumentKind::PlainText | DocumentKind::Other => {
                let bytes = file.read_bytes().await?;
                tracing::debug!(
                    "[Extractor] Direct read: {} bytes from {}",
                    bytes.len(),
                    file.name()
                );
                Ok(String::from_utf8_lossy(&bytes).into_owned())
            }
            DocumentKind::Pdf => self.extract_pdf(file).await,
            DocumentKind::Docx => Ok(docx_placeholder(file.name())),
        }
    }
}

/// Fixed text returned for Word documents
pub fn docx_placeholder(file_name: &str) -> String {
    format!(
        "[DOCX Document: {}]\n\nDOCX parsing is not yet supported. Please convert to PDF or use markdown (.md) / text (.txt) files for best results.",
        file_name
    )
}

/// Check if a file name carries one of the accepted upload extensions
pub fn is_accepted(name: &str) -> bool {
    std::path::Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| ACCEPTED_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}
