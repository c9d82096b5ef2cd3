//! Text Extractor — turns an uploaded CV into plain text.
//!
//! Validation happens before any parsing work: a document that is absent, empty,
//! not named `*.pdf`, or lacking the `%PDF-` header never reaches the parser.

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::models::analysis::UploadedDocument;

const PDF_MAGIC: &[u8] = b"%PDF-";
/// Readers accept the header anywhere in the first KiB.
const MAGIC_SEARCH_WINDOW: usize = 1024;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("{0}")]
    Invalid(String),

    #[error("Failed to extract text from PDF: {0}")]
    Extraction(String),
}

#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    async fn extract(&self, document: &UploadedDocument) -> Result<String, DocumentError>;
}

/// Rejects anything that is not recognisably a PDF.
pub fn validate_document(document: Option<&UploadedDocument>) -> Result<&UploadedDocument, DocumentError> {
    let invalid = || DocumentError::Invalid("Please upload a valid PDF file.".to_string());

    let document = document.ok_or_else(invalid)?;
    if document.bytes.is_empty() {
        return Err(invalid());
    }

    let named_pdf = document
        .file_name
        .as_deref()
        .map(|name| name.to_ascii_lowercase().ends_with(".pdf"))
        .unwrap_or(false);
    if !named_pdf || !has_pdf_magic(&document.bytes) {
        return Err(invalid());
    }

    Ok(document)
}

fn has_pdf_magic(bytes: &[u8]) -> bool {
    let window = &bytes[..bytes.len().min(MAGIC_SEARCH_WINDOW)];
    window
        .windows(PDF_MAGIC.len())
        .any(|candidate| candidate == PDF_MAGIC)
}

/// Extractor backed by `pdf-extract`. Parsing runs on the blocking pool since
/// it is CPU-bound and the library may panic on hostile input.
#[derive(Debug, Clone, Default)]
pub struct PdfTextExtractor;

#[async_trait]
impl DocumentExtractor for PdfTextExtractor {
    async fn extract(&self, document: &UploadedDocument) -> Result<String, DocumentError> {
        let bytes = document.bytes.clone();
        let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
            .await
            .map_err(|e| DocumentError::Extraction(format!("PDF parser aborted: {e}")))?
            .map_err(|e| DocumentError::Extraction(e.to_string()))?;

        debug!("Extracted {} characters from CV", text.chars().count());
        Ok(text)
    }
}
