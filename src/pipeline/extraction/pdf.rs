//! Naive PDF text-layer extraction.
//!
//! Reliable on digitally produced reports, useless on image-only scans,
//! which is exactly what the garble detector downstream is for. Extraction
//! never fails a document: any parser error becomes an empty result.

use lopdf::{Document, Object};

use super::ExtractionError;
use crate::models::{ExtractionResult, RawDocument};

pub struct PdfTextExtractor;

impl PdfTextExtractor {
    /// Extract the text layer and page count. Absorbs all parser errors.
    pub fn extract(&self, document: &RawDocument) -> ExtractionResult {
        match pdf_extract::extract_text_from_mem_by_pages(document.bytes()) {
            Ok(pages) => {
                let page_count = pages.len();
                let text = pages.join("\n");
                tracing::debug!(
                    document_id = %document.id(),
                    pages = page_count,
                    text_length = text.len(),
                    "Naive PDF extraction complete"
                );
                ExtractionResult {
                    text,
                    page_count: Some(page_count),
                }
            }
            Err(e) => {
                tracing::warn!(
                    document_id = %document.id(),
                    error = %e,
                    "Naive PDF extraction failed, continuing with empty text"
                );
                ExtractionResult::default()
            }
        }
    }

    /// Page count without extracting text, for OCR chunking decisions.
    pub fn page_count(&self, bytes: &[u8]) -> Result<usize, ExtractionError> {
        let doc =
            Document::load_mem(bytes).map_err(|e| ExtractionError::PdfParsing(e.to_string()))?;
        Ok(doc.get_pages().len())
    }

    /// Count embedded raster images. Scan-heavy documents have one per page;
    /// reported in the document summary as a scan-quality hint.
    pub fn count_images(&self, bytes: &[u8]) -> Option<usize> {
        let doc = Document::load_mem(bytes).ok()?;
        let count = doc
            .objects
            .values()
            .filter(|obj| {
                matches!(obj, Object::Stream(stream)
                    if stream
                        .dict
                        .get(b"Subtype")
                        .and_then(|v| v.as_name())
                        .map(|name| name == b"Image")
                        .unwrap_or(false))
            })
            .count();
        Some(count)
    }

    /// Split a PDF into consecutive page-range sub-documents of at most
    /// `chunk_size` pages. Used by the structured-document OCR provider to
    /// bound per-call payload size and request duration.
    pub fn split_page_ranges(
        &self,
        bytes: &[u8],
        chunk_size: usize,
    ) -> Result<Vec<Vec<u8>>, ExtractionError> {
        let doc =
            Document::load_mem(bytes).map_err(|e| ExtractionError::PdfParsing(e.to_string()))?;
        let total = doc.get_pages().len() as u32;
        let chunk_size = chunk_size.max(1) as u32;

        if total <= chunk_size {
            return Ok(vec![bytes.to_vec()]);
        }

        let mut chunks = Vec::new();
        let mut start = 1u32;
        while start <= total {
            let end = (start + chunk_size - 1).min(total);
            let mut sub = doc.clone();
            let keep: Vec<u32> = (start..=end).collect();
            let drop: Vec<u32> = (1..=total).filter(|p| !keep.contains(p)).collect();
            sub.delete_pages(&drop);

            let mut buf = Vec::new();
            sub.save_to(&mut buf)
                .map_err(|e| ExtractionError::PdfParsing(e.to_string()))?;
            chunks.push(buf);
            start = end + 1;
        }

        tracing::debug!(
            total_pages = total,
            chunk_size,
            chunks = chunks.len(),
            "Split PDF into page-range sub-documents"
        );
        Ok(chunks)
    }
}
