//! Text extraction: naive PDF text layer, garble detection, OCR fallback.
//!
//! The contract with the rest of the pipeline is deliberately forgiving:
//! extraction and OCR failures degrade to empty strings, never to errors. A
//! document that yields no usable text still flows through and produces a
//! near-empty bundle; one bad scan must not abort a batch.

pub mod document_ocr;
pub mod garble;
pub mod ocr;
pub mod pdf;
pub mod sanitize;
pub mod vision_ocr;

pub use garble::assess;
pub use ocr::{build_backend, run_ocr, select_merged_text, OcrBackend, PAGE_BREAK_MARKER};
pub use pdf::PdfTextExtractor;
pub use sanitize::sanitize_text;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF parsing failed: {0}")]
    PdfParsing(String),

    #[error("OCR request failed: {0}")]
    OcrRequest(String),

    #[error("OCR response could not be parsed: {0}")]
    OcrResponse(String),

    #[error("OCR provider returned HTTP {status}: {body}")]
    OcrStatus { status: u16, body: String },
}
