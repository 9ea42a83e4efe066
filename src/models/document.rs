use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An uploaded report document: immutable bytes plus a filename hint.
/// The source of truth for a run: never mutated, only read.
#[derive(Debug, Clone)]
pub struct RawDocument {
    id: Uuid,
    bytes: Vec<u8>,
    filename: Option<String>,
}

impl RawDocument {
    pub fn new(bytes: Vec<u8>, filename: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            bytes,
            filename,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }
}

/// Best-effort plain text from the naive extractor.
///
/// Empty text is a legitimate outcome (image-only scans); extraction never
/// fails a document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub text: String,
    pub page_count: Option<usize>,
}

/// Verdict of the garble detector, with the heuristic basis retained for
/// logging and review. Pure function of the text; nothing persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextQualityVerdict {
    /// Whole-text check failed: the text is extraction noise, not content.
    pub garbled: bool,
    /// Independent check over the compacted document head failed.
    pub garbled_prefix: bool,
    pub symbol_ratio: f32,
    pub letter_ratio: f32,
    pub longest_symbol_run: usize,
}

impl TextQualityVerdict {
    /// Either check failing triggers the OCR fallback.
    pub fn needs_ocr(&self) -> bool {
        self.garbled || self.garbled_prefix
    }
}

/// The text that survived the naive-vs-OCR merge decision, sanitized.
///
/// Every downstream extractor reads from this single blob. Once selected it
/// is never replaced with a shorter, less complete rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergedText {
    pub text: String,
    pub ocr_used: bool,
}
