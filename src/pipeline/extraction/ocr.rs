//! OCR fallback orchestration.
//!
//! OCR is best-effort: a backend that errors or returns nothing yields an
//! empty string, and the merge decision below makes sure an empty or thin
//! OCR result can never displace adequate naive text. The decision is
//! three-way, not a boolean swap, because OCR itself fails silently.

use async_trait::async_trait;

use super::document_ocr::DocumentOcrClient;
use super::sanitize::sanitize_text;
use super::vision_ocr::{LanguageModelOcr, VisionApiOcr};
use super::ExtractionError;
use crate::config::OcrProvider;
use crate::models::{MergedText, RawDocument, TextQualityVerdict};

/// Marker joining independently OCR'd page-range chunks.
pub const PAGE_BREAK_MARKER: &str = "\n\n--- Page Break ---\n\n";

/// OCR output below this many sanitized characters never replaces naive
/// text that was merely flagged as garbled.
const MIN_USEFUL_OCR_LEN: usize = 200;

/// Naive text below this many characters is thin enough that any longer OCR
/// output wins.
const THIN_NAIVE_LEN: usize = 200;

/// A configured OCR backend. Implementations perform the network call;
/// soft-failure policy lives in [`run_ocr`], not in the backends.
#[async_trait]
pub trait OcrBackend: Send + Sync {
    async fn ocr(
        &self,
        document: &RawDocument,
        page_count: Option<usize>,
    ) -> Result<String, ExtractionError>;

    fn name(&self) -> &'static str;
}

/// Build the backend for the resolved provider, if any.
pub fn build_backend(provider: &OcrProvider) -> Option<Box<dyn OcrBackend>> {
    match provider {
        OcrProvider::None => None,
        OcrProvider::VisionApi { api_key } => {
            Some(Box::new(VisionApiOcr::new(api_key.clone())))
        }
        OcrProvider::LanguageModel { base_url, model } => Some(Box::new(LanguageModelOcr::new(
            base_url.clone(),
            model.clone(),
        ))),
        OcrProvider::DocumentOcr {
            endpoint,
            project_id,
            processor_id,
            access_token,
        } => Some(Box::new(DocumentOcrClient::new(
            endpoint.clone(),
            project_id.clone(),
            processor_id.clone(),
            access_token.clone(),
        ))),
    }
}

/// Run OCR through the configured backend, failing soft to an empty string.
pub async fn run_ocr(
    backend: Option<&dyn OcrBackend>,
    document: &RawDocument,
    page_count: Option<usize>,
) -> String {
    let Some(backend) = backend else {
        return String::new();
    };

    match backend.ocr(document, page_count).await {
        Ok(text) => {
            tracing::info!(
                document_id = %document.id(),
                backend = backend.name(),
                text_length = text.len(),
                "OCR complete"
            );
            text
        }
        Err(e) => {
            tracing::warn!(
                document_id = %document.id(),
                backend = backend.name(),
                error = %e,
                "OCR failed, continuing without it"
            );
            String::new()
        }
    }
}

/// Decide which rendering survives: sanitized naive text or sanitized OCR.
///
/// Preference order:
/// 1. OCR, when the naive text was flagged garbled (whole or prefix) and the
///    OCR output is substantial enough to trust;
/// 2. OCR, when naive text is thin and OCR produced strictly more;
/// 3. naive text otherwise; adequate naive extraction is never displaced.
pub fn select_merged_text(naive: &str, ocr: &str, verdict: &TextQualityVerdict) -> MergedText {
    let naive_clean = sanitize_text(naive);
    let ocr_clean = sanitize_text(ocr);

    if verdict.needs_ocr() && ocr_clean.chars().count() > MIN_USEFUL_OCR_LEN {
        return MergedText {
            text: ocr_clean,
            ocr_used: true,
        };
    }

    if naive_clean.chars().count() < THIN_NAIVE_LEN
        && ocr_clean.chars().count() > naive_clean.chars().count()
    {
        return MergedText {
            text: ocr_clean,
            ocr_used: true,
        };
    }

    MergedText {
        text: naive_clean,
        ocr_used: false,
    }
}

/// Test backend returning a fixed result.
#[cfg(test)]
pub struct MockOcrBackend {
    pub text: String,
    pub fail: bool,
}

#[cfg(test)]
impl MockOcrBackend {
    pub fn returning(text: &str) -> Self {
        Self {
            text: text.into(),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            text: String::new(),
            fail: true,
        }
    }
}

#[cfg(test)]
#[async_trait]
impl OcrBackend for MockOcrBackend {
    async fn ocr(
        &self,
        _document: &RawDocument,
        _page_count: Option<usize>,
    ) -> Result<String, ExtractionError> {
        if self.fail {
            Err(ExtractionError::OcrRequest("mock failure".into()))
        } else {
            Ok(self.text.clone())
        }
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::extraction::garble::assess;

    fn long_ocr_text() -> String {
        "The defendant was observed leaving the premises carrying merchandise \
         that had not been paid for. Officers located the defendant two blocks \
         away and recovered the property described by the store manager. "
            .repeat(2)
    }

    fn garbled_verdict() -> TextQualityVerdict {
        assess("(cid:3)(cid:9)")
    }

    fn clean_verdict() -> TextQualityVerdict {
        let clean = "The officer responded to a report of theft at the listed address. \
                     The complainant described the suspect and the direction of travel. "
            .repeat(3);
        assess(&clean)
    }

    #[test]
    fn garbled_naive_with_substantial_ocr_prefers_ocr() {
        let merged = select_merged_text("(cid:3)(cid:9)", &long_ocr_text(), &garbled_verdict());
        assert!(merged.ocr_used);
        assert!(merged.text.contains("defendant"));
    }

    #[test]
    fn garbled_naive_with_empty_ocr_keeps_naive() {
        // OCR failed silently: garble alone must not select an empty result
        // through rule 1, and rule 2 requires OCR to be strictly longer.
        let merged = select_merged_text("(cid:3)(cid:9)", "", &garbled_verdict());
        assert!(!merged.ocr_used);
    }

    #[test]
    fn garbled_naive_with_thin_ocr_falls_to_length_rule() {
        // 50 chars of OCR: under the substantial threshold, but naive is thin
        // and OCR is longer, so rule 2 applies.
        let thin_ocr = "Short OCR result naming the defendant and charge.";
        let merged = select_merged_text("(cid:3)", thin_ocr, &garbled_verdict());
        assert!(merged.ocr_used);
        assert_eq!(merged.text, sanitize_text(thin_ocr));
    }

    #[test]
    fn adequate_naive_never_displaced_by_ocr() {
        let naive = "The officer responded to a report of theft at the listed address. \
                     The complainant described the suspect and the direction of travel. "
            .repeat(3);
        let merged = select_merged_text(&naive, &long_ocr_text(), &clean_verdict());
        assert!(!merged.ocr_used);
        assert_eq!(merged.text, sanitize_text(&naive));
    }

    #[test]
    fn merged_text_is_sanitized() {
        let merged = select_merged_text("(cid:3)", &format!("{}\x00\x01", long_ocr_text()), &garbled_verdict());
        assert!(!merged.text.contains('\x00'));
    }

    #[tokio::test]
    async fn run_ocr_without_backend_is_empty() {
        let doc = RawDocument::new(vec![1, 2, 3], None);
        assert_eq!(run_ocr(None, &doc, None).await, "");
    }

    #[tokio::test]
    async fn run_ocr_absorbs_backend_failure() {
        let doc = RawDocument::new(vec![1, 2, 3], None);
        let backend = MockOcrBackend::failing();
        assert_eq!(run_ocr(Some(&backend), &doc, None).await, "");
    }

    #[tokio::test]
    async fn run_ocr_returns_backend_text() {
        let doc = RawDocument::new(vec![1, 2, 3], None);
        let backend = MockOcrBackend::returning("recovered text");
        assert_eq!(run_ocr(Some(&backend), &doc, None).await, "recovered text");
    }

    #[test]
    fn build_backend_none_for_unconfigured() {
        assert!(build_backend(&OcrProvider::None).is_none());
    }

    #[test]
    fn build_backend_matches_provider() {
        let backend = build_backend(&OcrProvider::VisionApi {
            api_key: "k".into(),
        })
        .unwrap();
        assert_eq!(backend.name(), "vision_api");
    }
}
