//! Per-document pipeline orchestration.
//!
//! One entry point drives extraction → quality check → OCR fallback → merge →
//! citation resolution + bounded structured extraction → element evaluation,
//! and hands back a [`CaseBundle`] for the persistence collaborator. Every
//! external failure is absorbed into typed per-citation outcomes or empty
//! fields; processing a document never returns an error.
//!
//! Documents are independent: `process_batch` runs them concurrently with no
//! shared mutable state. Within a document, citations resolve concurrently;
//! the resolver's keyed lock serializes same-key work.

use std::sync::Arc;

use futures::future::join_all;

use crate::config::PipelineConfig;
use crate::db::StatuteStore;
use crate::models::{CaseBundle, Citation, DocumentSummary, RawDocument, StatuteOutcome};
use crate::pipeline::extraction::{
    assess, build_backend, run_ocr, sanitize_text, select_merged_text, OcrBackend,
    PdfTextExtractor, PAGE_BREAK_MARKER,
};
use crate::pipeline::statutes::{detect_citations, StatuteResolver};
use crate::pipeline::structuring::{
    bounded_section, evaluate_elements, extract_current_charges, extract_identity,
    extract_priors, LlmClient,
};

/// Naive text under this many sanitized characters triggers OCR even when
/// the garble checks pass: the merge decision can only prefer OCR over thin
/// naive text if OCR actually ran.
const THIN_TEXT_OCR_TRIGGER: usize = 200;

pub struct DocumentPipeline {
    config: PipelineConfig,
    ocr: Option<Box<dyn OcrBackend>>,
    resolver: Arc<StatuteResolver>,
    llm: Option<Arc<dyn LlmClient>>,
}

impl DocumentPipeline {
    /// Build a pipeline from a resolved config and a statute cache.
    pub fn new(config: PipelineConfig, store: Arc<dyn StatuteStore>) -> Self {
        let ocr = build_backend(&config.ocr);
        let resolver = Arc::new(StatuteResolver::new(config.statutes.clone(), store));
        Self {
            config,
            ocr,
            resolver,
            llm: None,
        }
    }

    /// Replace the OCR backend (custom providers, tests).
    pub fn with_ocr_backend(mut self, backend: Box<dyn OcrBackend>) -> Self {
        self.ocr = Some(backend);
        self
    }

    /// Enable the language-model path of the element evaluator.
    pub fn with_llm(mut self, llm: Arc<dyn LlmClient>) -> Self {
        self.llm = Some(llm);
        self
    }

    /// Process documents concurrently. Order of results matches input order.
    pub async fn process_batch(&self, documents: &[RawDocument]) -> Vec<CaseBundle> {
        join_all(documents.iter().map(|d| self.process_document(d))).await
    }

    /// Process one document end to end. Never fails: a document yielding no
    /// usable text still produces a (near-empty) bundle.
    pub async fn process_document(&self, document: &RawDocument) -> CaseBundle {
        let extractor = PdfTextExtractor;

        let extraction = extractor.extract(document);
        let verdict = assess(&extraction.text);

        let naive_thin =
            sanitize_text(&extraction.text).chars().count() < THIN_TEXT_OCR_TRIGGER;
        let ocr_text = if verdict.needs_ocr() || naive_thin {
            run_ocr(self.ocr.as_deref(), document, extraction.page_count).await
        } else {
            String::new()
        };

        let merged = select_merged_text(&extraction.text, &ocr_text, &verdict);
        tracing::info!(
            document_id = %document.id(),
            garbled = verdict.garbled,
            garbled_prefix = verdict.garbled_prefix,
            ocr_used = merged.ocr_used,
            text_length = merged.text.len(),
            "Merged text selected"
        );

        let identity = extract_identity(&merged.text);
        let charges = extract_current_charges(&merged.text, &self.config.markers);
        let priors = extract_priors(&merged.text, &self.config.markers);
        let narrative = bounded_section(
            &merged.text,
            &self.config.markers.narrative_start,
            &self.config.markers.narrative_stop,
        );

        let citations = detect_citations(&merged.text);
        let statutes = join_all(
            citations
                .into_iter()
                .map(|citation| self.resolve_outcome(citation, narrative.as_deref())),
        )
        .await;

        let summary = DocumentSummary {
            document_id: document.id(),
            filename: document.filename().map(str::to_string),
            page_count: extraction.page_count,
            text_length: merged.text.chars().count(),
            image_count: extractor.count_images(document.bytes()),
            ocr_used: merged.ocr_used,
        };

        CaseBundle {
            summary,
            merged_text: merged.text,
            identity,
            charges,
            priors,
            statutes,
        }
    }

    /// Resolve one citation and, when possible, evaluate elements against
    /// the narrative. Failures become typed outcomes, never placeholders.
    async fn resolve_outcome(
        &self,
        citation: Citation,
        narrative: Option<&str>,
    ) -> StatuteOutcome {
        match self.resolver.resolve(&citation).await {
            Ok(record) => {
                let evaluation = match narrative {
                    Some(n) if !n.trim().is_empty() => {
                        Some(evaluate_elements(n, &record.text, self.llm.as_deref()).await)
                    }
                    _ => None,
                };
                StatuteOutcome {
                    citation,
                    record: Some(record),
                    failure: None,
                    evaluation,
                }
            }
            Err(e) => {
                tracing::warn!(
                    citation = %citation.normalized_key,
                    reason = e.kind(),
                    "Citation unresolved, flagged for manual review"
                );
                StatuteOutcome {
                    citation,
                    record: None,
                    failure: Some(e.kind().to_string()),
                    evaluation: None,
                }
            }
        }
    }

    /// Combine per-document merged texts into one case-level blob: a fold
    /// over the immutable per-document results, in input order.
    pub fn merge_documents(bundles: &[CaseBundle]) -> String {
        bundles
            .iter()
            .map(|b| b.merged_text.as_str())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(PAGE_BREAK_MARKER)
    }
}
