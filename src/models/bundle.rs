use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::charge::{CaseIdentity, ChargeCandidate, ElementEvaluation, PriorsSummary};
use super::citation::{Citation, StatuteRecord};

/// Per-document processing summary for the persistence collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub document_id: Uuid,
    pub filename: Option<String>,
    pub page_count: Option<usize>,
    pub text_length: usize,
    pub image_count: Option<usize>,
    pub ocr_used: bool,
}

/// Outcome of resolving one citation. Failures are typed, human-readable,
/// and never substituted with placeholder statute text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatuteOutcome {
    pub citation: Citation,
    pub record: Option<StatuteRecord>,
    /// Failure reason when `record` is `None`, e.g. `"parse_error"`.
    pub failure: Option<String>,
    /// Elements screening against the officer narrative, when a record and a
    /// narrative were both available.
    pub evaluation: Option<ElementEvaluation>,
}

impl StatuteOutcome {
    pub fn resolved(&self) -> bool {
        self.record.is_some()
    }
}

/// Everything the pipeline produced for one document, handed to the
/// persistence collaborator. The collaborator owns storage and all
/// transactional semantics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseBundle {
    pub summary: DocumentSummary,
    pub merged_text: String,
    pub identity: CaseIdentity,
    pub charges: Vec<ChargeCandidate>,
    pub priors: Option<PriorsSummary>,
    pub statutes: Vec<StatuteOutcome>,
}
