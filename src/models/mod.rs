//! Core data types passed between pipeline stages and handed to the
//! persistence collaborator.

pub mod bundle;
pub mod charge;
pub mod citation;
pub mod document;

pub use bundle::{CaseBundle, DocumentSummary, StatuteOutcome};
pub use charge::{
    CaseIdentity, ChargeCandidate, ElementEvaluation, ElementFinding, ElementStatus,
    PriorIncident, PriorsSource, PriorsSummary,
};
pub use citation::{Citation, Jurisdiction, StatuteRecord};
pub use document::{ExtractionResult, MergedText, RawDocument, TextQualityVerdict};
