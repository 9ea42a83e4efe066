//! caseintel: document intelligence for police-report screening.
//!
//! Takes raw report PDFs of wildly uneven scan quality and produces a
//! reviewable [`CaseBundle`]: merged plain text, detected statute citations
//! with validated statute text, current charges, criminal-history entries,
//! and a coarse elements-met signal for each charge. Everything here is a
//! screening aid; outputs are meant for human review, never for automated
//! decisions.
//!
//! Pipeline shape (per document):
//!
//! ```text
//! bytes ─ pdf text layer ─ garble check ─┬─ (garbled) OCR fallback ─┐
//!                                        └─ (clean) ───────────────┤
//!                                                        merged text
//!                  ┌─────────────────────────────┬─────────────────┘
//!          citation detection              bounded extraction
//!                  │                       (identity / charges / priors)
//!          statute resolution                      │
//!          (cache → HTTP → browser,                │
//!           validated at every step)               │
//!                  └────────── element evaluation ─┘
//!                                      │
//!                                 CaseBundle
//! ```
//!
//! Persistence of cases/violations, upload transport, and access control are
//! collaborator concerns; the only storage this crate touches is the statute
//! cache behind [`db::StatuteStore`].

pub mod config;
pub mod db;
pub mod models;
pub mod pipeline;

pub use config::{OcrProvider, PipelineConfig, SectionMarkers, StatuteConfig};
pub use models::{
    CaseBundle, CaseIdentity, ChargeCandidate, Citation, DocumentSummary, ElementEvaluation,
    Jurisdiction, PriorsSummary, RawDocument, StatuteRecord,
};
pub use pipeline::processor::DocumentPipeline;
pub use pipeline::statutes::ResolveError;

/// Initialize tracing for binaries and integration tests.
///
/// Respects `RUST_LOG`; defaults to `info` for this crate. Safe to call more
/// than once; later calls are no-ops.
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("caseintel=info"));

    let _ = fmt().with_env_filter(filter).try_init();
}
