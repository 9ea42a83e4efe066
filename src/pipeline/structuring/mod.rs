//! Section-bounded structured extraction.
//!
//! Everything in this module is a pure function over merged text: no I/O, no
//! errors, no fabrication. Fields that cannot be recovered with confidence
//! are simply absent. Extraction is bounded by named section markers (see
//! [`crate::config::SectionMarkers`]) so that content never leaks across
//! section boundaries: charges come only from the screening sheet, priors
//! only from a criminal-history section.

pub mod charges;
pub mod elements;
pub mod history;
pub mod identity;
pub mod section;

pub use charges::extract_current_charges;
pub use elements::{evaluate_elements, LlmClient};
pub use history::extract_priors;
pub use identity::extract_identity;
pub use section::bounded_section;
