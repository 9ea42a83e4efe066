//! Statute citation resolution.
//!
//! Citations detected in report text are resolved to validated statute text
//! through an ordered strategy chain: cache → live HTTP → headless browser.
//! Every source, including the cache, passes the content validator before
//! it is trusted, and invalid content is never cached and never returned.
//! It is always preferable to tell the caller "not resolved" than to hand
//! back website navigation chrome dressed up as law.

pub mod browser;
pub mod citation;
pub mod debug_dump;
pub mod fetch;
pub mod resolver;
pub mod validator;

pub use citation::detect_citations;
pub use resolver::{ResolveStrategy, StatuteResolver};
pub use validator::{validate_content, ValidationFailure};

use thiserror::Error;

/// Typed resolution failures surfaced to the caller. Garbled text quality is
/// a verdict upstream, never an error here; cache/storage trouble degrades to
/// a cache miss and never reaches this taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("statute not found at source")]
    NotFound,

    #[error("network error: {0}")]
    Network(String),

    #[error("rate limited by source")]
    RateLimited,

    #[error("content failed parsing or validation: {0}")]
    Parse(String),

    #[error("unsupported citation: {0}")]
    Unsupported(String),
}

impl ResolveError {
    /// Stable machine-readable tag for persistence and review UIs.
    pub fn kind(&self) -> &'static str {
        match self {
            ResolveError::NotFound => "not_found",
            ResolveError::Network(_) => "network_error",
            ResolveError::RateLimited => "rate_limited",
            ResolveError::Parse(_) => "parse_error",
            ResolveError::Unsupported(_) => "unsupported",
        }
    }
}
