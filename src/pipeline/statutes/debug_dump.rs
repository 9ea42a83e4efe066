//! Diagnostic dump of fetched statute pages.
//!
//! Behind the `CASEINTEL_DEBUG_DUMP` flag (see [`crate::config`]): writes
//! truncated raw HTML and extracted text per citation, keyed by citation and
//! timestamp. Diagnostic only: failures are logged and never block
//! resolution.

use std::path::PathBuf;

use chrono::Utc;

use crate::config::StatuteConfig;
use crate::models::Citation;

/// Keep dumps readable: HTML beyond this is truncated.
const MAX_HTML_BYTES: usize = 65_536;

fn resolve_dir(config: &StatuteConfig) -> Option<PathBuf> {
    if !config.debug_dump {
        return None;
    }
    let dir = config
        .dump_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("caseintel-debug"));

    if let Err(e) = std::fs::create_dir_all(&dir) {
        tracing::warn!(path = %dir.display(), error = %e, "Debug dump: cannot create directory");
        return None;
    }
    Some(dir)
}

fn stamp(citation: &Citation) -> String {
    format!(
        "{}-{}-{}",
        citation.jurisdiction.as_str(),
        citation.normalized_key,
        Utc::now().format("%Y%m%dT%H%M%S%3f")
    )
}

/// Dump raw fetched HTML (truncated) for a citation.
pub fn dump_html(config: &StatuteConfig, citation: &Citation, label: &str, html: &str) {
    let Some(dir) = resolve_dir(config) else {
        return;
    };
    let mut end = html.len().min(MAX_HTML_BYTES);
    while end > 0 && !html.is_char_boundary(end) {
        end -= 1;
    }
    let path = dir.join(format!("{}-{label}.html", stamp(citation)));
    if let Err(e) = std::fs::write(&path, &html[..end]) {
        tracing::warn!(path = %path.display(), error = %e, "Debug dump: HTML write failed");
    }
}

/// Dump extracted candidate text for a citation.
pub fn dump_text(config: &StatuteConfig, citation: &Citation, label: &str, text: &str) {
    let Some(dir) = resolve_dir(config) else {
        return;
    };
    let path = dir.join(format!("{}-{label}.txt", stamp(citation)));
    if let Err(e) = std::fs::write(&path, text) {
        tracing::warn!(path = %path.display(), error = %e, "Debug dump: text write failed");
    }
}
