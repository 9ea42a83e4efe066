//! Pipeline configuration, resolved once at process start.
//!
//! Nothing in the pipeline reads the environment directly: the binary (or
//! test) builds a [`PipelineConfig`] up front and passes it by reference into
//! the orchestrator. Provider selection, statute-site base URLs, and the
//! section boundary markers all live here so that a new report vendor layout
//! means new marker data, not pipeline changes.

use std::path::PathBuf;

// ──────────────────────────────────────────────
// OCR provider selection
// ──────────────────────────────────────────────

/// Which OCR backend is active for this run, if any.
///
/// Resolved exactly once per process from named environment variables; the
/// value is immutable for the run's duration. Holds live credentials, so it
/// is deliberately not serializable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OcrProvider {
    /// No OCR credentials configured; naive extraction only.
    None,
    /// Generic vision API taking inline document bytes plus an API key.
    VisionApi { api_key: String },
    /// Vision-capable language model (inline base64 images + instruction
    /// prompt against an OpenAI/Ollama-style generate endpoint).
    LanguageModel { base_url: String, model: String },
    /// Structured-document OCR service (bytes + mime type in, text out).
    /// All four credentials are required before this provider is considered.
    DocumentOcr {
        endpoint: String,
        project_id: String,
        processor_id: String,
        access_token: String,
    },
}

impl Default for OcrProvider {
    fn default() -> Self {
        OcrProvider::None
    }
}

impl OcrProvider {
    /// Resolve the active provider from the environment.
    ///
    /// Precedence, first full credential set wins:
    /// 1. structured-document OCR (`CASEINTEL_DOCAI_*`, all four)
    /// 2. language-model OCR (`CASEINTEL_LLM_OCR_URL` + `_MODEL`)
    /// 3. vision API (`CASEINTEL_VISION_API_KEY`)
    /// 4. none
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());

        if let (Some(endpoint), Some(project_id), Some(processor_id), Some(access_token)) = (
            var("CASEINTEL_DOCAI_ENDPOINT"),
            var("CASEINTEL_DOCAI_PROJECT"),
            var("CASEINTEL_DOCAI_PROCESSOR"),
            var("CASEINTEL_DOCAI_TOKEN"),
        ) {
            return OcrProvider::DocumentOcr {
                endpoint,
                project_id,
                processor_id,
                access_token,
            };
        }

        if let (Some(base_url), Some(model)) =
            (var("CASEINTEL_LLM_OCR_URL"), var("CASEINTEL_LLM_OCR_MODEL"))
        {
            return OcrProvider::LanguageModel { base_url, model };
        }

        if let Some(api_key) = var("CASEINTEL_VISION_API_KEY") {
            return OcrProvider::VisionApi { api_key };
        }

        OcrProvider::None
    }

    /// Short label for logs and summaries.
    pub fn label(&self) -> &'static str {
        match self {
            OcrProvider::None => "none",
            OcrProvider::VisionApi { .. } => "vision_api",
            OcrProvider::LanguageModel { .. } => "language_model",
            OcrProvider::DocumentOcr { .. } => "document_ocr",
        }
    }
}

// ──────────────────────────────────────────────
// Statute resolution
// ──────────────────────────────────────────────

/// Statute resolver settings: source base URLs, cache TTL, diagnostics.
#[derive(Debug, Clone)]
pub struct StatuteConfig {
    /// Base URL of the state code site (shell + versioned section pages).
    pub utah_base_url: String,
    /// Base URL of the municipal code site.
    pub wvc_base_url: String,
    /// Cache entries older than this are treated as misses and refetched.
    pub cache_ttl_hours: i64,
    /// Enable the headless-browser fallback transport.
    pub browser_enabled: bool,
    /// Dump truncated fetched HTML and extracted text per citation.
    pub debug_dump: bool,
    /// Override for the debug dump directory.
    pub dump_dir: Option<PathBuf>,
}

impl Default for StatuteConfig {
    fn default() -> Self {
        Self {
            utah_base_url: "https://le.utah.gov/xcode".into(),
            wvc_base_url: "https://wvc-ut.municipal.codes".into(),
            cache_ttl_hours: 24 * 30,
            browser_enabled: true,
            debug_dump: false,
            dump_dir: None,
        }
    }
}

// ──────────────────────────────────────────────
// Section boundary markers
// ──────────────────────────────────────────────

/// Named section boundary markers for bounded extraction.
///
/// These are tuned to one report vendor's layout. They are data, not logic:
/// a department using a different records system supplies its own marker set.
/// Matching is case-insensitive on a per-line basis.
#[derive(Debug, Clone)]
pub struct SectionMarkers {
    /// Lines that open the screening-sheet charge table.
    pub charge_start: Vec<String>,
    /// Lines that close it. Charges must never leak past these.
    pub charge_stop: Vec<String>,
    /// Lines that open a criminal-history section.
    pub history_start: Vec<String>,
    /// Lines that close it.
    pub history_stop: Vec<String>,
    /// Lines that open the officer narrative.
    pub narrative_start: Vec<String>,
    /// Lines that close it.
    pub narrative_stop: Vec<String>,
}

impl Default for SectionMarkers {
    fn default() -> Self {
        let v = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        Self {
            charge_start: v(&["screening sheet", "current charges", "charge summary"]),
            charge_stop: v(&["criminal history", "utah bci", "ncic", "general offense"]),
            history_start: v(&[
                "criminal history summary",
                "adult criminal history (utah bci)",
                "adult criminal history",
                "criminal history",
            ]),
            history_stop: v(&[
                "general offense",
                "officer narrative",
                "narrative",
                "screening sheet",
            ]),
            narrative_start: v(&["general offense", "officer narrative", "narrative:"]),
            narrative_stop: v(&["criminal history", "screening sheet", "utah bci"]),
        }
    }
}

// ──────────────────────────────────────────────
// Top-level configuration
// ──────────────────────────────────────────────

/// Everything the pipeline needs, constructed once and passed by reference.
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub ocr: OcrProvider,
    pub statutes: StatuteConfig,
    pub markers: SectionMarkers,
}

impl PipelineConfig {
    /// Build a config from the process environment. The only place in the
    /// crate that reads environment variables for pipeline behavior.
    pub fn from_env() -> Self {
        let debug_dump = std::env::var("CASEINTEL_DEBUG_DUMP")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        let dump_dir = std::env::var("CASEINTEL_DUMP_DIR").ok().map(PathBuf::from);

        Self {
            ocr: OcrProvider::from_env(),
            statutes: StatuteConfig {
                debug_dump,
                dump_dir,
                ..StatuteConfig::default()
            },
            markers: SectionMarkers::default(),
        }
    }
}
