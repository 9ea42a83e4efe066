use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Legal-code source a citation resolves against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Jurisdiction {
    /// Utah state code. Strict validation: long sections with subsection
    /// markers are the norm, so both are required.
    Utah,
    /// West Valley City municipal code. Short ordinances without subsection
    /// structure are common, so validation is lenient.
    WestValley,
}

impl Jurisdiction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Jurisdiction::Utah => "UT",
            Jurisdiction::WestValley => "WVC",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "UT" => Some(Jurisdiction::Utah),
            "WVC" => Some(Jurisdiction::WestValley),
            _ => None,
        }
    }
}

/// A statute/ordinance reference found in report text.
///
/// Several raw spellings may normalize to the same key; detection dedupes on
/// `(jurisdiction, normalized_key)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    /// The text as it appeared in the report, e.g. `"58-37-8(2)(a)"`.
    pub raw: String,
    /// Canonical `title-chapter-section` key, e.g. `"58-37-8"`.
    pub normalized_key: String,
    pub jurisdiction: Jurisdiction,
}

impl Citation {
    /// Cache key; also the key the per-citation resolution lock is held on.
    pub fn cache_key(&self) -> String {
        format!("{}:{}", self.jurisdiction.as_str(), self.normalized_key)
    }
}

/// Validated statute text for a citation.
///
/// A record only exists after passing the content validator; construction
/// sites must not bypass it. Cached copies that later fail re-validation are
/// deleted from the cache, not merely skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatuteRecord {
    pub jurisdiction: Jurisdiction,
    pub normalized_key: String,
    pub title: String,
    pub text: String,
    pub url: String,
    pub fetched_at: DateTime<Utc>,
}
