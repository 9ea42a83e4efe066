//! Content validation: genuine statute text vs. website navigation chrome.
//!
//! Applied identically at three checkpoints: before caching, when reading
//! from cache, and immediately before returning to the caller. No resolver
//! code path may skip it; the cache checkpoint is what lets validation rules
//! tighten after content was cached.

use regex::Regex;

use crate::models::Jurisdiction;

/// Minimum plausible length of a state-code section.
const UTAH_MIN_LEN: usize = 300;

/// Municipal ordinances run short; the floor is lower and no structural
/// markers are required.
const WVC_MIN_LEN: usize = 120;

/// Multi-word phrases that only occur in site chrome. Deliberately excludes
/// single words ("search", "home", "contact") that also appear in legitimate
/// statute text.
const NAV_PHRASES: &[&str] = &[
    "skip to content",
    "skip to main content",
    "skip to navigation",
    "javascript is required",
    "javascript must be enabled",
    "enable javascript",
    "toggle navigation",
    "privacy policy",
    "terms of use",
    "site map",
    "search utah code",
    "utah code archive",
    "back to top",
    "view whole chapter",
    "download pdf version",
    "page not found",
];

/// Why a piece of content was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationFailure {
    TooShort { len: usize, min: usize },
    NavigationPhrase(&'static str),
    MissingSubsectionMarkers,
}

impl std::fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationFailure::TooShort { len, min } => {
                write!(f, "content too short ({len} chars, minimum {min})")
            }
            ValidationFailure::NavigationPhrase(phrase) => {
                write!(f, "navigation phrase present: \"{phrase}\"")
            }
            ValidationFailure::MissingSubsectionMarkers => {
                write!(f, "no subsection markers found")
            }
        }
    }
}

/// Validate candidate statute text for a jurisdiction.
pub fn validate_content(
    jurisdiction: Jurisdiction,
    text: &str,
) -> Result<(), ValidationFailure> {
    let trimmed = text.trim();
    let lower = trimmed.to_lowercase();

    for phrase in NAV_PHRASES {
        if lower.contains(phrase) {
            return Err(ValidationFailure::NavigationPhrase(phrase));
        }
    }

    let min = match jurisdiction {
        Jurisdiction::Utah => UTAH_MIN_LEN,
        Jurisdiction::WestValley => WVC_MIN_LEN,
    };
    let len = trimmed.chars().count();
    if len < min {
        return Err(ValidationFailure::TooShort { len, min });
    }

    // State-code sections are always subdivided: (1), (a), (i)…
    if jurisdiction == Jurisdiction::Utah {
        let markers = Regex::new(r"\((?:\d{1,2}|[a-z]|i{1,3}|iv|v|vi{0,3}|ix|x)\)").unwrap();
        if !markers.is_match(&lower) {
            return Err(ValidationFailure::MissingSubsectionMarkers);
        }
    }

    Ok(())
}

/// Boolean convenience used where the failure reason is not needed.
pub fn is_valid(jurisdiction: Jurisdiction, text: &str) -> bool {
    validate_content(jurisdiction, text).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A plausible Utah section body: long, subdivided.
    fn utah_section() -> String {
        "(1) A person commits assault if the person: (a) attempts, with \
         unlawful force or violence, to do bodily injury to another; or \
         (b) commits an act, with unlawful force or violence, that causes \
         bodily injury to another or creates a substantial risk of bodily \
         injury to another. (2) Assault is a class B misdemeanor. \
         (3) Assault is a class A misdemeanor if: (a) the person causes \
         substantial bodily injury to another; or (b) the victim is pregnant \
         and the person has knowledge of the pregnancy."
            .into()
    }

    #[test]
    fn genuine_utah_section_is_valid() {
        assert!(is_valid(Jurisdiction::Utah, &utah_section()));
    }

    #[test]
    fn short_text_is_invalid_for_both_jurisdictions() {
        let short = "(1) Short.";
        assert!(!is_valid(Jurisdiction::Utah, short));
        assert!(!is_valid(Jurisdiction::WestValley, short));
    }

    #[test]
    fn all_text_under_minimum_is_invalid() {
        for len in [0, 50, 119] {
            let text: String = "x".repeat(len);
            assert!(
                !is_valid(Jurisdiction::WestValley, &text),
                "len {len} should fail the lenient floor"
            );
        }
        let text_299: String = "(1) ".chars().cycle().take(299).collect();
        assert!(!is_valid(Jurisdiction::Utah, &text_299));
    }

    #[test]
    fn navigation_phrase_invalidates_regardless_of_length() {
        let text = format!("{} Skip to Content {}", utah_section(), utah_section());
        let failure = validate_content(Jurisdiction::Utah, &text).unwrap_err();
        assert_eq!(failure, ValidationFailure::NavigationPhrase("skip to content"));
    }

    #[test]
    fn navigation_phrase_match_is_case_insensitive() {
        let text = format!("{} PRIVACY POLICY", utah_section());
        assert!(!is_valid(Jurisdiction::Utah, &text));
    }

    #[test]
    fn single_word_search_does_not_invalidate() {
        // "search" alone occurs in real statutes (search and seizure).
        let text = format!("{} An officer may conduct a search incident to arrest.", utah_section());
        assert!(is_valid(Jurisdiction::Utah, &text));
    }

    #[test]
    fn utah_without_subsection_markers_is_invalid() {
        let flat = "A person commits assault if the person attempts with unlawful \
                    force or violence to do bodily injury to another person. "
            .repeat(6);
        assert!(flat.chars().count() > 300);
        let failure = validate_content(Jurisdiction::Utah, &flat).unwrap_err();
        assert_eq!(failure, ValidationFailure::MissingSubsectionMarkers);
    }

    #[test]
    fn wvc_without_subsection_markers_is_valid() {
        let flat = "It is unlawful for any person to park a vehicle upon any \
                    street in the city for the principal purpose of displaying \
                    the vehicle for sale without the consent of the city. "
            .repeat(2);
        assert!(is_valid(Jurisdiction::WestValley, &flat));
    }

    #[test]
    fn roman_numeral_markers_satisfy_the_structure_check() {
        let text = format!(
            "{} (i) first element; (ii) second element.",
            "A person is guilty of an offense under this part if the \
             prosecution establishes each of the following elements beyond \
             a reasonable doubt as described in the subsections below. "
                .repeat(5)
        );
        assert!(is_valid(Jurisdiction::Utah, &text));
    }
}
