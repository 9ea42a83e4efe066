//! Statute/ordinance citation detection and normalization.
//!
//! Utah code citations look like `76-5-102` or `41-6a-502`, optionally with
//! subsection tails like `(2)(a)`. Municipal ordinances use the same shape
//! but are flagged by nearby "WVC" / "West Valley" context. Date-shaped
//! number triples (`12-25-2023`) match the same pattern and are rejected.

use regex::Regex;

use crate::models::{Citation, Jurisdiction};

/// Characters of surrounding context inspected for a jurisdiction tag.
const CONTEXT_WINDOW: usize = 40;

/// Scan merged text for citations, normalized and deduped on
/// `(jurisdiction, normalized_key)`. First raw spelling wins.
pub fn detect_citations(text: &str) -> Vec<Citation> {
    let pattern = Regex::new(
        r"\b(\d{1,2}[A-Ca-c]?)-(\d{1,3}[A-Za-z]?)-(\d{1,4}(?:\.\d+)?)((?:\([0-9A-Za-z]{1,4}\))*)",
    )
    .unwrap();

    let mut citations: Vec<Citation> = Vec::new();

    for caps in pattern.captures_iter(text) {
        let whole = caps.get(0).unwrap();
        let title = &caps[1];
        let chapter = &caps[2];
        let section = &caps[3];

        if looks_like_date(title, chapter, section) {
            continue;
        }

        let normalized_key = format!(
            "{}-{}-{}",
            title.to_lowercase(),
            chapter.to_lowercase(),
            section
        );
        let jurisdiction = jurisdiction_for(text, whole.start(), whole.end());

        if citations
            .iter()
            .any(|c| c.jurisdiction == jurisdiction && c.normalized_key == normalized_key)
        {
            continue;
        }

        citations.push(Citation {
            raw: whole.as_str().to_string(),
            normalized_key,
            jurisdiction,
        });
    }

    tracing::debug!(count = citations.len(), "Citation detection complete");
    citations
}

/// `12-25-2023` is a date, not a statute. A four-digit year in the section
/// position with month/day-sized leading parts is the telltale.
fn looks_like_date(title: &str, chapter: &str, section: &str) -> bool {
    let (Ok(t), Ok(c)) = (title.parse::<u32>(), chapter.parse::<u32>()) else {
        return false;
    };
    let year_like = section.len() == 4
        && section
            .parse::<u32>()
            .map(|y| (1900..=2099).contains(&y))
            .unwrap_or(false);
    year_like && t <= 12 && c <= 31
}

/// Municipal citations are tagged by nearby context; everything else is
/// state code.
fn jurisdiction_for(text: &str, start: usize, end: usize) -> Jurisdiction {
    let window_start = start.saturating_sub(CONTEXT_WINDOW);
    let window_end = (end + CONTEXT_WINDOW).min(text.len());
    // Clamp to char boundaries to keep the slice valid.
    let window_start = floor_char_boundary(text, window_start);
    let window_end = floor_char_boundary(text, window_end);
    let context = text[window_start..window_end].to_lowercase();

    if context.contains("wvc") || context.contains("w.v.c") || context.contains("west valley") {
        Jurisdiction::WestValley
    } else {
        Jurisdiction::Utah
    }
}

fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    while index > 0 && !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_simple_state_citation() {
        let citations = detect_citations("in violation of 58-37-8, a felony");
        assert_eq!(citations.len(), 1);
        assert_eq!(citations[0].normalized_key, "58-37-8");
        assert_eq!(citations[0].jurisdiction, Jurisdiction::Utah);
    }

    #[test]
    fn keeps_subsections_in_raw_but_not_in_key() {
        let citations = detect_citations("charged under 58-37-8(2)(a) today");
        assert_eq!(citations[0].raw, "58-37-8(2)(a)");
        assert_eq!(citations[0].normalized_key, "58-37-8");
    }

    #[test]
    fn lettered_chapter_is_lowercased_in_key() {
        let citations = detect_citations("DUI per 41-6A-502 as amended");
        assert_eq!(citations[0].normalized_key, "41-6a-502");
    }

    #[test]
    fn wvc_context_tags_municipal_jurisdiction() {
        let citations = detect_citations("cited for WVC 17-3-103 (municipal)");
        assert_eq!(citations[0].jurisdiction, Jurisdiction::WestValley);
    }

    #[test]
    fn jurisdiction_is_part_of_identity() {
        let state = detect_citations("violation of 17-3-103 of the state code");
        let city = detect_citations("violation of WVC 17-3-103");
        assert_eq!(state[0].jurisdiction, Jurisdiction::Utah);
        assert_eq!(city[0].jurisdiction, Jurisdiction::WestValley);
        assert_ne!(state[0].cache_key(), city[0].cache_key());
    }

    #[test]
    fn duplicate_citations_dedupe_on_key() {
        let citations =
            detect_citations("count one: 76-5-102; count two also cites 76-5-102(1)(b)");
        assert_eq!(citations.len(), 1);
        assert_eq!(citations[0].raw, "76-5-102");
    }

    #[test]
    fn dates_are_not_citations() {
        let citations = detect_citations("arrested on 12-25-2023 at the residence");
        assert!(citations.is_empty());
    }

    #[test]
    fn date_like_statute_section_is_kept() {
        // Title 76 cannot be a month; this is a statute even with 4-digit-ish
        // parts elsewhere.
        let citations = detect_citations("per 76-10-1204 (distribution of pornographic material)");
        assert_eq!(citations.len(), 1);
        assert_eq!(citations[0].normalized_key, "76-10-1204");
    }

    #[test]
    fn empty_text_yields_nothing() {
        assert!(detect_citations("").is_empty());
    }
}
