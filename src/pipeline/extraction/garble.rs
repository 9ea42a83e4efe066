//! Garble detection: is extracted text genuine content or extraction noise?
//!
//! Scanned reports routinely defeat the naive extractor, which then emits
//! glyph-id soup like `(cid:3)(cid:9)…` or long runs of punctuation. Two
//! independent, order-free checks decide whether to fall back to OCR:
//! a whole-text check and a prefix check over the compacted document head;
//! the latter catches reports whose cover sheet scanned badly even when the
//! body text is clean.

use crate::models::TextQualityVerdict;

/// Anything shorter than this cannot be a real report.
const MIN_TEXT_LEN: usize = 120;

/// Broken-glyph marker emitted when a PDF's font has no unicode map.
const GLYPH_MARKER: &str = "(cid:";

/// Whole-text thresholds.
const MAX_SYMBOL_RATIO: f32 = 0.33;
const MIN_LETTER_RATIO: f32 = 0.22;
const MAX_SYMBOL_RUN: usize = 18;

/// Prefix check: first N characters after whitespace removal.
const PREFIX_LEN: usize = 1200;
const PREFIX_MAX_SYMBOL_RATIO: f32 = 0.45;
const PREFIX_MAX_PUNCT_DENSITY: f32 = 0.35;

/// Assess extracted text quality. Pure and deterministic; either flag in the
/// verdict independently triggers the OCR fallback.
pub fn assess(text: &str) -> TextQualityVerdict {
    let stripped: String = text.chars().filter(|c| !c.is_control()).collect();
    let trimmed = stripped.trim();

    let total = trimmed.chars().count();
    let letters = trimmed.chars().filter(|c| c.is_alphabetic()).count();
    let symbols = trimmed
        .chars()
        .filter(|c| !c.is_alphanumeric() && !c.is_whitespace())
        .count();

    let letter_ratio = ratio(letters, total);
    let symbol_ratio = ratio(symbols, total);
    let longest_symbol_run = longest_symbol_run(trimmed);

    let garbled = total < MIN_TEXT_LEN
        || trimmed.contains(GLYPH_MARKER)
        || (symbol_ratio > MAX_SYMBOL_RATIO && letter_ratio < MIN_LETTER_RATIO)
        || longest_symbol_run >= MAX_SYMBOL_RUN;

    let garbled_prefix = prefix_is_garbled(trimmed);

    TextQualityVerdict {
        garbled,
        garbled_prefix,
        symbol_ratio,
        letter_ratio,
        longest_symbol_run,
    }
}

/// Secondary check over only the compacted head of the document.
fn prefix_is_garbled(text: &str) -> bool {
    let compact: String = text
        .chars()
        .filter(|c| !c.is_whitespace())
        .take(PREFIX_LEN)
        .collect();
    if compact.is_empty() {
        return false;
    }

    let total = compact.chars().count();
    let symbols = compact.chars().filter(|c| !c.is_alphanumeric()).count();
    let punct = compact.chars().filter(|c| c.is_ascii_punctuation()).count();

    ratio(symbols, total) > PREFIX_MAX_SYMBOL_RATIO
        || ratio(punct, total) > PREFIX_MAX_PUNCT_DENSITY
}

fn longest_symbol_run(text: &str) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for c in text.chars() {
        if !c.is_alphanumeric() && !c.is_whitespace() {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

fn ratio(part: usize, total: usize) -> f32 {
    if total == 0 {
        0.0
    } else {
        part as f32 / total as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Plausible clean report text, repeated to clear the length floor.
    fn clean_text() -> String {
        "The officer responded to a report of theft at the listed address. \
         Upon arrival the complainant stated that an unknown male had taken \
         merchandise from the store without paying and fled on foot. "
            .repeat(3)
    }

    #[test]
    fn empty_text_is_garbled() {
        assert!(assess("").garbled);
    }

    #[test]
    fn short_text_is_garbled() {
        // Under 120 characters, content quality is irrelevant.
        let verdict = assess("Case 24-1234, suspect Roberts.");
        assert!(verdict.garbled);
    }

    #[test]
    fn all_short_strings_are_garbled() {
        for len in [1, 50, 119] {
            let text: String = "a ".repeat(len).chars().take(len).collect();
            assert!(assess(&text).garbled, "len {len} should be garbled");
        }
    }

    #[test]
    fn clean_report_text_passes() {
        let verdict = assess(&clean_text());
        assert!(!verdict.garbled);
        assert!(!verdict.garbled_prefix);
        assert!(!verdict.needs_ocr());
    }

    #[test]
    fn cid_glyph_soup_is_garbled() {
        let text = "(cid:3)(cid:9)(cid:14)".repeat(20);
        assert!(assess(&text).garbled);
    }

    #[test]
    fn cid_marker_in_long_text_is_garbled() {
        let text = format!("{} (cid:88) {}", clean_text(), clean_text());
        assert!(assess(&text).garbled);
    }

    #[test]
    fn symbol_heavy_letter_poor_text_is_garbled() {
        // >33% symbols, <22% letters.
        let text = "##%%@@!!^^&&**(()) 1234 ab ".repeat(10);
        let verdict = assess(&text);
        assert!(verdict.symbol_ratio > 0.33);
        assert!(verdict.letter_ratio < 0.22);
        assert!(verdict.garbled);
    }

    #[test]
    fn long_symbol_run_is_garbled() {
        let text = format!("{}~~~~~~~~~~~~~~~~~~~~{}", clean_text(), clean_text());
        let verdict = assess(&text);
        assert!(verdict.longest_symbol_run >= 18);
        assert!(verdict.garbled);
    }

    #[test]
    fn corrupt_header_clean_body_trips_prefix_check_only() {
        // 600 compacted junk characters up front (runs kept under 18 by the
        // spaces), clean body long enough that whole-text ratios stay under
        // the thresholds.
        let junk = "#@!%^&*()_+{}|: ".repeat(40);
        let body = clean_text().repeat(6);
        let verdict = assess(&format!("{junk}\n{body}"));
        assert!(verdict.garbled_prefix);
        assert!(!verdict.garbled);
        assert!(verdict.needs_ocr());
    }

    #[test]
    fn checks_are_order_independent() {
        let text = clean_text();
        let a = assess(&text);
        let b = assess(&text);
        assert_eq!(a.garbled, b.garbled);
        assert_eq!(a.garbled_prefix, b.garbled_prefix);
    }
}
