//! Current-charge extraction from the screening-sheet table.
//!
//! Scoped strictly to the bounded screening-sheet section: the scan stops at
//! the first history/BCI/NCIC marker so codes from prior-offense listings can
//! never leak into the current charges. Every candidate code must survive a
//! title allowlist, a date-shape rejection, and a suffix allowlist; a small
//! OCR-correction map repairs the one misread we see constantly (a leading
//! `7` read as `1`) before validation.

use regex::Regex;

use crate::config::SectionMarkers;
use crate::models::ChargeCandidate;
use crate::pipeline::structuring::section::bounded_section;

/// Utah code titles that actually appear on charge sheets.
const KNOWN_TITLES: &[&str] = &[
    "10", "23", "32b", "41", "53", "58", "76", "77", "78a", "80",
];

/// Allowed letter suffixes on chapter/section parts (e.g. `41-6a-502`).
const ALLOWED_SUFFIXES: &[char] = &['a', 'b', 'c'];

/// Severity classes as printed on the sheet.
const CLASS_PATTERN: &str = r"\b(F1|F2|F3|MA|MB|MC|IN)\b";

/// Extract deduplicated charge candidates from the screening-sheet section.
/// Returns nothing when the document has no bounded screening sheet.
pub fn extract_current_charges(text: &str, markers: &SectionMarkers) -> Vec<ChargeCandidate> {
    let Some(section) = bounded_section(text, &markers.charge_start, &markers.charge_stop) else {
        return Vec::new();
    };

    let code_pattern =
        Regex::new(r"(?i)\b(\d{1,2}[a-z]?)-(\d{1,3}[a-z]?)-(\d{1,4}(?:\.\d+)?)\b").unwrap();
    let class_pattern = Regex::new(CLASS_PATTERN).unwrap();

    let mut charges: Vec<ChargeCandidate> = Vec::new();

    for line in section.lines() {
        let Some(caps) = code_pattern.captures(line) else {
            continue;
        };

        let code = correct_ocr_misreads(
            &format!("{}-{}-{}", &caps[1], &caps[2], &caps[3]).to_lowercase(),
        );
        if !is_plausible_code(&code) {
            continue;
        }
        if charges.iter().any(|c| c.code == code) {
            continue;
        }

        let code_end = caps.get(0).unwrap().end();
        let rest = &line[code_end.min(line.len())..];

        let class = class_pattern
            .captures(&rest.to_uppercase())
            .map(|c| c[1].to_string());
        let name = charge_name(rest, &class);

        charges.push(ChargeCandidate { code, name, class });
    }

    tracing::debug!(count = charges.len(), "Charge extraction complete");
    charges
}

/// Repair known OCR misreads before validation. The dominant one on this
/// vendor's sheets: the leading `7` of titles 76/77/78a read as `1`.
fn correct_ocr_misreads(code: &str) -> String {
    let Some((title, rest)) = code.split_once('-') else {
        return code.to_string();
    };
    if KNOWN_TITLES.contains(&title) {
        return code.to_string();
    }
    if let Some(stripped) = title.strip_prefix('1') {
        let repaired = format!("7{stripped}");
        if KNOWN_TITLES.contains(&repaired.as_str()) {
            return format!("{repaired}-{rest}");
        }
    }
    code.to_string()
}

/// Validate a normalized code: known title, sane numeric ranges (rejecting
/// date-shaped triples), allowlisted suffixes.
fn is_plausible_code(code: &str) -> bool {
    let parts: Vec<&str> = code.split('-').collect();
    let [title, chapter, section] = parts.as_slice() else {
        return false;
    };

    if !KNOWN_TITLES.contains(title) {
        return false;
    }

    for part in [chapter, section] {
        let bare = part.trim_end_matches(|c: char| c.is_ascii_alphabetic());
        let suffix = &part[bare.len()..];
        if suffix.chars().count() > 1 {
            return false;
        }
        if let Some(c) = suffix.chars().next() {
            if !ALLOWED_SUFFIXES.contains(&c) {
                return false;
            }
        }
        if bare.is_empty() || bare.parse::<f32>().is_err() {
            return false;
        }
    }

    // Date-shaped: a four-digit year in the section slot with month/day-sized
    // leading parts is a misread date, not a code.
    let section_num = section
        .trim_end_matches(|c: char| c.is_ascii_alphabetic())
        .split('.')
        .next()
        .and_then(|s| s.parse::<u32>().ok());
    let title_num = title
        .trim_end_matches(|c: char| c.is_ascii_alphabetic())
        .parse::<u32>()
        .ok();
    let chapter_num = chapter
        .trim_end_matches(|c: char| c.is_ascii_alphabetic())
        .parse::<u32>()
        .ok();
    if let (Some(t), Some(c), Some(s)) = (title_num, chapter_num, section_num) {
        if (1900..=2099).contains(&s) && t <= 12 && c <= 31 && section.len() == 4 {
            return false;
        }
    }

    true
}

/// The charge name is whatever sits between the code and the class token.
fn charge_name(rest: &str, class: &Option<String>) -> String {
    let mut name = rest.trim();
    if let Some(class) = class {
        if let Some(idx) = name.to_uppercase().rfind(class.as_str()) {
            name = name[..idx].trim();
        }
    }
    name.trim_matches(|c: char| c == '-' || c == ':' || c == ',' || c.is_whitespace())
        .to_string()
}
