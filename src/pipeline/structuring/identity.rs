//! Case identity extraction: case number, defendant name, booking status.
//!
//! Reports repeat the defendant's name in several places and several forms,
//! including truncated ones, and also names half a dozen officers. Name
//! extraction therefore works from a prioritized label list, rejects
//! candidates that sit in officer-identification context, and never lets a
//! truncated candidate displace a fuller one already accepted.

use regex::Regex;

use crate::models::CaseIdentity;

/// A first name shorter than this is treated as truncated.
const MIN_FIRST_NAME_LEN: usize = 3;

/// Characters inspected before a name label for officer context.
const OFFICER_CONTEXT_WINDOW: usize = 60;

/// Name-label patterns in priority order. Earlier labels are more reliable
/// sources for the defendant's name on this vendor's layout.
const NAME_LABELS: &[&str] = &[
    r"(?i)name\s+used\s+at\s+arrest[:\s]+",
    r"(?i)\bdefendant(?:\s+name)?[:\s]+",
    r"(?i)\barrestee[:\s]+",
    r"(?i)\bsuspect(?:\s+name)?[:\s]+",
];

const OFFICER_CONTEXT: &str =
    r"(?i)\b(officer|ofc\.?|detective|det\.?|deputy|sergeant|sgt\.?|lieutenant|lt\.?|badge|reporting)\b";

/// `"Last, First [Middle] [Suffix]"` or `"First [Middle] Last"` right after
/// a label.
const NAME_SHAPE: &str = r"^([A-Za-z][A-Za-z'\-]+,\s*[A-Za-z][A-Za-z'\-]*(?:\s+[A-Z][A-Za-z'\-\.]*){0,2}|[A-Za-z][A-Za-z'\-]+(?:\s+[A-Z][A-Za-z'\-\.]*){1,3})";

pub fn extract_identity(text: &str) -> CaseIdentity {
    CaseIdentity {
        case_number: extract_case_number(text),
        defendant_name: extract_defendant_name(text),
        booked_into_jail: extract_booked(text),
    }
}

fn extract_case_number(text: &str) -> Option<String> {
    let pattern = Regex::new(
        r"(?i)\b(?:case\s*(?:no\.?|number|#)|dr\s*#|report\s*(?:no\.?|#)|incident\s*(?:no\.?|#))\s*:?\s*([A-Z]{0,3}\d[\dA-Z-]{4,19})",
    )
    .unwrap();
    pattern
        .captures(text)
        .map(|caps| caps[1].trim_end_matches('-').to_string())
}

fn extract_defendant_name(text: &str) -> Option<String> {
    let name_shape = Regex::new(NAME_SHAPE).unwrap();
    let officer_context = Regex::new(OFFICER_CONTEXT).unwrap();

    let mut accepted: Option<String> = None;

    for label in NAME_LABELS {
        let label_pattern = Regex::new(label).unwrap();
        for label_match in label_pattern.find_iter(text) {
            // Reject labels sitting in officer-identification context.
            // Only the label's own line counts: an officer named on the
            // previous line must not poison this label.
            let line_start = text[..label_match.start()]
                .rfind('\n')
                .map(|i| i + 1)
                .unwrap_or(0);
            let window_start = floor_char_boundary(
                text,
                line_start.max(label_match.start().saturating_sub(OFFICER_CONTEXT_WINDOW)),
            );
            if officer_context.is_match(&text[window_start..label_match.start()]) {
                continue;
            }

            let rest = &text[label_match.end()..];
            let rest_line = rest.lines().next().unwrap_or("");
            let Some(shape) = name_shape.captures(rest_line) else {
                continue;
            };

            let candidate = normalize_name(&shape[1]);
            let Some(candidate) = candidate else {
                continue;
            };

            if first_name_len(&candidate) >= MIN_FIRST_NAME_LEN {
                // A complete candidate from the highest-priority label wins
                // outright.
                return Some(candidate);
            }
            // Truncated candidate: remember it, but never let it overwrite a
            // fuller name accepted later in the scan.
            if accepted.is_none() {
                accepted = Some(candidate);
            }
        }
    }

    accepted
}

fn extract_booked(text: &str) -> bool {
    let pattern = Regex::new(
        r"(?i)\b(booked\s+into\s+(?:the\s+)?(?:\w+\s+){0,4}jail|booked[:\s]+yes|transported\s+to\s+.{0,40}jail\s+and\s+booked)\b",
    )
    .unwrap();
    let negated = Regex::new(r"(?i)\b(not|was\s+not|will\s+not\s+be)\s+booked\b").unwrap();
    pattern.is_match(text) && !negated.is_match(text)
}

/// Normalize to `"Last, First [Suffix]"` with title casing.
fn normalize_name(raw: &str) -> Option<String> {
    let raw = raw.trim().trim_end_matches(['.', ',']);
    if raw.is_empty() {
        return None;
    }

    let (last, rest) = if let Some((last, rest)) = raw.split_once(',') {
        (last.trim().to_string(), rest.trim().to_string())
    } else {
        // "First [Middle] Last [Suffix]": pull the last non-suffix token.
        let mut tokens: Vec<&str> = raw.split_whitespace().collect();
        if tokens.len() < 2 {
            return None;
        }
        let suffix = matches!(
            tokens.last().map(|t| t.trim_end_matches('.').to_uppercase()),
            Some(ref s) if ["JR", "SR", "II", "III", "IV"].contains(&s.as_str())
        );
        let suffix_token = if suffix { tokens.pop() } else { None };
        let last = tokens.pop()?.to_string();
        let mut rest = tokens.join(" ");
        if let Some(s) = suffix_token {
            rest = format!("{rest} {s}");
        }
        (last, rest.trim().to_string())
    };

    if rest.is_empty() {
        return None;
    }

    Some(format!("{}, {}", title_case(&last), title_case(&rest)))
}

fn first_name_len(normalized: &str) -> usize {
    normalized
        .split(", ")
        .nth(1)
        .and_then(|rest| rest.split_whitespace().next())
        .map(|first| first.chars().count())
        .unwrap_or(0)
}

fn title_case(part: &str) -> String {
    part.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    while index > 0 && !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}
