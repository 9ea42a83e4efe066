//! Sanitize extracted or OCR'd text before it becomes merged text.
//! Strips control characters, collapses whitespace, keeps the punctuation
//! legal documents actually use (citation hyphens, subsection parens, §).

/// Characters beyond alphanumerics/whitespace that survive sanitization.
fn is_kept_punctuation(c: char) -> bool {
    matches!(
        c,
        '.' | ','
            | ';'
            | ':'
            | '-'
            | '/'
            | '('
            | ')'
            | '['
            | ']'
            | '#'
            | '&'
            | '\''
            | '"'
            | '!'
            | '?'
            | '%'
            | '$'
            | '@'
            | '*'
            | '_'
            | '+'
            | '='
            | '§'
            | '\u{2013}' // en-dash, common in scanned citation ranges
            | '\u{2014}'
            | '\u{2019}'
            | '\u{201C}'
            | '\u{201D}'
    )
}

pub fn sanitize_text(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || is_kept_punctuation(*c))
        .collect::<String>()
        .lines()
        .map(|line| {
            line.split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_null_and_control_bytes() {
        let raw = "Defendant: Roberts,\x00 Chandee\x01\x02";
        let clean = sanitize_text(raw);
        assert!(!clean.contains('\x00'));
        assert!(!clean.contains('\x01'));
        assert!(clean.contains("Roberts, Chandee"));
    }

    #[test]
    fn preserves_citation_punctuation() {
        let raw = "Violation of 58-37-8(2)(a), a 3rd degree felony; see § 76-5-102.";
        let clean = sanitize_text(raw);
        assert_eq!(clean, raw);
    }

    #[test]
    fn collapses_runs_of_spaces_and_blank_lines() {
        let raw = "CASE   NO:    24-123456\n\n\n\nNAME    USED   AT ARREST";
        let clean = sanitize_text(raw);
        assert_eq!(clean, "CASE NO: 24-123456\nNAME USED AT ARREST");
    }

    #[test]
    fn trims_each_line() {
        let raw = "   leading\ntrailing   ";
        assert_eq!(sanitize_text(raw), "leading\ntrailing");
    }

    #[test]
    fn empty_and_control_only_input_yield_empty() {
        assert_eq!(sanitize_text(""), "");
        assert_eq!(sanitize_text("\x00\x01\x1b"), "");
    }

    #[test]
    fn drops_exotic_symbols_but_keeps_words() {
        let raw = "Charge ☐ THEFT ☑ filed";
        let clean = sanitize_text(raw);
        assert_eq!(clean, "Charge THEFT filed");
    }
}
