//! Section boundary detection as an explicit state machine.
//!
//! Boundary detection over report text is inherently order-sensitive, so it
//! is modeled as three named states with line-level transitions instead of
//! one sprawling pattern:
//!
//! ```text
//! BeforeSection ──start marker──▶ InSection ──stop marker──▶ AfterSection
//! ```
//!
//! Marker matching is case-insensitive substring matching on a single line;
//! the marker lists themselves are configuration data.

/// Where the scanner is relative to the target section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SectionState {
    BeforeSection,
    InSection,
    AfterSection,
}

fn line_matches(line: &str, markers: &[String]) -> bool {
    let lower = line.to_lowercase();
    markers.iter().any(|marker| lower.contains(marker.as_str()))
}

/// Extract the first section bounded by `start_markers` and `stop_markers`.
///
/// Returns `None` when no start marker occurs; callers treat that as "the
/// document has no such section", never as "scan the whole document".
/// The marker lines themselves are not part of the section body.
pub fn bounded_section(
    text: &str,
    start_markers: &[String],
    stop_markers: &[String],
) -> Option<String> {
    let mut state = SectionState::BeforeSection;
    let mut body: Vec<&str> = Vec::new();

    for line in text.lines() {
        state = match state {
            SectionState::BeforeSection if line_matches(line, start_markers) => {
                SectionState::InSection
            }
            SectionState::BeforeSection => SectionState::BeforeSection,
            SectionState::InSection if line_matches(line, stop_markers) => {
                SectionState::AfterSection
            }
            SectionState::InSection => {
                body.push(line);
                SectionState::InSection
            }
            SectionState::AfterSection => break,
        };
        if state == SectionState::AfterSection {
            break;
        }
    }

    match state {
        SectionState::BeforeSection => None,
        _ => Some(body.join("\n")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn markers(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn no_start_marker_yields_none() {
        let text = "line one\nline two";
        assert_eq!(
            bounded_section(text, &markers(&["screening sheet"]), &markers(&["ncic"])),
            None
        );
    }

    #[test]
    fn section_runs_from_start_to_stop_exclusive() {
        let text = "header\nSCREENING SHEET\ncharge one\ncharge two\nCRIMINAL HISTORY\nprior one";
        let section = bounded_section(
            text,
            &markers(&["screening sheet"]),
            &markers(&["criminal history"]),
        )
        .unwrap();
        assert_eq!(section, "charge one\ncharge two");
    }

    #[test]
    fn unterminated_section_runs_to_end_of_text() {
        let text = "SCREENING SHEET\ncharge one\ncharge two";
        let section = bounded_section(
            text,
            &markers(&["screening sheet"]),
            &markers(&["criminal history"]),
        )
        .unwrap();
        assert_eq!(section, "charge one\ncharge two");
    }

    #[test]
    fn matching_is_case_insensitive_and_substring() {
        let text = "Report — Screening Sheet (continued)\nrow";
        let section =
            bounded_section(text, &markers(&["screening sheet"]), &markers(&["ncic"])).unwrap();
        assert_eq!(section, "row");
    }

    #[test]
    fn any_stop_marker_ends_the_section() {
        let text = "START\nkept\nUtah BCI record follows\ndropped";
        let section = bounded_section(
            text,
            &markers(&["start"]),
            &markers(&["criminal history", "utah bci"]),
        )
        .unwrap();
        assert_eq!(section, "kept");
    }

    #[test]
    fn content_after_stop_never_leaks_in() {
        let text = "START\nkept\nSTOP\nSTART\nnot rescanned";
        let section = bounded_section(text, &markers(&["start"]), &markers(&["stop"])).unwrap();
        assert_eq!(section, "kept");
    }

    #[test]
    fn empty_section_is_some_empty() {
        let text = "START\nSTOP";
        let section = bounded_section(text, &markers(&["start"]), &markers(&["stop"])).unwrap();
        assert_eq!(section, "");
    }
}
