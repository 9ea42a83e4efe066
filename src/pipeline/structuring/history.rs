//! Criminal-history parsing, bounded sections only.
//!
//! Priors are only ever read out of an explicitly delimited history section;
//! a document without one yields `None`, not a whole-document scan. That is
//! a deliberate precision-over-recall choice: misattributing narrative text
//! as someone's criminal history is the worst failure mode this parser has.
//!
//! Within a section, parsing degrades through three levels of structure:
//! "Incident N of M" blocks, then inline year+offense / conviction-list
//! patterns, then a bare "N prior arrests" count.

use regex::Regex;

use crate::config::SectionMarkers;
use crate::models::{PriorIncident, PriorsSource, PriorsSummary};
use crate::pipeline::structuring::section::bounded_section;

/// Extract priors from a bounded criminal-history section, or `None` when
/// the document has no such section.
pub fn extract_priors(text: &str, markers: &SectionMarkers) -> Option<PriorsSummary> {
    let section = bounded_section(text, &markers.history_start, &markers.history_stop)?;

    if let Some(summary) = parse_incident_blocks(&section) {
        return Some(summary);
    }
    if let Some(summary) = parse_inline_patterns(&section) {
        return Some(summary);
    }
    parse_count_only(&section)
}

/// Structured "Incident N of M" blocks with per-block fields.
fn parse_incident_blocks(section: &str) -> Option<PriorsSummary> {
    let block_header = Regex::new(r"(?i)\bincident\s+(\d+)\s+of\s+(\d+)\b").unwrap();
    let arrest_date =
        Regex::new(r"(?i)date\s+of\s+arrest\s*:?\s*(\d{1,2}[/-]\d{1,2}[/-]\d{2,4})").unwrap();
    let tracking_number = Regex::new(r"(?i)\b(?:otn|offense\s+tracking\s+(?:number|no\.?))\s*[:#]?\s*([0-9A-Z]{6,20})").unwrap();
    let charge_line = Regex::new(r"(?i)^\s*(?:charge|offense)\s*:?\s*(.+)$").unwrap();

    let starts: Vec<usize> = block_header.find_iter(section).map(|m| m.start()).collect();
    if starts.is_empty() {
        return None;
    }

    let mut incidents = Vec::with_capacity(starts.len());
    for (i, &start) in starts.iter().enumerate() {
        let end = starts.get(i + 1).copied().unwrap_or(section.len());
        let block = &section[start..end];

        let mut incident = PriorIncident {
            date_of_arrest: arrest_date.captures(block).map(|c| c[1].to_string()),
            offense_tracking_number: tracking_number
                .captures(block)
                .map(|c| c[1].to_string()),
            charges: Vec::new(),
        };
        for line in block.lines() {
            if let Some(caps) = charge_line.captures(line) {
                let charge = caps[1].trim().to_string();
                if !charge.is_empty() {
                    incident.charges.push(charge);
                }
            }
        }
        incidents.push(incident);
    }

    let declared_total = block_header
        .captures(section)
        .and_then(|c| c[2].parse::<u32>().ok());

    Some(PriorsSummary {
        incidents,
        total_arrests: declared_total,
        source: PriorsSource::IncidentBlocks,
    })
}

/// Inline year+offense pairs and conviction lists.
fn parse_inline_patterns(section: &str) -> Option<PriorsSummary> {
    let year_offense =
        Regex::new(r"\b((?:19|20)\d{2})\s*[-–:]\s*([A-Z][A-Za-z0-9 /&']{3,50}?)(?:[;,.\n]|$)")
            .unwrap();
    let conviction_list = Regex::new(r"(?i)convictions?\s*:?\s*(.+)").unwrap();

    let mut incidents: Vec<PriorIncident> = Vec::new();

    for caps in year_offense.captures_iter(section) {
        incidents.push(PriorIncident {
            offense_tracking_number: None,
            date_of_arrest: Some(caps[1].to_string()),
            charges: vec![caps[2].trim().to_string()],
        });
    }

    if incidents.is_empty() {
        if let Some(caps) = conviction_list.captures(section) {
            let charges: Vec<String> = caps[1]
                .split(';')
                .map(|c| c.trim().trim_end_matches('.').to_string())
                .filter(|c| !c.is_empty())
                .collect();
            if !charges.is_empty() {
                incidents.push(PriorIncident {
                    offense_tracking_number: None,
                    date_of_arrest: None,
                    charges,
                });
            }
        }
    }

    if incidents.is_empty() {
        return None;
    }

    Some(PriorsSummary {
        incidents,
        total_arrests: None,
        source: PriorsSource::InlinePatterns,
    })
}

/// Coarse "N prior arrests" count with no per-incident detail.
fn parse_count_only(section: &str) -> Option<PriorsSummary> {
    let count = Regex::new(r"(?i)\b(\d{1,3})\s+prior\s+arrests?\b").unwrap();
    let total = count.captures(section)?[1].parse::<u32>().ok()?;

    Some(PriorsSummary {
        incidents: Vec::new(),
        total_arrests: Some(total),
        source: PriorsSource::CountOnly,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn markers() -> SectionMarkers {
        SectionMarkers::default()
    }

    #[test]
    fn no_history_section_yields_none() {
        // Years and offenses in narrative text must never become priors.
        let text = "GENERAL OFFENSE\nIn 2019 - THEFT was reported by the victim.";
        assert_eq!(extract_priors(text, &markers()), None);
    }

    #[test]
    fn incident_blocks_are_parsed_with_fields() {
        let text = "ADULT CRIMINAL HISTORY (UTAH BCI)\n\
                    Incident 1 of 2\n\
                    Date of Arrest: 03/14/2019\n\
                    OTN: 45211873001\n\
                    Charge: THEFT OF SERVICES\n\
                    Charge: CRIMINAL MISCHIEF\n\
                    Incident 2 of 2\n\
                    Date of Arrest: 11/02/2021\n\
                    OTN: 61834520119\n\
                    Offense: POSSESSION OF A CONTROLLED SUBSTANCE\n\
                    GENERAL OFFENSE\nnarrative text";
        let summary = extract_priors(text, &markers()).unwrap();

        assert_eq!(summary.source, PriorsSource::IncidentBlocks);
        assert_eq!(summary.total_arrests, Some(2));
        assert_eq!(summary.incidents.len(), 2);
        assert_eq!(
            summary.incidents[0].date_of_arrest.as_deref(),
            Some("03/14/2019")
        );
        assert_eq!(
            summary.incidents[0].offense_tracking_number.as_deref(),
            Some("45211873001")
        );
        assert_eq!(
            summary.incidents[0].charges,
            vec!["THEFT OF SERVICES", "CRIMINAL MISCHIEF"]
        );
        assert_eq!(summary.incidents[1].charges.len(), 1);
    }

    #[test]
    fn inline_year_offense_pairs_are_second_choice() {
        let text = "CRIMINAL HISTORY SUMMARY\n\
                    2018 - THEFT; 2020 - ASSAULT\n\
                    NARRATIVE\nofficer narrative";
        let summary = extract_priors(text, &markers()).unwrap();

        assert_eq!(summary.source, PriorsSource::InlinePatterns);
        assert_eq!(summary.incidents.len(), 2);
        assert_eq!(summary.incidents[0].date_of_arrest.as_deref(), Some("2018"));
        assert_eq!(summary.incidents[0].charges, vec!["THEFT"]);
        assert_eq!(summary.incidents[1].charges, vec!["ASSAULT"]);
    }

    #[test]
    fn conviction_list_is_parsed_when_no_year_pairs() {
        let text = "CRIMINAL HISTORY\n\
                    Convictions: RETAIL THEFT; DUI; FAILURE TO APPEAR.\n\
                    GENERAL OFFENSE\nnarrative";
        let summary = extract_priors(text, &markers()).unwrap();

        assert_eq!(summary.source, PriorsSource::InlinePatterns);
        assert_eq!(summary.incidents.len(), 1);
        assert_eq!(
            summary.incidents[0].charges,
            vec!["RETAIL THEFT", "DUI", "FAILURE TO APPEAR"]
        );
    }

    #[test]
    fn count_only_is_the_last_resort() {
        let text = "CRIMINAL HISTORY\nSubject has 4 prior arrests in Utah.\nNARRATIVE\ntext";
        let summary = extract_priors(text, &markers()).unwrap();

        assert_eq!(summary.source, PriorsSource::CountOnly);
        assert_eq!(summary.total_arrests, Some(4));
        assert!(summary.incidents.is_empty());
    }

    #[test]
    fn empty_history_section_yields_none() {
        let text = "CRIMINAL HISTORY\nNo record found.\nNARRATIVE\ntext";
        assert_eq!(extract_priors(text, &markers()), None);
    }

    #[test]
    fn blocks_outrank_inline_patterns() {
        let text = "CRIMINAL HISTORY\n\
                    Incident 1 of 1\n\
                    Date of Arrest: 01/01/2020\n\
                    Charge: THEFT\n\
                    also mentions 2018 - ASSAULT inline\n\
                    NARRATIVE\ntext";
        let summary = extract_priors(text, &markers()).unwrap();
        assert_eq!(summary.source, PriorsSource::IncidentBlocks);
    }
}
