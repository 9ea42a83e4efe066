use serde::{Deserialize, Serialize};

/// Case identity recovered from merged text. Any field may be absent; the
/// extractor never invents values to fill gaps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseIdentity {
    pub case_number: Option<String>,
    /// Normalized to `"Last, First [Suffix]"`.
    pub defendant_name: Option<String>,
    pub booked_into_jail: bool,
}

/// One charge row parsed from the screening-sheet table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeCandidate {
    /// Normalized statute code, e.g. `"76-5-102"`.
    pub code: String,
    pub name: String,
    /// Severity class as printed: `F1`..`F3`, `MA`..`MC`, `IN`.
    pub class: Option<String>,
}

/// One prior arrest grouped from a criminal-history section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorIncident {
    pub offense_tracking_number: Option<String>,
    pub date_of_arrest: Option<String>,
    pub charges: Vec<String>,
}

/// How the priors were recovered, most to least structured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriorsSource {
    IncidentBlocks,
    InlinePatterns,
    CountOnly,
}

/// Criminal history extracted from a bounded section. Absence of a bounded
/// section yields no summary at all; narrative text is never mined for
/// priors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorsSummary {
    pub incidents: Vec<PriorIncident>,
    pub total_arrests: Option<u32>,
    pub source: PriorsSource,
}

/// Coarse per-element screening signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementStatus {
    Met,
    Unclear,
}

/// One statutory element paired with the narrative evidence found for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementFinding {
    pub element: String,
    pub status: ElementStatus,
    pub evidence: Vec<String>,
}

/// Result of pairing the officer narrative against resolved statute text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementEvaluation {
    pub overall: ElementStatus,
    pub elements: Vec<ElementFinding>,
    pub notes: String,
}
