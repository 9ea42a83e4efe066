//! Element evaluation: does the narrative speak to the statute's elements?
//!
//! A coarse screening signal, never a legal conclusion. The default path is
//! deterministic keyword overlap between each statutory element and the
//! officer narrative; when a language model is configured it may be used
//! instead, with its output parsed strictly and any failure falling back to
//! the keyword path. Absent evidence always reads as `unclear`; the
//! evaluator never fabricates support for an element.

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;

use crate::models::{ElementEvaluation, ElementFinding, ElementStatus};

/// Minimum distinct content-word matches before an element can be `met`.
const MIN_MATCHED_WORDS: usize = 2;

/// Minimum fraction of an element's content words found in the narrative.
const MIN_OVERLAP_RATIO: f32 = 0.3;

/// Evidence snippets are clipped to keep bundles reviewable.
const MAX_SNIPPET_LEN: usize = 160;
const MAX_SNIPPETS: usize = 2;

/// Words too common to count as evidence of anything.
const STOPWORDS: &[&str] = &[
    "that", "this", "with", "from", "shall", "under", "upon", "person", "persons", "section",
    "subsection", "chapter", "title", "means", "includes", "other", "another", "which", "their",
    "there", "where", "when", "been", "were", "have", "does", "such", "any", "the", "and", "for",
    "not", "may", "is", "in", "a", "an", "of", "to", "or", "if", "as", "by", "on", "at", "it",
];

/// Minimal text-generation seam for the optional language-model path.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn generate(&self, prompt: &str, system: &str) -> Result<String, String>;
}

const EVAL_SYSTEM: &str = "\
You are screening a police narrative against statutory elements. Respond with \
JSON only: {\"overall\":\"met\"|\"unclear\",\"elements\":[{\"element\":...,\
\"status\":\"met\"|\"unclear\",\"evidence\":[...]}],\"notes\":...}. \
Mark an element met only when the narrative plainly supports it.";

/// Evaluate the narrative against statute text.
///
/// With a configured model, the model's verdict is used when it parses
/// cleanly; otherwise, and always when no model is configured, the
/// deterministic keyword path runs.
pub async fn evaluate_elements(
    narrative: &str,
    statute_text: &str,
    llm: Option<&dyn LlmClient>,
) -> ElementEvaluation {
    if let Some(client) = llm {
        let prompt = format!(
            "STATUTE:\n{statute_text}\n\nNARRATIVE:\n{narrative}\n\nEvaluate each element."
        );
        match client.generate(&prompt, EVAL_SYSTEM).await {
            Ok(response) => match parse_llm_evaluation(&response) {
                Some(evaluation) => return evaluation,
                None => {
                    tracing::warn!("Element evaluation response unparseable, using keyword path");
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "Element evaluation model call failed, using keyword path");
            }
        }
    }

    evaluate_by_keywords(narrative, statute_text)
}

/// Deterministic keyword-overlap evaluation.
pub fn evaluate_by_keywords(narrative: &str, statute_text: &str) -> ElementEvaluation {
    let narrative_words = content_words(narrative);
    let elements = split_elements(statute_text);

    let findings: Vec<ElementFinding> = elements
        .iter()
        .map(|element| {
            let element_words = content_words(element);
            let matched: Vec<&String> = element_words
                .iter()
                .filter(|w| narrative_words.contains(*w))
                .collect();

            let ratio = if element_words.is_empty() {
                0.0
            } else {
                matched.len() as f32 / element_words.len() as f32
            };

            let status = if matched.len() >= MIN_MATCHED_WORDS && ratio >= MIN_OVERLAP_RATIO {
                ElementStatus::Met
            } else {
                ElementStatus::Unclear
            };

            let evidence = match status {
                ElementStatus::Met => evidence_snippets(narrative, &matched),
                ElementStatus::Unclear => Vec::new(),
            };

            ElementFinding {
                element: clip(element, MAX_SNIPPET_LEN),
                status,
                evidence,
            }
        })
        .collect();

    let overall = if !findings.is_empty()
        && findings.iter().all(|f| f.status == ElementStatus::Met)
    {
        ElementStatus::Met
    } else {
        ElementStatus::Unclear
    };

    ElementEvaluation {
        overall,
        elements: findings,
        notes: "keyword-overlap screening; requires human review".into(),
    }
}

/// Split statute text into elements on subsection markers; the whole text is
/// one element when the statute has no subdivisions.
fn split_elements(statute_text: &str) -> Vec<String> {
    let marker = Regex::new(r"\((?:\d{1,2}|[a-z]|i{1,3}|iv|v|vi{0,3}|ix|x)\)").unwrap();
    let starts: Vec<usize> = marker.find_iter(statute_text).map(|m| m.start()).collect();

    if starts.is_empty() {
        let trimmed = statute_text.trim();
        return if trimmed.is_empty() {
            Vec::new()
        } else {
            vec![trimmed.to_string()]
        };
    }

    let mut elements = Vec::new();
    for (i, &start) in starts.iter().enumerate() {
        let end = starts.get(i + 1).copied().unwrap_or(statute_text.len());
        let segment = statute_text[start..end].trim();
        // Nested markers produce tiny fragments; fold those into nothing.
        if segment.chars().count() > 25 {
            elements.push(segment.to_string());
        }
    }
    if elements.is_empty() {
        elements.push(statute_text.trim().to_string());
    }
    elements
}

fn content_words(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .map(|w| w.to_lowercase())
        .filter(|w| w.chars().count() >= 4 && !STOPWORDS.contains(&w.as_str()))
        .collect()
}

/// Narrative sentences containing matched words, clipped.
fn evidence_snippets(narrative: &str, matched: &[&String]) -> Vec<String> {
    narrative
        .split(['.', ';', '\n'])
        .filter(|sentence| {
            let lower = sentence.to_lowercase();
            matched.iter().any(|w| lower.contains(w.as_str()))
        })
        .map(|sentence| clip(sentence.trim(), MAX_SNIPPET_LEN))
        .filter(|s| !s.is_empty())
        .take(MAX_SNIPPETS)
        .collect()
}

fn clip(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let clipped: String = text.chars().take(max).collect();
        format!("{clipped}…")
    }
}

#[derive(Deserialize)]
struct LlmEvaluation {
    overall: String,
    #[serde(default)]
    elements: Vec<LlmElement>,
    #[serde(default)]
    notes: String,
}

#[derive(Deserialize)]
struct LlmElement {
    element: String,
    status: String,
    #[serde(default)]
    evidence: Vec<String>,
}

/// Strict parse of the model response; any surprise yields `None` and the
/// keyword path takes over.
fn parse_llm_evaluation(response: &str) -> Option<ElementEvaluation> {
    let start = response.find('{')?;
    let end = response.rfind('}')?;
    let parsed: LlmEvaluation = serde_json::from_str(&response[start..=end]).ok()?;

    let status = |s: &str| match s {
        "met" => Some(ElementStatus::Met),
        "unclear" => Some(ElementStatus::Unclear),
        _ => None,
    };

    let overall = status(&parsed.overall)?;
    let mut elements = Vec::with_capacity(parsed.elements.len());
    for element in parsed.elements {
        elements.push(ElementFinding {
            status: status(&element.status)?,
            element: element.element,
            evidence: element.evidence,
        });
    }

    Some(ElementEvaluation {
        overall,
        elements,
        notes: if parsed.notes.is_empty() {
            "language-model screening; requires human review".into()
        } else {
            parsed.notes
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockLlm {
        response: Result<String, String>,
    }

    #[async_trait]
    impl LlmClient for MockLlm {
        async fn generate(&self, _prompt: &str, _system: &str) -> Result<String, String> {
            self.response.clone()
        }
    }

    fn assault_statute() -> &'static str {
        "(1) A person commits assault if the person attempts, with unlawful \
         force or violence, to do bodily injury to another. \
         (2) Assault is a class B misdemeanor."
    }

    #[test]
    fn matching_narrative_marks_elements_met() {
        let narrative = "The suspect used force and violence against the victim, \
                         causing bodily injury. Witnesses described the assault in detail. \
                         Officers noted the misdemeanor booking classification.";
        let evaluation = evaluate_by_keywords(narrative, assault_statute());
        assert_eq!(evaluation.overall, ElementStatus::Met);
        assert!(evaluation
            .elements
            .iter()
            .all(|e| e.status == ElementStatus::Met));
        assert!(!evaluation.elements[0].evidence.is_empty());
    }

    #[test]
    fn unrelated_narrative_is_unclear_with_no_evidence() {
        let narrative = "The reporting party stated a bicycle was missing from the garage.";
        let evaluation = evaluate_by_keywords(narrative, assault_statute());
        assert_eq!(evaluation.overall, ElementStatus::Unclear);
        for element in &evaluation.elements {
            assert_eq!(element.status, ElementStatus::Unclear);
            assert!(element.evidence.is_empty());
        }
    }

    #[test]
    fn empty_narrative_is_unclear() {
        let evaluation = evaluate_by_keywords("", assault_statute());
        assert_eq!(evaluation.overall, ElementStatus::Unclear);
    }

    #[test]
    fn undivided_statute_is_one_element() {
        let evaluation = evaluate_by_keywords("text", "An undivided ordinance with no markers.");
        assert_eq!(evaluation.elements.len(), 1);
    }

    #[test]
    fn empty_statute_yields_unclear_overall() {
        let evaluation = evaluate_by_keywords("narrative", "");
        assert!(evaluation.elements.is_empty());
        assert_eq!(evaluation.overall, ElementStatus::Unclear);
    }

    #[tokio::test]
    async fn llm_verdict_wins_when_parseable() {
        let llm = MockLlm {
            response: Ok(r#"{"overall":"met","elements":[{"element":"force","status":"met","evidence":["used force"]}],"notes":"clear"}"#.into()),
        };
        let evaluation = evaluate_elements("n", assault_statute(), Some(&llm)).await;
        assert_eq!(evaluation.overall, ElementStatus::Met);
        assert_eq!(evaluation.notes, "clear");
    }

    #[tokio::test]
    async fn unparseable_llm_response_falls_back_to_keywords() {
        let llm = MockLlm {
            response: Ok("I think the elements are probably met.".into()),
        };
        let evaluation = evaluate_elements("unrelated", assault_statute(), Some(&llm)).await;
        assert_eq!(evaluation.overall, ElementStatus::Unclear);
        assert!(evaluation.notes.contains("keyword"));
    }

    #[tokio::test]
    async fn llm_failure_falls_back_to_keywords() {
        let llm = MockLlm {
            response: Err("connection refused".into()),
        };
        let evaluation = evaluate_elements("unrelated", assault_statute(), Some(&llm)).await;
        assert!(evaluation.notes.contains("keyword"));
    }

    #[tokio::test]
    async fn invalid_status_value_falls_back() {
        let llm = MockLlm {
            response: Ok(r#"{"overall":"definitely","elements":[],"notes":""}"#.into()),
        };
        let evaluation = evaluate_elements("unrelated", assault_statute(), Some(&llm)).await;
        assert!(evaluation.notes.contains("keyword"));
    }
}
