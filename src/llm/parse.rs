//! Extracting structured results from free-form model output.
//!
//! Models often wrap the JSON object in prose or markdown fences, so the
//! object is taken as the span from the first `{` to the last `}`. Missing
//! or mistyped fields fall back to defaults instead of failing.

use serde_json::{Map, Value};

use crate::llm::types::{Analysis, LlmError, LlmResult, Proposal};

const NOVELTY_DEFAULT: &str = "Analysis unavailable";
const SECTION_DEFAULT: &str = "Section not generated";

/// Locate and decode the JSON object embedded in `text`.
pub fn extract_json(text: &str) -> LlmResult<Map<String, Value>> {
    let span = match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => return Err(LlmError::NoJson),
    };

    match serde_json::from_str::<Value>(span) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(LlmError::InvalidJson("expected an object".into())),
        Err(e) => {
            tracing::debug!(raw = %text, "Unparsable model output");
            Err(LlmError::InvalidJson(e.to_string()))
        }
    }
}

pub fn parse_analysis(text: &str) -> LlmResult<Analysis> {
    let map = extract_json(text)?;

    let novelty_assessment = match map.get("novelty_assessment") {
        Some(Value::String(s)) => s.clone(),
        None | Some(Value::Null) => {
            tracing::warn!(field = "novelty_assessment", "Missing field in model output, using default");
            NOVELTY_DEFAULT.to_string()
        }
        Some(other) => other.to_string(),
    };

    Ok(Analysis {
        research_gaps: string_list(&map, "research_gaps"),
        research_questions: string_list(&map, "research_questions"),
        methodology_suggestions: string_list(&map, "methodology_suggestions"),
        novelty_assessment,
    })
}

pub fn parse_proposal(text: &str) -> LlmResult<Proposal> {
    let map = extract_json(text)?;

    Ok(Proposal {
        title: section(&map, "title"),
        introduction: section(&map, "introduction"),
        literature_review: section(&map, "literature_review"),
        research_questions: string_list(&map, "research_questions"),
        methodology: section(&map, "methodology"),
        expected_outcomes: section(&map, "expected_outcomes"),
        timeline: section(&map, "timeline"),
    })
}

/// A list field; anything that isn't an array becomes empty.
fn string_list(map: &Map<String, Value>, field: &str) -> Vec<String> {
    match map.get(field) {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        Some(_) => Vec::new(),
        None => {
            tracing::warn!(field, "Missing field in model output, using default");
            Vec::new()
        }
    }
}

fn section(map: &Map<String, Value>, field: &str) -> String {
    match map.get(field) {
        Some(Value::String(s)) => s.clone(),
        _ => SECTION_DEFAULT.to_string(),
    }
}
