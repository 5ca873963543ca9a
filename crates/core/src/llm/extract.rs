//! Recovery of an [`LlmResult`] from noisy completion text.
//!
//! Cleanup runs as an ordered list of independent steps, see
//! [`CLEANUP_PIPELINE`]. Each step takes the previous step's output.

use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

use super::LlmResult;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("Model returned an empty response")]
    Empty,
    #[error("Model response is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

fn code_fence() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)```json|```").unwrap())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupStep {
    /// Remove every ```` ```json ```` and ```` ``` ```` marker, then trim.
    StripCodeFences,
    /// Turn stray back-ticks into double quotes.
    ReplaceBackticks,
    /// When the text does not open with `{`, keep the outermost `{ ... }` span.
    SliceToBraces,
}

pub const CLEANUP_PIPELINE: [CleanupStep; 3] = [
    CleanupStep::StripCodeFences,
    CleanupStep::ReplaceBackticks,
    CleanupStep::SliceToBraces,
];

impl CleanupStep {
    pub fn apply(&self, input: &str) -> String {
        match self {
            CleanupStep::StripCodeFences => code_fence().replace_all(input, "").trim().to_string(),
            CleanupStep::ReplaceBackticks => input.replace('`', "\""),
            CleanupStep::SliceToBraces => {
                if input.starts_with('{') {
                    return input.to_string();
                }
                match (input.find('{'), input.rfind('}')) {
                    (Some(first), Some(last)) if last > first => input[first..=last].to_string(),
                    _ => input.to_string(),
                }
            }
        }
    }
}

/// Run `content` through every step of [`CLEANUP_PIPELINE`].
pub fn clean_response(content: &str) -> String {
    CLEANUP_PIPELINE
        .iter()
        .fold(content.to_string(), |acc, step| step.apply(&acc))
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub message: ResponseMessage,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

/// Text of the first choice, empty when the response carries none.
pub fn response_content(response: &ChatResponse) -> &str {
    response
        .choices
        .first()
        .and_then(|choice| choice.message.content.as_deref())
        .unwrap_or_default()
}

/// Clean `content` and decode it as an [`LlmResult`].
pub fn parse_llm_result(content: &str) -> Result<LlmResult, FormatError> {
    let cleaned = clean_response(content);
    if cleaned.is_empty() {
        return Err(FormatError::Empty);
    }
    Ok(serde_json::from_str(&cleaned)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::QuestionType;

    #[test]
    fn test_strip_code_fences_any_case() {
        let out = CleanupStep::StripCodeFences.apply("```JSON\n{\"a\":1}\n```  ");
        assert_eq!(out, "{\"a\":1}");
    }

    #[test]
    fn test_replace_backticks() {
        assert_eq!(CleanupStep::ReplaceBackticks.apply("{`a`:1}"), "{\"a\":1}");
    }

    #[test]
    fn test_slice_to_braces_only_when_needed() {
        let step = CleanupStep::SliceToBraces;
        assert_eq!(step.apply("Sure! {\"a\":{}} Done."), "{\"a\":{}}");
        assert_eq!(step.apply("{\"a\":1} trailing"), "{\"a\":1} trailing");
        assert_eq!(step.apply("} nothing {"), "} nothing {");
        assert_eq!(step.apply("no braces"), "no braces");
    }

    #[test]
    fn test_pipeline_order_is_fixed() {
        assert_eq!(
            CLEANUP_PIPELINE,
            [
                CleanupStep::StripCodeFences,
                CleanupStep::ReplaceBackticks,
                CleanupStep::SliceToBraces
            ]
        );
    }

    #[test]
    fn test_fenced_response_with_backticks_parses() {
        let content = "```json\n{`passageHtml`: `<p>Glass</p>`, \"questions\": [{\"id\": 1, \"type\": \"fill-blank\", \"text\": \"Made of ____\", \"correctAnswer\": \"sand\"}]}\n```";

        let result = parse_llm_result(content).unwrap();

        assert_eq!(result.passage_html, "<p>Glass</p>");
        assert_eq!(result.questions.len(), 1);
        assert_eq!(result.questions[0].kind, QuestionType::FillBlank);
        assert_eq!(result.questions[0].correct_answer, "sand");
    }

    #[test]
    fn test_prose_around_json_is_discarded() {
        let content = "Here is the result:\n{\"passageHtml\":\"<p>x</p>\",\"questions\":[]}\nHope it helps.";
        let result = parse_llm_result(content).unwrap();
        assert!(result.questions.is_empty());
    }

    #[test]
    fn test_unparseable_content_is_a_format_error() {
        assert!(matches!(parse_llm_result("I cannot do that."), Err(FormatError::Json(_))));
        assert!(matches!(parse_llm_result("```json\n```"), Err(FormatError::Empty)));
    }

    #[test]
    fn test_response_content_defaults_to_empty() {
        let response: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert_eq!(response_content(&response), "");

        let response: ChatResponse =
            serde_json::from_str(r#"{"id":"x","choices":[{"message":{"role":"assistant","content":"{}"}}]}"#)
                .unwrap();
        assert_eq!(response_content(&response), "{}");
    }
}
