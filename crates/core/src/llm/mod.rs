//! Pure half of the model-backed generation path.
//!
//! [`prompt`] builds the chat completion request, [`extract`] turns the raw
//! completion text back into an [`LlmResult`]. The HTTP call itself lives in
//! the binary.

use serde::{Deserialize, Serialize};

use crate::types::{Question, QuestionType};

pub mod extract;
pub mod prompt;

pub use extract::{clean_response, parse_llm_result, response_content, ChatResponse, CleanupStep, FormatError};
pub use prompt::{build_request, build_user_prompt, ChatMessage, ChatRequest, Role, DEFAULT_MODEL, SYSTEM_PROMPT};

/// Passage markup and graded questions produced by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmResult {
    pub passage_html: String,
    pub questions: Vec<Question>,
}

impl LlmResult {
    /// Force every question to respect the options-iff-multiple-choice rule.
    ///
    /// Options on non multiple-choice items are dropped. A multiple-choice
    /// item with no usable options becomes fill-blank. Returns the ids of the
    /// questions that were changed.
    pub fn normalize(&mut self) -> Vec<u32> {
        let mut adjusted = Vec::new();

        for question in &mut self.questions {
            let empty_options = question.options.as_ref().is_some_and(Vec::is_empty);
            if question.is_well_formed() && !empty_options {
                continue;
            }

            match question.kind {
                QuestionType::MultipleChoice => {
                    question.kind = QuestionType::FillBlank;
                    question.options = None;
                }
                _ => question.options = None,
            }
            adjusted.push(question.id);
        }

        adjusted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::QuestionOption;

    #[test]
    fn test_normalize_keeps_valid_questions() {
        let mut result = LlmResult {
            passage_html: "<p>x</p>".into(),
            questions: vec![
                Question::new(
                    1,
                    QuestionType::MultipleChoice,
                    "Pick",
                    Some(vec![QuestionOption::new("A", "x")]),
                ),
                Question::new(2, QuestionType::TrueFalse, "Glass is old.", None),
            ],
        };
        let before = result.clone();

        assert!(result.normalize().is_empty());
        assert_eq!(result, before);
    }

    #[test]
    fn test_normalize_repairs_model_output() {
        let mut result: LlmResult = serde_json::from_str(
            r#"{"passageHtml":"","questions":[
                {"id":1,"type":"true-false","text":"a","options":[{"value":"A","text":"x"}],"correctAnswer":"TRUE"},
                {"id":2,"type":"multiple-choice","text":"b","correctAnswer":"C"},
                {"id":3,"type":"multiple-choice","text":"c","options":[],"correctAnswer":"A"}
            ]}"#,
        )
        .unwrap();

        assert_eq!(result.normalize(), vec![1, 2, 3]);
        assert!(result.questions.iter().all(Question::is_well_formed));
        assert_eq!(result.questions[0].kind, QuestionType::TrueFalse);
        assert_eq!(result.questions[1].kind, QuestionType::FillBlank);
        assert_eq!(result.questions[2].kind, QuestionType::FillBlank);
        assert_eq!(result.questions[1].correct_answer, "C");
    }
}
