use serde::{Deserialize, Serialize};

/// Answer format of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionType {
    MultipleChoice,
    FillBlank,
    TrueFalse,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "multiple-choice",
            QuestionType::FillBlank => "fill-blank",
            QuestionType::TrueFalse => "true-false",
        }
    }
}

impl std::fmt::Display for QuestionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    pub value: String,
    pub text: String,
}

impl QuestionOption {
    pub fn new(value: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            text: text.into(),
        }
    }
}

/// A single test item.
///
/// `options` is `Some` exactly when `kind` is [`QuestionType::MultipleChoice`].
/// Ids come from the source numbering and may repeat or skip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: u32,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<QuestionOption>>,
    /// Hint shown inside a fill-blank input.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(default)]
    pub correct_answer: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevant_text: Option<String>,
}

impl Question {
    /// An ungraded question; `options` are kept only for multiple-choice.
    pub fn new(
        id: u32,
        kind: QuestionType,
        text: impl Into<String>,
        options: Option<Vec<QuestionOption>>,
    ) -> Self {
        Self {
            id,
            kind,
            text: text.into(),
            options: options.filter(|_| kind == QuestionType::MultipleChoice),
            placeholder: None,
            instructions: None,
            correct_answer: String::new(),
            explanation: String::new(),
            relevant_text: None,
        }
    }

    pub fn with_answer(mut self, correct_answer: impl Into<String>) -> Self {
        self.correct_answer = correct_answer.into();
        self
    }

    /// Whether the options-iff-multiple-choice invariant holds.
    pub fn is_well_formed(&self) -> bool {
        (self.kind == QuestionType::MultipleChoice) == self.options.is_some()
    }
}
