//! Answers and scoring for one loaded test.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Question, QuestionType};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("No question with id {0}")]
    UnknownQuestion(u32),
}

/// Outcome of [`Session::score`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub score: usize,
    pub total_questions: usize,
    pub answers: BTreeMap<u32, String>,
    pub correctness: BTreeMap<u32, bool>,
}

impl TestResult {
    pub fn is_correct(&self, id: u32) -> bool {
        self.correctness.get(&id).copied().unwrap_or(false)
    }
}

/// Whether `given` matches the key of `question`.
///
/// Fill-blank answers are trimmed and compared case-insensitively; every
/// other type needs the exact value. A question without a key never matches,
/// so an empty answer against an empty key is wrong rather than equal.
pub fn answer_matches(question: &Question, given: &str) -> bool {
    if question.correct_answer.is_empty() {
        return false;
    }
    match question.kind {
        QuestionType::FillBlank => given.trim().to_lowercase() == question.correct_answer.to_lowercase(),
        QuestionType::MultipleChoice | QuestionType::TrueFalse => given == question.correct_answer,
    }
}

/// The test currently being taken: passage, questions and the answers so far.
///
/// Answers are keyed by question id, so questions sharing an id share one
/// answer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub passage_html: String,
    pub questions: Vec<Question>,
    answers: BTreeMap<u32, String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the loaded test. Previous answers are discarded and every
    /// question starts with an empty answer.
    pub fn load(&mut self, passage_html: impl Into<String>, questions: Vec<Question>) {
        self.passage_html = passage_html.into();
        self.answers = questions.iter().map(|q| (q.id, String::new())).collect();
        self.questions = questions;
    }

    pub fn answer(&mut self, id: u32, value: impl Into<String>) -> Result<(), SessionError> {
        match self.answers.get_mut(&id) {
            Some(slot) => {
                *slot = value.into();
                Ok(())
            }
            None => Err(SessionError::UnknownQuestion(id)),
        }
    }

    pub fn answers(&self) -> &BTreeMap<u32, String> {
        &self.answers
    }

    pub fn answer_for(&self, id: u32) -> Option<&str> {
        self.answers.get(&id).map(String::as_str)
    }

    pub fn question(&self, id: u32) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    /// True when the answer holds something other than whitespace.
    pub fn is_answered(&self, id: u32) -> bool {
        self.answer_for(id).is_some_and(|a| !a.trim().is_empty())
    }

    pub fn is_correct(&self, id: u32) -> bool {
        match (self.question(id), self.answer_for(id)) {
            (Some(question), Some(given)) => answer_matches(question, given),
            _ => false,
        }
    }

    pub fn completed_count(&self) -> usize {
        self.questions.iter().filter(|q| self.is_answered(q.id)).count()
    }

    pub fn score(&self) -> TestResult {
        let correctness: BTreeMap<u32, bool> = self
            .questions
            .iter()
            .map(|q| (q.id, self.is_correct(q.id)))
            .collect();
        let score = self.questions.iter().filter(|q| self.is_correct(q.id)).count();

        TestResult {
            score,
            total_questions: self.questions.len(),
            answers: self.answers.clone(),
            correctness,
        }
    }

    pub fn reset(&mut self) {
        self.passage_html.clear();
        self.questions.clear();
        self.answers.clear();
    }
}
