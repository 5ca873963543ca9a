//! Heuristic question extraction from the question block of a test.
//!
//! ```text
//! plain text -> question block -> numbered items -> classified Questions
//!              split_sections     segment_items     classify
//! ```

use std::sync::OnceLock;

use regex::Regex;

use crate::passage::split_sections;
use crate::types::{Question, QuestionOption, QuestionType};

fn item_start() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{1,2})[).\s]+(.+)").unwrap())
}

fn item_boundary() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{1,2}[).\s]+").unwrap())
}

fn true_false_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)\btrue\b.*\bfalse\b.*\bnot\s+given\b").unwrap())
}

fn option_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b([A-H])[).]\s*").unwrap())
}

fn verdict_words() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(?:TRUE|FALSE|NOT GIVEN)\b").unwrap())
}

/// A numbered item before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawItem {
    pub id: u32,
    pub text: String,
}

/// Walk trimmed, non-empty lines and cut them into numbered items.
///
/// A line like `12) text`, `12. text` or `12 text` opens an item; following
/// lines that do not look like an item start are appended with a space.
/// Lines before the first item are ignored.
pub fn segment_items(block: &str) -> Vec<RawItem> {
    let lines: Vec<&str> = block
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let mut items = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let Some(caps) = item_start().captures(lines[i]) else {
            i += 1;
            continue;
        };
        i += 1;

        let Ok(id) = caps[1].parse::<u32>() else {
            continue;
        };
        let mut text = caps[2].to_string();

        while i < lines.len() && !item_boundary().is_match(lines[i]) {
            text.push(' ');
            text.push_str(lines[i]);
            i += 1;
        }

        items.push(RawItem { id, text });
    }

    items
}

/// Inline `A) text B. text` options, in order of appearance.
///
/// An option's text runs from its marker to the next marker or the end of
/// the text.
pub fn inline_options(text: &str) -> Vec<QuestionOption> {
    let markers: Vec<(&str, usize, usize)> = option_marker()
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let letter = caps.get(1)?;
            Some((letter.as_str(), whole.start(), whole.end()))
        })
        .collect();

    markers
        .iter()
        .enumerate()
        .map(|(i, &(value, _, body_start))| {
            let body_end = markers.get(i + 1).map_or(text.len(), |&(_, next, _)| next);
            QuestionOption::new(value, text[body_start..body_end].trim())
        })
        .collect()
}

/// Decide the question type. First match wins: true/false/not-given, then
/// inline options, then fill-in-the-blank.
///
/// The true/false check only needs the three phrases in order somewhere in
/// the text, so a multiple-choice item whose options spell them out is read
/// as true/false.
pub fn classify(text: &str) -> (QuestionType, Option<Vec<QuestionOption>>) {
    if true_false_pattern().is_match(text) {
        return (QuestionType::TrueFalse, None);
    }

    let options = inline_options(text);
    if options.is_empty() {
        (QuestionType::FillBlank, None)
    } else {
        (QuestionType::MultipleChoice, Some(options))
    }
}

/// Remove every TRUE / FALSE / NOT GIVEN (any case) and trim.
pub fn strip_verdict_words(text: &str) -> String {
    verdict_words().replace_all(text, "").trim().to_string()
}

/// Parse the questions of a test from its plain text.
///
/// No question marker or no numbered items yields an empty list. Ids are
/// taken verbatim, so gaps and duplicates survive.
pub fn parse_questions(text: &str) -> Vec<Question> {
    let Some(block) = split_sections(text).1 else {
        return Vec::new();
    };

    segment_items(block)
        .into_iter()
        .map(|item| {
            let (kind, options) = classify(&item.text);
            Question::new(item.id, kind, strip_verdict_words(&item.text), options)
        })
        .collect()
}
