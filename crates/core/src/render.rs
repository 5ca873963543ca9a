//! HTML rendering of a loaded test into a page layout.
//!
//! The layout is any HTML document holding elements with the ids
//! [`PASSAGE_ID`], [`QUESTIONS_ID`] and [`PROGRESS_ID`]. [`inject`] replaces
//! the inner content of each of them.

use std::fmt::Write;
use std::ops::Range;
use std::sync::OnceLock;

use regex::{Regex, RegexBuilder};
use thiserror::Error;

use crate::passage::escape_html;
use crate::types::{Question, QuestionType};

pub const PASSAGE_ID: &str = "passage-text";
pub const QUESTIONS_ID: &str = "questions-container";
pub const PROGRESS_ID: &str = "progress-container";

const VERDICTS: [&str; 3] = ["TRUE", "FALSE", "NOT GIVEN"];

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Element #{0} has no closing tag")]
    Unclosed(String),
    #[error("Invalid element pattern: {0}")]
    Pattern(#[from] regex::Error),
}

fn blank_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\[\[blank\]\]").unwrap())
}

fn push_radio(out: &mut String, name: &str, value: &str, label: &str) {
    let _ = write!(
        out,
        r#"<label class="option"><input type="radio" name="{}" value="{}"> {}</label>"#,
        name,
        escape_html(value),
        escape_html(label)
    );
}

/// Markup for one question: number, text and its answer controls.
pub fn render_question(question: &Question) -> String {
    let name = format!("q{}", question.id);
    let mut out = String::new();

    let _ = write!(out, r#"<div class="question" id="{name}">"#);
    if let Some(instructions) = &question.instructions {
        let _ = write!(out, r#"<div class="question-instructions">{}</div>"#, escape_html(instructions));
    }
    let _ = write!(
        out,
        r#"<div class="question-title"><div class="question-number">{}</div>"#,
        question.id
    );

    match (&question.kind, &question.options) {
        (QuestionType::TrueFalse, _) => {
            let _ = write!(out, r#"<div class="question-text">{}</div></div>"#, escape_html(&question.text));
            out.push_str(r#"<div class="options">"#);
            for verdict in VERDICTS {
                push_radio(&mut out, &name, verdict, verdict);
            }
            out.push_str("</div>");
        }
        (QuestionType::MultipleChoice, Some(options)) => {
            let _ = write!(out, r#"<div class="question-text">{}</div></div>"#, escape_html(&question.text));
            out.push_str(r#"<div class="options">"#);
            for option in options {
                push_radio(&mut out, &name, &option.value, &format!("{}. {}", option.value, option.text));
            }
            out.push_str("</div>");
        }
        _ => {
            let text = blank_marker().replace(&question.text, "");
            let placeholder = question
                .placeholder
                .as_deref()
                .map(|p| format!(r#" placeholder="{}""#, escape_html(p)))
                .unwrap_or_default();
            let _ = write!(
                out,
                r#"<div class="question-text">{} <input type="text" name="{name}" class="fill-in-the-blank"{placeholder}></div></div>"#,
                escape_html(&text)
            );
        }
    }

    out.push_str("</div>");
    out
}

pub fn render_questions(questions: &[Question]) -> String {
    questions.iter().map(render_question).collect()
}

/// One progress item per question, in order.
pub fn render_progress(questions: &[Question]) -> String {
    questions
        .iter()
        .map(|q| format!(r#"<div class="progress-item" data-question="{0}">{0}</div>"#, q.id))
        .collect()
}

/// Byte range of the inner content of the element whose id is `id`.
///
/// Nested elements with the same tag name are balanced; `Ok(None)` when no
/// element carries the id.
pub fn find_element(html: &str, id: &str) -> Result<Option<Range<usize>>, RenderError> {
    let opening = RegexBuilder::new(&format!(
        r#"<([a-z][a-z0-9]*)\b[^>]*\bid\s*=\s*["']{}["'][^>]*>"#,
        regex::escape(id)
    ))
    .case_insensitive(true)
    .build()?;

    let Some(caps) = opening.captures(html) else {
        return Ok(None);
    };
    let (Some(whole), Some(tag)) = (caps.get(0), caps.get(1)) else {
        return Ok(None);
    };
    let start = whole.end();

    let tags = RegexBuilder::new(&format!(r"<(/?){}\b[^>]*>", regex::escape(tag.as_str())))
        .case_insensitive(true)
        .build()?;

    let mut depth = 1usize;
    for m in tags.find_iter(&html[start..]) {
        let text = m.as_str();
        if text.starts_with("</") {
            depth -= 1;
            if depth == 0 {
                return Ok(Some(start..start + m.start()));
            }
        } else if !text.ends_with("/>") {
            depth += 1;
        }
    }

    Err(RenderError::Unclosed(id.to_string()))
}

fn replace_inner(html: &mut String, id: &str, content: &str) -> Result<bool, RenderError> {
    match find_element(html, id)? {
        Some(range) => {
            html.replace_range(range, content);
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Replace the passage, question list and progress bar of `template`.
///
/// A layout without a passage element still gets its questions. A layout
/// without a questions container is returned after the passage step only,
/// leaving any progress element untouched.
pub fn inject(template: &str, passage_html: &str, questions: &[Question]) -> Result<String, RenderError> {
    let mut html = template.to_string();

    replace_inner(&mut html, PASSAGE_ID, passage_html)?;

    if !replace_inner(&mut html, QUESTIONS_ID, &render_questions(questions))? {
        return Ok(html);
    }

    replace_inner(&mut html, PROGRESS_ID, &render_progress(questions))?;
    Ok(html)
}

const PAGE_STYLE: &str = "body{font-family:sans-serif;margin:0;display:flex;flex-direction:column;height:100vh}\
main{display:flex;flex:1;overflow:hidden}\
#passage-text,#questions-container{flex:1;overflow-y:auto;padding:1rem 2rem}\
.question{margin-bottom:1.5rem}\
.question-title{display:flex;gap:.5rem}\
.question-number{font-weight:bold}\
.option{display:block;margin:.25rem 0}\
#progress-container{display:flex;gap:.25rem;padding:.5rem;border-top:1px solid #ccc}\
.progress-item{padding:.25rem .5rem;border:1px solid #ccc;cursor:pointer}\
body.dark-mode{background:#1e1e1e;color:#e0e0e0}\
body.dark-mode .progress-item{border-color:#555}";

/// Self-contained page layout; `dark_mode` sets the body class.
pub fn page_template(dark_mode: bool) -> String {
    let body_class = if dark_mode { r#" class="dark-mode""# } else { "" };
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>IELTS Reading</title>\n<style>{PAGE_STYLE}</style>\n</head>\n<body{body_class}>\n<main>\n<div id=\"{PASSAGE_ID}\"></div>\n<div id=\"{QUESTIONS_ID}\"></div>\n</main>\n<footer><div id=\"{PROGRESS_ID}\"></div></footer>\n</body>\n</html>\n"
    )
}

pub fn render_page(passage_html: &str, questions: &[Question], dark_mode: bool) -> Result<String, RenderError> {
    inject(&page_template(dark_mode), passage_html, questions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::QuestionOption;

    fn questions() -> Vec<Question> {
        vec![
            Question::new(1, QuestionType::TrueFalse, "Is the sky blue?", None),
            Question::new(2, QuestionType::FillBlank, "The capital is [[blank]].", None),
            Question::new(
                3,
                QuestionType::MultipleChoice,
                "Which option?",
                Some(vec![QuestionOption::new("A", "Paris"), QuestionOption::new("B", "Lyon")]),
            ),
        ]
    }

    #[test]
    fn test_true_false_has_three_radios() {
        let html = render_question(&questions()[0]);
        assert!(html.starts_with(r#"<div class="question" id="q1">"#));
        assert!(html.contains(r#"<div class="question-number">1</div>"#));
        assert_eq!(html.matches(r#"type="radio" name="q1""#).count(), 3);
        assert!(html.contains(r#"value="NOT GIVEN"> NOT GIVEN</label>"#));
    }

    #[test]
    fn test_fill_blank_removes_marker_and_appends_input() {
        let html = render_question(&questions()[1]);
        assert!(!html.contains("[[blank]]"));
        assert!(html.contains(
            r#"The capital is . <input type="text" name="q2" class="fill-in-the-blank"></div>"#
        ));
    }

    #[test]
    fn test_fill_blank_placeholder() {
        let mut q = questions()[1].clone();
        q.placeholder = Some("one word".into());
        let html = render_question(&q);
        assert!(html.contains(r#"class="fill-in-the-blank" placeholder="one word">"#));
    }

    #[test]
    fn test_instructions_precede_the_title() {
        let mut q = questions()[0].clone();
        q.instructions = Some("Write TRUE, FALSE or NOT GIVEN".into());
        let html = render_question(&q);
        assert!(html.starts_with(
            r#"<div class="question" id="q1"><div class="question-instructions">Write TRUE, FALSE or NOT GIVEN</div><div class="question-title">"#
        ));
    }

    #[test]
    fn test_multiple_choice_labels_value_and_text() {
        let html = render_question(&questions()[2]);
        assert!(html.contains(r#"value="A"> A. Paris</label>"#));
        assert!(html.contains(r#"value="B"> B. Lyon</label>"#));
    }

    #[test]
    fn test_question_text_is_escaped() {
        let q = Question::new(5, QuestionType::TrueFalse, "<b>bold</b> & co", None);
        let html = render_question(&q);
        assert!(html.contains("&lt;b&gt;bold&lt;/b&gt; &amp; co"));
    }

    #[test]
    fn test_rendered_question_divs_are_balanced() {
        let html = render_questions(&questions());
        assert_eq!(html.matches("<div").count(), html.matches("</div>").count());
    }

    #[test]
    fn test_progress_items() {
        let html = render_progress(&questions());
        assert_eq!(html.matches(r#"class="progress-item""#).count(), 3);
        assert!(html.contains(r#"<div class="progress-item" data-question="3">3</div>"#));
    }

    #[test]
    fn test_inject_replaces_existing_content() {
        let template = r#"<body><div id="passage-text"><p>old <div>nested</div></p></div><section id='questions-container'><div class="question">stale</div></section><div id="progress-container">x</div></body>"#;

        let html = inject(template, "<p>new</p>", &questions()).unwrap();

        assert!(html.contains(r#"<div id="passage-text"><p>new</p></div>"#));
        assert!(!html.contains("old"));
        assert!(!html.contains("stale"));
        assert!(html.contains(r#"<section id='questions-container'><div class="question" id="q1">"#));
        assert!(html.ends_with(r#"data-question="3">3</div></div></body>"#));
    }

    #[test]
    fn test_inject_twice_does_not_accumulate() {
        let once = inject(&page_template(false), "<p>a</p>", &questions()).unwrap();
        let twice = inject(&once, "<p>a</p>", &questions()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_missing_questions_container_stops_before_progress() {
        let template = r#"<div id="passage-text"></div><div id="progress-container">keep</div>"#;
        let html = inject(template, "<p>p</p>", &questions()).unwrap();
        assert_eq!(html, r#"<div id="passage-text"><p>p</p></div><div id="progress-container">keep</div>"#);
    }

    #[test]
    fn test_missing_passage_is_skipped() {
        let template = r#"<div id="questions-container"></div>"#;
        let html = inject(template, "<p>p</p>", &questions()).unwrap();
        assert!(!html.contains("<p>p</p>"));
        assert!(html.contains(r#"id="q3""#));
    }

    #[test]
    fn test_unclosed_element_is_an_error() {
        let err = inject(r#"<div id="passage-text"><p>"#, "", &[]).unwrap_err();
        assert!(matches!(err, RenderError::Unclosed(id) if id == PASSAGE_ID));
    }

    #[test]
    fn test_render_page_honours_dark_mode() {
        let dark = render_page("<p>x</p>", &questions(), true).unwrap();
        let light = render_page("<p>x</p>", &questions(), false).unwrap();
        assert!(dark.contains(r#"<body class="dark-mode">"#));
        assert!(light.contains("<body>\n"));
        assert!(dark.contains(r#"<div id="passage-text"><p>x</p></div>"#));
        assert!(dark.contains(r#"data-question="2""#));
    }
}
