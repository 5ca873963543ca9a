//! Reading-passage reconstruction from extracted plain text.

use std::borrow::Cow;
use std::sync::OnceLock;

use regex::Regex;

/// Share of uppercase letters above which a block reads as a heading.
pub const HEADING_UPPERCASE_RATIO: f64 = 0.6;

/// Blocks shorter than this many characters read as headings.
pub const HEADING_MAX_CHARS: usize = 60;

fn section_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?im)^questions?\b").unwrap())
}

/// Split text at the first line starting with the word "Question(s)".
///
/// Returns the passage (everything before the marker) and the question block
/// (the marker line onwards), if any.
pub fn split_sections(text: &str) -> (&str, Option<&str>) {
    match section_marker().find(text) {
        Some(m) => (&text[..m.start()], Some(&text[m.start()..])),
        None => (text, None),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Heading,
    Paragraph,
}

impl BlockKind {
    pub fn tag(&self) -> &'static str {
        match self {
            BlockKind::Heading => "h2",
            BlockKind::Paragraph => "p",
        }
    }
}

/// Uppercase ASCII letters over all ASCII letters; 0 when there are none.
pub fn uppercase_ratio(piece: &str) -> f64 {
    let letters = piece.chars().filter(char::is_ascii_alphabetic).count();
    if letters == 0 {
        return 0.0;
    }
    let upper = piece.chars().filter(char::is_ascii_uppercase).count();
    upper as f64 / letters as f64
}

pub fn classify_block(piece: &str) -> BlockKind {
    if uppercase_ratio(piece) > HEADING_UPPERCASE_RATIO || piece.chars().count() < HEADING_MAX_CHARS {
        BlockKind::Heading
    } else {
        BlockKind::Paragraph
    }
}

/// Escape `& < > " '` for inclusion in markup.
pub fn escape_html(text: &str) -> Cow<'_, str> {
    html_escape::encode_quoted_attribute(text)
}

/// Non-empty trimmed pieces of the passage, one per source line.
///
/// Every newline run is a hard boundary; pieces are never merged.
pub fn passage_blocks(text: &str) -> Vec<(BlockKind, &str)> {
    let (passage, _) = split_sections(text);
    passage
        .split('\n')
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(|piece| (classify_block(piece), piece))
        .collect()
}

/// Render the passage portion of `text` as `<h2>`/`<p>` blocks.
pub fn format_passage(text: &str) -> String {
    passage_blocks(text)
        .into_iter()
        .map(|(kind, piece)| format!("<{tag}>{}</{tag}>", escape_html(piece), tag = kind.tag()))
        .collect()
}
