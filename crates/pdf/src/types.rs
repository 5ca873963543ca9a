use serde::{Deserialize, Serialize};

/// One positioned text run as drawn on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFragment {
    pub text: String,
    pub x: f32,
    pub y: f32,
    /// Approximate glyph height: magnitude of the transform's first column.
    pub font_scale: f32,
    /// 1-based page number.
    pub page: u32,
}

impl TextFragment {
    /// Build a fragment from a text rendering transform `[a, b, c, d, e, f]`.
    ///
    /// `(e, f)` is the origin of the run; `hypot(a, b)` is its scale, which
    /// stays the same size under rotation.
    pub fn from_transform(text: impl Into<String>, transform: &[f32; 6], page: u32) -> Self {
        Self {
            text: text.into(),
            x: transform[4],
            y: transform[5],
            font_scale: transform[0].hypot(transform[1]),
            page,
        }
    }
}

/// Fragments merged by row proximity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub text: String,
    /// Largest fragment scale on the line; 0 for page-break sentinels.
    pub font_size: f32,
    pub page: u32,
}

impl Line {
    pub fn is_page_break(&self) -> bool {
        self.text == crate::layout::PAGE_BREAK_TEXT && self.font_size == 0.0
    }
}

/// Result of one extraction pass over a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedText {
    pub page_count: usize,
    pub lines: Vec<Line>,
    /// All line texts, sentinels included, joined with `\n`.
    pub text: String,
}
