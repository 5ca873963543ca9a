//! Line reconstruction from positioned fragments.
//!
//! ```text
//! TextFragment[] (per page) -> Line[] (+ page sentinel) -> plain text
//!                  group_fragments_into_lines      lines_to_text
//! ```
//!
//! Everything here is pure; the tolerance is a parameter so callers can tune
//! it without touching the grouping itself.

use std::cmp::Ordering;

use crate::{Line, TextFragment};

/// Two fragments whose y coordinates differ by at most this many units sit on
/// the same row.
pub const ROW_TOLERANCE: f32 = 2.0;

/// Text of the synthetic line closing every page.
pub const PAGE_BREAK_TEXT: &str = "\n";

/// The sentinel appended after the last line of `page`.
pub fn page_break(page: u32) -> Line {
    Line {
        text: PAGE_BREAK_TEXT.to_string(),
        font_size: 0.0,
        page,
    }
}

/// Group one page's fragments into lines, top of the page first.
///
/// Fragments are ordered by descending y and folded into rows: a fragment
/// joins the current row when its y is within `tolerance` of the y of the
/// fragment that opened the row, otherwise it opens a new row. Each row is
/// then read left to right, texts joined with a single space.
pub fn group_fragments_into_lines(mut fragments: Vec<TextFragment>, tolerance: f32) -> Vec<Line> {
    fragments.sort_by(|a, b| b.y.total_cmp(&a.y).then(a.x.total_cmp(&b.x)));

    let mut rows: Vec<Vec<TextFragment>> = Vec::new();
    let mut row_y = f32::NAN;

    for fragment in fragments {
        if (row_y - fragment.y).abs() <= tolerance {
            if let Some(row) = rows.last_mut() {
                row.push(fragment);
                continue;
            }
        }
        row_y = fragment.y;
        rows.push(vec![fragment]);
    }

    rows.into_iter().map(assemble_line).collect()
}

fn assemble_line(mut row: Vec<TextFragment>) -> Line {
    row.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal));

    let text = row
        .iter()
        .map(|f| f.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    let font_size = row.iter().map(|f| f.font_scale).fold(0.0_f32, f32::max);
    let page = row.first().map(|f| f.page).unwrap_or_default();

    Line {
        text,
        font_size,
        page,
    }
}

/// Lines of a whole document: each page's lines followed by its sentinel.
pub fn build_lines(pages: Vec<(u32, Vec<TextFragment>)>, tolerance: f32) -> Vec<Line> {
    let mut lines = Vec::new();

    for (page, fragments) in pages {
        lines.extend(group_fragments_into_lines(fragments, tolerance));
        lines.push(page_break(page));
    }

    lines
}

/// Join line texts with newlines. Sentinels contribute their own `\n`, so a
/// page break shows up as a blank line run in the output.
pub fn lines_to_text(lines: &[Line]) -> String {
    lines
        .iter()
        .map(|l| l.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
