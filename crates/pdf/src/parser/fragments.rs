//! Content-stream walker producing positioned [`TextFragment`]s.
//!
//! The walker implements the subset of the PDF text-rendering state machine
//! needed to know *where* each string lands and *how large* it is drawn. Glyph
//! widths are approximated, so horizontal advances are only good enough to
//! keep fragments of one line in left-to-right order.

use super::backend::{ContentOp, FontResource, PageId, PdfBackend, PdfValue};
use crate::normalize::normalize_fragment_text;
use crate::{PdfError, TextFragment};

/// Approximate glyph advance as a fraction of the font size.
const APPROX_CHAR_WIDTH_RATIO: f32 = 0.5;

/// A `TJ` kerning displacement wider than this fraction of an average glyph
/// is rendered as a space.
const KERNING_SPACE_RATIO: f32 = 0.3;

/// Affine matrix `[a, b, c, d, e, f]` in PDF row-vector convention.
pub type Matrix = [f32; 6];

pub const IDENTITY: Matrix = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

/// `lhs × rhs`.
pub fn multiply(lhs: &Matrix, rhs: &Matrix) -> Matrix {
    [
        lhs[0] * rhs[0] + lhs[1] * rhs[2],
        lhs[0] * rhs[1] + lhs[1] * rhs[3],
        lhs[2] * rhs[0] + lhs[3] * rhs[2],
        lhs[2] * rhs[1] + lhs[3] * rhs[3],
        lhs[4] * rhs[0] + lhs[5] * rhs[2] + rhs[4],
        lhs[4] * rhs[1] + lhs[5] * rhs[3] + rhs[5],
    ]
}

#[derive(Debug, Clone)]
struct TextState {
    font_key: Vec<u8>,
    font_size: f32,
    text_matrix: Matrix,
    line_matrix: Matrix,
    ctm: Matrix,
    saved_ctm: Vec<Matrix>,
    horiz_scale: f32,
    char_spacing: f32,
    word_spacing: f32,
    text_rise: f32,
    leading: f32,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            font_key: Vec::new(),
            font_size: 0.0,
            text_matrix: IDENTITY,
            line_matrix: IDENTITY,
            ctm: IDENTITY,
            saved_ctm: Vec::new(),
            horiz_scale: 1.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            text_rise: 0.0,
            leading: 0.0,
        }
    }
}

impl TextState {
    /// Text rendering matrix: font scaling × text matrix × CTM.
    fn rendering_matrix(&self) -> Matrix {
        let font = [
            self.font_size * self.horiz_scale,
            0.0,
            0.0,
            self.font_size,
            0.0,
            self.text_rise,
        ];
        multiply(&multiply(&font, &self.text_matrix), &self.ctm)
    }

    fn translate_line(&mut self, tx: f32, ty: f32) {
        self.line_matrix = multiply(&[1.0, 0.0, 0.0, 1.0, tx, ty], &self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        self.translate_line(0.0, -self.leading);
    }

    /// Advance along the baseline by `dx` unscaled text-space units.
    fn advance(&mut self, dx: f32) {
        self.text_matrix = multiply(&[1.0, 0.0, 0.0, 1.0, dx, 0.0], &self.text_matrix);
    }

    fn advance_after_show(&mut self, text: &str) {
        let glyph = self.font_size * APPROX_CHAR_WIDTH_RATIO;
        let dx: f32 = text
            .chars()
            .map(|ch| {
                let spacing = if ch == ' ' {
                    self.char_spacing + self.word_spacing
                } else {
                    self.char_spacing
                };
                (glyph + spacing) * self.horiz_scale
            })
            .sum();
        self.advance(dx);
    }
}

/// Per-page walker context.
struct PageWalk<'a> {
    backend: &'a dyn PdfBackend,
    fonts: Vec<FontResource>,
    page: u32,
    normalize: bool,
    state: TextState,
    fragments: Vec<TextFragment>,
}

impl PageWalk<'_> {
    fn decode(&self, operand: &PdfValue) -> String {
        let PdfValue::Str(bytes) = operand else {
            return String::new();
        };
        let font = self.fonts.iter().find(|f| f.key == self.state.font_key);
        let text = self.backend.decode_text(font, bytes);
        if self.normalize {
            normalize_fragment_text(&text)
        } else {
            text
        }
    }

    fn push(&mut self, text: &str, transform: Matrix) {
        if text.trim().is_empty() {
            return;
        }
        self.fragments
            .push(TextFragment::from_transform(text, &transform, self.page));
    }

    fn show(&mut self, operand: &PdfValue) {
        let text = self.decode(operand);
        if text.is_empty() {
            return;
        }
        let transform = self.state.rendering_matrix();
        self.push(&text, transform);
        self.state.advance_after_show(&text);
    }

    /// `TJ`: strings interleaved with kerning in thousandths of text space.
    /// One fragment per array, with spaces where the kerning looks like a
    /// word gap.
    fn show_array(&mut self, elements: &[PdfValue]) {
        let mut buf = String::new();
        let mut start: Option<Matrix> = None;

        for element in elements {
            if let PdfValue::Str(_) = element {
                let piece = self.decode(element);
                if start.is_none() {
                    start = Some(self.state.rendering_matrix());
                }
                buf.push_str(&piece);
                self.state.advance_after_show(&piece);
            } else if let Some(adjust) = element.as_f32() {
                let dx = -adjust / 1000.0 * self.state.font_size * self.state.horiz_scale;
                let gap = self.state.font_size
                    * APPROX_CHAR_WIDTH_RATIO
                    * self.state.horiz_scale
                    * KERNING_SPACE_RATIO;
                if dx > gap && !buf.is_empty() && !buf.ends_with(' ') {
                    buf.push(' ');
                }
                self.state.advance(dx);
            }
        }

        if let Some(transform) = start {
            let text = buf.trim_end().to_string();
            self.push(&text, transform);
        }
    }

    fn apply(&mut self, op: &ContentOp) {
        let num = |i: usize| op.operands.get(i).and_then(PdfValue::as_f32);

        match op.operator.as_str() {
            "q" => self.state.saved_ctm.push(self.state.ctm),
            "Q" => {
                if let Some(ctm) = self.state.saved_ctm.pop() {
                    self.state.ctm = ctm;
                }
            }
            "cm" => {
                if let Some(m) = matrix_operands(&op.operands) {
                    self.state.ctm = multiply(&m, &self.state.ctm);
                }
            }
            "BT" => {
                self.state.text_matrix = IDENTITY;
                self.state.line_matrix = IDENTITY;
            }
            "Tf" => {
                let key = match op.operands.first() {
                    Some(PdfValue::Name(n)) | Some(PdfValue::Str(n)) => n.clone(),
                    _ => return,
                };
                self.state.font_key = key;
                self.state.font_size = num(1).unwrap_or(0.0);
            }
            "Tm" => {
                if let Some(m) = matrix_operands(&op.operands) {
                    self.state.text_matrix = m;
                    self.state.line_matrix = m;
                }
            }
            "Td" => {
                if let (Some(tx), Some(ty)) = (num(0), num(1)) {
                    self.state.translate_line(tx, ty);
                }
            }
            "TD" => {
                if let (Some(tx), Some(ty)) = (num(0), num(1)) {
                    self.state.leading = -ty;
                    self.state.translate_line(tx, ty);
                }
            }
            "T*" => self.state.next_line(),
            "TL" => self.state.leading = num(0).unwrap_or(self.state.leading),
            "Tc" => self.state.char_spacing = num(0).unwrap_or(self.state.char_spacing),
            "Tw" => self.state.word_spacing = num(0).unwrap_or(self.state.word_spacing),
            "Tz" => {
                if let Some(v) = num(0) {
                    self.state.horiz_scale = v / 100.0;
                }
            }
            "Ts" => self.state.text_rise = num(0).unwrap_or(self.state.text_rise),
            "Tj" => {
                if let Some(first) = op.operands.first() {
                    self.show(first);
                }
            }
            "TJ" => {
                if let Some(PdfValue::Array(elements)) = op.operands.first() {
                    self.show_array(elements);
                }
            }
            "'" => {
                self.state.next_line();
                if let Some(first) = op.operands.first() {
                    self.show(first);
                }
            }
            "\"" => {
                if let (Some(aw), Some(ac), Some(text)) = (num(0), num(1), op.operands.get(2)) {
                    self.state.word_spacing = aw;
                    self.state.char_spacing = ac;
                    self.state.next_line();
                    self.show(text);
                }
            }
            _ => {}
        }
    }
}

fn matrix_operands(operands: &[PdfValue]) -> Option<Matrix> {
    let vals: Vec<f32> = operands.iter().take(6).filter_map(PdfValue::as_f32).collect();
    match vals.as_slice() {
        [a, b, c, d, e, f] => Some([*a, *b, *c, *d, *e, *f]),
        _ => None,
    }
}

/// Walk one page's content stream and return its fragments in stream order.
pub fn extract_page_fragments(
    backend: &dyn PdfBackend,
    page: u32,
    page_id: PageId,
    normalize: bool,
) -> Result<Vec<TextFragment>, PdfError> {
    let ops = backend.page_operations(page_id)?;
    let mut walk = PageWalk {
        backend,
        fonts: backend.page_fonts(page_id).unwrap_or_default(),
        page,
        normalize,
        state: TextState::default(),
        fragments: Vec::new(),
    };

    for op in &ops {
        walk.apply(op);
    }

    Ok(walk.fragments)
}

/// Fragments of every page, grouped per page in page order (1-based).
pub fn extract_all_fragments(
    backend: &dyn PdfBackend,
    normalize: bool,
) -> Result<Vec<(u32, Vec<TextFragment>)>, PdfError> {
    backend
        .pages()
        .into_iter()
        .map(|(page, page_id)| {
            let fragments = extract_page_fragments(backend, page, page_id, normalize)?;
            log::debug!("page {}: {} fragments", page, fragments.len());
            Ok((page, fragments))
        })
        .collect()
}
