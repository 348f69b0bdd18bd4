//! Positioned text runs from a PDF page, read with lopdf.
//!
//! Only the text-positioning subset of the content stream is interpreted:
//! enough to recover each run's baseline origin in user space. Font width
//! tables are not read; shown text advances by an estimated glyph width, and
//! `TJ` displacements move the pen exactly.

use std::collections::BTreeMap;
use std::path::Path;

use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::error::Result;

/// Estimated glyph advance as a fraction of the font size.
const APPROX_CHAR_WIDTH: f32 = 0.5;

/// A `TJ` displacement wider than this (thousandths of text space) is a word gap.
const TJ_GAP: f32 = 200.0;

/// One text-showing operation and where its origin landed on the page.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphRun {
    pub x: f32,
    /// PDF user space, origin bottom-left
    pub y: f32,
    pub text: String,
}

/// Affine matrix `[a b c d e f]` as used by `cm` and `Tm`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix([f32; 6]);

impl Matrix {
    const IDENTITY: Matrix = Matrix([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    fn translate(tx: f32, ty: f32) -> Matrix {
        Matrix([1.0, 0.0, 0.0, 1.0, tx, ty])
    }

    /// `self × other`
    fn then(self, other: Matrix) -> Matrix {
        let [a, b, c, d, e, f] = self.0;
        let [a2, b2, c2, d2, e2, f2] = other.0;
        Matrix([
            a * a2 + b * c2,
            a * b2 + b * d2,
            c * a2 + d * c2,
            c * b2 + d * d2,
            e * a2 + f * c2 + e2,
            e * b2 + f * d2 + f2,
        ])
    }

    fn origin(self) -> (f32, f32) {
        (self.0[4], self.0[5])
    }
}

fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r as f32),
        _ => None,
    }
}

fn matrix_operands(operands: &[Object]) -> Option<Matrix> {
    if operands.len() < 6 {
        return None;
    }
    let mut m = [0.0f32; 6];
    for (slot, operand) in m.iter_mut().zip(operands) {
        *slot = number(operand)?;
    }
    Some(Matrix(m))
}

/// A loaded statement PDF.
pub struct PdfDocument {
    doc: Document,
    pages: Vec<ObjectId>,
}

impl PdfDocument {
    pub fn load_mem(bytes: &[u8]) -> Result<Self> {
        let doc = Document::load_mem(bytes)?;
        Ok(Self::from_document(doc))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let doc = Document::load(path)?;
        Ok(Self::from_document(doc))
    }

    fn from_document(doc: Document) -> Self {
        // BTreeMap keyed by 1-based page number, so values are in document order.
        let pages = doc.get_pages().into_values().collect();
        Self { doc, pages }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Text runs of page `page_number` (1-based), blank runs dropped.
    pub fn page_runs(&self, page_number: u32) -> Result<Vec<GlyphRun>> {
        let Some(&page_id) = (page_number as usize)
            .checked_sub(1)
            .and_then(|i| self.pages.get(i))
        else {
            return Ok(Vec::new());
        };

        let content_data = self.doc.get_page_content(page_id)?;
        let content = Content::decode(&content_data)?;
        let fonts = self.doc.get_page_fonts(page_id).unwrap_or_default();

        Ok(PageInterpreter::new(&self.doc, &fonts).run(&content))
    }
}

/// Text and graphics state needed to place runs.
struct PageInterpreter<'a> {
    doc: &'a Document,
    fonts: &'a BTreeMap<Vec<u8>, &'a Dictionary>,
    ctm: Matrix,
    ctm_stack: Vec<Matrix>,
    text_matrix: Matrix,
    line_matrix: Matrix,
    font: Vec<u8>,
    font_size: f32,
    leading: f32,
    runs: Vec<GlyphRun>,
}

impl<'a> PageInterpreter<'a> {
    fn new(doc: &'a Document, fonts: &'a BTreeMap<Vec<u8>, &'a Dictionary>) -> Self {
        Self {
            doc,
            fonts,
            ctm: Matrix::IDENTITY,
            ctm_stack: Vec::new(),
            text_matrix: Matrix::IDENTITY,
            line_matrix: Matrix::IDENTITY,
            font: Vec::new(),
            font_size: 12.0,
            leading: 0.0,
            runs: Vec::new(),
        }
    }

    fn run(mut self, content: &Content) -> Vec<GlyphRun> {
        for op in &content.operations {
            let operands = op.operands.as_slice();
            match op.operator.as_str() {
                "q" => self.ctm_stack.push(self.ctm),
                "Q" => {
                    if let Some(m) = self.ctm_stack.pop() {
                        self.ctm = m;
                    }
                }
                "cm" => {
                    if let Some(m) = matrix_operands(operands) {
                        self.ctm = m.then(self.ctm);
                    }
                }
                "BT" => {
                    self.text_matrix = Matrix::IDENTITY;
                    self.line_matrix = Matrix::IDENTITY;
                }
                "Tf" => {
                    if let [name, size, ..] = operands {
                        if let Ok(name) = name.as_name() {
                            self.font = name.to_vec();
                        }
                        if let Some(size) = number(size) {
                            self.font_size = size;
                        }
                    }
                }
                "TL" => {
                    if let Some(tl) = operands.first().and_then(number) {
                        self.leading = tl;
                    }
                }
                "Td" => {
                    if let [tx, ty, ..] = operands {
                        self.move_line(number(tx).unwrap_or(0.0), number(ty).unwrap_or(0.0));
                    }
                }
                "TD" => {
                    if let [tx, ty, ..] = operands {
                        let ty = number(ty).unwrap_or(0.0);
                        self.leading = -ty;
                        self.move_line(number(tx).unwrap_or(0.0), ty);
                    }
                }
                "Tm" => {
                    if let Some(m) = matrix_operands(operands) {
                        self.text_matrix = m;
                        self.line_matrix = m;
                    }
                }
                "T*" => self.next_line(),
                "Tj" => {
                    if let Some(obj) = operands.first() {
                        self.show(obj);
                    }
                }
                "'" => {
                    self.next_line();
                    if let Some(obj) = operands.first() {
                        self.show(obj);
                    }
                }
                "\"" => {
                    self.next_line();
                    if let Some(obj) = operands.get(2) {
                        self.show(obj);
                    }
                }
                "TJ" => {
                    if let Some(Ok(items)) = operands.first().map(Object::as_array) {
                        self.show_array(items);
                    }
                }
                _ => {}
            }
        }
        self.runs
    }

    fn move_line(&mut self, tx: f32, ty: f32) {
        self.line_matrix = Matrix::translate(tx, ty).then(self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        // Without an explicit TL, approximate the leading from the font size.
        let leading = if self.leading != 0.0 {
            self.leading
        } else {
            self.font_size * 1.2
        };
        self.move_line(0.0, -leading);
    }

    /// Move the pen along the baseline by `tx` text-space units.
    fn advance(&mut self, tx: f32) {
        self.text_matrix = Matrix::translate(tx, 0.0).then(self.text_matrix);
    }

    fn advance_over(&mut self, text: &str) {
        self.advance(text.chars().count() as f32 * self.font_size * APPROX_CHAR_WIDTH);
    }

    fn show(&mut self, obj: &Object) {
        if let Some(text) = self.decode(obj) {
            let origin = self.text_matrix;
            self.advance_over(&text);
            self.push_run(origin, text);
        }
    }

    /// One run per `TJ` array. Displacements move the pen; wide ones also
    /// separate the surrounding strings with a space.
    fn show_array(&mut self, items: &[Object]) {
        let mut text = String::new();
        let mut origin = self.text_matrix;
        for item in items {
            if let Some(adjust) = number(item) {
                if -adjust > TJ_GAP && !text.is_empty() && !text.ends_with(' ') {
                    text.push(' ');
                }
                self.advance(-adjust / 1000.0 * self.font_size);
            } else if let Some(fragment) = self.decode(item) {
                if text.is_empty() {
                    origin = self.text_matrix;
                }
                self.advance_over(&fragment);
                text.push_str(&fragment);
            }
        }
        self.push_run(origin, text);
    }

    fn push_run(&mut self, origin: Matrix, text: String) {
        if text.trim().is_empty() {
            return;
        }
        let (x, y) = origin.then(self.ctm).origin();
        self.runs.push(GlyphRun { x, y, text });
    }

    /// Decode a string operand through the current font's encoding, falling
    /// back to UTF-16BE (with BOM) and then Latin-1.
    fn decode(&self, obj: &Object) -> Option<String> {
        let Object::String(bytes, _) = obj else {
            return None;
        };

        if let Some(font_dict) = self.fonts.get(&self.font) {
            if let Ok(encoding) = font_dict.get_font_encoding(self.doc) {
                if let Ok(text) = Document::decode_text(&encoding, bytes) {
                    return Some(text);
                }
            }
        }

        if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
            let utf16: Vec<u16> = bytes[2..]
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            return Some(String::from_utf16_lossy(&utf16));
        }

        Some(bytes.iter().map(|&b| b as char).collect())
    }
}
