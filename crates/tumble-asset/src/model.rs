//! Flat text model format.
//!
//! ```text
//! <N>
//! <f32> <f32> ... (N values, any whitespace)
//! ```
//!
//! Values are interleaved per-vertex records of [`FLOATS_PER_VERTEX`] floats:
//! position xyz, two legacy color slots that are never read, normal xyz.

use std::path::Path;

use crate::error::{ModelError, ParseError};

// ── vertex layout ─────────────────────────────────────────────────────────

/// Floats per vertex record.
pub const FLOATS_PER_VERTEX: usize = 8;

/// Float offset of the position attribute inside a record.
pub const POSITION_OFFSET: usize = 0;

/// Float offset of the normal attribute inside a record.
///
/// Offsets 3..5 hold legacy color data that no shader input binds.
pub const NORMAL_OFFSET: usize = 5;

/// Record stride in bytes.
pub const VERTEX_STRIDE_BYTES: u64 = (FLOATS_PER_VERTEX * size_of::<f32>()) as u64;

/// Position attribute offset in bytes.
pub const POSITION_OFFSET_BYTES: u64 = (POSITION_OFFSET * size_of::<f32>()) as u64;

/// Normal attribute offset in bytes.
pub const NORMAL_OFFSET_BYTES: u64 = (NORMAL_OFFSET * size_of::<f32>()) as u64;

// ── model data ────────────────────────────────────────────────────────────

/// Model values as declared by the file.
///
/// `floats.len()` always equals the declared count; any remainder past the
/// last whole record is kept but never drawn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelData {
    floats: Vec<f32>,
}

/// Attribute values of one vertex, read through the layout constants.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct VertexView {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl ModelData {
    pub fn from_floats(floats: Vec<f32>) -> Self {
        Self { floats }
    }

    /// Raw values, suitable for a direct GPU upload.
    pub fn floats(&self) -> &[f32] {
        &self.floats
    }

    /// Declared value count.
    pub fn declared_len(&self) -> usize {
        self.floats.len()
    }

    /// Whole vertex records available for drawing.
    pub fn vertex_count(&self) -> usize {
        self.floats.len() / FLOATS_PER_VERTEX
    }

    /// Triangles formed by consecutive vertex triples.
    pub fn triangle_count(&self) -> usize {
        self.vertex_count() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.vertex_count() == 0
    }

    /// Returns the attributes of vertex `index`, or `None` past the end.
    pub fn vertex(&self, index: usize) -> Option<VertexView> {
        if index >= self.vertex_count() {
            return None;
        }
        let rec = &self.floats[index * FLOATS_PER_VERTEX..(index + 1) * FLOATS_PER_VERTEX];
        let p = &rec[POSITION_OFFSET..POSITION_OFFSET + 3];
        let n = &rec[NORMAL_OFFSET..NORMAL_OFFSET + 3];
        Some(VertexView {
            position: [p[0], p[1], p[2]],
            normal: [n[0], n[1], n[2]],
        })
    }

    /// Whole vertices in order.
    pub fn vertices(&self) -> impl Iterator<Item = VertexView> + '_ {
        (0..self.vertex_count()).filter_map(|i| self.vertex(i))
    }

    /// Vertices whose normal has zero length; they cannot be lit.
    pub fn zero_normal_count(&self) -> usize {
        self.vertices()
            .filter(|v| v.normal.iter().all(|c| *c == 0.0))
            .count()
    }
}

// ── parsing ───────────────────────────────────────────────────────────────

/// Whitespace-separated token with its 1-based position.
struct Token<'s> {
    text: &'s str,
    line: usize,
    col: usize,
}

struct Tokens<'s> {
    src: &'s str,
    pos: usize,
    line: usize,
    col: usize,
}

impl<'s> Tokens<'s> {
    fn new(src: &'s str) -> Self {
        Self { src, pos: 0, line: 1, col: 1 }
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.src[self.pos..].chars().next() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
            if c == '\n' {
                self.line += 1;
                self.col = 1;
            } else {
                self.col += 1;
            }
        }
    }
}

impl<'s> Iterator for Tokens<'s> {
    type Item = Token<'s>;

    fn next(&mut self) -> Option<Token<'s>> {
        self.skip_whitespace();
        if self.pos >= self.src.len() {
            return None;
        }

        let start = self.pos;
        let (line, col) = (self.line, self.col);
        while let Some(c) = self.src[self.pos..].chars().next() {
            if c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
            self.col += 1;
        }

        Some(Token { text: &self.src[start..self.pos], line, col })
    }
}

/// Parses model text.
///
/// Tokens after the declared count are ignored.
pub fn parse_model(src: &str) -> Result<ModelData, ParseError> {
    let mut tokens = Tokens::new(src);

    let Some(head) = tokens.next() else {
        return Err(ParseError::new("missing value count", 1, 1));
    };
    let count: usize = head.text.parse().map_err(|_| {
        ParseError::new(
            format!("value count must be a non-negative integer, found `{}`", head.text),
            head.line,
            head.col,
        )
    })?;

    let mut floats = Vec::with_capacity(count.min(1 << 20));
    while floats.len() < count {
        let Some(tok) = tokens.next() else {
            return Err(ParseError::new(
                format!("expected {count} values, found {}", floats.len()),
                tokens.line,
                tokens.col,
            ));
        };
        let v: f32 = tok.text.parse().map_err(|_| {
            ParseError::new(format!("invalid number `{}`", tok.text), tok.line, tok.col)
        })?;
        floats.push(v);
    }

    Ok(ModelData::from_floats(floats))
}

/// Reads and parses a model file.
pub fn load_model(path: impl AsRef<Path>) -> Result<ModelData, ModelError> {
    let path = path.as_ref();
    let src = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_model(&src).map_err(|source| ModelError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(p: [f32; 3], legacy: [f32; 2], n: [f32; 3]) -> String {
        format!(
            "{} {} {} {} {} {} {} {}",
            p[0], p[1], p[2], legacy[0], legacy[1], n[0], n[1], n[2]
        )
    }

    // ── counts ────────────────────────────────────────────────────────────

    #[test]
    fn vertex_count_is_declared_over_eight() {
        for k in 0..5usize {
            let values: Vec<String> = (0..k * 8).map(|i| i.to_string()).collect();
            let src = format!("{}\n{}", k * 8, values.join(" "));
            let m = parse_model(&src).unwrap();
            assert_eq!(m.vertex_count(), k);
            assert_eq!(m.declared_len(), k * 8);
        }
    }

    #[test]
    fn remainder_values_are_loaded_but_not_drawn() {
        let src = "11\n1 2 3 4 5 6 7 8 9 10 11";
        let m = parse_model(src).unwrap();
        assert_eq!(m.declared_len(), 11);
        assert_eq!(m.vertex_count(), 1);
        assert!(m.vertex(1).is_none());
    }

    #[test]
    fn triangle_count_uses_whole_triples() {
        let values = vec!["0"; 8 * 7].join(" ");
        let m = parse_model(&format!("56 {values}")).unwrap();
        assert_eq!(m.vertex_count(), 7);
        assert_eq!(m.triangle_count(), 2);
    }

    #[test]
    fn extra_tokens_after_count_are_ignored() {
        let m = parse_model("2 1.5 -2 99 100").unwrap();
        assert_eq!(m.floats(), &[1.5, -2.0]);
    }

    #[test]
    fn zero_count_is_empty() {
        let m = parse_model("0").unwrap();
        assert!(m.is_empty());
        assert_eq!(m.triangle_count(), 0);
    }

    // ── layout ────────────────────────────────────────────────────────────

    #[test]
    fn layout_constants() {
        assert_eq!(VERTEX_STRIDE_BYTES, 32);
        assert_eq!(POSITION_OFFSET_BYTES, 0);
        assert_eq!(NORMAL_OFFSET_BYTES, 20);
    }

    #[test]
    fn attributes_ignore_legacy_slots() {
        let a = record([1.0, 2.0, 3.0], [0.0, 0.0], [0.0, 0.0, 1.0]);
        let b = record([1.0, 2.0, 3.0], [-7.5, 42.0], [0.0, 0.0, 1.0]);
        let ma = parse_model(&format!("8 {a}")).unwrap();
        let mb = parse_model(&format!("8 {b}")).unwrap();
        assert_eq!(ma.vertex(0), mb.vertex(0));
        assert_eq!(
            ma.vertex(0).unwrap(),
            VertexView { position: [1.0, 2.0, 3.0], normal: [0.0, 0.0, 1.0] }
        );
    }

    #[test]
    fn second_vertex_reads_from_stride() {
        let src = format!(
            "16 {} {}",
            record([0.0, 0.0, 0.0], [0.0, 0.0], [1.0, 0.0, 0.0]),
            record([4.0, 5.0, 6.0], [0.0, 0.0], [0.0, 1.0, 0.0]),
        );
        let v = parse_model(&src).unwrap().vertex(1).unwrap();
        assert_eq!(v.position, [4.0, 5.0, 6.0]);
        assert_eq!(v.normal, [0.0, 1.0, 0.0]);
    }

    // ── errors ────────────────────────────────────────────────────────────

    #[test]
    fn zero_normals_are_counted() {
        let src = format!(
            "24\n{}\n{}\n{}",
            record([0.0, 0.0, 0.0], [1.0, 1.0], [0.0, 0.0, 1.0]),
            record([1.0, 0.0, 0.0], [1.0, 1.0], [0.0, 0.0, 0.0]),
            record([0.0, 1.0, 0.0], [1.0, 1.0], [0.0, -0.0, 0.0])
        );
        let m = parse_model(&src).unwrap();
        assert_eq!(m.vertices().count(), 3);
        assert_eq!(m.zero_normal_count(), 2);
    }

    #[test]
    fn empty_source_is_error() {
        let e = parse_model("  \n ").unwrap_err();
        assert!(e.message.contains("missing value count"));
    }

    #[test]
    fn short_file_is_error() {
        let e = parse_model("8\n1 2 3").unwrap_err();
        assert!(e.message.contains("expected 8 values, found 3"), "{e}");
    }

    #[test]
    fn bad_count_is_error() {
        assert!(parse_model("-8 1 2").is_err());
        assert!(parse_model("2.5 1 2").is_err());
        assert!(parse_model("abc").is_err());
    }

    #[test]
    fn bad_value_reports_position() {
        let e = parse_model("3\n1.0 2.0\n  x").unwrap_err();
        assert_eq!((e.line, e.col), (3, 3));
        assert!(e.message.contains("`x`"));
    }

    #[test]
    fn accepts_exponent_and_sign() {
        let m = parse_model("3 1e-3 -2.5E2 +4").unwrap();
        assert_eq!(m.floats(), &[0.001, -250.0, 4.0]);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let e = load_model("definitely/not/here.txt").unwrap_err();
        assert!(matches!(e, ModelError::Io { .. }));
    }
}
