//! Glyph outlines and the Type3 glyph JSON they are read from.

use core::convert::TryFrom;

use serde_json::{Map, Value};

use crate::Error;

/// A point in font design units.
#[derive(Clone, Copy, PartialEq, Default, Debug)]
#[allow(missing_docs)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    #[inline]
    pub(crate) fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl core::ops::Add for Point {
    type Output = Point;

    #[inline]
    fn add(self, other: Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }
}

impl core::ops::Sub for Point {
    type Output = Point;

    #[inline]
    fn sub(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }
}

impl core::ops::Mul<f64> for Point {
    type Output = Point;

    #[inline]
    fn mul(self, k: f64) -> Point {
        Point::new(self.x * k, self.y * k)
    }
}


/// A single path segment.
#[derive(Clone, Copy, PartialEq, Debug)]
#[allow(missing_docs)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    /// First control point, second control point, end point.
    CubicCurveTo(Point, Point, Point),
    /// Control point, end point.
    QuadraticCurveTo(Point, Point),
    ClosePath,
}


/// A glyph as described by the input.
#[derive(Clone, PartialEq, Debug)]
pub struct GlyphSource {
    /// Never empty.
    pub name: String,

    /// The declared advance width.
    ///
    /// `None` means that the font-wide default should be used.
    pub width: Option<f64>,

    /// An explicit Unicode code point. Always positive.
    pub unicode: Option<u32>,

    /// The PDF character code, in a 0..=0x10FFFF range.
    pub char_code: Option<u32>,

    pub outline: Vec<PathCommand>,
}


/// The raw `FontMatrix` entries: `(a, b, c, d, e, f)`.
pub type Matrix = (f64, f64, f64, f64, f64, f64);

/// The identity matrix.
pub const IDENTITY_MATRIX: Matrix = (1.0, 0.0, 0.0, 1.0, 0.0, 0.0);

// Highest valid character code.
const MAX_CHAR_CODE: u64 = 0x10FFFF;


/// A decoded glyph JSON document.
#[derive(Clone, Debug)]
pub struct GlyphDocument {
    /// Informational only. Outlines are already in glyph space.
    pub font_matrix: Matrix,
    pub glyphs: Vec<GlyphSource>,
    /// Number of path commands that were dropped.
    pub dropped_commands: usize,
}

/// Parses a Type3 glyph JSON document.
///
/// Fails only when the data is not JSON or the top level is not an object.
/// Everything else degrades: unusable glyph records are skipped,
/// malformed commands are dropped and counted.
pub fn parse_glyph_json(data: &[u8]) -> Result<GlyphDocument, Error> {
    let root: Value = serde_json::from_slice(data)
        .map_err(|e| Error::Input(format!("invalid glyph JSON: {}", e)))?;

    let root = root.as_object()
        .ok_or_else(|| Error::Input(String::from("glyph JSON must be an object")))?;

    let font_matrix = parse_font_matrix(root.get("fontMatrix"));
    log::debug!("FontMatrix: {:?}", font_matrix);

    let mut glyphs = Vec::new();
    let mut dropped_commands = 0;
    let records = root.get("glyphs").and_then(Value::as_array).map(Vec::as_slice).unwrap_or(&[]);
    for (index, record) in records.iter().enumerate() {
        let record = match record.as_object() {
            Some(v) => v,
            None => {
                warn!("Glyph record {} is not an object. Skipped.", index + 1);
                continue;
            }
        };

        // Default names use a 1-based position.
        let glyph = parse_glyph(record, index + 1, &mut dropped_commands);
        glyphs.push(glyph);
    }

    Ok(GlyphDocument {
        font_matrix,
        glyphs,
        dropped_commands,
    })
}

fn parse_glyph(record: &Map<String, Value>, position: usize, dropped: &mut usize) -> GlyphSource {
    let name = match record.get("name").and_then(Value::as_str) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => format!("g{}", position),
    };

    let width = record.get("advanceWidth").and_then(Value::as_f64).filter(|w| !w.is_nan());

    let unicode = record.get("unicode")
        .and_then(Value::as_u64)
        .filter(|c| *c > 0)
        .and_then(|c| u32::try_from(c).ok());

    // The first integer wins, even when it's out of range.
    let char_code = ["charCode", "code", "charCodeRaw"].iter()
        .filter_map(|key| record.get(*key))
        .find(|v| v.is_i64() || v.is_u64())
        .and_then(Value::as_u64)
        .filter(|c| *c <= MAX_CHAR_CODE)
        .map(|c| c as u32);

    let mut outline = Vec::new();
    if let Some(commands) = record.get("outline").and_then(Value::as_array) {
        for command in commands {
            match parse_command(command) {
                Some(cmd) => outline.push(cmd),
                None => {
                    warn!("Glyph '{}' has an unsupported path command: {}. Skipped.", name, command);
                    *dropped += 1;
                }
            }
        }
    }

    GlyphSource {
        name,
        width,
        unicode,
        char_code,
        outline,
    }
}

fn parse_command(command: &Value) -> Option<PathCommand> {
    let command = command.as_object()?;
    let point = |x: &str, y: &str| -> Option<Point> {
        let x = command.get(x)?.as_f64()?;
        let y = command.get(y)?.as_f64()?;
        Some(Point::new(x, y))
    };

    match command.get("cmd")?.as_str()? {
        "M" => Some(PathCommand::MoveTo(point("x", "y")?)),
        "L" => Some(PathCommand::LineTo(point("x", "y")?)),
        "C" => Some(PathCommand::CubicCurveTo(
            point("x1", "y1")?,
            point("x2", "y2")?,
            point("x", "y")?,
        )),
        "Q" => Some(PathCommand::QuadraticCurveTo(point("x1", "y1")?, point("x", "y")?)),
        "Z" => Some(PathCommand::ClosePath),
        _ => None,
    }
}

/// Extracts `(a, b, c, d, e, f)` from a 3x3 matrix stored row by row.
///
/// Anything malformed results in the identity matrix.
pub fn parse_font_matrix(rows: Option<&Value>) -> Matrix {
    let rows = match rows.and_then(Value::as_array) {
        Some(rows) if !rows.is_empty() => rows,
        _ => return IDENTITY_MATRIX,
    };

    let mut values: Vec<Vec<f64>> = Vec::with_capacity(rows.len());
    for row in rows {
        let row = match row.as_array() {
            Some(v) => v,
            None => return IDENTITY_MATRIX,
        };

        let mut numbers = Vec::with_capacity(row.len());
        for n in row {
            match n.as_f64() {
                Some(n) => numbers.push(n),
                None => return IDENTITY_MATRIX,
            }
        }

        values.push(numbers);
    }

    if values.len() < 3 || values.iter().take(3).any(|row| row.len() < 2) {
        return IDENTITY_MATRIX;
    }

    (values[0][0], values[0][1], values[1][0], values[1][1], values[2][0], values[2][1])
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> GlyphDocument {
        parse_glyph_json(value.to_string().as_bytes()).unwrap()
    }

    #[test]
    fn not_json() {
        let err = parse_glyph_json(b"{glyphs").unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn not_an_object() {
        let err = parse_glyph_json(b"[1, 2]").unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn no_glyphs() {
        let doc = parse(json!({}));
        assert!(doc.glyphs.is_empty());
        assert_eq!(doc.font_matrix, IDENTITY_MATRIX);
    }

    #[test]
    fn default_names() {
        let doc = parse(json!({
            "glyphs": [
                { "name": "" },
                "garbage",
                { "name": "A" },
                {},
            ]
        }));

        let names: Vec<_> = doc.glyphs.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, ["g1", "A", "g4"]);
    }

    #[test]
    fn glyph_fields() {
        let doc = parse(json!({
            "glyphs": [{
                "name": "A",
                "advanceWidth": 612.5,
                "unicode": 65,
                "code": 0x41,
                "charCode": "x",
            }]
        }));

        let glyph = &doc.glyphs[0];
        assert_eq!(glyph.width, Some(612.5));
        assert_eq!(glyph.unicode, Some(65));
        assert_eq!(glyph.char_code, Some(0x41));
    }

    #[test]
    fn invalid_fields() {
        let doc = parse(json!({
            "glyphs": [{
                "advanceWidth": "wide",
                "unicode": 0,
                "charCode": 0x110000,
                "code": 5,
            }]
        }));

        let glyph = &doc.glyphs[0];
        assert_eq!(glyph.width, None);
        assert_eq!(glyph.unicode, None);
        // `charCode` is an integer, so `code` is never looked at.
        assert_eq!(glyph.char_code, None);
    }

    #[test]
    fn commands() {
        let doc = parse(json!({
            "glyphs": [{
                "outline": [
                    { "cmd": "M", "x": 0, "y": 0 },
                    { "cmd": "L", "x": 10.5, "y": 0 },
                    { "cmd": "C", "x1": 1, "y1": 2, "x2": 3, "y2": 4, "x": 5, "y": 6 },
                    { "cmd": "Q", "x1": 5, "y1": 10, "x": 10, "y": 0 },
                    { "cmd": "Z" },
                ]
            }]
        }));

        assert_eq!(doc.dropped_commands, 0);
        assert_eq!(doc.glyphs[0].outline, vec![
            PathCommand::MoveTo(Point::new(0.0, 0.0)),
            PathCommand::LineTo(Point::new(10.5, 0.0)),
            PathCommand::CubicCurveTo(Point::new(1.0, 2.0), Point::new(3.0, 4.0), Point::new(5.0, 6.0)),
            PathCommand::QuadraticCurveTo(Point::new(5.0, 10.0), Point::new(10.0, 0.0)),
            PathCommand::ClosePath,
        ]);
    }

    #[test]
    fn malformed_commands() {
        let doc = parse(json!({
            "glyphs": [{
                "outline": [
                    { "cmd": "M", "x": 0, "y": 0 },
                    { "cmd": "A", "x": 1, "y": 1 },
                    { "cmd": "L", "x": 1 },
                    { "cmd": "L", "x": "1", "y": 1 },
                    { "x": 1, "y": 1 },
                    42,
                    { "cmd": "Z" },
                ]
            }]
        }));

        assert_eq!(doc.dropped_commands, 5);
        assert_eq!(doc.glyphs[0].outline.len(), 2);
    }

    #[test]
    fn font_matrix() {
        let m = parse_font_matrix(Some(&json!([[0.001, 0, 0], [0, 0.001, 0], [0, 0, 1]])));
        assert_eq!(m, (0.001, 0.0, 0.0, 0.001, 0.0, 0.0));
    }

    #[test]
    fn malformed_font_matrix() {
        assert_eq!(parse_font_matrix(Some(&json!([[1, 0], [0, 1]]))), IDENTITY_MATRIX);
        assert_eq!(parse_font_matrix(Some(&json!([[1, "a"], [0, 1], [0, 0]]))), IDENTITY_MATRIX);
        assert_eq!(parse_font_matrix(Some(&json!([[1], [0, 1], [0, 0]]))), IDENTITY_MATRIX);
        assert_eq!(parse_font_matrix(Some(&json!("matrix"))), IDENTITY_MATRIX);
        assert_eq!(parse_font_matrix(None), IDENTITY_MATRIX);
    }
}
