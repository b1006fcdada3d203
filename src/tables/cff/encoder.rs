//! Type 2 charstring encoding of glyph outlines.

use crate::BBox;
use crate::metrics::round_half_up;
use crate::outline::{PathCommand, Point};

mod operator {
    pub const RLINETO: u8 = 5;
    pub const RRCURVETO: u8 = 8;
    pub const ENDCHAR: u8 = 14;
    pub const RMOVETO: u8 = 21;
    pub const SHORT_INT: u8 = 28;
}

/// An encoded glyph.
#[derive(Clone, PartialEq, Debug)]
pub struct EncodedGlyph {
    /// A width-prefixed Type 2 charstring.
    pub charstring: Vec<u8>,

    /// Bounds of all visited points, control points included.
    ///
    /// `None` when the outline has no points.
    pub bbox: Option<BBox>,
}

/// Converts a quadratic segment into a cubic one.
///
/// Returns both control points and the unchanged end point.
#[inline]
pub fn quad_to_cubic(p0: Point, ctrl: Point, p1: Point) -> (Point, Point, Point) {
    const K: f64 = 2.0 / 3.0;
    let c1 = Point::new(p0.x + K * (ctrl.x - p0.x), p0.y + K * (ctrl.y - p0.y));
    let c2 = Point::new(p1.x + K * (ctrl.x - p1.x), p1.y + K * (ctrl.y - p1.y));
    (c1, c2, p1)
}

/// Encodes an outline into a Type 2 charstring.
///
/// `width` is written as is, so the Private DICT must use a `nominalWidthX` of 0.
///
/// Returns `None` when a coordinate delta doesn't fit into a charstring integer.
pub fn encode_outline(outline: &[PathCommand], width: i32) -> Option<EncodedGlyph> {
    let mut enc = Encoder {
        data: Vec::with_capacity(outline.len() * 8 + 4),
        bbox: BBox::new(),
        current: None,
        start: (0, 0),
        start_exact: Point::default(),
        closed: false,
    };

    enc.push_int(width)?;

    for cmd in outline {
        match *cmd {
            PathCommand::MoveTo(p) => {
                enc.move_to(p)?;
            }
            PathCommand::LineTo(p) => {
                if enc.begin_segment(cmd)? {
                    enc.line_to(p)?;
                }
            }
            PathCommand::CubicCurveTo(c1, c2, p) => {
                if enc.begin_segment(cmd)? {
                    enc.curve_to(c1, c2, p)?;
                }
            }
            PathCommand::QuadraticCurveTo(ctrl, p) => {
                if enc.begin_segment(cmd)? {
                    let p0 = enc.current_exact();
                    let (c1, c2, p) = quad_to_cubic(p0, ctrl, p);
                    // Bounds use the original control point.
                    enc.bbox.extend_by(ctrl.x, ctrl.y);
                    enc.curve_to_unbounded(c1, c2, p)?;
                }
            }
            PathCommand::ClosePath => {
                if enc.current.is_some() {
                    // Type 2 subpaths are closed implicitly.
                    enc.current = Some((enc.start, enc.start_exact));
                    enc.closed = true;
                }
            }
        }
    }

    enc.data.push(operator::ENDCHAR);

    let bbox = if enc.bbox.is_default() { None } else { Some(enc.bbox) };
    Some(EncodedGlyph {
        charstring: enc.data,
        bbox,
    })
}

struct Encoder {
    data: Vec<u8>,
    bbox: BBox,
    // Rounded and exact current point.
    current: Option<((i32, i32), Point)>,
    start: (i32, i32),
    start_exact: Point,
    // Set after ClosePath, until the next drawing command.
    closed: bool,
}

impl Encoder {
    fn current_exact(&self) -> Point {
        self.current.map(|(_, p)| p).unwrap_or_default()
    }

    fn move_to(&mut self, p: Point) -> Option<()> {
        let (x0, y0) = self.current.map(|(p, _)| p).unwrap_or((0, 0));
        let (x, y) = round_point(p)?;
        self.push_int(x - x0)?;
        self.push_int(y - y0)?;
        self.data.push(operator::RMOVETO);
        self.bbox.extend_by(p.x, p.y);
        self.current = Some(((x, y), p));
        self.start = (x, y);
        self.start_exact = p;
        self.closed = false;
        Some(())
    }

    // Returns `false` when the segment should be skipped.
    fn begin_segment(&mut self, cmd: &PathCommand) -> Option<bool> {
        let (_, p) = match self.current {
            Some(v) => v,
            None => {
                warn!("{:?} without a current point. Skipped.", cmd);
                return Some(false);
            }
        };

        if self.closed {
            // Drawing after a ClosePath starts a new subpath at the previous start.
            self.move_to(p)?;
        }

        Some(true)
    }

    fn line_to(&mut self, p: Point) -> Option<()> {
        let (x0, y0) = self.current.map(|(p, _)| p)?;
        let (x, y) = round_point(p)?;
        self.push_int(x - x0)?;
        self.push_int(y - y0)?;
        self.data.push(operator::RLINETO);
        self.bbox.extend_by(p.x, p.y);
        self.current = Some(((x, y), p));
        Some(())
    }

    fn curve_to(&mut self, c1: Point, c2: Point, p: Point) -> Option<()> {
        self.bbox.extend_by(c1.x, c1.y);
        self.bbox.extend_by(c2.x, c2.y);
        self.curve_to_unbounded(c1, c2, p)
    }

    fn curve_to_unbounded(&mut self, c1: Point, c2: Point, p: Point) -> Option<()> {
        let (x0, y0) = self.current.map(|(p, _)| p)?;
        let (x1, y1) = round_point(c1)?;
        let (x2, y2) = round_point(c2)?;
        let (x, y) = round_point(p)?;
        self.push_int(x1 - x0)?;
        self.push_int(y1 - y0)?;
        self.push_int(x2 - x1)?;
        self.push_int(y2 - y1)?;
        self.push_int(x - x2)?;
        self.push_int(y - y2)?;
        self.data.push(operator::RRCURVETO);
        self.bbox.extend_by(p.x, p.y);
        self.current = Some(((x, y), p));
        Some(())
    }

    fn push_int(&mut self, n: i32) -> Option<()> {
        write_int(n, &mut self.data)
    }
}

fn round_point(p: Point) -> Option<(i32, i32)> {
    if !p.is_finite() {
        return None;
    }

    let x = round_half_up(p.x);
    let y = round_half_up(p.y);
    if x.abs() > f64::from(i16::MAX) || y.abs() > f64::from(i16::MAX) {
        return None;
    }

    Some((x as i32, y as i32))
}

/// Writes a charstring integer operand.
///
/// Adobe Technical Note #5177, Table 1 Type 2 Charstring Encoding Values
fn write_int(n: i32, data: &mut Vec<u8>) -> Option<()> {
    match n {
        -107..=107 => data.push((n + 139) as u8),
        108..=1131 => {
            let n = n - 108;
            data.push(((n >> 8) + 247) as u8);
            data.push((n & 0xFF) as u8);
        }
        -1131..=-108 => {
            let n = -n - 108;
            data.push(((n >> 8) + 251) as u8);
            data.push((n & 0xFF) as u8);
        }
        -32768..=32767 => {
            data.push(operator::SHORT_INT);
            data.extend_from_slice(&(n as i16).to_be_bytes());
        }
        _ => return None,
    }

    Some(())
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::{self, TtfType::*};
    use crate::tables::cff::charstring::{CharStringContext, parse_char_string};
    use crate::tables::cff::charset::Charset;
    use crate::tables::cff::index::DataIndex;
    use crate::OutlineBuilder;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    fn square() -> Vec<PathCommand> {
        vec![
            PathCommand::MoveTo(p(0.0, 0.0)),
            PathCommand::LineTo(p(10.0, 0.0)),
            PathCommand::LineTo(p(10.0, 10.0)),
            PathCommand::LineTo(p(0.0, 10.0)),
            PathCommand::ClosePath,
        ]
    }

    struct Builder(String);
    impl OutlineBuilder for Builder {
        fn move_to(&mut self, x: f32, y: f32) {
            self.0.push_str(&format!("M {} {} ", x, y));
        }

        fn line_to(&mut self, x: f32, y: f32) {
            self.0.push_str(&format!("L {} {} ", x, y));
        }

        fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
            self.0.push_str(&format!("C {} {} {} {} {} {} ", x1, y1, x2, y2, x, y));
        }

        fn close(&mut self) {
            self.0.push_str("Z ");
        }
    }

    fn decode(data: &[u8]) -> (String, Option<f32>) {
        let ctx = CharStringContext {
            global_subrs: DataIndex::default(),
            local_subrs: None,
            char_strings: DataIndex::default(),
            charset: Charset::ISOAdobe,
        };

        let mut builder = Builder(String::new());
        let info = parse_char_string(&ctx, data, &mut builder).unwrap();
        (builder.0, info.width)
    }

    #[test]
    fn square_bytes() {
        let glyph = encode_outline(&square(), 500).unwrap();
        assert_eq!(glyph.charstring, writer::convert(&[
            CFFInt(500), // width
            CFFInt(0), CFFInt(0), UInt8(21), // rmoveto
            CFFInt(10), CFFInt(0), UInt8(5), // rlineto
            CFFInt(0), CFFInt(10), UInt8(5), // rlineto
            CFFInt(-10), CFFInt(0), UInt8(5), // rlineto
            UInt8(14), // endchar
        ]));

        let bbox = glyph.bbox.unwrap();
        assert_eq!((bbox.x_min, bbox.y_min, bbox.x_max, bbox.y_max), (0.0, 0.0, 10.0, 10.0));
    }

    #[test]
    fn square_is_readable() {
        let glyph = encode_outline(&square(), 500).unwrap();
        let (path, width) = decode(&glyph.charstring);
        assert_eq!(path, "M 0 0 L 10 0 L 10 10 L 0 10 Z ");
        assert_eq!(width, Some(500.0));
    }

    #[test]
    fn empty_outline() {
        let glyph = encode_outline(&[], 250).unwrap();
        assert_eq!(glyph.charstring, writer::convert(&[CFFInt(250), UInt8(14)]));
        assert_eq!(glyph.bbox, None);
    }

    #[test]
    fn quadratic_uplift() {
        let (c1, c2, end) = quad_to_cubic(p(0.0, 0.0), p(5.0, 10.0), p(10.0, 0.0));
        assert!((c1.x - 10.0 / 3.0).abs() < 1e-9);
        assert!((c1.y - 20.0 / 3.0).abs() < 1e-9);
        assert!((c2.x - 20.0 / 3.0).abs() < 1e-9);
        assert!((c2.y - 20.0 / 3.0).abs() < 1e-9);
        assert_eq!(end, p(10.0, 0.0));
    }

    #[test]
    fn quadratic_segment() {
        let glyph = encode_outline(&[
            PathCommand::MoveTo(p(0.0, 0.0)),
            PathCommand::QuadraticCurveTo(p(5.0, 10.0), p(10.0, 0.0)),
        ], 100).unwrap();

        let (path, _) = decode(&glyph.charstring);
        assert_eq!(path, "M 0 0 C 3 7 7 7 10 0 Z ");

        // Start, control and end points.
        let bbox = glyph.bbox.unwrap();
        assert_eq!((bbox.x_min, bbox.y_min, bbox.x_max, bbox.y_max), (0.0, 0.0, 10.0, 10.0));
    }

    #[test]
    fn no_drift() {
        let glyph = encode_outline(&[
            PathCommand::MoveTo(p(0.4, 0.0)),
            PathCommand::LineTo(p(0.8, 0.0)),
            PathCommand::LineTo(p(1.2, 0.0)),
            PathCommand::LineTo(p(1.6, 0.0)),
        ], 100).unwrap();

        let (path, _) = decode(&glyph.charstring);
        assert_eq!(path, "M 0 0 L 1 0 L 1 0 L 2 0 Z ");
    }

    #[test]
    fn drawing_without_current_point() {
        let glyph = encode_outline(&[
            PathCommand::LineTo(p(10.0, 0.0)),
            PathCommand::ClosePath,
        ], 100).unwrap();

        assert_eq!(glyph.charstring, writer::convert(&[CFFInt(100), UInt8(14)]));
        assert_eq!(glyph.bbox, None);
    }

    #[test]
    fn drawing_after_close() {
        let glyph = encode_outline(&[
            PathCommand::MoveTo(p(10.0, 10.0)),
            PathCommand::LineTo(p(20.0, 10.0)),
            PathCommand::ClosePath,
            PathCommand::LineTo(p(10.0, 20.0)),
        ], 100).unwrap();

        let (path, _) = decode(&glyph.charstring);
        assert_eq!(path, "M 10 10 L 20 10 Z M 10 10 L 10 20 Z ");
    }

    #[test]
    fn subpaths() {
        let glyph = encode_outline(&[
            PathCommand::MoveTo(p(0.0, 0.0)),
            PathCommand::LineTo(p(10.0, 0.0)),
            PathCommand::MoveTo(p(100.0, 100.0)),
            PathCommand::CubicCurveTo(p(110.0, 100.0), p(120.0, 110.0), p(120.0, 120.0)),
        ], 600).unwrap();

        let (path, width) = decode(&glyph.charstring);
        assert_eq!(path, "M 0 0 L 10 0 Z M 100 100 C 110 100 120 110 120 120 Z ");
        assert_eq!(width, Some(600.0));
    }

    #[test]
    fn coordinates_out_of_range() {
        assert!(encode_outline(&[PathCommand::MoveTo(p(40000.0, 0.0))], 100).is_none());
        assert!(encode_outline(&[PathCommand::MoveTo(p(core::f64::NAN, 0.0))], 100).is_none());

        // The delta itself doesn't fit.
        assert!(encode_outline(&[
            PathCommand::MoveTo(p(-30000.0, 0.0)),
            PathCommand::LineTo(p(30000.0, 0.0)),
        ], 100).is_none());
    }

    #[test]
    fn large_operands() {
        let mut data = Vec::new();
        write_int(-2000, &mut data).unwrap();
        assert_eq!(data, [28, 0xF8, 0x30]);
        assert!(write_int(40000, &mut Vec::new()).is_none());
    }
}
