//! Quadratic TrueType outlines.

use crate::Rect;
use crate::cu2qu;
use crate::metrics::round_half_up;
use crate::outline::{PathCommand, Point};

/// A point of a TrueType contour.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[allow(missing_docs)]
pub struct GlyphPoint {
    pub x: i16,
    pub y: i16,
    pub on_curve: bool,
}

/// A simple TrueType glyph.
#[derive(Clone, PartialEq, Eq, Default, Debug)]
pub struct Glyph {
    /// Closed contours. Consecutive off-curve points have an implied on-curve point between them.
    pub contours: Vec<Vec<GlyphPoint>>,
}

impl Glyph {
    /// A glyph with a single contour of a single on-curve point at the origin.
    ///
    /// Used in place of an outline that can't be converted.
    pub fn placeholder() -> Self {
        Glyph {
            contours: vec![vec![GlyphPoint { x: 0, y: 0, on_curve: true }]],
        }
    }

    /// Checks that the glyph has no contours.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.contours.is_empty()
    }

    /// Returns the total number of points.
    pub fn number_of_points(&self) -> usize {
        self.contours.iter().map(Vec::len).sum()
    }

    /// Returns the bounding box of all points, off-curve points included.
    pub fn bbox(&self) -> Option<Rect> {
        let mut iter = self.contours.iter().flatten();
        let first = iter.next()?;
        let mut rect = Rect { x_min: first.x, y_min: first.y, x_max: first.x, y_max: first.y };
        for p in iter {
            rect.x_min = rect.x_min.min(p.x);
            rect.y_min = rect.y_min.min(p.y);
            rect.x_max = rect.x_max.max(p.x);
            rect.y_max = rect.y_max.max(p.y);
        }

        Some(rect)
    }
}


/// Converts an outline into a TrueType glyph.
///
/// Cubic segments are approximated with quadratic splines within `max_err`.
///
/// Returns `None` when a segment can't be converted or a coordinate
/// doesn't fit into `i16`.
pub fn build_glyph(outline: &[PathCommand], max_err: f64) -> Option<Glyph> {
    let mut b = ContourBuilder::default();

    for cmd in outline {
        match *cmd {
            PathCommand::MoveTo(p) => {
                b.close_contour()?;
                b.move_to(p);
            }
            PathCommand::LineTo(p) => {
                if b.begin_segment(cmd)? {
                    b.push(p, true);
                }
            }
            PathCommand::CubicCurveTo(c1, c2, p) => {
                if b.begin_segment(cmd)? {
                    let p0 = b.current;
                    let spline = cu2qu::curve_to_quadratic([p0, c1, c2, p], max_err)?;
                    // Skip the start point, it's already in the contour.
                    let off_curve = &spline[1..spline.len() - 1];
                    for q in off_curve {
                        b.push(*q, false);
                    }

                    b.push(p, true);
                }
            }
            PathCommand::QuadraticCurveTo(ctrl, p) => {
                if b.begin_segment(cmd)? {
                    b.push(ctrl, false);
                    b.push(p, true);
                }
            }
            PathCommand::ClosePath => {
                if b.open {
                    b.close_contour()?;
                    b.closed = true;
                }
            }
        }
    }

    b.close_contour()?;
    Some(Glyph { contours: b.contours })
}

#[derive(Default)]
struct ContourBuilder {
    contours: Vec<Vec<GlyphPoint>>,
    points: Vec<(Point, bool)>,
    current: Point,
    start: Point,
    // A contour is in progress.
    open: bool,
    // The previous contour was closed explicitly. Drawing restarts at its start.
    closed: bool,
}

impl ContourBuilder {
    fn move_to(&mut self, p: Point) {
        self.points.push((p, true));
        self.current = p;
        self.start = p;
        self.open = true;
        self.closed = false;
    }

    // Returns `false` when the segment should be skipped.
    fn begin_segment(&mut self, cmd: &PathCommand) -> Option<bool> {
        if self.open {
            return Some(true);
        }

        if self.closed {
            let start = self.start;
            self.move_to(start);
            return Some(true);
        }

        warn!("{:?} without a current point. Skipped.", cmd);
        Some(false)
    }

    fn push(&mut self, p: Point, on_curve: bool) {
        self.points.push((p, on_curve));
        if on_curve {
            self.current = p;
        }
    }

    fn close_contour(&mut self) -> Option<()> {
        self.open = false;
        let points = core::mem::take(&mut self.points);

        // A lone move point.
        if points.len() < 2 {
            return Some(());
        }

        let mut contour = Vec::with_capacity(points.len());
        for (p, on_curve) in points {
            let (x, y) = to_i16_point(p)?;
            contour.push(GlyphPoint { x, y, on_curve });
        }

        // The closing point duplicates the start.
        if let (Some(first), Some(last)) = (contour.first(), contour.last()) {
            if contour.len() > 1 && first == last {
                contour.pop();
            }
        }

        self.contours.push(contour);
        Some(())
    }
}

fn to_i16_point(p: Point) -> Option<(i16, i16)> {
    if !p.is_finite() {
        return None;
    }

    let x = round_half_up(p.x);
    let y = round_half_up(p.y);
    let range = f64::from(i16::MIN)..=f64::from(i16::MAX);
    if range.contains(&x) && range.contains(&y) {
        Some((x as i16, y as i16))
    } else {
        None
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    fn on(x: i16, y: i16) -> GlyphPoint {
        GlyphPoint { x, y, on_curve: true }
    }

    fn off(x: i16, y: i16) -> GlyphPoint {
        GlyphPoint { x, y, on_curve: false }
    }

    #[test]
    fn square() {
        let glyph = build_glyph(&[
            PathCommand::MoveTo(p(0.0, 0.0)),
            PathCommand::LineTo(p(10.0, 0.0)),
            PathCommand::LineTo(p(10.0, 10.0)),
            PathCommand::LineTo(p(0.0, 10.0)),
            PathCommand::ClosePath,
        ], 1.0).unwrap();

        assert_eq!(glyph.contours, vec![vec![on(0, 0), on(10, 0), on(10, 10), on(0, 10)]]);
        assert_eq!(glyph.bbox(), Some(Rect { x_min: 0, y_min: 0, x_max: 10, y_max: 10 }));
    }

    #[test]
    fn closing_point_is_dropped() {
        let glyph = build_glyph(&[
            PathCommand::MoveTo(p(0.0, 0.0)),
            PathCommand::LineTo(p(10.0, 0.0)),
            PathCommand::LineTo(p(0.0, 10.0)),
            PathCommand::LineTo(p(0.0, 0.0)),
            PathCommand::ClosePath,
        ], 1.0).unwrap();

        assert_eq!(glyph.contours, vec![vec![on(0, 0), on(10, 0), on(0, 10)]]);
    }

    #[test]
    fn quadratic_passes_through() {
        let glyph = build_glyph(&[
            PathCommand::MoveTo(p(0.0, 0.0)),
            PathCommand::QuadraticCurveTo(p(5.0, 10.0), p(10.0, 0.0)),
            PathCommand::ClosePath,
        ], 1.0).unwrap();

        assert_eq!(glyph.contours, vec![vec![on(0, 0), off(5, 10), on(10, 0)]]);
    }

    #[test]
    fn cubic_is_converted() {
        let glyph = build_glyph(&[
            PathCommand::MoveTo(p(0.0, 0.0)),
            PathCommand::CubicCurveTo(p(0.0, 100.0), p(100.0, 100.0), p(100.0, 0.0)),
            PathCommand::ClosePath,
        ], 1.0).unwrap();

        let contour = &glyph.contours[0];
        assert_eq!(contour[0], on(0, 0));
        assert_eq!(*contour.last().unwrap(), on(100, 0));
        assert!(contour[1..contour.len() - 1].iter().all(|p| !p.on_curve));
        assert!(contour.len() > 3);
    }

    #[test]
    fn open_contours_are_closed() {
        let glyph = build_glyph(&[
            PathCommand::MoveTo(p(0.0, 0.0)),
            PathCommand::LineTo(p(10.0, 0.0)),
            PathCommand::MoveTo(p(20.0, 0.0)),
            PathCommand::LineTo(p(30.0, 0.0)),
        ], 1.0).unwrap();

        assert_eq!(glyph.contours, vec![
            vec![on(0, 0), on(10, 0)],
            vec![on(20, 0), on(30, 0)],
        ]);
    }

    #[test]
    fn lone_move_is_dropped() {
        let glyph = build_glyph(&[
            PathCommand::MoveTo(p(0.0, 0.0)),
            PathCommand::MoveTo(p(10.0, 10.0)),
            PathCommand::ClosePath,
        ], 1.0).unwrap();

        assert!(glyph.is_empty());
        assert_eq!(glyph.bbox(), None);
    }

    #[test]
    fn drawing_without_current_point() {
        let glyph = build_glyph(&[
            PathCommand::LineTo(p(10.0, 0.0)),
            PathCommand::ClosePath,
        ], 1.0).unwrap();

        assert!(glyph.is_empty());
    }

    #[test]
    fn drawing_after_close() {
        let glyph = build_glyph(&[
            PathCommand::MoveTo(p(10.0, 10.0)),
            PathCommand::LineTo(p(20.0, 10.0)),
            PathCommand::ClosePath,
            PathCommand::LineTo(p(10.0, 20.0)),
        ], 1.0).unwrap();

        assert_eq!(glyph.contours, vec![
            vec![on(10, 10), on(20, 10)],
            vec![on(10, 10), on(10, 20)],
        ]);
    }

    #[test]
    fn out_of_range() {
        assert!(build_glyph(&[
            PathCommand::MoveTo(p(0.0, 0.0)),
            PathCommand::LineTo(p(40000.0, 0.0)),
        ], 1.0).is_none());
    }

    #[test]
    fn placeholder() {
        let glyph = Glyph::placeholder();
        assert_eq!(glyph.number_of_points(), 1);
        assert_eq!(glyph.bbox(), Some(Rect { x_min: 0, y_min: 0, x_max: 0, y_max: 0 }));
    }
}
