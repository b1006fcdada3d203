//! Font-wide and per-glyph horizontal metrics.

use core::convert::TryFrom;

use crate::{BBox, Rect};

/// Rounds half-way values toward positive infinity.
///
/// `-0.5` is rounded to `0`, unlike `f64::round`.
#[inline]
pub fn round_half_up(v: f64) -> f64 {
    (v + 0.5).floor()
}

/// Rounds a bounding box into integer font units.
pub fn round_bbox(bbox: &BBox) -> Option<Rect> {
    if bbox.is_default() {
        return None;
    }

    let conv = |n: f64| -> Option<i16> {
        let n = round_half_up(n);
        if n.is_finite() && n >= f64::from(i16::MIN) && n <= f64::from(i16::MAX) {
            Some(n as i16)
        } else {
            None
        }
    };

    Some(Rect {
        x_min: conv(bbox.x_min)?,
        y_min: conv(bbox.y_min)?,
        x_max: conv(bbox.x_max)?,
        y_max: conv(bbox.y_max)?,
    })
}

/// Returns the width used for glyphs without a valid declared width.
#[inline]
pub fn default_width(units_per_em: u16) -> u16 {
    (units_per_em / 2).max(1)
}

/// Resolves a declared advance width.
///
/// A width must be finite and positive after rounding,
/// otherwise `default` is used. Widths are limited to what
/// a charstring can encode.
pub fn resolve_width(declared: Option<f64>, default: u16) -> u16 {
    let width = match declared {
        Some(w) if w.is_finite() && w > 0.0 => round_half_up(w),
        _ => return default,
    };

    if width >= 1.0 && width <= f64::from(i16::MAX) {
        width as u16
    } else {
        default
    }
}


/// Font-wide vertical metrics.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct FontMetrics {
    /// Always positive.
    pub ascent: i16,
    /// Always negative.
    pub descent: i16,
    pub units_per_em: u16,
    pub default_width: u16,
}

impl FontMetrics {
    /// Derives metrics from glyph bounds.
    ///
    /// Without any bounds, ascent and descent are 80% and -20% of the em.
    pub fn from_bounds<'a, I>(units_per_em: u16, bounds: I) -> Self
        where I: IntoIterator<Item = &'a Rect>
    {
        let upem = f64::from(units_per_em);
        let default_ascent = clamp_i16(round_half_up(upem * 0.8)).max(1);
        let default_descent = (-clamp_i16(round_half_up(upem * 0.2))).min(-1);

        let mut y_max: Option<i16> = None;
        let mut y_min: Option<i16> = None;
        for rect in bounds {
            y_max = Some(y_max.map_or(rect.y_max, |v| v.max(rect.y_max)));
            y_min = Some(y_min.map_or(rect.y_min, |v| v.min(rect.y_min)));
        }

        let ascent = match y_max {
            Some(v) if v > 0 => v,
            _ => default_ascent,
        };

        let descent = match y_min {
            Some(v) if v < 0 => v,
            _ => default_descent,
        };

        FontMetrics {
            ascent,
            descent,
            units_per_em,
            default_width: default_width(units_per_em),
        }
    }
}

fn clamp_i16(n: f64) -> i16 {
    n.max(f64::from(i16::MIN)).min(f64::from(i16::MAX)) as i16
}


/// A glyph's horizontal metrics.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct GlyphMetrics {
    pub advance: u16,
    /// `None` for glyphs without an outline.
    pub bbox: Option<Rect>,
}

impl GlyphMetrics {
    /// The left side bearing: the glyph's x-min, or 0 without an outline.
    #[inline]
    pub fn lsb(&self) -> i16 {
        self.bbox.map(|r| r.x_min).unwrap_or(0)
    }
}


/// Values of the `hhea` table that are derived from all glyphs.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub struct HorizontalExtents {
    pub advance_width_max: u16,
    pub min_left_side_bearing: i16,
    pub min_right_side_bearing: i16,
    pub x_max_extent: i16,
}

impl HorizontalExtents {
    /// Glyphs without an outline affect only `advance_width_max`.
    pub fn compute(glyphs: &[GlyphMetrics]) -> Self {
        let mut extents = HorizontalExtents::default();
        let mut has_bounds = false;
        for glyph in glyphs {
            extents.advance_width_max = extents.advance_width_max.max(glyph.advance);

            let rect = match glyph.bbox {
                Some(v) => v,
                None => continue,
            };

            let lsb = rect.x_min;
            let rsb = clamp_i32(i32::from(glyph.advance) - i32::from(rect.x_max));
            let extent = rect.x_max;
            if has_bounds {
                extents.min_left_side_bearing = extents.min_left_side_bearing.min(lsb);
                extents.min_right_side_bearing = extents.min_right_side_bearing.min(rsb);
                extents.x_max_extent = extents.x_max_extent.max(extent);
            } else {
                extents.min_left_side_bearing = lsb;
                extents.min_right_side_bearing = rsb;
                extents.x_max_extent = extent;
                has_bounds = true;
            }
        }

        extents
    }
}

fn clamp_i32(n: i32) -> i16 {
    i16::try_from(n.max(i32::from(i16::MIN)).min(i32::from(i16::MAX))).unwrap_or(0)
}

/// Returns the union of all bounds, or `None` if there are none.
pub fn union_bounds<'a, I>(bounds: I) -> Option<Rect>
    where I: IntoIterator<Item = &'a Rect>
{
    bounds.into_iter().fold(None, |acc: Option<Rect>, r| {
        Some(match acc {
            Some(acc) => acc.union(r),
            None => *r,
        })
    })
}

/// Returns the rounded average of all non-zero advances.
pub fn average_width(glyphs: &[GlyphMetrics]) -> i16 {
    let (sum, count) = glyphs.iter()
        .filter(|g| g.advance != 0)
        .fold((0u64, 0u64), |(sum, count), g| (sum + u64::from(g.advance), count + 1));

    if count == 0 {
        return 0;
    }

    clamp_i16(round_half_up(sum as f64 / count as f64))
}
