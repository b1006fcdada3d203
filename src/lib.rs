/*!
Synthesizes OpenType fonts from the partial font data found inside PDFs.

Two entry points are provided:

- [`synthesize`] builds a CFF-flavored OpenType font (and, optionally, a TrueType one)
  from Type3 glyph outlines exported as JSON.
- [`wrap_cff`] wraps a bare CFF/Type1C program into an OpenType container,
  reconstructing metrics and the character map.

## Error handling

Binary decoding boils down to `Option::None` internally, like most font parsers do.
Only the entry points return a detailed [`Error`], which carries the pipeline
[`Stage`] it happened in.

Recoverable problems, like an unsupported path command or an unmatched
ToUnicode entry, are logged via the `log` crate and counted in a [`BuildReport`].
*/

#![forbid(unsafe_code)]
#![warn(missing_copy_implementations)]
#![warn(missing_debug_implementations)]

use core::convert::TryFrom;

macro_rules! warn {
    ($($arg:tt)+) => (
        log::log!(log::Level::Warn, $($arg)+);
    )
}

mod assemble;
mod cu2qu;
mod emit;
mod error;
mod parser;
mod sfnt;
mod writer;

pub mod glyph_order;
pub mod metrics;
pub mod outline;
pub mod synth;
pub mod tables;
pub mod truetype;
pub mod unicode;
pub mod wrap;

pub use emit::OutputGuard;
pub use error::{Error, Stage};
pub use outline::{GlyphSource, PathCommand, Point};
pub use synth::{synthesize, SynthOptions};
pub use wrap::{wrap_cff, WrapOptions};


/// A rectangle in font units.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[allow(missing_docs)]
pub struct Rect {
    pub x_min: i16,
    pub y_min: i16,
    pub x_max: i16,
    pub y_max: i16,
}

impl Rect {
    /// Returns a rectangle that contains both `self` and `other`.
    #[inline]
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            x_min: self.x_min.min(other.x_min),
            y_min: self.y_min.min(other.y_min),
            x_max: self.x_max.max(other.x_max),
            y_max: self.y_max.max(other.y_max),
        }
    }
}


/// A floating point bounding box that grows point by point.
#[derive(Clone, Copy, PartialEq, Debug)]
#[allow(missing_docs)]
pub struct BBox {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

impl Default for BBox {
    fn default() -> Self {
        BBox::new()
    }
}

impl BBox {
    /// Creates an empty box.
    #[inline]
    pub fn new() -> Self {
        BBox {
            x_min: core::f64::MAX,
            y_min: core::f64::MAX,
            x_max: core::f64::MIN,
            y_max: core::f64::MIN,
        }
    }

    /// Checks that no point was added yet.
    #[inline]
    pub fn is_default(&self) -> bool {
        self.x_min == core::f64::MAX &&
        self.y_min == core::f64::MAX &&
        self.x_max == core::f64::MIN &&
        self.y_max == core::f64::MIN
    }

    #[inline]
    pub fn extend_by(&mut self, x: f64, y: f64) {
        self.x_min = self.x_min.min(x);
        self.y_min = self.y_min.min(y);
        self.x_max = self.x_max.max(x);
        self.y_max = self.y_max.max(y);
    }

    /// Converts the box into an integer rectangle, truncating toward zero.
    ///
    /// Returns `None` for an empty box or when a value doesn't fit into `i16`.
    #[inline]
    pub fn to_rect(&self) -> Option<Rect> {
        if self.is_default() {
            return None;
        }

        Some(Rect {
            x_min: f64_to_i16(self.x_min)?,
            y_min: f64_to_i16(self.y_min)?,
            x_max: f64_to_i16(self.x_max)?,
            y_max: f64_to_i16(self.y_max)?,
        })
    }
}

#[inline]
fn f64_to_i16(n: f64) -> Option<i16> {
    if !n.is_finite() {
        return None;
    }

    i16::try_from(n.trunc() as i64).ok()
}


/// A trait for glyph outline construction.
pub trait OutlineBuilder {
    /// Appends a MoveTo segment.
    ///
    /// Start of a contour.
    fn move_to(&mut self, x: f32, y: f32);

    /// Appends a LineTo segment.
    fn line_to(&mut self, x: f32, y: f32);

    /// Appends a CurveTo segment.
    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32);

    /// Appends a ClosePath segment.
    ///
    /// End of a contour.
    fn close(&mut self);
}


/// Recoverable problems collected during a build.
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
pub struct BuildReport {
    /// Number of glyphs written to the font.
    pub glyphs: usize,

    /// Number of path commands dropped during ingestion.
    pub dropped_commands: usize,

    /// Number of glyphs whose TrueType outline was replaced by a placeholder.
    pub degraded_glyphs: usize,

    /// Number of glyphs whose charstring couldn't be interpreted.
    pub unreadable_glyphs: usize,

    /// Number of mapping entries that matched no glyph.
    pub unmatched_mappings: usize,

    /// Number of entries in the resulting character map.
    pub mapped_codepoints: usize,
}
