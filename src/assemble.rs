//! Tables shared by all output flavors.

use std::collections::BTreeMap;

use crate::Rect;
use crate::metrics::{self, GlyphMetrics, HorizontalExtents};
use crate::sfnt::Tag;
use crate::tables::{cmap, head, hhea, hmtx, maxp, name, os2, post};

/// Everything needed to write the tables outside of the outline data.
#[derive(Debug)]
pub struct FontTables<'a> {
    pub names: &'a name::Names,
    pub style: os2::Style,
    pub units_per_em: u16,
    pub ascender: i16,
    pub descender: i16,
    pub win_ascent: u16,
    pub win_descent: u16,
    pub x_height: i16,
    pub cap_height: i16,
    pub font_bbox: Rect,
    /// One entry per glyph, in glyph id order.
    pub glyphs: &'a [GlyphMetrics],
    pub cmap: &'a BTreeMap<u32, u16>,
}

impl FontTables<'_> {
    /// Returns `cmap`, `head`, `hhea`, `hmtx`, `maxp`, `name`, `OS/2` and `post`.
    pub fn build(
        &self,
        maxp: maxp::Table,
        index_to_location_format: head::IndexToLocationFormat,
    ) -> Vec<(Tag, Vec<u8>)> {
        let head = head::Table {
            units_per_em: self.units_per_em,
            bbox: self.font_bbox,
            mac_style: self.style.mac_style(),
            index_to_location_format,
        };

        let hhea = hhea::Table {
            ascender: self.ascender,
            descender: self.descender,
            line_gap: 0,
            extents: HorizontalExtents::compute(self.glyphs),
            number_of_h_metrics: self.glyphs.len() as u16,
        };

        let char_range = match (self.cmap.keys().next(), self.cmap.keys().next_back()) {
            (Some(first), Some(last)) => Some((*first, *last)),
            _ => None,
        };

        let os2 = os2::Table {
            units_per_em: self.units_per_em,
            x_avg_char_width: metrics::average_width(self.glyphs),
            style: self.style,
            char_range,
            ascender: self.ascender,
            descender: self.descender,
            win_ascent: self.win_ascent,
            win_descent: self.win_descent,
            x_height: self.x_height,
            cap_height: self.cap_height,
        };

        vec![
            (*b"cmap", cmap::to_vec(self.cmap)),
            (*b"head", head.to_vec()),
            (*b"hhea", hhea.to_vec()),
            (*b"hmtx", hmtx::to_vec(self.glyphs)),
            (*b"maxp", maxp.to_vec()),
            (*b"name", self.names.to_vec()),
            (*b"OS/2", os2.to_vec()),
            (*b"post", post::Table::default().to_vec()),
        ]
    }
}
