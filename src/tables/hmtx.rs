// https://docs.microsoft.com/en-us/typography/opentype/spec/hmtx

use crate::metrics::GlyphMetrics;
use crate::writer::Writer;

/// Writes a full `longHorMetric` record for every glyph.
///
/// `hhea.numberOfHMetrics` must be equal to the number of glyphs.
pub fn write(glyphs: &[GlyphMetrics], w: &mut Writer) {
    for glyph in glyphs {
        w.write(glyph.advance);
        w.write(glyph.lsb());
    }
}

pub fn to_vec(glyphs: &[GlyphMetrics]) -> Vec<u8> {
    let mut w = Writer::with_capacity(glyphs.len() * 4);
    write(glyphs, &mut w);
    w.finish()
}
