// https://docs.microsoft.com/en-us/typography/opentype/spec/loca

use crate::tables::head::IndexToLocationFormat;
use crate::writer::Writer;

/// Writes glyph offsets, using the short format when all of them fit.
///
/// Offsets must be even.
pub fn to_vec(offsets: &[u32]) -> (Vec<u8>, IndexToLocationFormat) {
    let max = offsets.last().copied().unwrap_or(0);
    let mut w = Writer::new();
    if max / 2 <= u32::from(u16::MAX) {
        for offset in offsets {
            w.write((offset / 2) as u16);
        }

        (w.finish(), IndexToLocationFormat::Short)
    } else {
        for offset in offsets {
            w.write(*offset);
        }

        (w.finish(), IndexToLocationFormat::Long)
    }
}
