// https://docs.microsoft.com/en-us/typography/opentype/spec/glyf

use core::convert::TryFrom;

use crate::truetype::Glyph;
use crate::writer::Writer;

mod simple_glyph_flag {
    pub const ON_CURVE_POINT: u8 = 0x01;
    pub const X_SHORT_VECTOR: u8 = 0x02;
    pub const Y_SHORT_VECTOR: u8 = 0x04;
    pub const X_IS_SAME_OR_POSITIVE_X_SHORT_VECTOR: u8 = 0x10;
    pub const Y_IS_SAME_OR_POSITIVE_Y_SHORT_VECTOR: u8 = 0x20;
}

/// Encodes a simple glyph without instructions.
///
/// An empty glyph has no data at all.
///
/// Returns `None` when the glyph has too many points or contours
/// or when a coordinate delta doesn't fit into `i16`.
pub fn encode_glyph(glyph: &Glyph) -> Option<Vec<u8>> {
    use simple_glyph_flag::*;

    let rect = match glyph.bbox() {
        Some(v) => v,
        None => return Some(Vec::new()),
    };

    let mut w = Writer::new();
    w.write(i16::try_from(glyph.contours.len()).ok()?);
    w.write(rect.x_min);
    w.write(rect.y_min);
    w.write(rect.x_max);
    w.write(rect.y_max);

    let mut last_point = 0usize;
    for contour in &glyph.contours {
        last_point += contour.len();
        // Contours are never empty.
        w.write(u16::try_from(last_point.checked_sub(1)?).ok()?);
    }

    w.write(0u16); // instruction length

    let mut flags = Vec::with_capacity(last_point);
    let mut x_coords = Writer::new();
    let mut y_coords = Writer::new();
    let mut prev_x = 0i32;
    let mut prev_y = 0i32;
    for p in glyph.contours.iter().flatten() {
        let dx = i16::try_from(i32::from(p.x) - prev_x).ok()?;
        let dy = i16::try_from(i32::from(p.y) - prev_y).ok()?;
        prev_x = i32::from(p.x);
        prev_y = i32::from(p.y);

        let mut flag = if p.on_curve { ON_CURVE_POINT } else { 0 };
        flag |= write_delta(dx, X_SHORT_VECTOR, X_IS_SAME_OR_POSITIVE_X_SHORT_VECTOR, &mut x_coords);
        flag |= write_delta(dy, Y_SHORT_VECTOR, Y_IS_SAME_OR_POSITIVE_Y_SHORT_VECTOR, &mut y_coords);
        flags.push(flag);
    }

    w.extend(&flags);
    w.extend(&x_coords.data);
    w.extend(&y_coords.data);
    Some(w.finish())
}

fn write_delta(delta: i16, short_flag: u8, same_or_positive_flag: u8, w: &mut Writer) -> u8 {
    if delta == 0 {
        same_or_positive_flag
    } else if delta.unsigned_abs() <= 0xFF {
        w.write(delta.unsigned_abs() as u8);
        if delta > 0 { short_flag | same_or_positive_flag } else { short_flag }
    } else {
        w.write(delta);
        0
    }
}

/// Concatenates encoded glyphs, padding each to an even length.
///
/// Returns the table and the `loca` offsets, one per glyph plus the end offset.
pub fn write_table(glyphs: &[Vec<u8>]) -> (Vec<u8>, Vec<u32>) {
    let mut w = Writer::new();
    let mut offsets = Vec::with_capacity(glyphs.len() + 1);
    for data in glyphs {
        offsets.push(w.offset() as u32);
        w.extend(data);
        w.align(2);
    }
    offsets.push(w.offset() as u32);

    (w.finish(), offsets)
}
