// https://docs.microsoft.com/en-us/typography/opentype/spec/cmap#format-4-segment-mapping-to-delta-values

use core::convert::TryFrom;

use crate::writer::{self, Writer};

const HEADER_SIZE: usize = 16;
const SEGMENT_SIZE: usize = 8;

#[derive(Clone, Copy, Debug)]
struct Segment {
    start: u16,
    end: u16,
    delta: u16,
}

/// Writes a format 4 subtable.
///
/// Only code points below `0xFFFF` are used. Consecutive code points
/// mapped to consecutive glyphs share a segment; `idRangeOffset` is always 0.
///
/// Returns `None` when the subtable doesn't fit into its 16-bit length.
pub fn write(mapping: &[(u32, u16)]) -> Option<Vec<u8>> {
    let mut segments: Vec<Segment> = Vec::new();
    for &(code_point, glyph_id) in mapping {
        // 0xFFFF is reserved for the final segment.
        let code_point = match u16::try_from(code_point) {
            Ok(c) if c != 0xFFFF => c,
            _ => continue,
        };

        let delta = glyph_id.wrapping_sub(code_point);
        if let Some(last) = segments.last_mut() {
            if last.end.wrapping_add(1) == code_point && last.delta == delta {
                last.end = code_point;
                continue;
            }
        }

        segments.push(Segment { start: code_point, end: code_point, delta });
    }

    segments.push(Segment { start: 0xFFFF, end: 0xFFFF, delta: 1 });

    let seg_count = u16::try_from(segments.len()).ok()?;
    let length = u16::try_from(HEADER_SIZE + segments.len() * SEGMENT_SIZE).ok()?;
    let (search_range, entry_selector, range_shift) = writer::search_params(seg_count, 2);

    let mut w = Writer::with_capacity(usize::from(length));
    w.write(4u16); // format
    w.write(length);
    w.write(0u16); // language
    w.write(seg_count * 2);
    w.write(search_range);
    w.write(entry_selector);
    w.write(range_shift);
    for segment in &segments {
        w.write(segment.end);
    }
    w.write(0u16); // reserved pad
    for segment in &segments {
        w.write(segment.start);
    }
    for segment in &segments {
        w.write(segment.delta);
    }
    for _ in &segments {
        w.write(0u16); // id range offset
    }

    Some(w.finish())
}
