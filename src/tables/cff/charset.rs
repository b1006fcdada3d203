use crate::parser::{FromData, LazyArray16, Stream};
use crate::writer::Writer;
use super::StringId;

/// The Standard Encoding as defined in the Adobe Technical Note #5176 Appendix B.
pub const STANDARD_ENCODING: [u8; 256] = [
      0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,
      0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,
      1,   2,   3,   4,   5,   6,   7,   8,   9,  10,  11,  12,  13,  14,  15,  16,
     17,  18,  19,  20,  21,  22,  23,  24,  25,  26,  27,  28,  29,  30,  31,  32,
     33,  34,  35,  36,  37,  38,  39,  40,  41,  42,  43,  44,  45,  46,  47,  48,
     49,  50,  51,  52,  53,  54,  55,  56,  57,  58,  59,  60,  61,  62,  63,  64,
     65,  66,  67,  68,  69,  70,  71,  72,  73,  74,  75,  76,  77,  78,  79,  80,
     81,  82,  83,  84,  85,  86,  87,  88,  89,  90,  91,  92,  93,  94,  95,   0,
      0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,
      0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,
      0,  96,  97,  98,  99, 100, 101, 102, 103, 104, 105, 106, 107, 108, 109, 110,
      0, 111, 112, 113, 114,   0, 115, 116, 117, 118, 119, 120, 121, 122,   0, 123,
      0, 124, 125, 126, 127, 128, 129, 130, 131,   0, 132, 133,   0, 134, 135, 136,
    137,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,
      0, 138,   0, 139,   0,   0,   0,   0, 140, 141, 142, 143,   0,   0,   0,   0,
      0, 144,   0,   0,   0, 145,   0,   0, 146, 147, 148, 149,   0,   0,   0,   0,
];


#[derive(Clone, Copy, Debug)]
pub(crate) struct Format1Range {
    first: StringId,
    left: u8,
}

impl FromData for Format1Range {
    const SIZE: usize = 3;

    #[inline]
    fn parse(data: &[u8]) -> Option<Self> {
        let mut s = Stream::new(data);
        Some(Format1Range {
            first: s.read()?,
            left: s.read()?,
        })
    }
}


#[derive(Clone, Copy, Debug)]
pub(crate) struct Format2Range {
    first: StringId,
    left: u16,
}

impl FromData for Format2Range {
    const SIZE: usize = 4;

    #[inline]
    fn parse(data: &[u8]) -> Option<Self> {
        let mut s = Stream::new(data);
        Some(Format2Range {
            first: s.read()?,
            left: s.read()?,
        })
    }
}


/// A glyph id to SID (or CID, in CID-keyed fonts) mapping.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Charset<'a> {
    ISOAdobe,
    Expert,
    ExpertSubset,
    Format0(LazyArray16<'a, StringId>),
    Format1(LazyArray16<'a, Format1Range>),
    Format2(LazyArray16<'a, Format2Range>),
}

impl Charset<'_> {
    pub fn sid_to_gid(&self, sid: StringId) -> Option<u16> {
        if sid.0 == 0 {
            return Some(0);
        }

        match self {
            Charset::ISOAdobe | Charset::Expert | Charset::ExpertSubset => None,
            Charset::Format0(ref array) => {
                // First glyph is omitted, so we have to add 1.
                array.into_iter().position(|n| n == sid).map(|n| n as u16 + 1)
            }
            Charset::Format1(array) => {
                let mut glyph_id = 1u16;
                for range in *array {
                    let last = u32::from(range.first.0) + u32::from(range.left);
                    if range.first <= sid && u32::from(sid.0) <= last {
                        return glyph_id.checked_add(sid.0 - range.first.0);
                    }

                    glyph_id = glyph_id.checked_add(u16::from(range.left) + 1)?;
                }

                None
            }
            Charset::Format2(array) => {
                // The same as format 1, but Range::left is u16.
                let mut glyph_id = 1u16;
                for range in *array {
                    let last = u32::from(range.first.0) + u32::from(range.left);
                    if sid >= range.first && u32::from(sid.0) <= last {
                        return glyph_id.checked_add(sid.0 - range.first.0);
                    }

                    glyph_id = glyph_id.checked_add(range.left.checked_add(1)?)?;
                }

                None
            }
        }
    }

    pub fn gid_to_sid(&self, gid: u16) -> Option<StringId> {
        match self {
            // Predefined charsets map glyph ids to the same SIDs.
            Charset::ISOAdobe => {
                if gid <= 228 { Some(StringId(gid)) } else { None }
            }
            Charset::Expert | Charset::ExpertSubset => None,
            Charset::Format0(ref array) => {
                if gid == 0 {
                    Some(StringId(0))
                } else {
                    array.get(gid - 1)
                }
            }
            Charset::Format1(array) => {
                if gid == 0 {
                    return Some(StringId(0));
                }

                let mut glyph_id = 1u16;
                for range in *array {
                    let end = glyph_id.checked_add(u16::from(range.left))?;
                    if (glyph_id..=end).contains(&gid) {
                        let sid = range.first.0.checked_add(gid - glyph_id)?;
                        return Some(StringId(sid));
                    }

                    glyph_id = end.checked_add(1)?;
                }

                None
            }
            Charset::Format2(array) => {
                if gid == 0 {
                    return Some(StringId(0));
                }

                let mut glyph_id = 1u16;
                for range in *array {
                    let end = glyph_id.checked_add(range.left)?;
                    if (glyph_id..=end).contains(&gid) {
                        let sid = range.first.0.checked_add(gid - glyph_id)?;
                        return Some(StringId(sid));
                    }

                    glyph_id = end.checked_add(1)?;
                }

                None
            }
        }
    }
}

pub(crate) fn parse_charset<'a>(number_of_glyphs: u16, s: &mut Stream<'a>) -> Option<Charset<'a>> {
    if number_of_glyphs < 2 {
        return None;
    }

    // -1 everywhere, since `.notdef` is omitted.
    let format: u8 = s.read()?;
    match format {
        0 => Some(Charset::Format0(s.read_array16(number_of_glyphs - 1)?)),
        1 => {
            // The number of ranges is not defined, so we have to
            // read until no glyphs are left.
            let mut count = 0;
            {
                let mut s = *s;
                let mut total_left = number_of_glyphs - 1;
                while total_left > 0 {
                    s.skip::<StringId>(); // first
                    let left: u8 = s.read()?;
                    total_left = total_left.saturating_sub(u16::from(left) + 1);
                    count += 1;
                }
            }

            s.read_array16(count).map(Charset::Format1)
        }
        2 => {
            // The same as format 1, but Range::left is u16.
            let mut count = 0;
            {
                let mut s = *s;
                let mut total_left = number_of_glyphs - 1;
                while total_left > 0 {
                    s.skip::<StringId>(); // first
                    let left: u16 = s.read()?;
                    let left = left.checked_add(1)?;
                    total_left = total_left.saturating_sub(left);
                    count += 1;
                }
            }

            s.read_array16(count).map(Charset::Format2)
        }
        _ => None,
    }
}

/// Writes a format 0 charset. `.notdef` must not be included.
pub(crate) fn write_charset(sids: &[StringId], w: &mut Writer) {
    w.write(0u8); // format
    for sid in sids {
        w.write(sid.0);
    }
}
