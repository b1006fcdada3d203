// https://docs.microsoft.com/en-us/typography/opentype/spec/cmap#format-12-segmented-coverage

use crate::writer::Writer;

const HEADER_SIZE: usize = 16;
const GROUP_SIZE: usize = 12;

#[derive(Clone, Copy, Debug)]
struct SequentialMapGroup {
    start_char_code: u32,
    end_char_code: u32,
    start_glyph_id: u32,
}

/// Writes a format 12 subtable covering all code points.
pub fn write(mapping: &[(u32, u16)]) -> Vec<u8> {
    let mut groups: Vec<SequentialMapGroup> = Vec::new();
    for &(code_point, glyph_id) in mapping {
        let glyph_id = u32::from(glyph_id);
        if let Some(last) = groups.last_mut() {
            let len = last.end_char_code - last.start_char_code;
            if last.end_char_code + 1 == code_point && last.start_glyph_id + len + 1 == glyph_id {
                last.end_char_code = code_point;
                continue;
            }
        }

        groups.push(SequentialMapGroup {
            start_char_code: code_point,
            end_char_code: code_point,
            start_glyph_id: glyph_id,
        });
    }

    let length = HEADER_SIZE + groups.len() * GROUP_SIZE;
    let mut w = Writer::with_capacity(length);
    w.write(12u16); // format
    w.write(0u16); // reserved
    w.write(length as u32);
    w.write(0u32); // language
    w.write(groups.len() as u32);
    for group in &groups {
        w.write(group.start_char_code);
        w.write(group.end_char_code);
        w.write(group.start_glyph_id);
    }

    w.finish()
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::{self, TtfType::*};

    #[test]
    fn groups() {
        let data = write(&[(0x41, 1), (0x42, 2), (0x1F600, 3), (0x1F602, 4)]);
        assert_eq!(data, writer::convert(&[
            UInt16(12), // format
            UInt16(0), // reserved
            UInt32(52), // length
            UInt32(0), // language
            UInt32(3), // number of groups
            // Group [0]
            UInt32(0x41), // start char code
            UInt32(0x42), // end char code
            UInt32(1), // start glyph ID
            // Group [1]
            UInt32(0x1F600), // start char code
            UInt32(0x1F600), // end char code
            UInt32(3), // start glyph ID
            // Group [2]
            UInt32(0x1F602), // start char code
            UInt32(0x1F602), // end char code
            UInt32(4), // start glyph ID
        ]));
    }
}
