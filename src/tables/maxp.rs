// https://docs.microsoft.com/en-us/typography/opentype/spec/maxp

use crate::writer::Writer;

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Table {
    /// Version 0.5, for CFF outlines.
    Cff {
        number_of_glyphs: u16,
    },
    /// Version 1.0, for TrueType outlines.
    TrueType {
        number_of_glyphs: u16,
        max_points: u16,
        max_contours: u16,
    },
}

impl Table {
    pub fn write(&self, w: &mut Writer) {
        match *self {
            Table::Cff { number_of_glyphs } => {
                w.write(0x00005000u32); // version
                w.write(number_of_glyphs);
            }
            Table::TrueType { number_of_glyphs, max_points, max_contours } => {
                w.write(0x00010000u32); // version
                w.write(number_of_glyphs);
                w.write(max_points);
                w.write(max_contours);
                w.write(0u16); // max composite points
                w.write(0u16); // max composite contours
                w.write(2u16); // max zones
                w.write(0u16); // max twilight points
                w.write(0u16); // max storage
                w.write(0u16); // max function defs
                w.write(0u16); // max instruction defs
                w.write(0u16); // max stack elements
                w.write(0u16); // max size of instructions
                w.write(0u16); // max component elements
                w.write(0u16); // max component depth
            }
        }
    }

    pub fn to_vec(&self) -> Vec<u8> {
        let mut w = Writer::new();
        self.write(&mut w);
        w.finish()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_05() {
        let data = Table::Cff { number_of_glyphs: 3 }.to_vec();
        assert_eq!(data, [
            0x00, 0x00, 0x50, 0x00, // version: 0.3125
            0x00, 0x03, // number of glyphs: 3
        ]);
    }

    #[test]
    fn version_1() {
        let data = Table::TrueType { number_of_glyphs: 1, max_points: 4, max_contours: 1 }.to_vec();
        assert_eq!(data, [
            0x00, 0x01, 0x00, 0x00, // version: 1
            0x00, 0x01, // number of glyphs: 1
            0x00, 0x04, // maximum points in a non-composite glyph: 4
            0x00, 0x01, // maximum contours in a non-composite glyph: 1
            0x00, 0x00, // maximum points in a composite glyph: 0
            0x00, 0x00, // maximum contours in a composite glyph: 0
            0x00, 0x02, // maximum zones: 2
            0x00, 0x00, // maximum twilight points: 0
            0x00, 0x00, // number of Storage Area locations: 0
            0x00, 0x00, // number of FDEFs: 0
            0x00, 0x00, // number of IDEFs: 0
            0x00, 0x00, // maximum stack depth: 0
            0x00, 0x00, // maximum byte count for glyph instructions: 0
            0x00, 0x00, // maximum number of components: 0
            0x00, 0x00, // maximum levels of recursion: 0
        ]);
    }
}
