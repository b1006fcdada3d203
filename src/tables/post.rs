// https://docs.microsoft.com/en-us/typography/opentype/spec/post

use crate::writer::Writer;

pub const TABLE_SIZE: usize = 32;

/// Version 3.0: no glyph names.
#[derive(Clone, Copy, Debug)]
pub struct Table {
    pub underline_position: i16,
    pub underline_thickness: i16,
}

impl Default for Table {
    fn default() -> Self {
        Table {
            underline_position: -100,
            underline_thickness: 50,
        }
    }
}

impl Table {
    pub fn write(&self, w: &mut Writer) {
        w.write(0x00030000u32); // version
        w.write(0u32); // italic angle
        w.write(self.underline_position);
        w.write(self.underline_thickness);
        w.write(0u32); // is fixed pitch
        w.write(0u32); // min mem type 42
        w.write(0u32); // max mem type 42
        w.write(0u32); // min mem type 1
        w.write(0u32); // max mem type 1
    }

    pub fn to_vec(&self) -> Vec<u8> {
        let mut w = Writer::with_capacity(TABLE_SIZE);
        self.write(&mut w);
        w.finish()
    }
}
