// https://docs.microsoft.com/en-us/typography/opentype/spec/hhea

use crate::metrics::HorizontalExtents;
use crate::writer::Writer;

pub const TABLE_SIZE: usize = 36;

#[derive(Clone, Copy, Debug)]
pub struct Table {
    pub ascender: i16,
    pub descender: i16,
    pub line_gap: i16,
    pub extents: HorizontalExtents,
    pub number_of_h_metrics: u16,
}

impl Table {
    pub fn write(&self, w: &mut Writer) {
        w.write(0x00010000u32); // version
        w.write(self.ascender);
        w.write(self.descender);
        w.write(self.line_gap);
        w.write(self.extents.advance_width_max);
        w.write(self.extents.min_left_side_bearing);
        w.write(self.extents.min_right_side_bearing);
        w.write(self.extents.x_max_extent);
        w.write(1i16); // caret slope rise
        w.write(0i16); // caret slope run
        w.write(0i16); // caret offset
        for _ in 0..4 {
            w.write(0i16); // reserved
        }
        w.write(0i16); // metric data format
        w.write(self.number_of_h_metrics);
    }

    pub fn to_vec(&self) -> Vec<u8> {
        let mut w = Writer::with_capacity(TABLE_SIZE);
        self.write(&mut w);
        w.finish()
    }
}
