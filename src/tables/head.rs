// https://docs.microsoft.com/en-us/typography/opentype/spec/head

use crate::Rect;
use crate::writer::Writer;

pub const TABLE_SIZE: usize = 54;
pub const CHECKSUM_ADJUSTMENT_OFFSET: usize = 8;
const MAGIC_NUMBER: u32 = 0x5F0F3CF5;

// Baseline at y=0, left sidebearing point at x=0, integer ppem.
const FLAGS: u16 = 0x000B;

// Seconds since 1904-01-01. Fixed to keep the output reproducible.
const TIMESTAMP: u64 = 3_600_000_000;

const LOWEST_REC_PPEM: u16 = 8;
const FONT_DIRECTION_HINT: i16 = 2;

pub mod mac_style {
    pub const BOLD: u16 = 1 << 0;
    pub const ITALIC: u16 = 1 << 1;
}

/// A format of the `loca` table offsets.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum IndexToLocationFormat {
    Short,
    Long,
}

#[derive(Clone, Copy, Debug)]
pub struct Table {
    pub units_per_em: u16,
    pub bbox: Rect,
    pub mac_style: u16,
    pub index_to_location_format: IndexToLocationFormat,
}

impl Table {
    /// Writes the table with a zero `checkSumAdjustment`.
    pub fn write(&self, w: &mut Writer) {
        w.write(0x00010000u32); // version
        w.write(0x00010000u32); // font revision
        w.write(0u32); // checksum adjustment
        w.write(MAGIC_NUMBER);
        w.write(FLAGS);
        w.write(self.units_per_em);
        w.write(TIMESTAMP); // created
        w.write(TIMESTAMP); // modified
        w.write(self.bbox.x_min);
        w.write(self.bbox.y_min);
        w.write(self.bbox.x_max);
        w.write(self.bbox.y_max);
        w.write(self.mac_style);
        w.write(LOWEST_REC_PPEM);
        w.write(FONT_DIRECTION_HINT);
        w.write(match self.index_to_location_format {
            IndexToLocationFormat::Short => 0i16,
            IndexToLocationFormat::Long => 1i16,
        });
        w.write(0i16); // glyph data format
    }

    pub fn to_vec(&self) -> Vec<u8> {
        let mut w = Writer::with_capacity(TABLE_SIZE);
        self.write(&mut w);
        w.finish()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::{self, TtfType::*};

    #[test]
    fn layout() {
        let table = Table {
            units_per_em: 1000,
            bbox: Rect { x_min: -10, y_min: -200, x_max: 1000, y_max: 800 },
            mac_style: mac_style::BOLD,
            index_to_location_format: IndexToLocationFormat::Long,
        };

        let data = table.to_vec();
        assert_eq!(data.len(), TABLE_SIZE);
        assert_eq!(data, writer::convert(&[
            UInt32(0x00010000), // version: 1.0
            UInt32(0x00010000), // font revision: 1.0
            UInt32(0), // checksum adjustment
            UInt32(0x5F0F3CF5), // magic number
            UInt16(0x000B), // flags
            UInt16(1000), // units per em
            UInt32(0), UInt32(3_600_000_000), // created
            UInt32(0), UInt32(3_600_000_000), // modified
            Int16(-10), // x min
            Int16(-200), // y min
            Int16(1000), // x max
            Int16(800), // y max
            UInt16(1), // mac style
            UInt16(8), // lowest rec ppem
            Int16(2), // font direction hint
            Int16(1), // index to location format
            Int16(0), // glyph data format
        ]));
    }
}
