//! An sfnt container writer.

use crate::tables::head;
use crate::writer::{self, Writer};

pub const TRUE_TYPE_MAGIC: u32 = 0x00010000;
pub const OPEN_TYPE_MAGIC: u32 = 0x4F54544F; // OTTO

const HEADER_SIZE: usize = 12;
const TABLE_RECORD_SIZE: usize = 16;
const CHECKSUM_MAGIC: u32 = 0xB1B0AFBA;

/// A table tag.
pub type Tag = [u8; 4];

/// Sums big-endian `u32` words, the last one zero-padded.
pub fn checksum(data: &[u8]) -> u32 {
    let mut sum = 0u32;
    for chunk in data.chunks(4) {
        let mut word = [0u8; 4];
        word[..chunk.len()].copy_from_slice(chunk);
        sum = sum.wrapping_add(u32::from_be_bytes(word));
    }

    sum
}

/// Assembles a font file from tables.
///
/// Tables are sorted by tag and 4-byte aligned. When a `head` table is present,
/// its `checkSumAdjustment` is computed over the whole file.
pub fn assemble(sfnt_version: u32, mut tables: Vec<(Tag, Vec<u8>)>) -> Vec<u8> {
    tables.sort_by(|a, b| a.0.cmp(&b.0));

    let count = tables.len() as u16;
    let (search_range, entry_selector, range_shift) =
        writer::search_params(count, TABLE_RECORD_SIZE as u16);

    let mut w = Writer::new();
    w.write(sfnt_version);
    w.write(count);
    w.write(search_range);
    w.write(entry_selector);
    w.write(range_shift);

    let mut checksum_adjustment_offset = None;
    let mut offset = HEADER_SIZE + tables.len() * TABLE_RECORD_SIZE;
    for (tag, data) in &mut tables {
        if tag == b"head" && data.len() >= head::CHECKSUM_ADJUSTMENT_OFFSET + 4 {
            let i = head::CHECKSUM_ADJUSTMENT_OFFSET;
            data[i..i + 4].copy_from_slice(&[0; 4]);
            checksum_adjustment_offset = Some(offset + i);
        }

        w.write(*tag);
        w.write(checksum(data));
        w.write(offset as u32);
        w.write(data.len() as u32);

        offset += data.len();
        while offset % 4 != 0 {
            offset += 1;
        }
    }

    for (_, data) in &tables {
        w.extend(data);
        w.align(4);
    }

    let mut data = w.finish();
    if let Some(i) = checksum_adjustment_offset {
        let value = CHECKSUM_MAGIC.wrapping_sub(checksum(&data));
        data[i..i + 4].copy_from_slice(&value.to_be_bytes());
    }

    data
}
