/*!
A [character to glyph index mapping](https://docs.microsoft.com/en-us/typography/opentype/spec/cmap)
table writer.

The table contains up to three encoding records:

- Macintosh Roman with a format 4 subtable for BMP code points
- Windows Unicode BMP with the same format 4 subtable
- Windows Unicode full repertoire with a format 12 subtable,
  only when at least one code point is beyond the BMP
*/

use std::collections::BTreeMap;

use crate::writer::Writer;

mod format4;
mod format12;

const HEADER_SIZE: usize = 4;
const RECORD_SIZE: usize = 8;

#[derive(Clone, Copy, PartialEq, Debug)]
struct EncodingRecord {
    platform_id: u16,
    encoding_id: u16,
    subtable: usize,
}

/// Writes a `cmap` table for a code point to glyph ID mapping.
///
/// When there is nothing to map, a Windows BMP format 4 subtable
/// with only the final segment is written, so the table is never empty.
pub fn to_vec(mapping: &BTreeMap<u32, u16>) -> Vec<u8> {
    let entries: Vec<(u32, u16)> = mapping.iter().map(|(c, g)| (*c, *g)).collect();
    let has_bmp = entries.iter().any(|(c, _)| *c < 0xFFFF);
    let has_supplementary = entries.iter().any(|(c, _)| *c > 0xFFFF);

    let mut subtables: Vec<Vec<u8>> = Vec::new();
    let mut records: Vec<EncodingRecord> = Vec::new();

    let mut needs_full_repertoire = has_supplementary;
    if has_bmp {
        match format4::write(&entries) {
            Some(data) => {
                subtables.push(data);
                records.push(EncodingRecord { platform_id: 1, encoding_id: 0, subtable: 0 });
                records.push(EncodingRecord { platform_id: 3, encoding_id: 1, subtable: 0 });
            }
            None => {
                warn!("Too many BMP segments for a format 4 subtable. Using format 12 only.");
                needs_full_repertoire = true;
            }
        }
    }

    if needs_full_repertoire {
        subtables.push(format12::write(&entries));
        records.push(EncodingRecord { platform_id: 3, encoding_id: 10, subtable: subtables.len() - 1 });
    }

    if records.is_empty() {
        if let Some(data) = format4::write(&[]) {
            subtables.push(data);
            records.push(EncodingRecord { platform_id: 3, encoding_id: 1, subtable: 0 });
        }
    }

    let mut offsets = Vec::with_capacity(subtables.len());
    let mut offset = HEADER_SIZE + records.len() * RECORD_SIZE;
    for subtable in &subtables {
        offsets.push(offset as u32);
        offset += subtable.len();
    }

    let mut w = Writer::with_capacity(offset);
    w.write(0u16); // version
    w.write(records.len() as u16);
    for record in &records {
        w.write(record.platform_id);
        w.write(record.encoding_id);
        w.write(offsets[record.subtable]);
    }

    for subtable in &subtables {
        w.extend(subtable);
    }

    w.finish()
}
