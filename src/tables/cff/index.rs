use core::convert::TryFrom;

use crate::parser::{FromData, Stream, U24};
use crate::writer::Writer;


pub fn parse_index<'a>(s: &mut Stream<'a>) -> Option<DataIndex<'a>> {
    let count: u16 = s.read()?;
    if count != 0 {
        parse_index_impl(u32::from(count), s)
    } else {
        Some(DataIndex::default())
    }
}

fn parse_index_impl<'a>(count: u32, s: &mut Stream<'a>) -> Option<DataIndex<'a>> {
    let offset_size = try_parse_offset_size(s)?;
    let offsets_len = (count + 1).checked_mul(offset_size.to_u32())?;
    let offsets = VarOffsets {
        data: s.read_bytes(usize::try_from(offsets_len).ok()?)?,
        offset_size,
    };

    // Last offset indicates a Data Index size.
    match offsets.last() {
        Some(last_offset) => {
            let data = s.read_bytes(usize::try_from(last_offset).ok()?)?;
            Some(DataIndex { data, offsets })
        }
        None => {
            Some(DataIndex::default())
        }
    }
}


#[derive(Clone, Copy, Debug)]
pub struct VarOffsets<'a> {
    pub data: &'a [u8],
    pub offset_size: OffsetSize,
}

impl<'a> VarOffsets<'a> {
    pub fn get(&self, index: u32) -> Option<u32> {
        if index >= self.len() {
            return None;
        }

        let start = usize::try_from(index).ok()? * self.offset_size.to_usize();
        let end = start + self.offset_size.to_usize();
        let data = self.data.get(start..end)?;
        let n: u32 = match self.offset_size {
            OffsetSize::Size1 => u32::from(u8::parse(data)?),
            OffsetSize::Size2 => u32::from(u16::parse(data)?),
            OffsetSize::Size3 => U24::parse(data)?.0,
            OffsetSize::Size4 => u32::parse(data)?,
        };

        // Offsets are offset by one byte in the font,
        // so we have to shift them back.
        n.checked_sub(1)
    }

    #[inline]
    pub fn last(&self) -> Option<u32> {
        if !self.is_empty() {
            self.get(self.len() - 1)
        } else {
            None
        }
    }

    #[inline]
    pub fn len(&self) -> u32 {
        self.data.len() as u32 / self.offset_size.to_u32()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}


#[derive(Clone, Copy, Debug)]
pub struct DataIndex<'a> {
    pub data: &'a [u8],
    pub offsets: VarOffsets<'a>,
}

impl<'a> Default for DataIndex<'a> {
    #[inline]
    fn default() -> Self {
        DataIndex {
            data: b"",
            offsets: VarOffsets { data: b"", offset_size: OffsetSize::Size1 },
        }
    }
}

impl<'a> IntoIterator for DataIndex<'a> {
    type Item = &'a [u8];
    type IntoIter = DataIndexIter<'a>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        DataIndexIter {
            data: self,
            offset_index: 0,
        }
    }
}

impl<'a> DataIndex<'a> {
    #[inline]
    pub fn len(&self) -> u32 {
        if !self.offsets.is_empty() {
            // Last offset points to the byte after the `Object data`.
            // We should skip it.
            self.offsets.len() - 1
        } else {
            0
        }
    }

    pub fn get(&self, index: u32) -> Option<&'a [u8]> {
        let next = index.checked_add(1)?;
        if next < self.offsets.len() {
            let start = usize::try_from(self.offsets.get(index)?).ok()?;
            let end = usize::try_from(self.offsets.get(next)?).ok()?;
            self.data.get(start..end)
        } else {
            None
        }
    }
}

pub struct DataIndexIter<'a> {
    data: DataIndex<'a>,
    offset_index: u32,
}

impl<'a> Iterator for DataIndexIter<'a> {
    type Item = &'a [u8];

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.offset_index == self.data.len() {
            return None;
        }

        let index = self.offset_index;
        self.offset_index += 1;
        self.data.get(index)
    }
}


#[derive(Clone, Copy, PartialEq, Debug)]
pub enum OffsetSize {
    Size1 = 1,
    Size2 = 2,
    Size3 = 3,
    Size4 = 4,
}

impl OffsetSize {
    #[inline] fn to_u32(self) -> u32 { self as u32 }
    #[inline] fn to_usize(self) -> usize { self as usize }

    /// The smallest size able to hold `max` (an offset already shifted by one).
    fn for_offset(max: usize) -> Self {
        if max <= 0xFF {
            OffsetSize::Size1
        } else if max <= 0xFFFF {
            OffsetSize::Size2
        } else if max <= 0xFF_FFFF {
            OffsetSize::Size3
        } else {
            OffsetSize::Size4
        }
    }
}

#[inline]
fn try_parse_offset_size(s: &mut Stream) -> Option<OffsetSize> {
    match s.read::<u8>()? {
        1 => Some(OffsetSize::Size1),
        2 => Some(OffsetSize::Size2),
        3 => Some(OffsetSize::Size3),
        4 => Some(OffsetSize::Size4),
        _ => None,
    }
}


/// Returns the number of bytes `write_index` would produce for `items`.
pub fn index_size<T: AsRef<[u8]>>(items: &[T]) -> usize {
    if items.is_empty() {
        return 2;
    }

    let data_len: usize = items.iter().map(|v| v.as_ref().len()).sum();
    let offset_size = OffsetSize::for_offset(data_len + 1);
    2 + 1 + (items.len() + 1) * offset_size.to_usize() + data_len
}

/// Writes an INDEX structure.
///
/// The caller is responsible for keeping `items.len()` within `u16`.
pub fn write_index<T: AsRef<[u8]>>(items: &[T], w: &mut Writer) {
    w.write(items.len() as u16); // count
    if items.is_empty() {
        return;
    }

    let data_len: usize = items.iter().map(|v| v.as_ref().len()).sum();
    let offset_size = OffsetSize::for_offset(data_len + 1);
    w.write(offset_size as u8);

    let mut offset = 1usize;
    write_offset(offset, offset_size, w);
    for item in items {
        offset += item.as_ref().len();
        write_offset(offset, offset_size, w);
    }

    for item in items {
        w.extend(item.as_ref());
    }
}

fn write_offset(n: usize, offset_size: OffsetSize, w: &mut Writer) {
    let bytes = (n as u32).to_be_bytes();
    w.extend(&bytes[4 - offset_size.to_usize()..]);
}
