//! A big-endian binary writer, the counterpart of `parser::Stream`.

/// A trait for writing raw binary data.
pub trait ToData {
    /// Appends `self` to `data` in big-endian order.
    fn write(&self, data: &mut Vec<u8>);
}

impl ToData for u8 {
    #[inline]
    fn write(&self, data: &mut Vec<u8>) {
        data.push(*self);
    }
}

impl ToData for i8 {
    #[inline]
    fn write(&self, data: &mut Vec<u8>) {
        data.push(*self as u8);
    }
}

impl ToData for u16 {
    #[inline]
    fn write(&self, data: &mut Vec<u8>) {
        data.extend_from_slice(&self.to_be_bytes());
    }
}

impl ToData for i16 {
    #[inline]
    fn write(&self, data: &mut Vec<u8>) {
        data.extend_from_slice(&self.to_be_bytes());
    }
}

impl ToData for u32 {
    #[inline]
    fn write(&self, data: &mut Vec<u8>) {
        data.extend_from_slice(&self.to_be_bytes());
    }
}

impl ToData for i32 {
    #[inline]
    fn write(&self, data: &mut Vec<u8>) {
        data.extend_from_slice(&self.to_be_bytes());
    }
}

impl ToData for u64 {
    #[inline]
    fn write(&self, data: &mut Vec<u8>) {
        data.extend_from_slice(&self.to_be_bytes());
    }
}

impl ToData for [u8; 4] {
    #[inline]
    fn write(&self, data: &mut Vec<u8>) {
        data.extend_from_slice(self);
    }
}


#[derive(Clone, Default, Debug)]
pub struct Writer {
    pub data: Vec<u8>,
}

impl Writer {
    #[inline]
    pub fn new() -> Self {
        Writer { data: Vec::new() }
    }

    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Writer { data: Vec::with_capacity(capacity) }
    }

    #[inline]
    pub fn write<T: ToData>(&mut self, value: T) {
        value.write(&mut self.data);
    }

    #[inline]
    pub fn extend(&mut self, data: &[u8]) {
        self.data.extend_from_slice(data);
    }

    /// Pads with zeros until the length is a multiple of `n`.
    #[inline]
    pub fn align(&mut self, n: usize) {
        while self.data.len() % n != 0 {
            self.data.push(0);
        }
    }

    #[inline]
    pub fn offset(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn finish(self) -> Vec<u8> {
        self.data
    }
}


/// Returns `searchRange`, `entrySelector` and `rangeShift` for `count` items of `size` bytes.
pub fn search_params(count: u16, size: u16) -> (u16, u16, u16) {
    let mut entry_selector = 0u16;
    while u32::from(count) >> (entry_selector + 1) != 0 {
        entry_selector += 1;
    }

    let search_range = (1u16 << entry_selector).wrapping_mul(size);
    let range_shift = count.wrapping_mul(size).wrapping_sub(search_range);
    (search_range, entry_selector, range_shift)
}


/// Typed values for assembling test fixtures.
#[cfg(test)]
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug)]
pub enum TtfType {
    Raw(&'static [u8]),
    TrueTypeMagic,
    OpenTypeMagic,
    Int8(i8),
    UInt8(u8),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    CFFInt(i32),
}

#[cfg(test)]
impl Writer {
    pub fn write_type(&mut self, value: TtfType) {
        match value {
            TtfType::Raw(bytes) => self.extend(bytes),
            TtfType::TrueTypeMagic => self.extend(&[0x00, 0x01, 0x00, 0x00]),
            TtfType::OpenTypeMagic => self.extend(b"OTTO"),
            TtfType::Int8(n) => self.write(n),
            TtfType::UInt8(n) => self.write(n),
            TtfType::Int16(n) => self.write(n),
            TtfType::UInt16(n) => self.write(n),
            TtfType::Int32(n) => self.write(n),
            TtfType::UInt32(n) => self.write(n),
            TtfType::CFFInt(n) => crate::tables::cff::dict::write_int(n, &mut self.data),
        }
    }
}

#[cfg(test)]
pub fn convert(values: &[TtfType]) -> Vec<u8> {
    let mut w = Writer::new();
    for v in values {
        w.write_type(*v);
    }

    w.data
}
