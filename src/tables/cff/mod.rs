// Useful links:
// http://wwwimages.adobe.com/content/dam/Adobe/en/devnet/font/pdfs/5176.CFF.pdf
// http://wwwimages.adobe.com/content/dam/Adobe/en/devnet/font/pdfs/5177.Type2.pdf

pub(crate) mod argstack;
pub(crate) mod cff1;
pub(crate) mod charset;
pub(crate) mod charstring;
pub(crate) mod dict;
pub(crate) mod encoder;
pub(crate) mod index;
pub(crate) mod std_names;

use core::convert::TryFrom;

use crate::parser::{FromData, Stream};

pub use cff1::{CffBuilder, FontKind, Metadata};
pub use encoder::{encode_outline, EncodedGlyph};


/// A list of errors that can occur during a CFF table parsing or charstring interpretation.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum CFFError {
    ReadOutOfBounds,
    InvalidOperator,
    UnsupportedOperator,
    MissingEndChar,
    DataAfterEndChar,
    NestingLimitReached,
    ArgumentsStackLimitReached,
    InvalidArgumentsStackLength,
    MissingMoveTo,
    InvalidSubroutineIndex,
    NoLocalSubroutines,
    InvalidSeacCode,
}

impl core::fmt::Display for CFFError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match *self {
            CFFError::ReadOutOfBounds => {
                write!(f, "read out of bounds")
            }
            CFFError::InvalidOperator => {
                write!(f, "an invalid operator occurred")
            }
            CFFError::UnsupportedOperator => {
                write!(f, "an unsupported operator occurred")
            }
            CFFError::MissingEndChar => {
                write!(f, "the 'endchar' operator is missing")
            }
            CFFError::DataAfterEndChar => {
                write!(f, "unused data left after 'endchar' operator")
            }
            CFFError::NestingLimitReached => {
                write!(f, "subroutines nesting limit reached")
            }
            CFFError::ArgumentsStackLimitReached => {
                write!(f, "arguments stack limit reached")
            }
            CFFError::InvalidArgumentsStackLength => {
                write!(f, "an invalid amount of items are in an arguments stack")
            }
            CFFError::MissingMoveTo => {
                write!(f, "missing moveto operator")
            }
            CFFError::InvalidSubroutineIndex => {
                write!(f, "an invalid subroutine index")
            }
            CFFError::NoLocalSubroutines => {
                write!(f, "no local subroutines")
            }
            CFFError::InvalidSeacCode => {
                write!(f, "invalid seac code")
            }
        }
    }
}

impl std::error::Error for CFFError {}


/// A type-safe wrapper for string ID.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct StringId(pub u16);

impl FromData for StringId {
    const SIZE: usize = 2;

    #[inline]
    fn parse(data: &[u8]) -> Option<Self> {
        u16::parse(data).map(StringId)
    }
}


pub trait IsEven {
    fn is_even(&self) -> bool;
    fn is_odd(&self) -> bool;
}

impl IsEven for usize {
    #[inline]
    fn is_even(&self) -> bool { (*self) & 1 == 0 }

    #[inline]
    fn is_odd(&self) -> bool { !self.is_even() }
}


#[inline]
pub fn conv_subroutine_index(index: f32, bias: u16) -> Result<u32, CFFError> {
    conv_subroutine_index_impl(index, bias).ok_or(CFFError::InvalidSubroutineIndex)
}

#[inline]
fn conv_subroutine_index_impl(index: f32, bias: u16) -> Option<u32> {
    if !index.is_finite() || index < i32::MIN as f32 || index > i32::MAX as f32 {
        return None;
    }

    let index = index as i32;
    let bias = i32::from(bias);

    let index = index.checked_add(bias)?;
    u32::try_from(index).ok()
}

// Adobe Technical Note #5176, Chapter 16 "Local / Global Subrs INDEXes"
#[inline]
pub fn calc_subroutine_bias(len: u32) -> u16 {
    if len < 1240 {
        107
    } else if len < 33900 {
        1131
    } else {
        32768
    }
}

/// Reads the CFF header and returns a stream positioned at the Name INDEX.
pub(crate) fn parse_header(data: &[u8]) -> Option<(u8, Stream<'_>)> {
    let mut s = Stream::new(data);
    let major: u8 = s.read()?;
    s.skip::<u8>(); // minor
    let header_size: u8 = s.read()?;
    s.skip::<u8>(); // Absolute offset

    // Jump to Name INDEX. It's not necessarily right after the header.
    if header_size > 4 {
        s.advance(usize::from(header_size) - 4);
    }

    Some((major, s))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subroutine_bias() {
        assert_eq!(calc_subroutine_bias(0), 107);
        assert_eq!(calc_subroutine_bias(1239), 107);
        assert_eq!(calc_subroutine_bias(1240), 1131);
        assert_eq!(calc_subroutine_bias(33899), 1131);
        assert_eq!(calc_subroutine_bias(33900), 32768);
    }

    #[test]
    fn subroutine_index() {
        assert_eq!(conv_subroutine_index(-107.0, 107), Ok(0));
        assert_eq!(conv_subroutine_index(-108.0, 107), Err(CFFError::InvalidSubroutineIndex));
        assert_eq!(conv_subroutine_index(f32::NAN, 107), Err(CFFError::InvalidSubroutineIndex));
    }
}
