// https://docs.microsoft.com/en-us/typography/opentype/spec/os2

use crate::metrics::round_half_up;
use crate::tables::head::mac_style;
use crate::writer::Writer;

pub const TABLE_SIZE: usize = 96;

const VENDOR_ID: [u8; 4] = *b"NONE";

// Latin 1.
const CODE_PAGE_RANGE_1: u32 = 1;

const DEFAULT_FIRST_CHAR: u16 = 0x0020;
const DEFAULT_LAST_CHAR: u16 = 0x007E;

pub mod fs_selection {
    pub const ITALIC: u16 = 1 << 0;
    pub const BOLD: u16 = 1 << 5;
    pub const REGULAR: u16 = 1 << 6;
}


/// A font [weight](https://docs.microsoft.com/en-us/typography/opentype/spec/os2#usweightclass).
#[derive(Clone, Copy, PartialEq, Debug)]
#[allow(missing_docs)]
pub enum Weight {
    Thin,
    ExtraLight,
    Light,
    Normal,
    Medium,
    SemiBold,
    Bold,
    ExtraBold,
    Black,
}

impl Weight {
    /// Returns a numeric representation of a weight.
    #[inline]
    pub fn to_number(self) -> u16 {
        match self {
            Weight::Thin        => 100,
            Weight::ExtraLight  => 200,
            Weight::Light       => 300,
            Weight::Normal      => 400,
            Weight::Medium      => 500,
            Weight::SemiBold    => 600,
            Weight::Bold        => 700,
            Weight::ExtraBold   => 800,
            Weight::Black       => 900,
        }
    }
}

impl Default for Weight {
    #[inline]
    fn default() -> Self {
        Weight::Normal
    }
}


/// Style bits derived from a subfamily name like `Bold Italic`.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Style {
    pub weight: Weight,
    pub italic: bool,
}

impl Style {
    pub fn from_name(name: &str) -> Self {
        let name = name.to_ascii_lowercase().replace(|c: char| c == ' ' || c == '-', "");

        // Longest names first, so `semibold` doesn't match `bold`.
        let weights = [
            ("extralight", Weight::ExtraLight),
            ("ultralight", Weight::ExtraLight),
            ("extrabold", Weight::ExtraBold),
            ("ultrabold", Weight::ExtraBold),
            ("semibold", Weight::SemiBold),
            ("demibold", Weight::SemiBold),
            ("medium", Weight::Medium),
            ("black", Weight::Black),
            ("heavy", Weight::Black),
            ("light", Weight::Light),
            ("thin", Weight::Thin),
            ("bold", Weight::Bold),
        ];

        let weight = weights.iter()
            .find(|(s, _)| name.contains(s))
            .map(|(_, w)| *w)
            .unwrap_or_default();

        Style {
            weight,
            italic: name.contains("italic") || name.contains("oblique"),
        }
    }

    pub fn fs_selection(&self) -> u16 {
        let mut flags = 0;
        if self.italic {
            flags |= fs_selection::ITALIC;
        }

        if self.weight == Weight::Bold {
            flags |= fs_selection::BOLD;
        }

        if flags == 0 {
            flags = fs_selection::REGULAR;
        }

        flags
    }

    pub fn mac_style(&self) -> u16 {
        let mut flags = 0;
        if self.italic {
            flags |= mac_style::ITALIC;
        }

        if self.weight == Weight::Bold {
            flags |= mac_style::BOLD;
        }

        flags
    }
}

impl Default for Style {
    fn default() -> Self {
        Style { weight: Weight::Normal, italic: false }
    }
}


/// Version 4 table.
#[derive(Clone, Copy, Debug)]
pub struct Table {
    pub units_per_em: u16,
    pub x_avg_char_width: i16,
    pub style: Style,
    /// The smallest and the largest mapped code point.
    pub char_range: Option<(u32, u32)>,
    pub ascender: i16,
    pub descender: i16,
    pub win_ascent: u16,
    pub win_descent: u16,
    pub x_height: i16,
    pub cap_height: i16,
}

impl Table {
    pub fn write(&self, w: &mut Writer) {
        let scale = |n: f64| -> i16 {
            round_half_up(n * f64::from(self.units_per_em) / 1000.0) as i16
        };

        let (first_char, last_char) = match self.char_range {
            Some((first, last)) => (clamp_char(first), clamp_char(last)),
            None => (DEFAULT_FIRST_CHAR, DEFAULT_LAST_CHAR),
        };

        w.write(4u16); // version
        w.write(self.x_avg_char_width);
        w.write(self.style.weight.to_number());
        w.write(5u16); // width class: normal
        w.write(0u16); // type: installable embedding
        w.write(scale(650.0)); // subscript x size
        w.write(scale(600.0)); // subscript y size
        w.write(0i16); // subscript x offset
        w.write(scale(75.0)); // subscript y offset
        w.write(scale(650.0)); // superscript x size
        w.write(scale(600.0)); // superscript y size
        w.write(0i16); // superscript x offset
        w.write(scale(350.0)); // superscript y offset
        w.write(scale(50.0)); // strikeout size
        w.write(scale(300.0)); // strikeout position
        w.write(0i16); // family class
        w.extend(&[0; 10]); // panose
        w.write(0u32); // unicode range 1
        w.write(0u32); // unicode range 2
        w.write(0u32); // unicode range 3
        w.write(0u32); // unicode range 4
        w.write(VENDOR_ID);
        w.write(self.style.fs_selection());
        w.write(first_char);
        w.write(last_char);
        w.write(self.ascender); // typo ascender
        w.write(self.descender); // typo descender
        w.write(0i16); // typo line gap
        w.write(self.win_ascent);
        w.write(self.win_descent);
        w.write(CODE_PAGE_RANGE_1);
        w.write(0u32); // code page range 2
        w.write(self.x_height);
        w.write(self.cap_height);
        w.write(0u16); // default char
        w.write(0x0020u16); // break char
        w.write(0u16); // max context
    }

    pub fn to_vec(&self) -> Vec<u8> {
        let mut w = Writer::with_capacity(TABLE_SIZE);
        self.write(&mut w);
        w.finish()
    }
}

fn clamp_char(c: u32) -> u16 {
    c.min(0xFFFF) as u16
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::{self, TtfType::*};

    #[test]
    fn styles() {
        let style = Style::from_name("Regular");
        assert_eq!(style, Style::default());
        assert_eq!(style.fs_selection(), fs_selection::REGULAR);
        assert_eq!(style.mac_style(), 0);

        let style = Style::from_name("Bold Italic");
        assert_eq!(style.weight, Weight::Bold);
        assert!(style.italic);
        assert_eq!(style.fs_selection(), fs_selection::BOLD | fs_selection::ITALIC);
        assert_eq!(style.mac_style(), mac_style::BOLD | mac_style::ITALIC);

        let style = Style::from_name("SemiBold");
        assert_eq!(style.weight, Weight::SemiBold);
        assert_eq!(style.fs_selection(), fs_selection::REGULAR);

        assert_eq!(Style::from_name("Extra-Light").weight, Weight::ExtraLight);
        assert_eq!(Style::from_name("Oblique").fs_selection(), fs_selection::ITALIC);
    }

    #[test]
    fn version_4() {
        let table = Table {
            units_per_em: 1000,
            x_avg_char_width: 500,
            style: Style::default(),
            char_range: Some((0x41, 0x1F600)),
            ascender: 800,
            descender: -200,
            win_ascent: 800,
            win_descent: 200,
            x_height: 500,
            cap_height: 700,
        };

        let data = table.to_vec();
        assert_eq!(data.len(), TABLE_SIZE);
        assert_eq!(data, writer::convert(&[
            UInt16(4), // version
            Int16(500), // average char width
            UInt16(400), // weight class
            UInt16(5), // width class
            UInt16(0), // type
            Int16(650), // subscript x size
            Int16(600), // subscript y size
            Int16(0), // subscript x offset
            Int16(75), // subscript y offset
            Int16(650), // superscript x size
            Int16(600), // superscript y size
            Int16(0), // superscript x offset
            Int16(350), // superscript y offset
            Int16(50), // strikeout size
            Int16(300), // strikeout position
            Int16(0), // family class
            Raw(&[0; 10]), // panose
            UInt32(0), // unicode range 1
            UInt32(0), // unicode range 2
            UInt32(0), // unicode range 3
            UInt32(0), // unicode range 4
            Raw(b"NONE"), // vendor ID
            UInt16(0x40), // selection
            UInt16(0x41), // first char index
            UInt16(0xFFFF), // last char index
            Int16(800), // typo ascender
            Int16(-200), // typo descender
            Int16(0), // typo line gap
            UInt16(800), // win ascent
            UInt16(200), // win descent
            UInt32(1), // code page range 1
            UInt32(0), // code page range 2
            Int16(500), // x height
            Int16(700), // cap height
            UInt16(0), // default char
            UInt16(0x20), // break char
            UInt16(0), // max context
        ]));
    }

    #[test]
    fn scaled_to_em() {
        let table = Table {
            units_per_em: 2048,
            x_avg_char_width: 0,
            style: Style::default(),
            char_range: None,
            ascender: 1638,
            descender: -410,
            win_ascent: 1638,
            win_descent: 410,
            x_height: 1024,
            cap_height: 1434,
        };

        let data = table.to_vec();
        // subscript x size
        assert_eq!(&data[10..12], &1331i16.to_be_bytes());
        // first and last char index
        assert_eq!(&data[64..68], &[0x00, 0x20, 0x00, 0x7E]);
    }
}
