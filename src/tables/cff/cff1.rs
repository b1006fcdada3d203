// Useful links:
// http://wwwimages.adobe.com/content/dam/Adobe/en/devnet/font/pdfs/5176.CFF.pdf
// http://wwwimages.adobe.com/content/dam/Adobe/en/devnet/font/pdfs/5177.Type2.pdf
// https://github.com/opentypejs/opentype.js/blob/master/src/tables/cff.js

use core::convert::TryFrom;
use core::ops::Range;
use std::borrow::Cow;

use crate::{OutlineBuilder, Rect};
use crate::parser::{LazyArray16, Stream};
use crate::writer::Writer;
use super::{CFFError, StringId, parse_header};
use super::charset::{Charset, parse_charset, write_charset};
use super::charstring::{CharStringContext, CharStringInfo, parse_char_string};
use super::dict::{self, DictionaryParser, MAX_OPERANDS_LEN};
use super::index::{DataIndex, index_size, parse_index, write_index};
use super::std_names::{STANDARD_NAMES, standard_sid};

/// Enumerates some operators defined in the Adobe Technical Note #5176,
/// Table 9 Top DICT Operator Entries
mod top_dict_operator {
    pub const FULL_NAME: u16                    = 2;
    pub const FAMILY_NAME: u16                  = 3;
    pub const WEIGHT: u16                       = 4;
    pub const FONT_BBOX: u16                    = 5;
    pub const CHARSET_OFFSET: u16               = 15;
    pub const CHAR_STRINGS_OFFSET: u16          = 17;
    pub const PRIVATE_DICT_SIZE_AND_OFFSET: u16 = 18;
    pub const ROS: u16                          = 1230;
    pub const FD_ARRAY: u16                     = 1236;
    pub const FD_SELECT: u16                    = 1237;
}

/// Enumerates some operators defined in the Adobe Technical Note #5176,
/// Table 23 Private DICT Operators
mod private_dict_operator {
    pub const LOCAL_SUBROUTINES_OFFSET: u16 = 19;
    pub const DEFAULT_WIDTH: u16            = 20;
    pub const NOMINAL_WIDTH: u16            = 21;
}

/// Enumerates Charset IDs defined in the Adobe Technical Note #5176, Table 22
mod charset_id {
    pub const ISO_ADOBE: usize = 0;
    pub const EXPERT: usize = 1;
    pub const EXPERT_SUBSET: usize = 2;
}


/// Reasons a CFF program can't be used at all.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum CffParseError {
    UnsupportedVersion(u8),
    NoFonts,
    NoCharStrings,
    Malformed,
}

impl core::fmt::Display for CffParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match *self {
            CffParseError::UnsupportedVersion(major) => {
                write!(f, "unsupported CFF major version {}", major)
            }
            CffParseError::NoFonts => {
                write!(f, "no fonts found in CFF data")
            }
            CffParseError::NoCharStrings => {
                write!(f, "CFF font has no CharStrings")
            }
            CffParseError::Malformed => {
                write!(f, "malformed CFF data")
            }
        }
    }
}

impl std::error::Error for CffParseError {}


#[derive(Clone, Copy, Default, Debug)]
struct PrivateDict<'a> {
    default_width: Option<f64>,
    nominal_width: f64,
    local_subrs: Option<DataIndex<'a>>,
}

#[derive(Clone, Copy, Debug)]
pub struct Metadata<'a> {
    // The whole CFF table.
    // Used to resolve a local subroutine in a CID font.
    table_data: &'a [u8],

    names: DataIndex<'a>,
    strings: DataIndex<'a>,
    global_subrs: DataIndex<'a>,
    charset: Option<Charset<'a>>,
    char_strings: DataIndex<'a>,
    kind: FontKind<'a>,
}

#[derive(Clone, Copy, Debug)]
pub enum FontKind<'a> {
    SID(SIDMetadata<'a>),
    CID(CIDMetadata<'a>),
}

#[derive(Clone, Copy, Default, Debug)]
pub struct SIDMetadata<'a> {
    private: PrivateDict<'a>,
}

#[derive(Clone, Copy, Default, Debug)]
pub struct CIDMetadata<'a> {
    fd_array: DataIndex<'a>,
    fd_select: Option<FDSelect<'a>>,
}

/// Advance width and bounds of a single glyph.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct GlyphMetrics {
    pub advance: f64,
    pub bbox: Option<Rect>,
}

impl<'a> Metadata<'a> {
    /// Parses the first font of a CFF FontSet.
    pub fn parse(data: &'a [u8]) -> Result<Self, CffParseError> {
        let (major, mut s) = parse_header(data).ok_or(CffParseError::Malformed)?;
        if major != 1 {
            return Err(CffParseError::UnsupportedVersion(major));
        }

        let names = parse_index(&mut s).ok_or(CffParseError::Malformed)?;
        if names.len() == 0 {
            return Err(CffParseError::NoFonts);
        }

        let top_dict = parse_top_dict(&mut s).ok_or(CffParseError::Malformed)?;

        // Must be set, otherwise there are nothing to parse.
        if top_dict.char_strings_offset == 0 {
            return Err(CffParseError::NoCharStrings);
        }

        // String INDEX.
        let strings = parse_index(&mut s).ok_or(CffParseError::Malformed)?;

        // Parse Global Subroutines INDEX.
        let global_subrs = parse_index(&mut s).unwrap_or_default();

        let char_strings = Stream::new_at(data, top_dict.char_strings_offset)
            .and_then(|mut s| parse_index(&mut s))
            .ok_or(CffParseError::Malformed)?;

        if char_strings.len() == 0 {
            return Err(CffParseError::NoCharStrings);
        }

        // 'The number of glyphs is the value of the count field in the CharStrings INDEX.'
        let number_of_glyphs = u16::try_from(char_strings.len())
            .map_err(|_| CffParseError::Malformed)?;

        let charset = match top_dict.charset_offset {
            // 'There are no predefined charsets for CID fonts.'
            // Adobe Technical Note #5176, chapter 18 CID-keyed Fonts
            Some(n) if top_dict.has_ros && n <= charset_id::EXPERT_SUBSET => None,
            Some(charset_id::ISO_ADOBE) => Some(Charset::ISOAdobe),
            Some(charset_id::EXPERT) => Some(Charset::Expert),
            Some(charset_id::EXPERT_SUBSET) => Some(Charset::ExpertSubset),
            Some(offset) => {
                Stream::new_at(data, offset).and_then(|mut s| parse_charset(number_of_glyphs, &mut s))
            }
            None if top_dict.has_ros => None,
            None => Some(Charset::ISOAdobe), // default
        };

        if charset.is_none() {
            warn!("CFF charset is missing or malformed. Glyph names will be synthesized.");
        }

        let kind = if top_dict.has_ros {
            parse_cid_metadata(data, &top_dict, number_of_glyphs)
        } else {
            parse_sid_metadata(data, &top_dict)
        };

        Ok(Metadata {
            table_data: data,
            names,
            strings,
            global_subrs,
            charset,
            char_strings,
            kind,
        })
    }

    /// Returns the number of glyphs.
    #[inline]
    pub fn number_of_glyphs(&self) -> u16 {
        // Already checked during parsing.
        self.char_strings.len() as u16
    }

    #[inline]
    pub fn is_cid(&self) -> bool {
        matches!(self.kind, FontKind::CID(_))
    }

    /// The first entry of the Name INDEX.
    pub fn font_name(&self) -> Option<Cow<'a, str>> {
        self.names.get(0).map(String::from_utf8_lossy)
    }

    /// Returns a glyph name, if the charset defines one.
    ///
    /// CID-keyed fonts get `cid` + the zero-padded CID.
    pub fn glyph_name(&self, glyph_id: u16) -> Option<String> {
        if glyph_id == 0 {
            return Some(String::from(".notdef"));
        }

        let sid = self.charset?.gid_to_sid(glyph_id)?;
        match self.kind {
            FontKind::SID(_) => {
                let sid = usize::from(sid.0);
                match STANDARD_NAMES.get(sid) {
                    Some(name) => Some(String::from(*name)),
                    None => {
                        let idx = u32::try_from(sid - STANDARD_NAMES.len()).ok()?;
                        let name = self.strings.get(idx)?;
                        core::str::from_utf8(name).ok().map(String::from)
                    }
                }
            }
            FontKind::CID(_) => Some(format!("cid{:05}", sid.0)),
        }
    }

    /// Returns names for all glyphs, in glyph id order.
    ///
    /// Glyphs without a name get `glyph<id>`.
    pub fn glyph_names(&self) -> Vec<String> {
        (0..self.number_of_glyphs())
            .map(|gid| self.glyph_name(gid).unwrap_or_else(|| format!("glyph{}", gid)))
            .collect()
    }

    /// Returns the `defaultWidthX` of the font, or of the first Font DICT for CID fonts.
    pub fn default_width(&self) -> Option<f64> {
        self.private_dict(0).default_width
    }

    /// Interprets a glyph's charstring and returns its advance and bounds.
    ///
    /// `fallback_width` is used when neither the charstring nor
    /// the Private DICT define a width.
    pub fn glyph_metrics(
        &self,
        glyph_id: u16,
        fallback_width: f64,
    ) -> Result<GlyphMetrics, CFFError> {
        let data = self.char_strings.get(u32::from(glyph_id)).ok_or(CFFError::ReadOutOfBounds)?;
        let private = self.private_dict(glyph_id);
        let ctx = CharStringContext {
            global_subrs: self.global_subrs,
            local_subrs: private.local_subrs,
            char_strings: self.char_strings,
            charset: self.charset.unwrap_or(Charset::ISOAdobe),
        };

        let info: CharStringInfo = parse_char_string(&ctx, data, &mut NullBuilder)?;
        let advance = match info.width {
            Some(w) => private.nominal_width + f64::from(w),
            None => private.default_width.unwrap_or(fallback_width),
        };

        let bbox = if info.bbox.is_default() { None } else { info.bbox.to_rect() };
        Ok(GlyphMetrics { advance, bbox })
    }

    /// Interprets a glyph's charstring, forwarding its outline to `builder`.
    pub fn outline(&self, glyph_id: u16, builder: &mut dyn OutlineBuilder) -> Result<(), CFFError> {
        let data = self.char_strings.get(u32::from(glyph_id)).ok_or(CFFError::ReadOutOfBounds)?;
        let ctx = CharStringContext {
            global_subrs: self.global_subrs,
            local_subrs: self.private_dict(glyph_id).local_subrs,
            char_strings: self.char_strings,
            charset: self.charset.unwrap_or(Charset::ISOAdobe),
        };

        parse_char_string(&ctx, data, builder).map(|_| ())
    }

    /// In CID fonts, to get a Private DICT we have to:
    ///   1. Find Font DICT index via FDSelect by GID.
    ///   2. Get Font DICT data from FDArray using this index.
    ///   3. Get a Private DICT offset from a Font DICT.
    ///   4. Parse the Private DICT and its local subroutines.
    fn private_dict(&self, glyph_id: u16) -> PrivateDict<'a> {
        match self.kind {
            FontKind::SID(ref sid) => sid.private,
            FontKind::CID(ref cid) => {
                let font_dict_index = cid.fd_select
                    .and_then(|fd_select| fd_select.font_dict_index(glyph_id))
                    .unwrap_or(0);

                cid.fd_array.get(u32::from(font_dict_index))
                    .and_then(parse_font_dict)
                    .map(|range| parse_private_dict(self.table_data, range))
                    .unwrap_or_default()
            }
        }
    }
}

struct NullBuilder;

impl OutlineBuilder for NullBuilder {
    fn move_to(&mut self, _: f32, _: f32) {}
    fn line_to(&mut self, _: f32, _: f32) {}
    fn curve_to(&mut self, _: f32, _: f32, _: f32, _: f32, _: f32, _: f32) {}
    fn close(&mut self) {}
}

fn parse_sid_metadata<'a>(data: &'a [u8], top_dict: &TopDict) -> FontKind<'a> {
    let private = match top_dict.private_dict_range.clone() {
        Some(range) => parse_private_dict(data, range),
        None => PrivateDict::default(),
    };

    FontKind::SID(SIDMetadata { private })
}

fn parse_cid_metadata<'a>(data: &'a [u8], top_dict: &TopDict, number_of_glyphs: u16) -> FontKind<'a> {
    let mut metadata = CIDMetadata::default();

    if let Some(offset) = top_dict.fd_array_offset {
        metadata.fd_array = Stream::new_at(data, offset)
            .and_then(|mut s| parse_index(&mut s))
            .unwrap_or_default();
    }

    if let Some(offset) = top_dict.fd_select_offset {
        metadata.fd_select = Stream::new_at(data, offset)
            .and_then(|mut s| parse_fd_select(number_of_glyphs, &mut s));
    }

    if metadata.fd_array.len() == 0 {
        warn!("CID-keyed CFF has no FDArray. Default widths will be used.");
    }

    FontKind::CID(metadata)
}

#[derive(Default)]
struct TopDict {
    charset_offset: Option<usize>,
    char_strings_offset: usize,
    private_dict_range: Option<Range<usize>>,
    has_ros: bool,
    fd_array_offset: Option<usize>,
    fd_select_offset: Option<usize>,
}

fn parse_top_dict(s: &mut Stream) -> Option<TopDict> {
    let mut top_dict = TopDict::default();

    let index = parse_index(s)?;

    // The Top DICT INDEX should have only one dictionary.
    let data = index.get(0)?;

    let mut operands_buffer = [0.0; MAX_OPERANDS_LEN];
    let mut dict_parser = DictionaryParser::new(data, &mut operands_buffer);
    while let Some(operator) = dict_parser.parse_next() {
        match operator.get() {
            top_dict_operator::CHARSET_OFFSET => {
                top_dict.charset_offset = dict_parser.parse_offset();
            }
            top_dict_operator::CHAR_STRINGS_OFFSET => {
                top_dict.char_strings_offset = dict_parser.parse_offset()?;
            }
            top_dict_operator::PRIVATE_DICT_SIZE_AND_OFFSET => {
                top_dict.private_dict_range = dict_parser.parse_range();
            }
            top_dict_operator::ROS => {
                top_dict.has_ros = true;
            }
            top_dict_operator::FD_ARRAY => {
                top_dict.fd_array_offset = dict_parser.parse_offset();
            }
            top_dict_operator::FD_SELECT => {
                top_dict.fd_select_offset = dict_parser.parse_offset();
            }
            _ => {}
        }
    }

    Some(top_dict)
}

fn parse_private_dict(data: &[u8], range: Range<usize>) -> PrivateDict<'_> {
    let mut private = PrivateDict::default();
    let dict_data = match data.get(range.clone()) {
        Some(v) => v,
        None => return private,
    };

    let mut subroutines_offset = None;
    let mut operands_buffer = [0.0; MAX_OPERANDS_LEN];
    let mut dict_parser = DictionaryParser::new(dict_data, &mut operands_buffer);
    while let Some(operator) = dict_parser.parse_next() {
        match operator.get() {
            private_dict_operator::LOCAL_SUBROUTINES_OFFSET => {
                subroutines_offset = dict_parser.parse_offset();
            }
            private_dict_operator::DEFAULT_WIDTH => {
                private.default_width = dict_parser.parse_number();
            }
            private_dict_operator::NOMINAL_WIDTH => {
                private.nominal_width = dict_parser.parse_number().unwrap_or(0.0);
            }
            _ => {}
        }
    }

    // 'The local subroutines offset is relative to the beginning
    // of the Private DICT data.'
    if let Some(offset) = subroutines_offset {
        private.local_subrs = range.start.checked_add(offset)
            .and_then(|start| Stream::new_at(data, start))
            .and_then(|mut s| parse_index(&mut s));
    }

    private
}

fn parse_font_dict(data: &[u8]) -> Option<Range<usize>> {
    let mut operands_buffer = [0.0; MAX_OPERANDS_LEN];
    let mut dict_parser = DictionaryParser::new(data, &mut operands_buffer);
    while let Some(operator) = dict_parser.parse_next() {
        if operator.get() == top_dict_operator::PRIVATE_DICT_SIZE_AND_OFFSET {
            return dict_parser.parse_range();
        }
    }

    None
}


#[derive(Clone, Copy, Debug)]
enum FDSelect<'a> {
    Format0(LazyArray16<'a, u8>),
    Format3(&'a [u8]), // It's easier to parse it in-place.
}

impl FDSelect<'_> {
    fn font_dict_index(&self, glyph_id: u16) -> Option<u8> {
        match self {
            FDSelect::Format0(ref array) => array.get(glyph_id),
            FDSelect::Format3(ref data) => {
                let mut s = Stream::new(data);
                let number_of_ranges: u16 = s.read()?;
                if number_of_ranges == 0 {
                    return None;
                }

                // 'A sentinel GID follows the last range element and serves
                // to delimit the last range in the array.'
                // So we can simply increase the number of ranges by one.
                let number_of_ranges = number_of_ranges.checked_add(1)?;

                // Range is: GlyphId + u8
                let mut prev_first_glyph: u16 = s.read()?;
                let mut prev_index: u8 = s.read()?;
                for _ in 1..number_of_ranges {
                    let curr_first_glyph: u16 = s.read()?;
                    if (prev_first_glyph..curr_first_glyph).contains(&glyph_id) {
                        return Some(prev_index);
                    } else {
                        prev_index = s.read()?;
                    }

                    prev_first_glyph = curr_first_glyph;
                }

                None
            }
        }
    }
}

fn parse_fd_select<'a>(number_of_glyphs: u16, s: &mut Stream<'a>) -> Option<FDSelect<'a>> {
    let format: u8 = s.read()?;
    match format {
        0 => Some(FDSelect::Format0(s.read_array16(number_of_glyphs)?)),
        3 => Some(FDSelect::Format3(s.tail()?)),
        _ => None,
    }
}


/// Custom strings of a font being compiled.
#[derive(Default)]
struct StringTable<'a> {
    custom: Vec<&'a str>,
}

impl<'a> StringTable<'a> {
    fn sid(&mut self, name: &'a str) -> StringId {
        if let Some(sid) = standard_sid(name) {
            return StringId(sid);
        }

        let idx = match self.custom.iter().position(|n| *n == name) {
            Some(idx) => idx,
            None => {
                self.custom.push(name);
                self.custom.len() - 1
            }
        };

        StringId((STANDARD_NAMES.len() + idx) as u16)
    }
}

/// Compiles a single-font, name-keyed CFF table.
///
/// The first glyph must be `.notdef`.
/// Charstrings are stored as is and must use a `nominalWidthX` of 0.
#[derive(Debug)]
pub struct CffBuilder<'a> {
    pub font_name: &'a str,
    pub full_name: &'a str,
    pub family_name: &'a str,
    pub weight: &'a str,
    pub font_bbox: Rect,
    pub glyphs: Vec<(&'a str, &'a [u8])>,
}

impl<'a> CffBuilder<'a> {
    pub fn build(&self) -> Vec<u8> {
        let mut strings = StringTable::default();
        let full_name = strings.sid(self.full_name);
        let family_name = strings.sid(self.family_name);
        let weight = strings.sid(self.weight);
        let glyph_sids: Vec<StringId> = self.glyphs.iter()
            .skip(1)
            .map(|(name, _)| strings.sid(name))
            .collect();

        let mut name_index = Writer::new();
        write_index(&[self.font_name.as_bytes()], &mut name_index);

        let mut string_index = Writer::new();
        let custom: Vec<&[u8]> = strings.custom.iter().map(|s| s.as_bytes()).collect();
        write_index(&custom, &mut string_index);

        let mut charset = Writer::new();
        write_charset(&glyph_sids, &mut charset);

        let mut char_strings = Writer::new();
        let glyph_data: Vec<&[u8]> = self.glyphs.iter().map(|(_, data)| *data).collect();
        write_index(&glyph_data, &mut char_strings);

        let mut private = Writer::new();
        dict::write_int(0, &mut private.data);
        dict::write_operator(private_dict_operator::DEFAULT_WIDTH, &mut private);
        dict::write_int(0, &mut private.data);
        dict::write_operator(private_dict_operator::NOMINAL_WIDTH, &mut private);

        let top_dict = |charset_offset: usize, char_strings_offset: usize, private_offset: usize| {
            let mut w = Writer::new();
            dict::write_int(i32::from(full_name.0), &mut w.data);
            dict::write_operator(top_dict_operator::FULL_NAME, &mut w);
            dict::write_int(i32::from(family_name.0), &mut w.data);
            dict::write_operator(top_dict_operator::FAMILY_NAME, &mut w);
            dict::write_int(i32::from(weight.0), &mut w.data);
            dict::write_operator(top_dict_operator::WEIGHT, &mut w);
            dict::write_int(i32::from(self.font_bbox.x_min), &mut w.data);
            dict::write_int(i32::from(self.font_bbox.y_min), &mut w.data);
            dict::write_int(i32::from(self.font_bbox.x_max), &mut w.data);
            dict::write_int(i32::from(self.font_bbox.y_max), &mut w.data);
            dict::write_operator(top_dict_operator::FONT_BBOX, &mut w);
            // Offsets use the fixed size encoding, so the DICT size is known up front.
            dict::write_long_int(charset_offset as i32, &mut w.data);
            dict::write_operator(top_dict_operator::CHARSET_OFFSET, &mut w);
            dict::write_long_int(char_strings_offset as i32, &mut w.data);
            dict::write_operator(top_dict_operator::CHAR_STRINGS_OFFSET, &mut w);
            dict::write_long_int(private.data.len() as i32, &mut w.data);
            dict::write_long_int(private_offset as i32, &mut w.data);
            dict::write_operator(top_dict_operator::PRIVATE_DICT_SIZE_AND_OFFSET, &mut w);
            w.data
        };

        const HEADER_SIZE: usize = 4;
        const EMPTY_INDEX_SIZE: usize = 2;

        let top_dict_size = index_size(&[top_dict(0, 0, 0)]);
        let charset_offset = HEADER_SIZE
            + name_index.data.len()
            + top_dict_size
            + string_index.data.len()
            + EMPTY_INDEX_SIZE; // Global Subrs
        let char_strings_offset = charset_offset + charset.data.len();
        let private_offset = char_strings_offset + char_strings.data.len();

        let mut w = Writer::with_capacity(private_offset + private.data.len());
        // Header
        w.write(1u8); // major version
        w.write(0u8); // minor version
        w.write(HEADER_SIZE as u8); // header size
        w.write(4u8); // absolute offset size
        w.extend(&name_index.data);
        write_index(&[top_dict(charset_offset, char_strings_offset, private_offset)], &mut w);
        w.extend(&string_index.data);
        w.write(0u16); // Global Subrs count
        debug_assert_eq!(w.offset(), charset_offset);
        w.extend(&charset.data);
        w.extend(&char_strings.data);
        debug_assert_eq!(w.offset(), private_offset);
        w.extend(&private.data);
        w.finish()
    }
}
