//! Code point to glyph mapping reconstruction.

use std::collections::BTreeMap;

use core::convert::TryFrom;

use serde::Deserialize;

use crate::glyph_order::{GlyphOrder, NOTDEF};

const PRIVATE_USE_START: u32 = 0xF000;
const PRIVATE_USE_END: u32 = 0xF8FF;

// Longer `bfrange` entries are treated as corrupt.
const MAX_RANGE_LEN: u32 = 0xFFFF;

/// Where a mapping came from.
///
/// Sources are ordered by priority, from the lowest to the highest.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum MappingSource {
    PrivateUse,
    GlyphName,
    CharCode,
    ToUnicode,
    ExplicitUnicode,
}

/// A glyph claiming a code point.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Claim {
    pub glyph: String,
    pub source: MappingSource,
}

/// Checks that a code point is a Unicode scalar value.
#[inline]
pub fn is_scalar_value(code_point: u32) -> bool {
    core::char::from_u32(code_point).is_some()
}


/// A code point to glyph name map.
///
/// Each code point is claimed by one glyph. A new claim replaces
/// an existing one only when its source has the same or a higher priority.
#[derive(Clone, Default, Debug)]
pub struct CodepointMap {
    claims: BTreeMap<u32, Claim>,
}

impl CodepointMap {
    #[inline]
    pub fn new() -> Self {
        CodepointMap::default()
    }

    /// Claims a code point for a glyph.
    ///
    /// Returns `true` when the claim was accepted.
    pub fn claim(&mut self, code_point: u32, glyph: &str, source: MappingSource) -> bool {
        if !is_scalar_value(code_point) {
            warn!("U+{:04X} is not a Unicode scalar value. Skipped.", code_point);
            return false;
        }

        if let Some(existing) = self.claims.get(&code_point) {
            if existing.glyph == glyph {
                if source > existing.source {
                    self.claims.insert(code_point, Claim { glyph: String::from(glyph), source });
                }

                return true;
            }

            if source < existing.source {
                log::debug!(
                    "U+{:04X} stays mapped to '{}' ({:?}). '{}' ({:?}) rejected.",
                    code_point, existing.glyph, existing.source, glyph, source,
                );
                return false;
            }

            log::debug!(
                "U+{:04X} remapped from '{}' ({:?}) to '{}' ({:?}).",
                code_point, existing.glyph, existing.source, glyph, source,
            );
        }

        self.claims.insert(code_point, Claim { glyph: String::from(glyph), source });
        true
    }

    /// Claims a code point only when nobody has claimed it yet.
    pub fn claim_vacant(&mut self, code_point: u32, glyph: &str, source: MappingSource) -> bool {
        if self.claims.contains_key(&code_point) {
            return false;
        }

        self.claim(code_point, glyph, source)
    }

    #[inline]
    pub fn get(&self, code_point: u32) -> Option<&Claim> {
        self.claims.get(&code_point)
    }

    #[inline]
    pub fn contains(&self, code_point: u32) -> bool {
        self.claims.contains_key(&code_point)
    }

    /// Checks that a glyph has at least one code point.
    pub fn is_mapped(&self, glyph: &str) -> bool {
        self.claims.values().any(|c| c.glyph == glyph)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.claims.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &Claim)> + '_ {
        self.claims.iter().map(|(c, claim)| (*c, claim))
    }

    /// Resolves glyph names into glyph ids.
    ///
    /// Claims of glyphs missing from `order` are skipped.
    pub fn to_glyph_ids(&self, order: &GlyphOrder) -> BTreeMap<u32, u16> {
        let mut mapping = BTreeMap::new();
        for (code_point, claim) in self.iter() {
            match order.glyph_id(&claim.glyph) {
                Some(id) => { mapping.insert(code_point, id); }
                None => {
                    warn!("U+{:04X} is mapped to an unknown glyph '{}'.", code_point, claim.glyph);
                }
            }
        }

        mapping
    }
}


/// Hands out private-use code points for glyphs without any.
///
/// Code points are allocated sequentially from U+F000,
/// skipping those already claimed.
#[derive(Clone, Copy, Debug)]
pub struct PrivateUseAllocator {
    next: u32,
}

impl Default for PrivateUseAllocator {
    fn default() -> Self {
        PrivateUseAllocator { next: PRIVATE_USE_START }
    }
}

impl PrivateUseAllocator {
    #[inline]
    pub fn new() -> Self {
        PrivateUseAllocator::default()
    }

    /// Returns the next free code point.
    ///
    /// Returns `None` when the private-use block is exhausted.
    pub fn allocate(&mut self, map: &CodepointMap) -> Option<u32> {
        while self.next <= PRIVATE_USE_END {
            let code_point = self.next;
            self.next += 1;
            if !map.contains(code_point) {
                return Some(code_point);
            }
        }

        None
    }
}


/// How glyph ids of an external mapping are turned into glyph names.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum NamingConvention {
    /// Glyphs are named `cid` + CID, so ids are CIDs.
    Cid,
    /// Ids are indices into the glyph order.
    Direct,
}

impl NamingConvention {
    /// Detects the convention from the first five glyphs after `.notdef`.
    pub fn detect(order: &GlyphOrder) -> Self {
        let is_cid = order.names().iter()
            .filter(|name| name.as_str() != NOTDEF)
            .take(5)
            .any(|name| is_cid_name(name));

        if is_cid {
            NamingConvention::Cid
        } else {
            NamingConvention::Direct
        }
    }

    /// Returns the name of the glyph an external id refers to.
    ///
    /// CID-keyed names are tried zero-padded first. `.notdef` is never returned.
    pub fn resolve<'a>(&self, id: u32, order: &'a GlyphOrder) -> Option<&'a str> {
        let glyph_id = match self {
            NamingConvention::Cid => {
                let padded = format!("cid{:05}", id);
                let plain = format!("cid{}", id);
                order.glyph_id(&padded).or_else(|| order.glyph_id(&plain))?
            }
            NamingConvention::Direct => u16::try_from(id).ok()?,
        };

        if glyph_id == 0 {
            return None;
        }

        order.name(glyph_id)
    }
}

fn is_cid_name(name: &str) -> bool {
    match name.strip_prefix("cid") {
        Some(digits) => !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}


/// Parses a `uniXXXX` or `uXXXX`..`uXXXXXX` glyph name.
pub fn code_point_from_name(name: &str) -> Option<u32> {
    let hex = if let Some(hex) = name.strip_prefix("uni") {
        if hex.len() != 4 {
            return None;
        }

        hex
    } else if let Some(hex) = name.strip_prefix('u') {
        if hex.len() < 4 || hex.len() > 6 {
            return None;
        }

        hex
    } else {
        return None;
    };

    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    let code_point = u32::from_str_radix(hex, 16).ok()?;
    if is_scalar_value(code_point) { Some(code_point) } else { None }
}

/// Maps glyphs with Unicode-derived names to their code points,
/// unless the code point is already claimed.
///
/// Returns the number of new mappings.
pub fn claim_glyph_names(order: &GlyphOrder, map: &mut CodepointMap) -> usize {
    let mut count = 0;
    for name in order.names() {
        if let Some(code_point) = code_point_from_name(name) {
            if map.claim_vacant(code_point, name, MappingSource::GlyphName) {
                count += 1;
            }
        }
    }

    count
}


/// An external glyph id to Unicode mapping.
#[derive(Clone, Default, PartialEq, Eq, Debug)]
pub struct ExternalMapping {
    /// As declared by a JSON mapping. `None` for ToUnicode data.
    pub is_cid: Option<bool>,
    /// Glyph ids or CIDs with their code points, in file order.
    pub entries: Vec<(u32, u32)>,
}

impl ExternalMapping {
    /// Parses either a JSON mapping or a ToUnicode CMap.
    ///
    /// Invalid content results in an empty mapping.
    pub fn parse(data: &[u8]) -> Self {
        let text = String::from_utf8_lossy(data);
        if text.trim_start().starts_with('{') {
            if let Some(mapping) = parse_json(text.as_bytes()) {
                return mapping;
            }

            warn!("Mapping looks like JSON but can't be parsed. Trying ToUnicode.");
        }

        ExternalMapping {
            is_cid: None,
            entries: parse_to_unicode(&text),
        }
    }

    /// Claims all entries that resolve to a glyph.
    ///
    /// Returns the number of entries that matched no glyph.
    pub fn apply(
        &self,
        order: &GlyphOrder,
        convention: NamingConvention,
        map: &mut CodepointMap,
    ) -> usize {
        let mut unmatched = 0;
        for &(id, code_point) in &self.entries {
            match convention.resolve(id, order) {
                Some(name) => { map.claim(code_point, name, MappingSource::ToUnicode); }
                None => {
                    log::debug!("No glyph for id {} (U+{:04X}).", id, code_point);
                    unmatched += 1;
                }
            }
        }

        if unmatched != 0 {
            warn!("{} mapping entries matched no glyph.", unmatched);
        }

        unmatched
    }
}

#[derive(Deserialize)]
struct MappingDocument {
    #[serde(default, rename = "isCID")]
    is_cid: bool,
    #[serde(default)]
    entries: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct MappingEntry {
    gid: u32,
    unicode: i64,
}

fn parse_json(data: &[u8]) -> Option<ExternalMapping> {
    let doc: MappingDocument = serde_json::from_slice(data).ok()?;
    let mut entries = Vec::with_capacity(doc.entries.len());
    for value in doc.entries {
        let entry: MappingEntry = match serde_json::from_value(value) {
            Ok(v) => v,
            Err(e) => {
                warn!("Invalid mapping entry: {}.", e);
                continue;
            }
        };

        if entry.unicode <= 0 || entry.unicode > i64::from(u32::MAX) {
            continue;
        }

        entries.push((entry.gid, entry.unicode as u32));
    }

    Some(ExternalMapping { is_cid: Some(doc.is_cid), entries })
}


#[derive(Clone, Copy, PartialEq, Debug)]
enum Token<'a> {
    Hex(&'a str),
    ArrayStart,
    ArrayEnd,
    Keyword(&'a str),
}

fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'<' => {
                let start = i + 1;
                match text[start..].find('>') {
                    Some(len) => {
                        tokens.push(Token::Hex(&text[start..start + len]));
                        i = start + len + 1;
                    }
                    None => break,
                }
            }
            b'[' => { tokens.push(Token::ArrayStart); i += 1; }
            b']' => { tokens.push(Token::ArrayEnd); i += 1; }
            b'%' => {
                // A comment till the end of the line.
                while i < bytes.len() && bytes[i] != b'\n' && bytes[i] != b'\r' {
                    i += 1;
                }
            }
            b if b.is_ascii_alphabetic() => {
                let start = i;
                while i < bytes.len() && bytes[i].is_ascii_alphanumeric() {
                    i += 1;
                }
                tokens.push(Token::Keyword(&text[start..i]));
            }
            _ => i += 1,
        }
    }

    tokens
}

fn parse_hex_code(s: &str) -> Option<u32> {
    let s: String = s.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    if s.is_empty() || s.len() > 8 {
        return None;
    }

    u32::from_str_radix(&s, 16).ok()
}

/// Decodes a UTF-16BE destination string holding exactly one scalar value.
fn parse_destination(s: &str) -> Option<u32> {
    let s: String = s.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    if s.is_empty() || s.len() % 4 != 0 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    let units: Vec<u16> = (0..s.len() / 4)
        .map(|i| u16::from_str_radix(&s[i * 4..i * 4 + 4], 16))
        .collect::<Result<_, _>>()
        .ok()?;

    let mut chars = core::char::decode_utf16(units.iter().copied());
    let c = chars.next()?.ok()?;
    if chars.next().is_some() {
        log::debug!("Multi-character destination <{}> skipped.", s);
        return None;
    }

    Some(c as u32).filter(|c| *c > 0)
}

/// Parses `bfchar` and `bfrange` sections of a ToUnicode CMap.
///
/// Data without any sections is treated as a list of `bfchar` pairs.
fn parse_to_unicode(text: &str) -> Vec<(u32, u32)> {
    let tokens = tokenize(text);
    let has_sections = tokens.iter().any(|t| match t {
        Token::Keyword(k) => *k == "beginbfchar" || *k == "beginbfrange",
        _ => false,
    });

    if !has_sections {
        let mut entries = Vec::new();
        parse_bfchar(&tokens, &mut entries);
        return entries;
    }

    let mut entries = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        match tokens[i] {
            Token::Keyword("beginbfchar") => {
                let len = section_len(&tokens[i + 1..], "endbfchar");
                parse_bfchar(&tokens[i + 1..i + 1 + len], &mut entries);
                i += len + 1;
            }
            Token::Keyword("beginbfrange") => {
                let len = section_len(&tokens[i + 1..], "endbfrange");
                parse_bfrange(&tokens[i + 1..i + 1 + len], &mut entries);
                i += len + 1;
            }
            _ => i += 1,
        }
    }

    entries
}

fn section_len(tokens: &[Token], end: &str) -> usize {
    tokens.iter()
        .position(|t| *t == Token::Keyword(end))
        .unwrap_or(tokens.len())
}

fn parse_bfchar(tokens: &[Token], entries: &mut Vec<(u32, u32)>) {
    let hex: Vec<&str> = tokens.iter().filter_map(|t| match t {
        Token::Hex(s) => Some(*s),
        _ => None,
    }).collect();

    for pair in hex.chunks_exact(2) {
        let code = match parse_hex_code(pair[0]) {
            Some(v) => v,
            None => continue,
        };

        if let Some(code_point) = parse_destination(pair[1]) {
            entries.push((code, code_point));
        }
    }
}

fn parse_bfrange(tokens: &[Token], entries: &mut Vec<(u32, u32)>) {
    let mut i = 0;
    while i + 2 < tokens.len() {
        let (lo, hi) = match (tokens[i], tokens[i + 1]) {
            (Token::Hex(lo), Token::Hex(hi)) => (parse_hex_code(lo), parse_hex_code(hi)),
            _ => {
                i += 1;
                continue;
            }
        };

        match tokens[i + 2] {
            Token::Hex(dst) => {
                i += 3;
                let (lo, hi, start) = match (lo, hi, parse_destination(dst)) {
                    (Some(lo), Some(hi), Some(start)) if lo <= hi && hi - lo <= MAX_RANGE_LEN => {
                        (lo, hi, start)
                    }
                    _ => continue,
                };

                for (n, code) in (lo..=hi).enumerate() {
                    let code_point = start + n as u32;
                    if is_scalar_value(code_point) {
                        entries.push((code, code_point));
                    }
                }
            }
            Token::ArrayStart => {
                let len = tokens[i + 3..].iter()
                    .position(|t| *t == Token::ArrayEnd)
                    .unwrap_or(tokens.len() - i - 3);
                let items = &tokens[i + 3..i + 3 + len];
                i += 3 + len + 1;

                let (lo, hi) = match (lo, hi) {
                    (Some(lo), Some(hi)) if lo <= hi && hi - lo <= MAX_RANGE_LEN => (lo, hi),
                    _ => continue,
                };

                // Extra destinations are ignored.
                let count = (hi - lo) as usize + 1;
                for (code, item) in (lo..=hi).zip(items.iter().take(count)) {
                    if let Token::Hex(dst) = item {
                        if let Some(code_point) = parse_destination(dst) {
                            entries.push((code, code_point));
                        }
                    }
                }
            }
            _ => i += 1,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn order(names: &[&str]) -> GlyphOrder {
        let mut order = GlyphOrder::new();
        for name in names {
            order.push(name).unwrap();
        }

        order
    }

    fn cid_order() -> GlyphOrder {
        let names: Vec<String> = (1..=10).map(|cid| format!("cid{:05}", cid)).collect();
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        order(&names)
    }

    #[test]
    fn claim_priority() {
        let mut map = CodepointMap::new();
        assert!(map.claim(0x41, "a", MappingSource::CharCode));
        assert!(!map.claim(0x41, "b", MappingSource::GlyphName));
        assert_eq!(map.get(0x41).unwrap().glyph, "a");

        assert!(map.claim(0x41, "c", MappingSource::CharCode));
        assert_eq!(map.get(0x41).unwrap().glyph, "c");

        assert!(map.claim(0x41, "d", MappingSource::ExplicitUnicode));
        assert!(!map.claim(0x41, "e", MappingSource::ToUnicode));
        assert_eq!(map.get(0x41), Some(&Claim { glyph: String::from("d"), source: MappingSource::ExplicitUnicode }));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn invalid_code_points() {
        let mut map = CodepointMap::new();
        assert!(!map.claim(0xD800, "a", MappingSource::ExplicitUnicode));
        assert!(!map.claim(0x110000, "a", MappingSource::ExplicitUnicode));
        assert!(map.is_empty());
    }

    #[test]
    fn vacant_claims() {
        let mut map = CodepointMap::new();
        assert!(map.claim_vacant(0x41, "a", MappingSource::GlyphName));
        assert!(!map.claim_vacant(0x41, "uni0041", MappingSource::GlyphName));
        assert_eq!(map.get(0x41).unwrap().glyph, "a");
    }

    #[test]
    fn private_use() {
        let mut map = CodepointMap::new();
        map.claim(0xF001, "a", MappingSource::ExplicitUnicode);

        let mut allocator = PrivateUseAllocator::new();
        assert_eq!(allocator.allocate(&map), Some(0xF000));
        assert_eq!(allocator.allocate(&map), Some(0xF002));
    }

    #[test]
    fn private_use_exhausted() {
        let map = CodepointMap::new();
        let mut allocator = PrivateUseAllocator::new();
        for _ in PRIVATE_USE_START..=PRIVATE_USE_END {
            assert!(allocator.allocate(&map).is_some());
        }

        assert_eq!(allocator.allocate(&map), None);
    }

    #[test]
    fn naming_convention() {
        assert_eq!(NamingConvention::detect(&cid_order()), NamingConvention::Cid);
        assert_eq!(NamingConvention::detect(&order(&["A", "B"])), NamingConvention::Direct);
        assert_eq!(NamingConvention::detect(&order(&["cidx", "B"])), NamingConvention::Direct);
        // Only the first five glyphs are checked.
        assert_eq!(
            NamingConvention::detect(&order(&["a", "b", "c", "d", "e", "cid00001"])),
            NamingConvention::Direct,
        );
    }

    #[test]
    fn cid_mapping() {
        let order = cid_order();
        let mapping = ExternalMapping { is_cid: Some(true), entries: vec![(5, 0x41)] };
        let mut map = CodepointMap::new();
        let convention = NamingConvention::detect(&order);
        assert_eq!(mapping.apply(&order, convention, &mut map), 0);
        assert_eq!(map.get(0x41).unwrap().glyph, "cid00005");
        assert_eq!(map.get(0x41).unwrap().source, MappingSource::ToUnicode);
    }

    #[test]
    fn unpadded_cid_names() {
        let order = order(&["cid1", "cid2", "cid3"]);
        assert_eq!(NamingConvention::Cid.resolve(2, &order), Some("cid2"));
        assert_eq!(NamingConvention::Cid.resolve(4, &order), None);
    }

    #[test]
    fn direct_mapping() {
        let order = order(&["a", "b", "c", "d", "e", "f"]);
        let mapping = ExternalMapping { is_cid: None, entries: vec![(5, 0x41), (100, 0x42)] };
        let mut map = CodepointMap::new();
        assert_eq!(mapping.apply(&order, NamingConvention::Direct, &mut map), 1);
        assert_eq!(map.get(0x41).unwrap().glyph, order.names()[5]);
        assert!(!map.contains(0x42));
    }

    #[test]
    fn names_to_code_points() {
        assert_eq!(code_point_from_name("uni0041"), Some(0x41));
        assert_eq!(code_point_from_name("u1F600"), Some(0x1F600));
        assert_eq!(code_point_from_name("u0041"), Some(0x41));
        assert_eq!(code_point_from_name("uni00410042"), None);
        assert_eq!(code_point_from_name("uniD800"), None);
        assert_eq!(code_point_from_name("u12"), None);
        assert_eq!(code_point_from_name("u+0041"), None);
        assert_eq!(code_point_from_name("underscore"), None);
        assert_eq!(code_point_from_name("A"), None);
    }

    #[test]
    fn glyph_names_fill_gaps() {
        let order = order(&["uni0041", "u0042", "B"]);
        let mut map = CodepointMap::new();
        map.claim(0x42, "B", MappingSource::ToUnicode);
        assert_eq!(claim_glyph_names(&order, &mut map), 1);
        assert_eq!(map.get(0x41).unwrap().glyph, "uni0041");
        assert_eq!(map.get(0x42).unwrap().glyph, "B");
    }

    #[test]
    fn json_mapping() {
        let data = br#"{"isCID": true, "entries": [
            {"gid": 1, "unicode": 65},
            {"gid": 2, "unicode": 0},
            {"gid": "x", "unicode": 67},
            {"gid": 4, "unicode": 68}
        ]}"#;

        let mapping = ExternalMapping::parse(data);
        assert_eq!(mapping.is_cid, Some(true));
        assert_eq!(mapping.entries, vec![(1, 65), (4, 68)]);
    }

    #[test]
    fn json_without_cid_flag() {
        let mapping = ExternalMapping::parse(br#"{"entries": [{"gid": 3, "unicode": 97}]}"#);
        assert_eq!(mapping.is_cid, Some(false));
        assert_eq!(mapping.entries, vec![(3, 97)]);
    }

    #[test]
    fn to_unicode_cmap() {
        let data = b"\
/CIDInit /ProcSet findresource begin
12 dict begin
begincmap
1 begincodespacerange
<00> <FF>
endcodespacerange
2 beginbfchar
<03> <0020>
<04> <D83DDE00>
endbfchar
2 beginbfrange
<10> <12> <0041>
<20> <21> [<0061> <00660066>]
endbfrange
1 beginbfchar
<05> <0066 0069>
endbfchar
endcmap
";

        let mapping = ExternalMapping::parse(data);
        assert_eq!(mapping.is_cid, None);
        assert_eq!(mapping.entries, vec![
            (0x03, 0x20),
            (0x04, 0x1F600),
            (0x10, 0x41),
            (0x11, 0x42),
            (0x12, 0x43),
            (0x20, 0x61),
        ]);
    }

    #[test]
    fn bfrange_array_bounds() {
        let mapping = ExternalMapping::parse(
            b"1 beginbfrange\n<FFFFFFFF> <FFFFFFFF> [<0041> <0042>]\nendbfrange\n"
        );
        assert_eq!(mapping.entries, vec![(0xFFFF_FFFF, 0x41)]);

        let mapping = ExternalMapping::parse(
            b"1 beginbfrange\n<01> <02> [<0041> <0042> <0043>]\nendbfrange\n"
        );
        assert_eq!(mapping.entries, vec![(1, 0x41), (2, 0x42)]);

        let mapping = ExternalMapping::parse(
            b"1 beginbfrange\n<02> <01> [<0041>]\nendbfrange\n"
        );
        assert!(mapping.entries.is_empty());
    }

    #[test]
    fn bare_pairs() {
        let mapping = ExternalMapping::parse(b"<01> <0041>\n<02> <0000>\n<03> <0042>");
        assert_eq!(mapping.entries, vec![(1, 0x41), (3, 0x42)]);
    }

    #[test]
    fn broken_json_falls_back() {
        let mapping = ExternalMapping::parse(b"{ not json <01> <0041>");
        assert_eq!(mapping.entries, vec![(1, 0x41)]);
    }
}
