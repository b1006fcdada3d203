//! Glyph names in glyph id order.

use std::collections::HashMap;

use core::convert::TryFrom;

pub const NOTDEF: &str = ".notdef";

/// An ordered list of unique glyph names.
///
/// The first glyph is always `.notdef`.
#[derive(Clone, Debug)]
pub struct GlyphOrder {
    names: Vec<String>,
    ids: HashMap<String, u16>,
}

impl Default for GlyphOrder {
    fn default() -> Self {
        GlyphOrder::new()
    }
}

impl GlyphOrder {
    /// Creates an order containing only `.notdef`.
    pub fn new() -> Self {
        let mut ids = HashMap::new();
        ids.insert(String::from(NOTDEF), 0);
        GlyphOrder {
            names: vec![String::from(NOTDEF)],
            ids,
        }
    }

    /// Creates an order from names of an existing font.
    ///
    /// The first name is replaced with `.notdef`.
    pub fn from_font_names<I>(names: I) -> Option<Self>
        where I: IntoIterator<Item = String>
    {
        let mut order = GlyphOrder::new();
        for name in names.into_iter().skip(1) {
            order.push(&name)?;
        }

        Some(order)
    }

    /// Appends a glyph and returns its id.
    ///
    /// A name that is already taken gets the first free `.1`, `.2`, ... suffix.
    ///
    /// Returns `None` when there are no glyph ids left.
    pub fn push(&mut self, name: &str) -> Option<u16> {
        // The number of glyphs is stored as `u16`.
        let id = u16::try_from(self.names.len()).ok().filter(|id| *id < u16::MAX)?;

        let mut unique_name = String::from(name);
        let mut suffix = 1;
        while self.ids.contains_key(&unique_name) {
            unique_name = format!("{}.{}", name, suffix);
            suffix += 1;
        }

        if unique_name != name {
            warn!("Glyph '{}' is already defined. Renamed to '{}'.", name, unique_name);
        }

        self.ids.insert(unique_name.clone(), id);
        self.names.push(unique_name);
        Some(id)
    }

    /// Returns the number of glyphs, `.notdef` included.
    #[inline]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Always `false`, since `.notdef` is always present.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    #[inline]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[inline]
    pub fn name(&self, glyph_id: u16) -> Option<&str> {
        self.names.get(usize::from(glyph_id)).map(String::as_str)
    }

    #[inline]
    pub fn glyph_id(&self, name: &str) -> Option<u16> {
        self.ids.get(name).copied()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notdef_is_first() {
        let order = GlyphOrder::new();
        assert_eq!(order.len(), 1);
        assert_eq!(order.name(0), Some(NOTDEF));
        assert_eq!(order.glyph_id(NOTDEF), Some(0));
    }

    #[test]
    fn duplicates() {
        let mut order = GlyphOrder::new();
        assert_eq!(order.push("a"), Some(1));
        assert_eq!(order.push("a"), Some(2));
        assert_eq!(order.push("a"), Some(3));
        assert_eq!(order.push(".notdef"), Some(4));
        assert_eq!(order.names(), &[".notdef", "a", "a.1", "a.2", ".notdef.1"]);
        assert_eq!(order.glyph_id("a.2"), Some(3));
    }

    #[test]
    fn suffix_collision() {
        let mut order = GlyphOrder::new();
        order.push("a.1");
        order.push("a");
        order.push("a");
        assert_eq!(order.names(), &[".notdef", "a.1", "a", "a.2"]);
    }

    #[test]
    fn font_names() {
        let names = vec![String::from("cid00000"), String::from("cid00001"), String::from("A")];
        let order = GlyphOrder::from_font_names(names).unwrap();
        assert_eq!(order.names(), &[".notdef", "cid00001", "A"]);
    }

    #[test]
    fn too_many_glyphs() {
        let mut order = GlyphOrder::new();
        for i in 1..0xFFFF {
            assert!(order.push(&format!("g{}", i)).is_some());
        }

        assert_eq!(order.push("last"), None);
    }
}
