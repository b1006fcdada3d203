// https://docs.microsoft.com/en-us/typography/opentype/spec/name

use crate::writer::Writer;

/// A list of [name ID](https://docs.microsoft.com/en-us/typography/opentype/spec/name#name-ids)'s.
pub mod name_id {
    pub const FAMILY: u16                               = 1;
    pub const SUBFAMILY: u16                            = 2;
    pub const UNIQUE_ID: u16                            = 3;
    pub const FULL_NAME: u16                            = 4;
    pub const VERSION: u16                              = 5;
    pub const POST_SCRIPT_NAME: u16                     = 6;
}

/// A [platform ID](https://docs.microsoft.com/en-us/typography/opentype/spec/name#platform-ids).
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum PlatformId {
    Macintosh,
    Windows,
}

impl PlatformId {
    // Platform, encoding and language IDs.
    fn ids(self) -> (u16, u16, u16) {
        match self {
            // Roman, English
            PlatformId::Macintosh => (1, 0, 0),
            // Unicode BMP, en-US
            PlatformId::Windows => (3, 1, 0x0409),
        }
    }

    fn encode(self, s: &str) -> Vec<u8> {
        match self {
            PlatformId::Macintosh => {
                s.chars().map(|c| if c.is_ascii() { c as u8 } else { b'?' }).collect()
            }
            PlatformId::Windows => {
                s.encode_utf16().flat_map(|c| c.to_be_bytes().to_vec()).collect()
            }
        }
    }
}

const MAX_POST_SCRIPT_NAME_LEN: usize = 63;

// Six names, up to 4 bytes per char on Windows and 1 on Macintosh,
// must fit into 16-bit storage offsets.
const MAX_NAME_LEN: usize = 2048;

fn truncate(s: &str) -> &str {
    match s.char_indices().nth(MAX_NAME_LEN) {
        Some((i, _)) => &s[..i],
        None => s,
    }
}

/// Makes a valid PostScript name.
///
/// Only printable ASCII is allowed, without spaces and `[](){}<>/%`.
pub fn sanitize_post_script_name(name: &str) -> String {
    let mut ps_name: String = name.chars()
        .filter(|c| c.is_ascii_graphic() && !"[](){}<>/%".contains(*c))
        .take(MAX_POST_SCRIPT_NAME_LEN)
        .collect();

    if ps_name.is_empty() {
        ps_name.push_str("Untitled");
    }

    ps_name
}


/// Naming records written for every platform.
#[derive(Clone, PartialEq, Debug)]
pub struct Names {
    pub family: String,
    pub subfamily: String,
    pub unique_id: String,
    pub full_name: String,
    pub version: String,
    pub post_script_name: String,
}

impl Names {
    fn records(&self) -> [(u16, &str); 6] {
        [
            (name_id::FAMILY, truncate(&self.family)),
            (name_id::SUBFAMILY, truncate(&self.subfamily)),
            (name_id::UNIQUE_ID, truncate(&self.unique_id)),
            (name_id::FULL_NAME, truncate(&self.full_name)),
            (name_id::VERSION, truncate(&self.version)),
            (name_id::POST_SCRIPT_NAME, truncate(&self.post_script_name)),
        ]
    }

    /// Writes a format 0 table.
    pub fn write(&self, w: &mut Writer) {
        const HEADER_SIZE: usize = 6;
        const RECORD_SIZE: usize = 12;

        // Records must be sorted by platform, encoding, language and name ID.
        let platforms = [PlatformId::Macintosh, PlatformId::Windows];

        let records_data = self.records();
        for &(id, value) in records_data.iter() {
            if value.len() < self.value(id).len() {
                warn!("Name {} is longer than {} characters. Truncated.", id, MAX_NAME_LEN);
            }
        }

        let mut storage = Vec::new();
        let mut records = Vec::new();
        for platform in &platforms {
            for &(id, value) in records_data.iter() {
                let data = platform.encode(value);
                records.push((*platform, id, storage.len(), data.len()));
                storage.extend_from_slice(&data);
            }
        }

        let count = records.len();
        w.write(0u16); // format
        w.write(count as u16);
        w.write((HEADER_SIZE + count * RECORD_SIZE) as u16); // storage offset
        for (platform, id, offset, len) in records {
            let (platform_id, encoding_id, language_id) = platform.ids();
            w.write(platform_id);
            w.write(encoding_id);
            w.write(language_id);
            w.write(id);
            w.write(len as u16);
            w.write(offset as u16);
        }
        w.extend(&storage);
    }

    pub fn to_vec(&self) -> Vec<u8> {
        let mut w = Writer::new();
        self.write(&mut w);
        w.finish()
    }

    fn value(&self, id: u16) -> &str {
        match id {
            name_id::FAMILY => &self.family,
            name_id::SUBFAMILY => &self.subfamily,
            name_id::UNIQUE_ID => &self.unique_id,
            name_id::FULL_NAME => &self.full_name,
            name_id::VERSION => &self.version,
            _ => &self.post_script_name,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Stream;

    fn names() -> Names {
        Names {
            family: String::from("Fé"),
            subfamily: String::from("R"),
            unique_id: String::from("U"),
            full_name: String::from("N"),
            version: String::from("V"),
            post_script_name: String::from("P"),
        }
    }

    #[test]
    fn header() {
        let data = names().to_vec();
        let mut s = Stream::new(&data);
        assert_eq!(s.read::<u16>(), Some(0)); // format
        assert_eq!(s.read::<u16>(), Some(12)); // count
        assert_eq!(s.read::<u16>(), Some(6 + 12 * 12)); // storage offset
    }

    #[test]
    fn records() {
        let data = names().to_vec();
        let storage = &data[150..];

        let mut s = Stream::new_at(&data, 6).unwrap();
        let mut read_record = || -> (u16, u16, u16, u16, usize, usize) {
            (
                s.read().unwrap(),
                s.read().unwrap(),
                s.read().unwrap(),
                s.read().unwrap(),
                usize::from(s.read::<u16>().unwrap()),
                usize::from(s.read::<u16>().unwrap()),
            )
        };

        // Macintosh family name.
        let (platform, encoding, language, id, len, offset) = read_record();
        assert_eq!((platform, encoding, language, id), (1, 0, 0, name_id::FAMILY));
        assert_eq!(&storage[offset..offset + len], b"F?");

        for _ in 0..5 {
            read_record();
        }

        // Windows family name.
        let (platform, encoding, language, id, len, offset) = read_record();
        assert_eq!((platform, encoding, language, id), (3, 1, 0x0409, name_id::FAMILY));
        assert_eq!(&storage[offset..offset + len], &[0x00, 0x46, 0x00, 0xE9]);

        // Windows subfamily name.
        let (_, _, _, id, len, offset) = read_record();
        assert_eq!(id, name_id::SUBFAMILY);
        assert_eq!(&storage[offset..offset + len], &[0x00, 0x52]);
    }

    #[test]
    fn long_names_are_truncated() {
        let mut names = names();
        names.family = "A".repeat(14000);
        names.full_name = "\u{1F600}".repeat(14000);

        let data = names.to_vec();
        let storage = &data[6 + 12 * 12..];
        let mut s = Stream::new_at(&data, 6).unwrap();
        for _ in 0..12 {
            let platform: u16 = s.read().unwrap();
            s.advance(4); // encoding and language
            let id: u16 = s.read().unwrap();
            let len = usize::from(s.read::<u16>().unwrap());
            let offset = usize::from(s.read::<u16>().unwrap());
            let value = &storage[offset..offset + len];

            match (platform, id) {
                (1, name_id::FAMILY) => assert_eq!(len, 2048),
                (3, name_id::FAMILY) => assert_eq!(len, 2048 * 2),
                (3, name_id::FULL_NAME) => assert_eq!(len, 2048 * 4),
                (1, name_id::VERSION) => assert_eq!(value, b"V"),
                (3, name_id::VERSION) => assert_eq!(value, &[0x00, 0x56]),
                (3, name_id::POST_SCRIPT_NAME) => assert_eq!(value, &[0x00, 0x50]),
                _ => {}
            }
        }
    }

    #[test]
    fn post_script_names() {
        assert_eq!(sanitize_post_script_name("Type3Synth-Regular"), "Type3Synth-Regular");
        assert_eq!(sanitize_post_script_name("My Font (Bold)"), "MyFontBold");
        assert_eq!(sanitize_post_script_name("Фонт"), "Untitled");
        assert_eq!(sanitize_post_script_name(&"A".repeat(100)).len(), 63);
    }
}
