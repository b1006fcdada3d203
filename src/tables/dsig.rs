// https://docs.microsoft.com/en-us/typography/opentype/spec/dsig

/// An empty digital signature table.
pub fn stub() -> Vec<u8> {
    vec![
        0x00, 0x00, 0x00, 0x01, // version: 1
        0x00, 0x00, // number of signatures: 0
        0x00, 0x00, // flags: 0
    ]
}
