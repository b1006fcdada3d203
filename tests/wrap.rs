use std::fs;

use fontsynth::{PathCommand, Point, Rect};
use fontsynth::tables::cff::{self, CffBuilder};
use ttf_parser::{Face, GlyphId};

fn square(size: f64) -> Vec<u8> {
    let outline = [
        PathCommand::MoveTo(Point::new(0.0, 0.0)),
        PathCommand::LineTo(Point::new(size, 0.0)),
        PathCommand::LineTo(Point::new(size, size)),
        PathCommand::LineTo(Point::new(0.0, size)),
        PathCommand::ClosePath,
    ];

    cff::encode_outline(&outline, 700).unwrap().charstring
}

fn cff_font(names: &[&str]) -> Vec<u8> {
    let notdef = cff::encode_outline(&[], 500).unwrap().charstring;
    let glyph = square(100.0);
    let mut glyphs: Vec<(&str, &[u8])> = vec![(".notdef", notdef.as_slice())];
    for name in names {
        glyphs.push((*name, glyph.as_slice()));
    }

    CffBuilder {
        font_name: "Embedded",
        full_name: "Embedded",
        family_name: "Embedded",
        weight: "Regular",
        font_bbox: Rect { x_min: 0, y_min: 0, x_max: 100, y_max: 100 },
        glyphs,
    }.build()
}

#[test]
fn to_unicode_cmap() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("font.cff");
    let mapping = dir.path().join("font.cmap");
    let output = dir.path().join("font.otf");

    fs::write(&input, cff_font(&["a", "b", "c"])).unwrap();
    fs::write(&mapping, "\
/CIDInit /ProcSet findresource begin
12 dict begin
begincmap
1 begincodespacerange
<00> <FF>
endcodespacerange
1 beginbfchar
<01> <0041>
endbfchar
1 beginbfrange
<02> <03> <0062>
endbfrange
endcmap
").unwrap();

    let report = fontsynth::wrap_cff(
        &input, &output, Some(&mapping), &fontsynth::WrapOptions::default(),
    ).unwrap();
    assert_eq!(report.glyphs, 4);
    assert_eq!(report.mapped_codepoints, 3);
    assert_eq!(report.unmatched_mappings, 0);

    let data = fs::read(&output).unwrap();
    let face = Face::parse(&data, 0).unwrap();
    assert_eq!(face.number_of_glyphs(), 4);
    assert_eq!(face.glyph_index('A'), Some(GlyphId(1)));
    assert_eq!(face.glyph_index('b'), Some(GlyphId(2)));
    assert_eq!(face.glyph_index('c'), Some(GlyphId(3)));
    assert_eq!(face.glyph_hor_advance(GlyphId(0)), Some(500));
    assert_eq!(face.glyph_hor_advance(GlyphId(1)), Some(700));
    assert_eq!(face.ascender(), 800);
    assert_eq!(face.descender(), -200);

    let bbox = face.glyph_bounding_box(GlyphId(2)).unwrap();
    assert_eq!((bbox.x_min, bbox.y_min, bbox.x_max, bbox.y_max), (0, 0, 100, 100));
}

#[test]
fn cid_json_mapping() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("font.cff");
    let mapping = dir.path().join("map.json");
    let output = dir.path().join("font.otf");

    let names: Vec<String> = (1..=10).map(|n| format!("cid{:05}", n)).collect();
    let names: Vec<&str> = names.iter().map(String::as_str).collect();
    fs::write(&input, cff_font(&names)).unwrap();
    fs::write(&mapping, r#"{"isCID": true, "entries": [{"gid": 5, "unicode": 65}]}"#).unwrap();

    let report = fontsynth::wrap_cff(
        &input, &output, Some(&mapping), &fontsynth::WrapOptions::default(),
    ).unwrap();
    assert_eq!(report.mapped_codepoints, 1);

    let data = fs::read(&output).unwrap();
    let face = Face::parse(&data, 0).unwrap();
    assert_eq!(face.glyph_index('A'), Some(GlyphId(5)));
}

#[test]
fn missing_mapping_is_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("font.cff");
    let output = dir.path().join("font.otf");
    fs::write(&input, cff_font(&["uni0041"])).unwrap();

    let report = fontsynth::wrap_cff(
        &input, &output, Some(&dir.path().join("missing.txt")), &fontsynth::WrapOptions::default(),
    ).unwrap();
    assert_eq!(report.mapped_codepoints, 1);

    let data = fs::read(&output).unwrap();
    let face = Face::parse(&data, 0).unwrap();
    assert_eq!(face.glyph_index('A'), Some(GlyphId(1)));
}

#[test]
fn invalid_cff() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("font.cff");
    let output = dir.path().join("font.otf");
    fs::write(&input, b"not a font").unwrap();

    let err = fontsynth::wrap_cff(&input, &output, None, &fontsynth::WrapOptions::default())
        .unwrap_err();
    assert_eq!(err.exit_code(), 2);
    assert!(!output.exists());
}
