use std::fs;
use std::process::Command;

const SYNTH: &str = env!("CARGO_BIN_EXE_type3-synth");
const WRAP: &str = env!("CARGO_BIN_EXE_cff-wrap");

const GLYPHS: &str = r#"{
    "glyphs": [{
        "name": "A",
        "unicode": 65,
        "outline": [
            { "cmd": "M", "x": 0, "y": 0 },
            { "cmd": "L", "x": 400, "y": 700 },
            { "cmd": "L", "x": 800, "y": 0 },
            { "cmd": "Z" }
        ]
    }]
}"#;

#[test]
fn synth_success() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("glyphs.json");
    let otf = dir.path().join("font.otf");
    let ttf = dir.path().join("font.ttf");
    fs::write(&input, GLYPHS).unwrap();

    let status = Command::new(SYNTH)
        .arg("--input").arg(&input)
        .arg("--otf-output").arg(&otf)
        .arg("--ttf-output").arg(&ttf)
        .args(&["--family-name", "Cli Test", "--units-per-em", "2048"])
        .status()
        .unwrap();

    assert_eq!(status.code(), Some(0));

    let data = fs::read(&ttf).unwrap();
    let face = ttf_parser::Face::parse(&data, 0).unwrap();
    assert_eq!(face.units_per_em(), 2048);
    assert_eq!(face.glyph_index('A'), Some(ttf_parser::GlyphId(1)));
    assert!(otf.exists());
}

#[test]
fn synth_missing_arguments() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("glyphs.json");
    fs::write(&input, GLYPHS).unwrap();

    let output = Command::new(SYNTH).arg("--input").arg(&input).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(!output.stderr.is_empty());
}

#[test]
fn synth_invalid_units_per_em() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("glyphs.json");
    let otf = dir.path().join("font.otf");
    fs::write(&input, GLYPHS).unwrap();

    let status = Command::new(SYNTH)
        .arg("--input").arg(&input)
        .arg("--otf-output").arg(&otf)
        .args(&["--units-per-em", "8"])
        .status()
        .unwrap();

    assert_eq!(status.code(), Some(2));
    assert!(!otf.exists());
}

#[test]
fn synth_empty_font() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("glyphs.json");
    let otf = dir.path().join("font.otf");
    fs::write(&input, r#"{"glyphs": []}"#).unwrap();

    let status = Command::new(SYNTH)
        .arg("--input").arg(&input)
        .arg("--otf-output").arg(&otf)
        .status()
        .unwrap();

    assert_eq!(status.code(), Some(2));
    assert!(!otf.exists());
}

#[test]
fn synth_write_failure() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("glyphs.json");
    let otf = dir.path().join("font.otf");
    let ttf = dir.path().join("missing").join("font.ttf");
    fs::write(&input, GLYPHS).unwrap();

    let output = Command::new(SYNTH)
        .arg("--input").arg(&input)
        .arg("--otf-output").arg(&otf)
        .arg("--ttf-output").arg(&ttf)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(!otf.exists());
    assert!(!ttf.exists());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("writing failed"));
}

#[test]
fn wrap_missing_input() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("font.otf");

    let status = Command::new(WRAP)
        .arg(dir.path().join("missing.cff"))
        .arg(&output)
        .status()
        .unwrap();

    assert_eq!(status.code(), Some(2));
    assert!(!output.exists());
}

#[test]
fn wrap_without_arguments() {
    let status = Command::new(WRAP).status().unwrap();
    assert_eq!(status.code(), Some(2));
}

#[test]
fn wrap_flags_take_precedence() {
    use fontsynth::tables::cff::{self, CffBuilder};

    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("font.cff");
    let positional_output = dir.path().join("positional.otf");
    let output = dir.path().join("font.otf");

    let notdef = cff::encode_outline(&[], 500).unwrap().charstring;
    let data = CffBuilder {
        font_name: "Cli",
        full_name: "Cli",
        family_name: "Cli",
        weight: "Regular",
        font_bbox: fontsynth::Rect { x_min: 0, y_min: 0, x_max: 0, y_max: 0 },
        glyphs: vec![(".notdef", notdef.as_slice()), ("uni0042", notdef.as_slice())],
    }.build();
    fs::write(&input, data).unwrap();

    let status = Command::new(WRAP)
        .arg(&input)
        .arg(&positional_output)
        .arg("--output").arg(&output)
        .status()
        .unwrap();

    assert_eq!(status.code(), Some(0));
    assert!(!positional_output.exists());

    let data = fs::read(&output).unwrap();
    let face = ttf_parser::Face::parse(&data, 0).unwrap();
    assert_eq!(face.glyph_index('B'), Some(ttf_parser::GlyphId(1)));
}
