//! Synthesizes OpenType fonts from Type3 glyph outlines.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use crate::{BuildReport, Error, Rect, Stage};
use crate::assemble::FontTables;
use crate::emit::OutputGuard;
use crate::glyph_order::GlyphOrder;
use crate::metrics::{self, FontMetrics, GlyphMetrics};
use crate::outline::{self, GlyphDocument, GlyphSource};
use crate::sfnt;
use crate::tables::{dsig, glyf, loca, maxp};
use crate::tables::cff::{encode_outline, CffBuilder};
use crate::tables::head::IndexToLocationFormat;
use crate::tables::name::{self, Names};
use crate::tables::os2::Style;
use crate::truetype::{self, Glyph};
use crate::unicode::{CodepointMap, MappingSource, PrivateUseAllocator};

const MIN_UNITS_PER_EM: u16 = 16;
const MAX_UNITS_PER_EM: u16 = 16384;
const VERSION: &str = "Version 1.000";

/// Font-wide settings.
#[derive(Clone, Debug)]
pub struct SynthOptions {
    pub family_name: String,
    pub style_name: String,
    pub units_per_em: u16,
    /// The maximum distance between a cubic curve and its quadratic approximation.
    pub cu2qu_error: f64,
}

impl Default for SynthOptions {
    fn default() -> Self {
        SynthOptions {
            family_name: String::from("Type3 Synth"),
            style_name: String::from("Regular"),
            units_per_em: 1000,
            cu2qu_error: 1.0,
        }
    }
}

impl SynthOptions {
    fn validate(&self) -> Result<(), Error> {
        if self.family_name.trim().is_empty() {
            return Err(Error::Input(String::from("family name must not be empty")));
        }

        if self.style_name.trim().is_empty() {
            return Err(Error::Input(String::from("style name must not be empty")));
        }

        if self.units_per_em < MIN_UNITS_PER_EM || self.units_per_em > MAX_UNITS_PER_EM {
            return Err(Error::Input(format!(
                "units per em must be in a {}..={} range, got {}",
                MIN_UNITS_PER_EM, MAX_UNITS_PER_EM, self.units_per_em,
            )));
        }

        if !(self.cu2qu_error.is_finite() && self.cu2qu_error > 0.0) {
            return Err(Error::Input(format!(
                "cu2qu error must be a positive number, got {}", self.cu2qu_error,
            )));
        }

        Ok(())
    }

    fn names(&self) -> Names {
        let family = self.family_name.trim();
        let style = self.style_name.trim();
        let post_script_name = name::sanitize_post_script_name(
            &format!("{}-{}", family.replace(' ', ""), style.replace(' ', ""))
        );

        Names {
            family: family.to_string(),
            subfamily: style.to_string(),
            unique_id: format!("{};NONE;{}", VERSION, post_script_name),
            full_name: format!("{} {}", family, style),
            version: VERSION.to_string(),
            post_script_name,
        }
    }
}


/// An encoded glyph, ready for assembly.
#[derive(Clone, Debug)]
pub struct GlyphBuildResult {
    /// A unique name.
    pub name: String,
    /// Always positive.
    pub width: u16,
    pub charstring: Vec<u8>,
    /// `None` when a TrueType glyph was requested but couldn't be built.
    pub truetype: Option<Glyph>,
    /// `None` for an empty outline.
    pub bbox: Option<Rect>,
    pub unicode: Option<u32>,
    pub char_code: Option<u32>,
}

/// Fonts built in memory.
#[derive(Clone, Debug)]
pub struct SynthesizedFonts {
    pub glyph_order: GlyphOrder,
    pub codepoints: CodepointMap,
    pub metrics: FontMetrics,
    /// A CFF-flavored OpenType font.
    pub otf: Vec<u8>,
    /// A TrueType font, when requested.
    pub ttf: Option<Vec<u8>>,
    pub report: BuildReport,
}


/// Reads a Type3 glyph JSON file and writes an OpenType font
/// and, optionally, a TrueType one.
///
/// No output file is left behind on error.
pub fn synthesize(
    input: &Path,
    otf_output: &Path,
    ttf_output: Option<&Path>,
    options: &SynthOptions,
) -> Result<BuildReport, Error> {
    options.validate()?;

    let data = std::fs::read(input)
        .map_err(|e| Error::Input(format!("failed to read '{}': {}", input.display(), e)))?;
    let doc = outline::parse_glyph_json(&data)?;

    let fonts = build_fonts(&doc, options, ttf_output.is_some())?;

    let mut guard = OutputGuard::new();
    guard.write(otf_output, &fonts.otf)?;
    if let (Some(path), Some(data)) = (ttf_output, fonts.ttf.as_ref()) {
        guard.write(path, data)?;
    }
    guard.commit();

    let report = fonts.report;
    log::info!(
        "Synthesized {} glyphs with {} mapped code points.",
        report.glyphs, report.mapped_codepoints,
    );

    if report.dropped_commands != 0 || report.degraded_glyphs != 0 {
        warn!(
            "{} path commands were dropped and {} glyphs were degraded.",
            report.dropped_commands, report.degraded_glyphs,
        );
    }

    Ok(report)
}

/// Builds fonts from a parsed glyph document, without touching the file system.
pub fn build_fonts(
    doc: &GlyphDocument,
    options: &SynthOptions,
    with_truetype: bool,
) -> Result<SynthesizedFonts, Error> {
    options.validate()?;

    if doc.glyphs.is_empty() {
        return Err(Error::Input(String::from("no glyphs provided in the glyph JSON")));
    }

    let mut report = BuildReport {
        dropped_commands: doc.dropped_commands,
        ..BuildReport::default()
    };

    // Encoding.

    let mut glyph_order = GlyphOrder::new();
    let mut results = Vec::with_capacity(doc.glyphs.len());
    let default_width = metrics::default_width(options.units_per_em);
    for source in &doc.glyphs {
        let id = glyph_order.push(&source.name).ok_or_else(|| {
            Error::Assembly(Stage::Encoding, String::from("too many glyphs"))
        })?;

        let name = glyph_order.name(id).unwrap_or(source.name.as_str()).to_string();
        let result = build_glyph(source, name, default_width, options, with_truetype, &mut report)?;
        results.push(result);
    }

    // Assembling.

    let font_metrics = FontMetrics::from_bounds(
        options.units_per_em,
        results.iter().filter_map(|r| r.bbox.as_ref()),
    );

    let codepoints = map_code_points(&results);
    let cmap = codepoints.to_glyph_ids(&glyph_order);
    report.mapped_codepoints = cmap.len();
    report.glyphs = glyph_order.len();

    let names = options.names();
    let style = Style::from_name(&options.style_name);

    let mut cff_metrics = Vec::with_capacity(glyph_order.len());
    cff_metrics.push(GlyphMetrics { advance: default_width, bbox: None });
    cff_metrics.extend(results.iter().map(|r| GlyphMetrics { advance: r.width, bbox: r.bbox }));

    let font_bbox = metrics::union_bounds(results.iter().filter_map(|r| r.bbox.as_ref()))
        .unwrap_or(Rect { x_min: 0, y_min: 0, x_max: 0, y_max: 0 });

    let notdef = encode_outline(&[], i32::from(default_width))
        .ok_or_else(|| Error::Assembly(Stage::Encoding, String::from("failed to encode .notdef")))?;

    let mut cff_glyphs: Vec<(&str, &[u8])> = Vec::with_capacity(glyph_order.len());
    cff_glyphs.push((glyph_order.names()[0].as_str(), notdef.charstring.as_slice()));
    cff_glyphs.extend(results.iter().map(|r| (r.name.as_str(), r.charstring.as_slice())));

    let cff = CffBuilder {
        font_name: &names.post_script_name,
        full_name: &names.full_name,
        family_name: &names.family,
        weight: &names.subfamily,
        font_bbox,
        glyphs: cff_glyphs,
    }.build();

    let units_per_em = f64::from(options.units_per_em);
    let font = FontTables {
        names: &names,
        style,
        units_per_em: options.units_per_em,
        ascender: font_metrics.ascent,
        descender: font_metrics.descent,
        win_ascent: font_metrics.ascent.max(0) as u16,
        win_descent: (-i32::from(font_metrics.descent.min(0))) as u16,
        x_height: metrics::round_half_up(units_per_em * 0.5) as i16,
        cap_height: metrics::round_half_up(units_per_em * 0.7) as i16,
        font_bbox,
        glyphs: &cff_metrics,
        cmap: &cmap,
    };

    let number_of_glyphs = glyph_order.len() as u16;
    let mut tables = font.build(maxp::Table::Cff { number_of_glyphs }, IndexToLocationFormat::Short);
    tables.push((*b"CFF ", cff));
    let otf = sfnt::assemble(sfnt::OPEN_TYPE_MAGIC, tables);

    let ttf = if with_truetype {
        let mut glyphs = Vec::with_capacity(glyph_order.len());
        glyphs.push(Glyph::placeholder());
        for result in &results {
            match result.truetype {
                Some(ref glyph) => glyphs.push(glyph.clone()),
                None => glyphs.push(Glyph::placeholder()),
            }
        }

        let mut glyph_data = Vec::with_capacity(glyphs.len());
        let mut tt_metrics = Vec::with_capacity(glyphs.len());
        let mut max_points = 0;
        let mut max_contours = 0;
        for (glyph, cff_glyph) in glyphs.iter_mut().zip(&cff_metrics) {
            let data = match glyf::encode_glyph(glyph) {
                Some(data) => data,
                None => {
                    warn!("A TrueType glyph can't be encoded. Replaced with an empty one.");
                    report.degraded_glyphs += 1;
                    *glyph = Glyph::placeholder();
                    glyf::encode_glyph(glyph).unwrap_or_default()
                }
            };

            max_points = max_points.max(glyph.number_of_points());
            max_contours = max_contours.max(glyph.contours.len());
            tt_metrics.push(GlyphMetrics { advance: cff_glyph.advance, bbox: glyph.bbox() });
            glyph_data.push(data);
        }

        let (glyf, offsets) = glyf::write_table(&glyph_data);
        let (loca, index_to_location_format) = loca::to_vec(&offsets);

        let font = FontTables {
            glyphs: &tt_metrics,
            font_bbox: metrics::union_bounds(tt_metrics.iter().filter_map(|m| m.bbox.as_ref()))
                .unwrap_or(font_bbox),
            ..font
        };

        let maxp = maxp::Table::TrueType {
            number_of_glyphs,
            max_points: max_points.min(usize::from(u16::MAX)) as u16,
            max_contours: max_contours.min(usize::from(u16::MAX)) as u16,
        };

        let mut tables = font.build(maxp, index_to_location_format);
        tables.push((*b"glyf", glyf));
        tables.push((*b"loca", loca));
        tables.push((*b"DSIG", dsig::stub()));
        Some(sfnt::assemble(sfnt::TRUE_TYPE_MAGIC, tables))
    } else {
        None
    };

    Ok(SynthesizedFonts {
        glyph_order,
        codepoints,
        metrics: font_metrics,
        otf,
        ttf,
        report,
    })
}

fn build_glyph(
    source: &GlyphSource,
    name: String,
    default_width: u16,
    options: &SynthOptions,
    with_truetype: bool,
    report: &mut BuildReport,
) -> Result<GlyphBuildResult, Error> {
    let width = metrics::resolve_width(source.width, default_width);
    if source.width.is_some() && source.width != Some(f64::from(width)) {
        log::debug!("Glyph '{}' width {:?} resolved to {}.", name, source.width, width);
    }

    let encoded = match encode_outline(&source.outline, i32::from(width)) {
        Some(v) => v,
        None => {
            warn!("Glyph '{}' has coordinates out of range. Outline removed.", name);
            report.degraded_glyphs += 1;
            encode_outline(&[], i32::from(width)).ok_or_else(|| {
                Error::Assembly(Stage::Encoding, format!("failed to encode '{}'", name))
            })?
        }
    };

    let truetype = if with_truetype {
        let glyph = truetype::build_glyph(&source.outline, options.cu2qu_error);
        if glyph.is_none() {
            warn!("Glyph '{}' can't be converted to TrueType. Replaced with an empty one.", name);
            report.degraded_glyphs += 1;
        }

        glyph
    } else {
        None
    };

    Ok(GlyphBuildResult {
        bbox: encoded.bbox.as_ref().and_then(metrics::round_bbox),
        charstring: encoded.charstring,
        truetype,
        width,
        unicode: source.unicode,
        char_code: source.char_code,
        name,
    })
}

/// Maps every glyph to its explicit code point, its character code
/// or a private-use code point, in that order.
fn map_code_points(results: &[GlyphBuildResult]) -> CodepointMap {
    let mut map = CodepointMap::new();
    for result in results {
        if let Some(c) = result.unicode {
            map.claim(c, &result.name, MappingSource::ExplicitUnicode);
        } else if let Some(c) = result.char_code {
            map.claim(c, &result.name, MappingSource::CharCode);
        }
    }

    let mapped: HashSet<String> = map.iter().map(|(_, claim)| claim.glyph.clone()).collect();
    let mut allocator = PrivateUseAllocator::new();
    for result in results {
        if mapped.contains(&result.name) {
            continue;
        }

        match allocator.allocate(&map) {
            Some(c) => {
                map.claim(c, &result.name, MappingSource::PrivateUse);
            }
            None => {
                warn!("No private-use code points left for '{}'.", result.name);
            }
        }
    }

    map
}

/// Returns the code point to glyph id mapping of a synthesized font.
pub fn character_map(fonts: &SynthesizedFonts) -> BTreeMap<u32, u16> {
    fonts.codepoints.to_glyph_ids(&fonts.glyph_order)
}


#[cfg(test)]
mod tests {
    use super::*;

    fn document(json: &str) -> GlyphDocument {
        outline::parse_glyph_json(json.as_bytes()).unwrap()
    }

    const SQUARE: &str = r#"[
        {"cmd": "M", "x": 0, "y": 0},
        {"cmd": "L", "x": 10, "y": 0},
        {"cmd": "L", "x": 10, "y": 10},
        {"cmd": "L", "x": 0, "y": 10},
        {"cmd": "Z"}
    ]"#;

    #[test]
    fn default_options() {
        let options = SynthOptions::default();
        assert_eq!(options.family_name, "Type3 Synth");
        assert_eq!(options.style_name, "Regular");
        assert_eq!(options.units_per_em, 1000);
        assert_eq!(options.cu2qu_error, 1.0);

        let names = options.names();
        assert_eq!(names.post_script_name, "Type3Synth-Regular");
        assert_eq!(names.full_name, "Type3 Synth Regular");
    }

    #[test]
    fn invalid_options() {
        let doc = document(r#"{"glyphs": [{"name": "a"}]}"#);

        let options = SynthOptions { units_per_em: 0, ..SynthOptions::default() };
        assert_eq!(build_fonts(&doc, &options, false).unwrap_err().exit_code(), 2);

        let options = SynthOptions { cu2qu_error: -1.0, ..SynthOptions::default() };
        assert_eq!(build_fonts(&doc, &options, false).unwrap_err().exit_code(), 2);

        let options = SynthOptions { family_name: String::from(" "), ..SynthOptions::default() };
        assert_eq!(build_fonts(&doc, &options, false).unwrap_err().exit_code(), 2);
    }

    #[test]
    fn no_glyphs() {
        let doc = document(r#"{"glyphs": []}"#);
        let err = build_fonts(&doc, &SynthOptions::default(), true).unwrap_err();
        assert_eq!(err.stage(), Stage::Ingesting);
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn glyph_order() {
        let doc = document(r#"{"glyphs": [
            {"name": "a"}, {"name": ".notdef"}, {"name": "a"}, {}
        ]}"#);

        let fonts = build_fonts(&doc, &SynthOptions::default(), false).unwrap();
        assert_eq!(fonts.glyph_order.names(), &[".notdef", "a", ".notdef.1", "a.1", "g4"]);
        assert_eq!(fonts.report.glyphs, 5);
        assert!(fonts.ttf.is_none());
    }

    #[test]
    fn code_points() {
        let doc = document(r#"{"glyphs": [
            {"name": "a", "unicode": 97, "charCode": 1},
            {"name": "b", "charCode": 98},
            {"name": "c"},
            {"name": "d", "unicode": 61440},
            {"name": "e"}
        ]}"#);

        let fonts = build_fonts(&doc, &SynthOptions::default(), false).unwrap();
        let cmap = character_map(&fonts);
        let expected: BTreeMap<u32, u16> = [
            (97, 1), (98, 2), (0xF000, 4), (0xF001, 3), (0xF002, 5),
        ].iter().copied().collect();
        assert_eq!(cmap, expected);
        assert_eq!(fonts.report.mapped_codepoints, 5);
    }

    #[test]
    fn explicit_unicode_wins() {
        let doc = document(r#"{"glyphs": [
            {"name": "a", "charCode": 65},
            {"name": "b", "unicode": 65}
        ]}"#);

        let fonts = build_fonts(&doc, &SynthOptions::default(), false).unwrap();
        let cmap = character_map(&fonts);
        assert_eq!(cmap.get(&65), Some(&2));
        // `a` lost its only code point.
        assert_eq!(cmap.get(&0xF000), Some(&1));
    }

    #[test]
    fn metrics_without_outlines() {
        let doc = document(r#"{"glyphs": [{"name": "space", "advanceWidth": 250}]}"#);
        let fonts = build_fonts(&doc, &SynthOptions::default(), true).unwrap();
        assert_eq!(fonts.metrics.ascent, 800);
        assert_eq!(fonts.metrics.descent, -200);
        assert!(fonts.ttf.is_some());
    }

    #[test]
    fn metrics_from_outlines() {
        let doc = document(&format!(r#"{{"glyphs": [{{"name": "sq", "outline": {}}}]}}"#, SQUARE));
        let fonts = build_fonts(&doc, &SynthOptions::default(), true).unwrap();
        assert_eq!(fonts.metrics.ascent, 10);
        // Nothing below the baseline.
        assert_eq!(fonts.metrics.descent, -200);
    }

    #[test]
    fn square_bbox() {
        let doc = document(&format!(r#"{{"glyphs": [{{"name": "sq", "outline": {}}}]}}"#, SQUARE));
        let mut report = BuildReport::default();
        let result = build_glyph(
            &doc.glyphs[0], String::from("sq"), 500, &SynthOptions::default(), true, &mut report,
        ).unwrap();

        let rect = Rect { x_min: 0, y_min: 0, x_max: 10, y_max: 10 };
        assert_eq!(result.bbox, Some(rect));
        assert_eq!(result.truetype.unwrap().bbox(), Some(rect));
        assert_eq!(result.width, 500);
        assert_eq!(report, BuildReport::default());
    }

    #[test]
    fn invalid_widths() {
        let doc = document(r#"{"glyphs": [
            {"name": "a", "advanceWidth": -5},
            {"name": "b", "advanceWidth": 0.2},
            {"name": "c", "advanceWidth": "wide"},
            {"name": "d", "advanceWidth": 612.5}
        ]}"#);

        let mut report = BuildReport::default();
        let widths: Vec<u16> = doc.glyphs.iter().map(|g| {
            build_glyph(g, g.name.clone(), 500, &SynthOptions::default(), false, &mut report)
                .unwrap()
                .width
        }).collect();

        assert_eq!(widths, [500, 500, 500, 613]);
    }

    #[test]
    fn degraded_truetype_glyph() {
        let doc = document(r#"{"glyphs": [{"name": "big", "outline": [
            {"cmd": "M", "x": 0, "y": 0},
            {"cmd": "L", "x": 40000, "y": 0},
            {"cmd": "Z"}
        ]}]}"#);

        let fonts = build_fonts(&doc, &SynthOptions::default(), true).unwrap();
        // Both outlines are unusable.
        assert_eq!(fonts.report.degraded_glyphs, 2);
        assert!(fonts.ttf.is_some());
    }

    #[test]
    fn idempotence() {
        let doc = document(&format!(r#"{{"glyphs": [
            {{"name": "sq", "unicode": 65, "outline": {}}},
            {{"name": "b"}},
            {{"name": "c", "charCode": 67}}
        ]}}"#, SQUARE));

        let a = build_fonts(&doc, &SynthOptions::default(), true).unwrap();
        let b = build_fonts(&doc, &SynthOptions::default(), true).unwrap();
        assert_eq!(a.glyph_order.names(), b.glyph_order.names());
        assert_eq!(character_map(&a), character_map(&b));
        assert_eq!(a.metrics, b.metrics);
        assert_eq!(a.otf, b.otf);
        assert_eq!(a.ttf, b.ttf);
    }
}
