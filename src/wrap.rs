//! Wraps a bare CFF font program into an OpenType container.

use std::path::Path;

use crate::{BuildReport, Error, Rect, Stage};
use crate::assemble::FontTables;
use crate::emit::OutputGuard;
use crate::glyph_order::GlyphOrder;
use crate::metrics::{self, GlyphMetrics};
use crate::sfnt;
use crate::tables::cff::Metadata;
use crate::tables::head::IndexToLocationFormat;
use crate::tables::maxp;
use crate::tables::name::{self, Names};
use crate::tables::os2::Style;
use crate::unicode::{self, CodepointMap, ExternalMapping, NamingConvention};

const UNITS_PER_EM: u16 = 1000;
const DEFAULT_ADVANCE: f64 = 500.0;
const DEFAULT_FAMILY_NAME: &str = "Converted";
const VERSION: &str = "Version 1.0";

// The global bounding box never gets smaller than this.
const MIN_FONT_BBOX: Rect = Rect { x_min: 0, y_min: -200, x_max: 1000, y_max: 800 };

const X_HEIGHT: i16 = 500;
const CAP_HEIGHT: i16 = 700;

/// Naming overrides.
#[derive(Clone, Debug)]
pub struct WrapOptions {
    /// Overrides the font name stored in the CFF.
    pub family_name: Option<String>,
    pub style_name: String,
}

impl Default for WrapOptions {
    fn default() -> Self {
        WrapOptions {
            family_name: None,
            style_name: String::from("Regular"),
        }
    }
}

/// A font built in memory.
#[derive(Clone, Debug)]
pub struct WrappedFont {
    pub glyph_order: GlyphOrder,
    pub codepoints: CodepointMap,
    pub font: Vec<u8>,
    pub report: BuildReport,
}


/// Reads a CFF file and writes it as an OpenType font.
///
/// A mapping file that doesn't exist or can't be read is ignored.
/// No output file is left behind on error.
pub fn wrap_cff(
    input: &Path,
    output: &Path,
    mapping: Option<&Path>,
    options: &WrapOptions,
) -> Result<BuildReport, Error> {
    let data = std::fs::read(input)
        .map_err(|e| Error::Input(format!("failed to read '{}': {}", input.display(), e)))?;

    let mapping = mapping.and_then(|path| match std::fs::read(path) {
        Ok(data) => Some(ExternalMapping::parse(&data)),
        Err(e) => {
            warn!("Failed to read a Unicode mapping from '{}': {}. Ignored.", path.display(), e);
            None
        }
    });

    let wrapped = wrap_cff_data(&data, mapping.as_ref(), options)?;

    let mut guard = OutputGuard::new();
    guard.write(output, &wrapped.font)?;
    guard.commit();

    let report = wrapped.report;
    log::info!(
        "Wrapped {} glyphs with {} mapped code points.",
        report.glyphs, report.mapped_codepoints,
    );

    Ok(report)
}

/// Wraps CFF data, without touching the file system.
pub fn wrap_cff_data(
    data: &[u8],
    mapping: Option<&ExternalMapping>,
    options: &WrapOptions,
) -> Result<WrappedFont, Error> {
    let cff = Metadata::parse(data)
        .map_err(|e| Error::Input(format!("invalid CFF data: {}", e)))?;

    let number_of_glyphs = cff.number_of_glyphs();
    let glyph_order = GlyphOrder::from_font_names(cff.glyph_names()).ok_or_else(|| {
        Error::Assembly(Stage::Assembling, String::from("too many glyphs"))
    })?;

    let mut report = BuildReport {
        glyphs: glyph_order.len(),
        ..BuildReport::default()
    };

    let default_width = cff.default_width().filter(|w| *w > 0.0).unwrap_or(DEFAULT_ADVANCE);

    let mut glyphs = Vec::with_capacity(usize::from(number_of_glyphs));
    for glyph_id in 0..number_of_glyphs {
        let glyph = match cff.glyph_metrics(glyph_id, default_width) {
            Ok(m) => GlyphMetrics { advance: to_advance(m.advance), bbox: m.bbox },
            Err(e) => {
                warn!("Glyph {} can't be interpreted: {}. Using defaults.", glyph_id, e);
                report.unreadable_glyphs += 1;
                GlyphMetrics { advance: to_advance(default_width), bbox: None }
            }
        };

        glyphs.push(glyph);
    }

    let font_bbox = glyphs.iter()
        .filter_map(|g| g.bbox.as_ref())
        .fold(MIN_FONT_BBOX, |acc, r| acc.union(r));

    let mut codepoints = CodepointMap::new();
    if let Some(mapping) = mapping {
        let convention = NamingConvention::detect(&glyph_order);
        log::debug!("Applying {} mapping entries as {:?}.", mapping.entries.len(), convention);
        report.unmatched_mappings = mapping.apply(&glyph_order, convention, &mut codepoints);
    }

    unicode::claim_glyph_names(&glyph_order, &mut codepoints);

    let cmap = codepoints.to_glyph_ids(&glyph_order);
    report.mapped_codepoints = cmap.len();

    let names = names(&cff, options);
    let font = FontTables {
        names: &names,
        style: Style::from_name(&options.style_name),
        units_per_em: UNITS_PER_EM,
        // The bbox always includes 800 and -200.
        ascender: font_bbox.y_max,
        descender: font_bbox.y_min,
        win_ascent: font_bbox.y_max.max(0) as u16,
        win_descent: (-i32::from(font_bbox.y_min.min(0))) as u16,
        x_height: X_HEIGHT,
        cap_height: CAP_HEIGHT,
        font_bbox,
        glyphs: &glyphs,
        cmap: &cmap,
    };

    let mut tables = font.build(maxp::Table::Cff { number_of_glyphs }, IndexToLocationFormat::Short);
    tables.push((*b"CFF ", data.to_vec()));

    Ok(WrappedFont {
        glyph_order,
        codepoints,
        font: sfnt::assemble(sfnt::OPEN_TYPE_MAGIC, tables),
        report,
    })
}

fn names(cff: &Metadata, options: &WrapOptions) -> Names {
    let family = options.family_name.clone()
        .filter(|s| !s.trim().is_empty())
        .or_else(|| cff.font_name().map(|s| s.into_owned()))
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| String::from(DEFAULT_FAMILY_NAME));

    let style = options.style_name.trim();
    let full_name = if style.is_empty() || style == "Regular" {
        family.clone()
    } else {
        format!("{} {}", family, style)
    };

    let post_script_name = name::sanitize_post_script_name(&family.replace(' ', "-"));

    Names {
        unique_id: format!("{};NONE;{}", VERSION, post_script_name),
        subfamily: if style.is_empty() { String::from("Regular") } else { style.to_string() },
        version: VERSION.to_string(),
        family,
        full_name,
        post_script_name,
    }
}

fn to_advance(width: f64) -> u16 {
    if !width.is_finite() {
        return 0;
    }

    metrics::round_half_up(width).max(0.0).min(f64::from(u16::MAX)) as u16
}
