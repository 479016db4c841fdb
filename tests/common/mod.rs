//! Shared helpers that synthesize small, real TrueType fixtures for the
//! integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use kurbo::{BezPath, Shape};
use write_fonts::{
    tables::{
        cmap::Cmap,
        glyf::{GlyfLocaBuilder, SimpleGlyph},
        head::Head,
        hhea::Hhea,
        hmtx::{Hmtx, LongMetric},
        loca::LocaFormat,
        maxp::Maxp,
        name::{Name, NameRecord},
        post::Post,
    },
    types::{FWord, GlyphId, NameId, UfWord},
    FontBuilder,
};

pub const UPEM: u16 = 1000;

/// An axis-aligned square with its lower-left corner at `(origin, origin)`.
pub fn square(origin: f64, size: f64) -> BezPath {
    let mut path = BezPath::new();
    path.move_to((origin, origin));
    path.line_to((origin, origin + size));
    path.line_to((origin + size, origin + size));
    path.line_to((origin + size, origin));
    path.close_path();
    path
}

/// A right triangle with legs of length `size` starting at `(origin, origin)`.
pub fn triangle(origin: f64, size: f64) -> BezPath {
    let mut path = BezPath::new();
    path.move_to((origin, origin));
    path.line_to((origin + size, origin));
    path.line_to((origin, origin + size));
    path.close_path();
    path
}

/// Build a minimal TrueType font. Each `(codepoint, path)` entry becomes its
/// own glyph mapped through the cmap; glyph 0 is an empty `.notdef`.
pub fn build_font(family: &str, glyphs: &[(u32, BezPath)]) -> Vec<u8> {
    let mut glyf_builder = GlyfLocaBuilder::new();
    glyf_builder
        .add_glyph(&SimpleGlyph::from_bezpath(&BezPath::new()).unwrap())
        .unwrap();

    let mut mappings = Vec::with_capacity(glyphs.len());
    let mut metrics = vec![LongMetric {
        advance: 600,
        side_bearing: 0,
    }];
    let mut bounds: Option<kurbo::Rect> = None;
    for (index, (codepoint, path)) in glyphs.iter().enumerate() {
        glyf_builder
            .add_glyph(&SimpleGlyph::from_bezpath(path).unwrap())
            .unwrap();
        mappings.push((
            char::from_u32(*codepoint).unwrap(),
            GlyphId::new(index as u32 + 1),
        ));
        metrics.push(LongMetric {
            advance: 600,
            side_bearing: 0,
        });
        let glyph_bounds = path.bounding_box();
        bounds = Some(match bounds {
            Some(existing) => existing.union(glyph_bounds),
            None => glyph_bounds,
        });
    }
    let (glyf, loca, loca_format) = glyf_builder.build();
    let bounds = bounds.unwrap_or(kurbo::Rect::ZERO);
    let num_glyphs = glyphs.len() as u16 + 1;

    let cmap = Cmap::from_mappings(mappings).unwrap();
    let head = Head {
        units_per_em: UPEM,
        x_min: bounds.min_x() as i16,
        y_min: bounds.min_y() as i16,
        x_max: bounds.max_x() as i16,
        y_max: bounds.max_y() as i16,
        index_to_loc_format: match loca_format {
            LocaFormat::Short => 0,
            LocaFormat::Long => 1,
        },
        ..Default::default()
    };
    let hhea = Hhea {
        ascender: FWord::new(800),
        descender: FWord::new(-200),
        line_gap: FWord::new(0),
        advance_width_max: UfWord::new(600),
        min_left_side_bearing: FWord::new(0),
        min_right_side_bearing: FWord::new(0),
        x_max_extent: FWord::new(bounds.max_x() as i16),
        caret_slope_rise: 1,
        caret_slope_run: 0,
        caret_offset: 0,
        number_of_h_metrics: num_glyphs,
    };
    let hmtx = Hmtx {
        h_metrics: metrics,
        left_side_bearings: vec![],
    };
    let maxp = Maxp {
        num_glyphs,
        ..Default::default()
    };
    let mut name = Name::default();
    name.name_record.push(NameRecord::new(
        3,
        1,
        0x409,
        NameId::FAMILY_NAME,
        String::from(family).into(),
    ));
    name.name_record.push(NameRecord::new(
        3,
        1,
        0x409,
        NameId::SUBFAMILY_NAME,
        String::from("Regular").into(),
    ));
    name.name_record.push(NameRecord::new(
        3,
        1,
        0x409,
        NameId::FULL_NAME,
        format!("{family} Regular").into(),
    ));
    name.name_record.sort();

    let mut builder = FontBuilder::new();
    builder.add_table(&cmap).unwrap();
    builder.add_table(&glyf).unwrap();
    builder.add_table(&loca).unwrap();
    builder.add_table(&head).unwrap();
    builder.add_table(&hhea).unwrap();
    builder.add_table(&hmtx).unwrap();
    builder.add_table(&maxp).unwrap();
    builder.add_table(&name).unwrap();
    builder.add_table(&Post::default()).unwrap();
    builder.build()
}

/// Write a fixture font into `dir` and return its path.
pub fn write_font(dir: &Path, file_name: &str, family: &str, glyphs: &[(u32, BezPath)]) -> PathBuf {
    let path = dir.join(file_name);
    std::fs::write(&path, build_font(family, glyphs)).unwrap();
    path
}
