//! Per-font surveying and cross-font duplicate discovery.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use skrifa::{string::StringId, MetadataProvider};
use write_fonts::read::{collections::IntSet, FontRef, TableProvider};
use write_fonts::types::GlyphId;

use crate::{read_font_bytes, DedupError};

/// Metadata for one font file: identity, size and Unicode coverage.
#[derive(Clone, Debug)]
pub struct FontSurvey {
    pub path: PathBuf,
    /// Family name from the name table, "Unknown" when unresolvable.
    pub family_name: String,
    /// Total number of glyphs in the font, mapped or not.
    pub glyph_count: u16,
    /// Every code point reachable through the best available character map.
    pub codepoints: IntSet<u32>,
}

/// One entry of a font's code point to glyph mapping.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GlyphRecord {
    pub codepoint: u32,
    pub glyph_id: GlyphId,
}

/// Code points mapped by more than one of the analyzed fonts.
#[derive(Clone, Debug, Default)]
pub struct DuplicateReport {
    pub fonts: Vec<FontSurvey>,
    /// Code point to the fonts containing it, only entries with two or more
    /// fonts.
    pub duplicates: BTreeMap<u32, Vec<PathBuf>>,
    pub total_duplicate_count: usize,
}

/// Parse `font_path` and collect its survey.
pub fn survey(font_path: &Path) -> Result<FontSurvey, DedupError> {
    let data = read_font_bytes(font_path)?;
    let font = FontRef::new(&data).map_err(|source| DedupError::InvalidFormat {
        path: font_path.to_owned(),
        source,
    })?;
    Ok(survey_font(&font, font_path))
}

pub(crate) fn survey_font(font: &FontRef, path: &Path) -> FontSurvey {
    let family_name = font
        .localized_strings(StringId::FAMILY_NAME)
        .english_or_first()
        .map(|name| name.to_string())
        .unwrap_or_else(|| "Unknown".to_owned());
    let glyph_count = font
        .maxp()
        .map(|maxp| maxp.num_glyphs())
        .unwrap_or_default();
    let codepoints = font.charmap().mappings().map(|(cp, _)| cp).collect();
    FontSurvey {
        path: path.to_owned(),
        family_name,
        glyph_count,
        codepoints,
    }
}

/// The full code point to glyph id listing for one font, ordered by code
/// point.
pub fn glyph_records(font_path: &Path) -> Result<Vec<GlyphRecord>, DedupError> {
    let data = read_font_bytes(font_path)?;
    let font = FontRef::new(&data).map_err(|source| DedupError::InvalidFormat {
        path: font_path.to_owned(),
        source,
    })?;
    let mut records: Vec<_> = font
        .charmap()
        .mappings()
        .map(|(codepoint, glyph_id)| GlyphRecord {
            codepoint,
            glyph_id,
        })
        .collect();
    records.sort_by_key(|record| record.codepoint);
    Ok(records)
}

/// Survey all `fonts` and report every code point present in at least two of
/// them.
pub fn find_duplicates(fonts: &[PathBuf]) -> Result<DuplicateReport, DedupError> {
    if fonts.is_empty() {
        return Err(DedupError::EmptyFontList);
    }

    let mut surveys = Vec::with_capacity(fonts.len());
    let mut codepoint_to_fonts: BTreeMap<u32, Vec<PathBuf>> = BTreeMap::new();
    for font_path in fonts {
        let survey = survey(font_path)?;
        for codepoint in survey.codepoints.iter() {
            codepoint_to_fonts
                .entry(codepoint)
                .or_default()
                .push(font_path.clone());
        }
        surveys.push(survey);
    }

    codepoint_to_fonts.retain(|_, fonts_with_cp| fonts_with_cp.len() > 1);
    let total_duplicate_count = codepoint_to_fonts.len();
    log::debug!(
        "{total_duplicate_count} duplicated code points across {} fonts",
        fonts.len()
    );

    Ok(DuplicateReport {
        fonts: surveys,
        duplicates: codepoint_to_fonts,
        total_duplicate_count,
    })
}
