//! Structural and coverage validation of output fonts.

use std::path::Path;

use skrifa::MetadataProvider;
use write_fonts::read::{collections::IntSet, FontRef, TableProvider};
use write_fonts::types::{GlyphId, Tag};

const REQUIRED_TABLES: [Tag; 7] = [
    Tag::new(b"cmap"),
    Tag::new(b"head"),
    Tag::new(b"hhea"),
    Tag::new(b"hmtx"),
    Tag::new(b"maxp"),
    Tag::new(b"name"),
    Tag::new(b"post"),
];
const OUTLINE_TABLES: [Tag; 3] = [Tag::new(b"glyf"), Tag::new(b"CFF "), Tag::new(b"CFF2")];
const HEAD_MAGIC: u32 = 0x5F0F3CF5;

// Beyond these counts the offending code points are summarized rather than
// listed in full.
const MAX_LISTED_MISSING: usize = 10;
const MAX_LISTED_INACCESSIBLE: usize = 5;

/// Outcome of validating one font file. Errors fail validation, warnings do
/// not.
#[derive(Clone, Debug)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

impl ValidationResult {
    fn error(&mut self, message: String) {
        self.is_valid = false;
        self.errors.push(message);
    }

    fn warn(&mut self, message: String) {
        self.warnings.push(message);
    }

    fn failure(message: String) -> Self {
        let mut result = Self::default();
        result.error(message);
        result
    }
}

/// Check that `font_path` is a structurally sound font: parseable, carrying
/// the required tables, outline data and a sane header.
pub fn validate_format(font_path: &Path) -> ValidationResult {
    if !font_path.exists() {
        return ValidationResult::failure(format!("file does not exist: {}", font_path.display()));
    }
    match std::fs::metadata(font_path) {
        Ok(metadata) if metadata.len() == 0 => {
            return ValidationResult::failure(format!("file is empty: {}", font_path.display()));
        }
        Err(error) => {
            return ValidationResult::failure(format!(
                "cannot stat {}: {error}",
                font_path.display()
            ));
        }
        Ok(_) => {}
    }
    let data = match std::fs::read(font_path) {
        Ok(data) => data,
        Err(error) => {
            return ValidationResult::failure(format!(
                "cannot read {}: {error}",
                font_path.display()
            ));
        }
    };
    let font = match FontRef::new(&data) {
        Ok(font) => font,
        Err(error) => {
            return ValidationResult::failure(format!(
                "not a parseable font file {}: {error}",
                font_path.display()
            ));
        }
    };

    let mut result = ValidationResult::default();

    let missing: Vec<String> = REQUIRED_TABLES
        .iter()
        .filter(|tag| font.table_data(**tag).is_none())
        .map(|tag| tag.to_string())
        .collect();
    if !missing.is_empty() {
        result.error(format!("missing required tables: {}", missing.join(", ")));
    }

    if !OUTLINE_TABLES
        .iter()
        .any(|tag| font.table_data(*tag).is_some())
    {
        result.error("no glyph outline data (glyf or CFF table)".to_owned());
    }

    let charmap = font.charmap();
    if !charmap.has_map() {
        result.warn("no usable character map".to_owned());
    } else if charmap.mappings().next().is_none() {
        result.warn("character map contains no mappings".to_owned());
    }

    if let Ok(head) = font.head() {
        let magic = head.magic_number();
        if magic != HEAD_MAGIC {
            result.error(format!("bad head table magic number: {magic:#010X}"));
        }
    }

    result
}

/// Check that every code point in `expected` is reachable in the font at
/// `font_path`: mapped by the character map, and mapped to a glyph that
/// actually exists. All offenders are collected, not just the first.
pub fn validate_glyph_coverage(font_path: &Path, expected: &IntSet<u32>) -> ValidationResult {
    let mut result = validate_format(font_path);
    if !result.is_valid {
        return result;
    }

    let data = match std::fs::read(font_path) {
        Ok(data) => data,
        Err(error) => {
            result.error(format!("cannot read {}: {error}", font_path.display()));
            return result;
        }
    };
    let font = match FontRef::new(&data) {
        Ok(font) => font,
        Err(error) => {
            result.error(format!(
                "not a parseable font file {}: {error}",
                font_path.display()
            ));
            return result;
        }
    };

    let charmap = font.charmap();
    let glyph_count = font
        .maxp()
        .map(|maxp| maxp.num_glyphs())
        .unwrap_or_default() as u32;

    let mut missing: Vec<u32> = Vec::new();
    let mut inaccessible: Vec<(u32, GlyphId)> = Vec::new();
    for codepoint in expected.iter() {
        match charmap.map(codepoint) {
            None => missing.push(codepoint),
            Some(glyph_id) if glyph_id.to_u32() >= glyph_count => {
                inaccessible.push((codepoint, glyph_id));
            }
            Some(_) => {}
        }
    }

    if !missing.is_empty() {
        result.error(format_missing(&missing));
    }
    if !inaccessible.is_empty() {
        result.error(format_inaccessible(&inaccessible));
    }
    result
}

fn format_missing(missing: &[u32]) -> String {
    let listed = if missing.len() <= MAX_LISTED_MISSING {
        codepoint_list(missing)
    } else {
        format!(
            "{} ... ({} total)",
            codepoint_list(&missing[..MAX_LISTED_MISSING / 2]),
            missing.len()
        )
    };
    format!("code points absent from the character map: {listed}")
}

fn format_inaccessible(inaccessible: &[(u32, GlyphId)]) -> String {
    let entry = |&(codepoint, glyph_id): &(u32, GlyphId)| format!("U+{codepoint:04X} -> {glyph_id}");
    let listed = if inaccessible.len() <= MAX_LISTED_INACCESSIBLE {
        inaccessible.iter().map(entry).collect::<Vec<_>>().join(", ")
    } else {
        format!(
            "{} ... ({} total)",
            inaccessible[..MAX_LISTED_INACCESSIBLE / 2 + 1]
                .iter()
                .map(entry)
                .collect::<Vec<_>>()
                .join(", "),
            inaccessible.len()
        )
    };
    format!("code points mapped to glyphs that do not exist: {listed}")
}

fn codepoint_list(codepoints: &[u32]) -> String {
    codepoints
        .iter()
        .map(|codepoint| format!("U+{codepoint:04X}"))
        .collect::<Vec<_>>()
        .join(", ")
}
