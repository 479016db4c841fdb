//! Deduplicate glyphs across a set of font files.
//!
//! Given several fonts with overlapping Unicode coverage, the engine decides
//! per code point which font keeps its glyph, strips it from the rest and
//! writes slimmed copies. The optional shape-aware mode compares glyph
//! outlines so that code points whose designs genuinely differ between fonts
//! (regional Han variants, stylistic splits) are preserved in every font that
//! carries a distinct shape instead of being collapsed into one.

mod engine;
mod outline;
mod ranges;
mod report;
mod shape;
mod subset;
mod survey;
mod validate;

pub use engine::{
    priority_order, DedupEngine, DedupResult, Mode, ShapeAwareDedupResult,
};
pub use outline::{extract_outline, GlyphOutline};
pub use ranges::{in_any_range, parse_range, parse_ranges};
pub use report::{
    format_file_size, format_validation, AnalysisReport, DedupOutcome,
};
pub use shape::{find_shape_variants, similarity, ShapeVariant, ShapeVariantReport};
pub use subset::{batch_subset, subset};
pub use survey::{
    find_duplicates, glyph_records, survey, DuplicateReport, FontSurvey, GlyphRecord,
};
pub use validate::{validate_format, validate_glyph_coverage, ValidationResult};

use std::path::{Path, PathBuf};

use thiserror::Error;
use write_fonts::read::ReadError;

/// Errors surfaced by the deduplication pipeline.
#[derive(Debug, Error)]
pub enum DedupError {
    #[error("font file not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to parse font file {path}: {source}")]
    InvalidFormat { path: PathBuf, source: ReadError },

    #[error("at least one font file is required")]
    EmptyFontList,

    #[error("similarity threshold must be within 0.0..=1.0, got {0}")]
    InvalidThreshold(f32),

    #[error("invalid code point range '{0}', expected START-END within 0x0..=0x10FFFF")]
    InvalidRange(String),

    #[error("unsupported font format for {0}, expected a .ttf or .otf file")]
    UnsupportedFormat(PathBuf),

    #[error("priority font {0} is not among the input fonts")]
    PriorityNotInInputs(PathBuf),

    #[error("output path {0} exists and is not a directory")]
    OutputNotDirectory(PathBuf),

    #[error("shape analysis is not enabled on this engine")]
    ShapeAnalysisDisabled,

    #[error("subsetting {path} failed: {source}")]
    Subset {
        path: PathBuf,
        source: skera::SubsetError,
    },

    #[error("filesystem operation on {path} failed: {source}")]
    Filesystem {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Read a font file into memory, distinguishing a missing path from other
/// I/O failures.
pub(crate) fn read_font_bytes(path: &Path) -> Result<Vec<u8>, DedupError> {
    if !path.exists() {
        return Err(DedupError::NotFound(path.to_owned()));
    }
    std::fs::read(path).map_err(|source| DedupError::Filesystem {
        path: path.to_owned(),
        source,
    })
}
