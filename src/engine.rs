//! Priority resolution and the ownership partitioning engine.
//!
//! Fonts are walked in priority order; the first font to claim a code point
//! inside the deduplication scope owns it, and every later font that also
//! maps it has it marked for removal. Exclusion ranges dominate everything,
//! code points outside an active range filter pass through untouched, and in
//! shape-aware mode detected variants are kept everywhere without ever
//! entering the claim set.

use std::collections::BTreeMap;
use std::path::PathBuf;

use write_fonts::read::collections::IntSet;

use crate::ranges::in_any_range;
use crate::shape::{find_shape_variants, ShapeVariant};
use crate::survey::survey;
use crate::DedupError;

/// Which code points each font keeps and loses.
///
/// For every input font, `kept` and `removed` are disjoint and their union
/// is exactly the font's original code point set.
#[derive(Clone, Debug, Default)]
pub struct DedupResult {
    pub kept: BTreeMap<PathBuf, IntSet<u32>>,
    pub removed: BTreeMap<PathBuf, IntSet<u32>>,
}

/// [`DedupResult`] plus the shape variants that were protected from removal.
#[derive(Clone, Debug, Default)]
pub struct ShapeAwareDedupResult {
    pub kept: BTreeMap<PathBuf, IntSet<u32>>,
    pub removed: BTreeMap<PathBuf, IntSet<u32>>,
    /// One entry per protected code point, ordered by code point.
    pub preserved_variants: Vec<ShapeVariant>,
    /// Pairwise similarity scores for each protected code point.
    pub similarity_data: BTreeMap<u32, BTreeMap<(PathBuf, PathBuf), f32>>,
}

/// Engine mode: plain priority dedup, or outline comparison protecting shape
/// variants.
#[derive(Copy, Clone, Debug)]
pub enum Mode {
    Basic,
    ShapeAware { threshold: f32 },
}

/// Priority-based glyph deduplication across multiple fonts.
#[derive(Clone, Debug)]
pub struct DedupEngine {
    priority: Option<Vec<PathBuf>>,
    mode: Mode,
}

impl DedupEngine {
    /// Engine with plain priority semantics. `priority` lists fonts from
    /// highest to lowest; input order is used when absent.
    pub fn new(priority: Option<Vec<PathBuf>>) -> Self {
        Self {
            priority,
            mode: Mode::Basic,
        }
    }

    /// Engine that additionally compares outlines and keeps shape variants
    /// in every font that has one.
    pub fn with_shape_analysis(
        priority: Option<Vec<PathBuf>>,
        threshold: f32,
    ) -> Result<Self, DedupError> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(DedupError::InvalidThreshold(threshold));
        }
        Ok(Self {
            priority,
            mode: Mode::ShapeAware { threshold },
        })
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Partition each font's code points into kept and removed.
    pub fn deduplicate(
        &self,
        fonts: &[PathBuf],
        unicode_ranges: Option<&[(u32, u32)]>,
        exclude_ranges: Option<&[(u32, u32)]>,
    ) -> Result<DedupResult, DedupError> {
        if fonts.is_empty() {
            return Err(DedupError::EmptyFontList);
        }
        let order = priority_order(fonts, self.priority.as_deref());
        let codepoints = survey_codepoints(fonts)?;
        let partition = partition_codepoints(
            &order,
            &codepoints,
            unicode_ranges,
            exclude_ranges,
            &IntSet::empty(),
        );
        Ok(DedupResult {
            kept: partition.kept,
            removed: partition.removed,
        })
    }

    /// Like [`deduplicate`](Self::deduplicate), but code points classified as
    /// shape variants are kept in every font that maps them.
    ///
    /// Fails with [`DedupError::ShapeAnalysisDisabled`] unless the engine was
    /// built with [`with_shape_analysis`](Self::with_shape_analysis).
    pub fn deduplicate_with_shapes(
        &self,
        fonts: &[PathBuf],
        unicode_ranges: Option<&[(u32, u32)]>,
        exclude_ranges: Option<&[(u32, u32)]>,
    ) -> Result<ShapeAwareDedupResult, DedupError> {
        let Mode::ShapeAware { threshold } = self.mode else {
            return Err(DedupError::ShapeAnalysisDisabled);
        };
        if fonts.is_empty() {
            return Err(DedupError::EmptyFontList);
        }
        let order = priority_order(fonts, self.priority.as_deref());
        let codepoints = survey_codepoints(fonts)?;

        // The variant lookup runs over the full shared set: the analysis cap
        // offered by the standalone entry point is for reporting only and
        // would under-protect variants here.
        let report = find_shape_variants(fonts, threshold, None)?;
        let variant_set: IntSet<u32> = report
            .shape_variants
            .iter()
            .map(|variant| variant.codepoint)
            .collect();

        let partition = partition_codepoints(
            &order,
            &codepoints,
            unicode_ranges,
            exclude_ranges,
            &variant_set,
        );

        let preserved_variants: Vec<ShapeVariant> = report
            .shape_variants
            .into_iter()
            .filter(|variant| partition.preserved.contains(variant.codepoint))
            .collect();
        let similarity_data = preserved_variants
            .iter()
            .map(|variant| (variant.codepoint, variant.similarity_scores.clone()))
            .collect();
        log::info!(
            "protected {} shape variant code points from removal",
            preserved_variants.len()
        );

        Ok(ShapeAwareDedupResult {
            kept: partition.kept,
            removed: partition.removed,
            preserved_variants,
            similarity_data,
        })
    }
}

/// Definitive font ordering, highest priority first: explicit entries that
/// appear in `fonts` keep their explicit order, the remaining fonts follow
/// in input order, and explicit entries absent from `fonts` are ignored.
pub fn priority_order(fonts: &[PathBuf], explicit: Option<&[PathBuf]>) -> Vec<PathBuf> {
    let Some(explicit) = explicit else {
        return fonts.to_vec();
    };
    let mut ordered: Vec<PathBuf> = Vec::with_capacity(fonts.len());
    for path in explicit.iter().filter(|path| fonts.contains(path)) {
        if !ordered.contains(path) {
            ordered.push(path.clone());
        }
    }
    for font in fonts {
        if !ordered.contains(font) {
            ordered.push(font.clone());
        }
    }
    ordered
}

fn survey_codepoints(
    fonts: &[PathBuf],
) -> Result<BTreeMap<PathBuf, IntSet<u32>>, DedupError> {
    fonts
        .iter()
        .map(|path| Ok((path.clone(), survey(path)?.codepoints)))
        .collect()
}

struct Partition {
    kept: BTreeMap<PathBuf, IntSet<u32>>,
    removed: BTreeMap<PathBuf, IntSet<u32>>,
    /// Variant code points that were actually inside the dedup scope of some
    /// font and therefore protected.
    preserved: IntSet<u32>,
}

/// The per-codepoint decision loop. Pure over its inputs: the outcome
/// depends only on the priority order, the range filters and the variant
/// classification, never on the iteration order within a font.
fn partition_codepoints(
    order: &[PathBuf],
    codepoints: &BTreeMap<PathBuf, IntSet<u32>>,
    unicode_ranges: Option<&[(u32, u32)]>,
    exclude_ranges: Option<&[(u32, u32)]>,
    variants: &IntSet<u32>,
) -> Partition {
    let mut kept: BTreeMap<PathBuf, IntSet<u32>> = codepoints
        .keys()
        .map(|path| (path.clone(), IntSet::empty()))
        .collect();
    let mut removed = kept.clone();
    let mut claimed: IntSet<u32> = IntSet::empty();
    let mut preserved: IntSet<u32> = IntSet::empty();

    for font_path in order {
        let Some(original) = codepoints.get(font_path) else {
            continue;
        };
        let mut keep = IntSet::empty();
        let mut cut = IntSet::empty();
        for codepoint in original.iter() {
            let excluded = exclude_ranges.map_or(false, |ranges| in_any_range(codepoint, ranges));
            let in_scope = unicode_ranges.map_or(true, |ranges| in_any_range(codepoint, ranges));
            if excluded {
                // exclusion dominates the claim state and the range filter
                keep.insert(codepoint);
            } else if !in_scope {
                // outside the dedup scope, passes through untouched
                keep.insert(codepoint);
            } else if variants.contains(codepoint) {
                // variants are exempt from the claim mechanism entirely
                keep.insert(codepoint);
                preserved.insert(codepoint);
            } else if !claimed.contains(codepoint) {
                keep.insert(codepoint);
                claimed.insert(codepoint);
            } else {
                cut.insert(codepoint);
            }
        }
        kept.insert(font_path.clone(), keep);
        removed.insert(font_path.clone(), cut);
    }

    Partition {
        kept,
        removed,
        preserved,
    }
}
