//! Outline comparison and shape variant detection.
//!
//! A code point shared by several fonts is either a true duplicate (the
//! serialized outlines are identical everywhere) or a shape variant (at
//! least one pair of fonts draws it differently). Variants typically carry
//! regional design differences and must survive deduplication.

use std::collections::BTreeMap;
use std::path::PathBuf;

use write_fonts::read::{collections::IntSet, FontRef};

use crate::outline::extract_from;
use crate::survey::{survey_font, FontSurvey};
use crate::{read_font_bytes, DedupError, GlyphOutline};

/// A code point whose glyph design differs between fonts that share it.
#[derive(Clone, Debug)]
pub struct ShapeVariant {
    pub codepoint: u32,
    /// Fonts an outline was extracted from, in input order.
    pub fonts: Vec<PathBuf>,
    /// Pairwise similarity per unordered font pair, keyed in extraction
    /// order.
    pub similarity_scores: BTreeMap<(PathBuf, PathBuf), f32>,
}

/// Outcome of comparing glyph outlines across a set of fonts.
#[derive(Clone, Debug, Default)]
pub struct ShapeVariantReport {
    pub fonts: Vec<FontSurvey>,
    pub shape_variants: Vec<ShapeVariant>,
    /// Shared code points whose outlines are identical in every font that
    /// maps them; these are safe to deduplicate.
    pub unicode_duplicates: BTreeMap<u32, Vec<PathBuf>>,
    pub total_variant_count: usize,
}

/// Similarity score between two outlines.
///
/// Outline data is unrendered vector geometry, so any difference in the
/// serialized commands is a real design difference: the score is 1.0 for
/// identical outlines and 0.0 otherwise, with no partial credit. The
/// threshold accepted by [`find_shape_variants`] is validated and threaded
/// through for callers but does not grade this comparison.
pub fn similarity(a: &GlyphOutline, b: &GlyphOutline) -> f32 {
    if a.outline_data == b.outline_data {
        1.0
    } else {
        0.0
    }
}

/// Compare glyph outlines for every code point mapped by at least two of
/// `fonts` and classify each one as a true duplicate or a shape variant.
///
/// `codepoint_limit` caps how many shared code points are analyzed, keeping
/// the numerically smallest ones; variants past the cap go undetected, so
/// the cap is only suitable for reporting.
pub fn find_shape_variants(
    fonts: &[PathBuf],
    similarity_threshold: f32,
    codepoint_limit: Option<usize>,
) -> Result<ShapeVariantReport, DedupError> {
    if fonts.is_empty() {
        return Err(DedupError::EmptyFontList);
    }
    if !(0.0..=1.0).contains(&similarity_threshold) {
        return Err(DedupError::InvalidThreshold(similarity_threshold));
    }

    // Parse every font once for the whole batch; extracting outlines per
    // code point from freshly opened fonts would re-parse each font once
    // per shared code point.
    let data: Vec<Vec<u8>> = fonts
        .iter()
        .map(|path| read_font_bytes(path))
        .collect::<Result<_, _>>()?;
    let mut parsed: Vec<FontRef> = Vec::with_capacity(fonts.len());
    for (path, bytes) in fonts.iter().zip(&data) {
        let font = FontRef::new(bytes).map_err(|source| DedupError::InvalidFormat {
            path: path.clone(),
            source,
        })?;
        parsed.push(font);
    }

    let surveys: Vec<FontSurvey> = fonts
        .iter()
        .zip(&parsed)
        .map(|(path, font)| survey_font(font, path))
        .collect();

    let shared = shared_codepoints(&surveys, codepoint_limit);
    log::debug!(
        "comparing outlines for {} shared code points across {} fonts",
        shared.len(),
        fonts.len()
    );

    let mut shape_variants = Vec::new();
    let mut unicode_duplicates = BTreeMap::new();
    for codepoint in shared.iter() {
        let mut outlines: Vec<(PathBuf, GlyphOutline)> = Vec::new();
        for (index, survey) in surveys.iter().enumerate() {
            if !survey.codepoints.contains(codepoint) {
                continue;
            }
            // The cmap can map a code point to a glyph that has no outline
            // entry; such fonts are skipped rather than failing the batch.
            if let Some(outline) = extract_from(&parsed[index], &survey.path, codepoint) {
                outlines.push((survey.path.clone(), outline));
            }
        }
        if outlines.len() < 2 {
            continue;
        }

        let mut similarity_scores = BTreeMap::new();
        let mut has_variant = false;
        for i in 0..outlines.len() {
            for j in i + 1..outlines.len() {
                let score = similarity(&outlines[i].1, &outlines[j].1);
                if score < 1.0 {
                    has_variant = true;
                }
                similarity_scores
                    .insert((outlines[i].0.clone(), outlines[j].0.clone()), score);
            }
        }

        let font_paths: Vec<PathBuf> = outlines.into_iter().map(|(path, _)| path).collect();
        if has_variant {
            shape_variants.push(ShapeVariant {
                codepoint,
                fonts: font_paths,
                similarity_scores,
            });
        } else {
            unicode_duplicates.insert(codepoint, font_paths);
        }
    }

    let total_variant_count = shape_variants.len();
    Ok(ShapeVariantReport {
        fonts: surveys,
        shape_variants,
        unicode_duplicates,
        total_variant_count,
    })
}

/// Code points present in at least two surveys, truncated to the numerically
/// smallest `limit` entries when a cap is given.
fn shared_codepoints(surveys: &[FontSurvey], limit: Option<usize>) -> IntSet<u32> {
    let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
    for survey in surveys {
        for codepoint in survey.codepoints.iter() {
            *counts.entry(codepoint).or_default() += 1;
        }
    }
    let shared = counts
        .into_iter()
        .filter(|&(_, count)| count > 1)
        .map(|(codepoint, _)| codepoint);
    match limit {
        Some(limit) => {
            let shared: Vec<u32> = shared.collect();
            if shared.len() > limit {
                log::warn!(
                    "analyzing the smallest {limit} of {} shared code points; variants past the cap go unreported",
                    shared.len()
                );
            }
            shared.into_iter().take(limit).collect()
        }
        None => shared.collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn outline(codepoint: u32, path: &str, data: &[u8]) -> GlyphOutline {
        GlyphOutline {
            codepoint,
            font_path: Path::new(path).to_owned(),
            outline_data: data.to_vec(),
            bounding_box: (0.0, 0.0, 0.0, 0.0),
        }
    }

    #[test]
    fn similarity_is_reflexive() {
        let a = outline(0x41, "a.ttf", b"M....L....Z");
        assert_eq!(similarity(&a, &a), 1.0);
    }

    #[test]
    fn similarity_is_strict_equality() {
        let a = outline(0x41, "a.ttf", b"M....L....Z");
        let b = outline(0x41, "b.ttf", b"M....L....Z");
        let c = outline(0x41, "c.ttf", b"M....L...xZ");
        // identical bytes from different fonts still match
        assert_eq!(similarity(&a, &b), 1.0);
        // a near miss scores zero, never a fraction
        assert_eq!(similarity(&a, &c), 0.0);
    }

    #[test]
    fn empty_font_list_is_rejected() {
        assert!(matches!(
            find_shape_variants(&[], 1.0, None),
            Err(DedupError::EmptyFontList)
        ));
    }

    #[test]
    fn out_of_range_threshold_is_rejected() {
        let fonts = vec![Path::new("missing.ttf").to_owned()];
        assert!(matches!(
            find_shape_variants(&fonts, 1.5, None),
            Err(DedupError::InvalidThreshold(_))
        ));
        assert!(matches!(
            find_shape_variants(&fonts, -0.1, None),
            Err(DedupError::InvalidThreshold(_))
        ));
    }

    #[test]
    fn shared_codepoints_truncate_to_smallest() {
        let survey = |codepoints: &[u32]| FontSurvey {
            path: Path::new("x.ttf").to_owned(),
            family_name: "X".to_owned(),
            glyph_count: 0,
            codepoints: codepoints.iter().copied().collect(),
        };
        let surveys = [
            survey(&[0x41, 0x42, 0x43, 0x44, 0x100]),
            survey(&[0x41, 0x42, 0x43, 0x44, 0x200]),
        ];
        let all = shared_codepoints(&surveys, None);
        assert_eq!(all.iter().collect::<Vec<_>>(), vec![0x41, 0x42, 0x43, 0x44]);

        let capped = shared_codepoints(&surveys, Some(2));
        assert_eq!(capped.iter().collect::<Vec<_>>(), vec![0x41, 0x42]);
    }
}
