//! Human-readable rendering of analysis, dedup and validation results.

use std::collections::BTreeMap;
use std::fmt::Write;
use std::path::{Path, PathBuf};

use write_fonts::read::collections::IntSet;

use crate::engine::{DedupResult, ShapeAwareDedupResult};
use crate::shape::{ShapeVariant, ShapeVariantReport};
use crate::survey::{DuplicateReport, FontSurvey};
use crate::validate::ValidationResult;

const RULE: &str = "============================================================";
const THIN_RULE: &str = "------------------------------------------------------------";
const MAX_LISTED: usize = 20;
const MAX_LISTED_REMOVED: usize = 10;

/// Analysis output; the mode is chosen at the call site and rendered by
/// matching on the variant.
#[derive(Clone, Debug)]
pub enum AnalysisReport {
    Duplicates(DuplicateReport),
    ShapeVariants(ShapeVariantReport),
}

impl AnalysisReport {
    pub fn render(&self) -> String {
        match self {
            AnalysisReport::Duplicates(report) => render_duplicate_report(report),
            AnalysisReport::ShapeVariants(report) => render_shape_variant_report(report),
        }
    }
}

/// Dedup output, basic or shape-aware.
#[derive(Clone, Debug)]
pub enum DedupOutcome {
    Basic(DedupResult),
    ShapeAware(ShapeAwareDedupResult),
}

impl DedupOutcome {
    pub fn kept(&self) -> &BTreeMap<PathBuf, IntSet<u32>> {
        match self {
            DedupOutcome::Basic(result) => &result.kept,
            DedupOutcome::ShapeAware(result) => &result.kept,
        }
    }

    pub fn removed(&self) -> &BTreeMap<PathBuf, IntSet<u32>> {
        match self {
            DedupOutcome::Basic(result) => &result.removed,
            DedupOutcome::ShapeAware(result) => &result.removed,
        }
    }

    pub fn render(&self) -> String {
        let (title, preserved) = match self {
            DedupOutcome::Basic(_) => ("Glyph deduplication result", None),
            DedupOutcome::ShapeAware(result) => (
                "Glyph deduplication result (shape-aware)",
                Some(result.preserved_variants.as_slice()),
            ),
        };
        render_dedup(title, self.kept(), self.removed(), preserved)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn font_names(fonts: &[PathBuf]) -> String {
    fonts
        .iter()
        .map(|path| file_name(path))
        .collect::<Vec<_>>()
        .join(", ")
}

fn printable(codepoint: u32) -> char {
    if codepoint >= 0x20 {
        char::from_u32(codepoint).unwrap_or('?')
    } else {
        '?'
    }
}

fn push_survey_list(out: &mut String, fonts: &[FontSurvey]) {
    let _ = writeln!(out, "Fonts analyzed: {}", fonts.len());
    out.push('\n');
    for (index, survey) in fonts.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", index + 1, file_name(&survey.path));
        let _ = writeln!(out, "   family: {}", survey.family_name);
        let _ = writeln!(out, "   glyphs: {}", survey.glyph_count);
        let _ = writeln!(out, "   mapped code points: {}", survey.codepoints.len());
        out.push('\n');
    }
}

fn push_codepoint_fonts(out: &mut String, entries: &BTreeMap<u32, Vec<PathBuf>>) {
    for (codepoint, fonts) in entries.iter().take(MAX_LISTED) {
        let _ = writeln!(
            out,
            "  U+{codepoint:04X} ({}): {}",
            printable(*codepoint),
            font_names(fonts)
        );
    }
    if entries.len() > MAX_LISTED {
        let _ = writeln!(out, "  ... and {} more", entries.len() - MAX_LISTED);
    }
}

fn render_duplicate_report(report: &DuplicateReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "Glyph duplication analysis");
    let _ = writeln!(out, "{RULE}");
    out.push('\n');
    push_survey_list(&mut out, &report.fonts);

    let _ = writeln!(out, "{THIN_RULE}");
    let _ = writeln!(out, "Duplication summary");
    let _ = writeln!(out, "{THIN_RULE}");
    let _ = writeln!(
        out,
        "Duplicated code points found: {}",
        report.total_duplicate_count
    );
    out.push('\n');

    if report.total_duplicate_count > 0 {
        // how many code points are duplicated across how many fonts
        let mut by_font_count: BTreeMap<usize, usize> = BTreeMap::new();
        for fonts in report.duplicates.values() {
            *by_font_count.entry(fonts.len()).or_default() += 1;
        }
        let _ = writeln!(out, "Distribution:");
        for (font_count, codepoints) in by_font_count.iter().rev() {
            let _ = writeln!(
                out,
                "  present in {font_count} fonts: {codepoints} code points"
            );
        }
        out.push('\n');
        if report.total_duplicate_count <= MAX_LISTED {
            let _ = writeln!(out, "Duplicated code points:");
        } else {
            let _ = writeln!(out, "Duplicated code points (first {MAX_LISTED}):");
        }
        push_codepoint_fonts(&mut out, &report.duplicates);
    } else {
        let _ = writeln!(out, "No duplicated glyphs found.");
    }
    out.push('\n');
    let _ = writeln!(out, "{RULE}");
    out
}

fn render_shape_variant_report(report: &ShapeVariantReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "Glyph shape variant analysis");
    let _ = writeln!(out, "{RULE}");
    out.push('\n');
    push_survey_list(&mut out, &report.fonts);

    let _ = writeln!(out, "{THIN_RULE}");
    let _ = writeln!(out, "Classification summary");
    let _ = writeln!(out, "{THIN_RULE}");
    let _ = writeln!(out, "Shape variants found: {}", report.total_variant_count);
    let _ = writeln!(
        out,
        "True duplicates found: {}",
        report.unicode_duplicates.len()
    );
    out.push('\n');

    if !report.unicode_duplicates.is_empty() {
        let _ = writeln!(out, "{THIN_RULE}");
        let _ = writeln!(out, "True duplicates (identical shape)");
        let _ = writeln!(out, "{THIN_RULE}");
        out.push('\n');
        let _ = writeln!(
            out,
            "These code points have identical outlines in every font that maps"
        );
        let _ = writeln!(out, "them and are safe to deduplicate.");
        out.push('\n');
        push_codepoint_fonts(&mut out, &report.unicode_duplicates);
        out.push('\n');
    }

    if !report.shape_variants.is_empty() {
        let _ = writeln!(out, "{THIN_RULE}");
        let _ = writeln!(out, "Shape variants (differing shape)");
        let _ = writeln!(out, "{THIN_RULE}");
        out.push('\n');
        let _ = writeln!(
            out,
            "These code points are drawn differently between fonts, typically"
        );
        let _ = writeln!(
            out,
            "regional or stylistic design differences, and should be preserved."
        );
        out.push('\n');
        push_variant_list(&mut out, &report.shape_variants, true);
        out.push('\n');
    }

    if report.unicode_duplicates.is_empty() && report.shape_variants.is_empty() {
        let _ = writeln!(out, "No duplicates or shape variants found.");
        out.push('\n');
    }

    let _ = writeln!(out, "{RULE}");
    out
}

fn push_variant_list(out: &mut String, variants: &[ShapeVariant], with_scores: bool) {
    let listed = variants.len().min(MAX_LISTED);
    for variant in &variants[..listed] {
        let _ = writeln!(
            out,
            "  U+{:04X} ({}): {}",
            variant.codepoint,
            printable(variant.codepoint),
            font_names(&variant.fonts)
        );
        if with_scores && variants.len() <= MAX_LISTED {
            for ((left, right), score) in &variant.similarity_scores {
                let _ = writeln!(
                    out,
                    "    {} <-> {}: {score:.2}",
                    file_name(left),
                    file_name(right)
                );
            }
        }
    }
    if variants.len() > MAX_LISTED {
        let _ = writeln!(out, "  ... and {} more", variants.len() - MAX_LISTED);
    }
}

fn render_dedup(
    title: &str,
    kept: &BTreeMap<PathBuf, IntSet<u32>>,
    removed: &BTreeMap<PathBuf, IntSet<u32>>,
    preserved: Option<&[ShapeVariant]>,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "{title}");
    let _ = writeln!(out, "{RULE}");
    out.push('\n');

    let total_kept: u64 = kept.values().map(|set| set.len()).sum();
    let total_removed: u64 = removed.values().map(|set| set.len()).sum();
    let _ = writeln!(out, "Fonts processed: {}", kept.len());
    let _ = writeln!(out, "Code points kept: {total_kept}");
    let _ = writeln!(out, "Code points removed: {total_removed}");
    if let Some(variants) = preserved {
        let _ = writeln!(out, "Shape variants protected: {}", variants.len());
    }
    out.push('\n');

    if let Some(variants) = preserved.filter(|variants| !variants.is_empty()) {
        let _ = writeln!(out, "{THIN_RULE}");
        let _ = writeln!(out, "Protected shape variants");
        let _ = writeln!(out, "{THIN_RULE}");
        out.push('\n');
        let _ = writeln!(
            out,
            "These code points are drawn differently per font; every variant"
        );
        let _ = writeln!(out, "was kept:");
        out.push('\n');
        push_variant_list(&mut out, variants, false);
        out.push('\n');
    }

    let _ = writeln!(out, "{THIN_RULE}");
    let _ = writeln!(out, "Per-font details");
    let _ = writeln!(out, "{THIN_RULE}");
    out.push('\n');
    for (font_path, kept_set) in kept {
        let removed_set = removed.get(font_path);
        let removed_count = removed_set.map(|set| set.len()).unwrap_or_default();
        let _ = writeln!(out, "Font: {}", file_name(font_path));
        let _ = writeln!(out, "  code points kept: {}", kept_set.len());
        let _ = writeln!(out, "  code points removed: {removed_count}");
        if let Some(removed_set) = removed_set.filter(|set| !set.is_empty()) {
            let removed_list: Vec<String> = removed_set
                .iter()
                .take(MAX_LISTED_REMOVED)
                .map(|codepoint| format!("U+{codepoint:04X}"))
                .collect();
            if removed_count as usize <= MAX_LISTED_REMOVED {
                let _ = writeln!(out, "  removed: {}", removed_list.join(", "));
            } else {
                let _ = writeln!(
                    out,
                    "  removed: {} ... ({removed_count} total)",
                    removed_list.join(", ")
                );
            }
        }
        out.push('\n');
    }
    let _ = writeln!(out, "{RULE}");
    out
}

/// Render a [`ValidationResult`] for display.
pub fn format_validation(result: &ValidationResult) -> String {
    let mut out = String::new();
    if result.is_valid {
        let _ = writeln!(out, "validation passed");
    } else {
        let _ = writeln!(out, "validation FAILED");
    }
    if !result.errors.is_empty() {
        let _ = writeln!(out, "errors:");
        for error in &result.errors {
            let _ = writeln!(out, "  - {error}");
        }
    }
    if !result.warnings.is_empty() {
        let _ = writeln!(out, "warnings:");
        for warning in &result.warnings {
            let _ = writeln!(out, "  - {warning}");
        }
    }
    out.trim_end().to_owned()
}

/// Render an original-vs-output file size comparison.
pub fn format_file_size(original: u64, new: u64) -> String {
    if new < original {
        let saved = original - new;
        let percentage = saved as f64 / original as f64 * 100.0;
        format!(
            "file size: {} -> {} (saved {}, {percentage:.1}%)",
            format_bytes(original),
            format_bytes(new),
            format_bytes(saved)
        )
    } else if new > original {
        let grew = new - original;
        let percentage = grew as f64 / original as f64 * 100.0;
        format!(
            "file size: {} -> {} (grew {}, {percentage:.1}%)",
            format_bytes(original),
            format_bytes(new),
            format_bytes(grew)
        )
    } else {
        format!("file size: {} (unchanged)", format_bytes(original))
    }
}

fn format_bytes(size: u64) -> String {
    let mut size = size as f64;
    for unit in ["B", "KB", "MB", "GB"] {
        if size < 1024.0 {
            return format!("{size:.2} {unit}");
        }
        size /= 1024.0;
    }
    format!("{size:.2} TB")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn result_with(kept: &[(&str, &[u32])], removed: &[(&str, &[u32])]) -> DedupResult {
        let build = |entries: &[(&str, &[u32])]| {
            entries
                .iter()
                .map(|(name, cps)| {
                    (
                        Path::new(name).to_owned(),
                        cps.iter().copied().collect::<IntSet<u32>>(),
                    )
                })
                .collect()
        };
        DedupResult {
            kept: build(kept),
            removed: build(removed),
        }
    }

    #[test]
    fn dedup_report_counts_both_sides() {
        let result = result_with(
            &[("a.ttf", &[0x41, 0x42]), ("b.ttf", &[])],
            &[("a.ttf", &[]), ("b.ttf", &[0x41, 0x42])],
        );
        let rendered = DedupOutcome::Basic(result).render();
        assert!(rendered.contains("Fonts processed: 2"));
        assert!(rendered.contains("Code points kept: 2"));
        assert!(rendered.contains("Code points removed: 2"));
        assert!(rendered.contains("removed: U+0041, U+0042"));
        // basic mode never mentions variants
        assert!(!rendered.contains("Shape variants"));
    }

    #[test]
    fn empty_duplicate_report_says_so() {
        let report = DuplicateReport::default();
        let rendered = AnalysisReport::Duplicates(report).render();
        assert!(rendered.contains("No duplicated glyphs found."));
    }

    #[test]
    fn file_sizes_are_humanized() {
        assert_eq!(
            format_file_size(2048, 1024),
            "file size: 2.00 KB -> 1.00 KB (saved 1.00 KB, 50.0%)"
        );
        assert_eq!(format_file_size(100, 100), "file size: 100.00 B (unchanged)");
        assert!(format_file_size(1024, 4096).contains("grew"));
    }
}
