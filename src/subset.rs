//! Writing slimmed fonts through the skera subsetter.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use skera::{subset_font, Plan, SubsetFlags};
use write_fonts::read::{collections::IntSet, FontRef};

use crate::{read_font_bytes, DedupError};

const MAX_CODEPOINT: u32 = 0x10FFFF;

/// Subset `source_font` down to `codepoints`, writing the new font to
/// `output_path` (parent directories are created as needed).
///
/// Layout features, name records (legacy ones included) and the `.notdef`
/// outline are retained; glyph bounds are recomputed from the retained
/// outlines and the original timestamps are carried through. Code points
/// beyond the Unicode scalar range are silently dropped from the retain set.
pub fn subset(
    source_font: &Path,
    codepoints: &IntSet<u32>,
    output_path: &Path,
) -> Result<PathBuf, DedupError> {
    let data = read_font_bytes(source_font)?;
    let font = FontRef::new(&data).map_err(|source| DedupError::InvalidFormat {
        path: source_font.to_owned(),
        source,
    })?;

    let unicodes: IntSet<u32> = codepoints
        .iter()
        .filter(|codepoint| *codepoint <= MAX_CODEPOINT)
        .collect();

    let flags = SubsetFlags::SUBSET_FLAGS_NOTDEF_OUTLINE
        | SubsetFlags::SUBSET_FLAGS_NAME_LEGACY
        | SubsetFlags::SUBSET_FLAGS_PASSTHROUGH_UNRECOGNIZED;
    let plan = Plan::new(
        &IntSet::empty(), // selection is purely by code point, no explicit gids
        &unicodes,
        &font,
        flags,
        &IntSet::empty(), // drop no tables
        &IntSet::all(),   // keep every layout script
        &IntSet::all(),   // keep every layout feature
        &IntSet::all(),   // keep every name record
        &IntSet::all(),   // in every language
    );
    let output = subset_font(&font, &plan).map_err(|source| DedupError::Subset {
        path: source_font.to_owned(),
        source,
    })?;

    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| DedupError::Filesystem {
            path: parent.to_owned(),
            source,
        })?;
    }
    std::fs::write(output_path, output).map_err(|source| DedupError::Filesystem {
        path: output_path.to_owned(),
        source,
    })?;
    log::info!(
        "wrote {} with {} retained code points",
        output_path.display(),
        unicodes.len()
    );
    Ok(output_path.to_owned())
}

/// Subset every font of a kept-codepoints mapping into `output_dir`, naming
/// each output `{stem}{suffix}{ext}`. Fonts are processed in parallel; the
/// returned paths follow the mapping's iteration order.
pub fn batch_subset(
    kept: &BTreeMap<PathBuf, IntSet<u32>>,
    output_dir: &Path,
    suffix: &str,
) -> Result<Vec<PathBuf>, DedupError> {
    std::fs::create_dir_all(output_dir).map_err(|source| DedupError::Filesystem {
        path: output_dir.to_owned(),
        source,
    })?;
    kept.par_iter()
        .map(|(font_path, codepoints)| {
            let output_path = output_dir.join(output_name(font_path, suffix));
            subset(font_path, codepoints, &output_path)
        })
        .collect()
}

fn output_name(font_path: &Path, suffix: &str) -> String {
    let stem = font_path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("font");
    match font_path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => format!("{stem}{suffix}.{ext}"),
        None => format!("{stem}{suffix}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_names_keep_stem_and_extension() {
        assert_eq!(
            output_name(Path::new("fonts/NotoSansSC.ttf"), "_dedup"),
            "NotoSansSC_dedup.ttf"
        );
        assert_eq!(
            output_name(Path::new("Foo.otf"), "-slim"),
            "Foo-slim.otf"
        );
        assert_eq!(output_name(Path::new("bare"), "_dedup"), "bare_dedup");
    }
}
