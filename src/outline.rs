//! Glyph outline extraction.
//!
//! Outlines are captured by drawing a glyph through a recording pen and
//! serializing the recorded path elements into a canonical byte form, so that
//! byte equality of two captures implies command-for-command equality of the
//! geometry.

use std::path::{Path, PathBuf};

use skrifa::{
    instance::{LocationRef, Size},
    outline::{pen::PathElement, DrawSettings},
    MetadataProvider,
};
use write_fonts::read::FontRef;

use crate::{read_font_bytes, DedupError};

/// A glyph outline captured from one font for comparison against other fonts.
#[derive(Clone, Debug, PartialEq)]
pub struct GlyphOutline {
    pub codepoint: u32,
    pub font_path: PathBuf,
    /// Canonical serialization of the recorded draw commands.
    pub outline_data: Vec<u8>,
    /// `(x_min, y_min, x_max, y_max)` over every point the commands touch,
    /// control points included; all zeros for an empty outline.
    pub bounding_box: (f32, f32, f32, f32),
}

/// Extract the outline for `codepoint` from the font at `font_path`.
///
/// Returns `None` when the font does not map the code point or has no
/// outline for the mapped glyph; that is expected for sparse fonts and is
/// not an error.
pub fn extract_outline(
    font_path: &Path,
    codepoint: u32,
) -> Result<Option<GlyphOutline>, DedupError> {
    let data = read_font_bytes(font_path)?;
    let font = FontRef::new(&data).map_err(|source| DedupError::InvalidFormat {
        path: font_path.to_owned(),
        source,
    })?;
    Ok(extract_from(&font, font_path, codepoint))
}

pub(crate) fn extract_from(
    font: &FontRef,
    font_path: &Path,
    codepoint: u32,
) -> Option<GlyphOutline> {
    let glyph_id = font.charmap().map(codepoint)?;
    let glyph = font.outline_glyphs().get(glyph_id)?;
    let mut elements: Vec<PathElement> = Vec::new();
    glyph
        .draw(
            DrawSettings::unhinted(Size::unscaled(), LocationRef::default()),
            &mut elements,
        )
        .ok()?;
    Some(GlyphOutline {
        codepoint,
        font_path: font_path.to_owned(),
        outline_data: serialize_elements(&elements),
        bounding_box: bounding_box(&elements),
    })
}

fn serialize_elements(elements: &[PathElement]) -> Vec<u8> {
    let mut out = Vec::with_capacity(elements.len() * 9);
    for element in elements {
        match *element {
            PathElement::MoveTo { x, y } => {
                out.push(b'M');
                push_coords(&mut out, &[x, y]);
            }
            PathElement::LineTo { x, y } => {
                out.push(b'L');
                push_coords(&mut out, &[x, y]);
            }
            PathElement::QuadTo { cx0, cy0, x, y } => {
                out.push(b'Q');
                push_coords(&mut out, &[cx0, cy0, x, y]);
            }
            PathElement::CurveTo {
                cx0,
                cy0,
                cx1,
                cy1,
                x,
                y,
            } => {
                out.push(b'C');
                push_coords(&mut out, &[cx0, cy0, cx1, cy1, x, y]);
            }
            PathElement::Close => out.push(b'Z'),
        }
    }
    out
}

fn push_coords(out: &mut Vec<u8>, coords: &[f32]) {
    for coord in coords {
        out.extend_from_slice(&coord.to_be_bytes());
    }
}

fn bounding_box(elements: &[PathElement]) -> (f32, f32, f32, f32) {
    let mut bounds: Option<(f32, f32, f32, f32)> = None;
    for element in elements {
        match *element {
            PathElement::MoveTo { x, y } | PathElement::LineTo { x, y } => {
                expand(&mut bounds, x, y);
            }
            PathElement::QuadTo { cx0, cy0, x, y } => {
                expand(&mut bounds, cx0, cy0);
                expand(&mut bounds, x, y);
            }
            PathElement::CurveTo {
                cx0,
                cy0,
                cx1,
                cy1,
                x,
                y,
            } => {
                expand(&mut bounds, cx0, cy0);
                expand(&mut bounds, cx1, cy1);
                expand(&mut bounds, x, y);
            }
            PathElement::Close => {}
        }
    }
    bounds.unwrap_or((0.0, 0.0, 0.0, 0.0))
}

fn expand(bounds: &mut Option<(f32, f32, f32, f32)>, x: f32, y: f32) {
    *bounds = Some(match *bounds {
        None => (x, y, x, y),
        Some((x_min, y_min, x_max, y_max)) => {
            (x_min.min(x), y_min.min(y), x_max.max(x), y_max.max(y))
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use PathElement::*;

    #[test]
    fn serialization_is_canonical() {
        let elements = [
            MoveTo { x: 1.0, y: 2.0 },
            LineTo { x: 42.0, y: 24.0 },
            Close,
        ];
        assert_eq!(
            serialize_elements(&elements),
            serialize_elements(&elements.clone())
        );
        // a single differing coordinate changes the bytes
        let nudged = [
            MoveTo { x: 1.0, y: 2.0 },
            LineTo { x: 42.5, y: 24.0 },
            Close,
        ];
        assert_ne!(serialize_elements(&elements), serialize_elements(&nudged));
        // same coordinates under a different command do too
        let relined = [
            LineTo { x: 1.0, y: 2.0 },
            LineTo { x: 42.0, y: 24.0 },
            Close,
        ];
        assert_ne!(serialize_elements(&elements), serialize_elements(&relined));
    }

    #[test]
    fn bounding_box_covers_control_points() {
        let elements = [
            MoveTo { x: 10.0, y: 10.0 },
            QuadTo {
                cx0: -5.0,
                cy0: 60.0,
                x: 20.0,
                y: 20.0,
            },
            CurveTo {
                cx0: 30.0,
                cy0: 90.0,
                cx1: 55.0,
                cy1: -10.0,
                x: 40.0,
                y: 15.0,
            },
            Close,
        ];
        assert_eq!(bounding_box(&elements), (-5.0, -10.0, 55.0, 90.0));
    }

    #[test]
    fn bounding_box_of_empty_outline_is_zero() {
        assert_eq!(bounding_box(&[]), (0.0, 0.0, 0.0, 0.0));
        // close alone carries no coordinates
        assert_eq!(bounding_box(&[Close]), (0.0, 0.0, 0.0, 0.0));
    }
}
