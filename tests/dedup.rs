//! End-to-end engine runs over fixture fonts on disk.

mod common;

use common::{square, triangle, write_font};
use gallra::DedupEngine;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

#[test]
fn first_font_claims_everything_it_shares() {
    let dir = TempDir::new().unwrap();
    let glyphs = [
        (0x41, square(100.0, 200.0)),
        (0x42, square(10.0, 40.0)),
        (0x43, triangle(5.0, 30.0)),
    ];
    let first = write_font(dir.path(), "first.ttf", "First", &glyphs);
    let second = write_font(dir.path(), "second.ttf", "Second", &glyphs);

    let engine = DedupEngine::new(None);
    let result = engine
        .deduplicate(&[first.clone(), second.clone()], None, None)
        .unwrap();

    let kept_first: Vec<u32> = result.kept[&first].iter().collect();
    assert_eq!(kept_first, vec![0x41, 0x42, 0x43]);
    assert!(result.removed[&first].is_empty());
    assert!(result.kept[&second].is_empty());
    let removed_second: Vec<u32> = result.removed[&second].iter().collect();
    assert_eq!(removed_second, vec![0x41, 0x42, 0x43]);
}

#[test]
fn excluded_codepoints_survive_in_every_font() {
    let dir = TempDir::new().unwrap();
    let glyphs = [
        (0x41, square(100.0, 200.0)),
        (0x42, square(10.0, 40.0)),
        (0x43, triangle(5.0, 30.0)),
    ];
    let first = write_font(dir.path(), "first.ttf", "First", &glyphs);
    let second = write_font(dir.path(), "second.ttf", "Second", &glyphs);

    let engine = DedupEngine::new(None);
    let result = engine
        .deduplicate(
            &[first, second.clone()],
            None,
            Some(&[(0x42, 0x42)]),
        )
        .unwrap();

    assert!(result.kept[&second].contains(0x42));
    let removed_second: Vec<u32> = result.removed[&second].iter().collect();
    assert_eq!(removed_second, vec![0x41, 0x43]);
}

#[test]
fn codepoints_outside_the_range_filter_pass_through() {
    let dir = TempDir::new().unwrap();
    let glyphs = [
        (0x41, square(100.0, 200.0)),
        (0x4E00, square(50.0, 500.0)),
    ];
    let first = write_font(dir.path(), "first.ttf", "First", &glyphs);
    let second = write_font(dir.path(), "second.ttf", "Second", &glyphs);

    let engine = DedupEngine::new(None);
    let result = engine
        .deduplicate(
            &[first, second.clone()],
            Some(&[(0x4E00, 0x4E00)]),
            None,
        )
        .unwrap();

    // ASCII is out of scope, so the second font keeps it despite the overlap
    assert!(result.kept[&second].contains(0x41));
    assert!(result.removed[&second].contains(0x4E00));
}

#[test]
fn explicit_priority_overrides_input_order() {
    let dir = TempDir::new().unwrap();
    let glyphs = [(0x41, square(100.0, 200.0))];
    let first = write_font(dir.path(), "first.ttf", "First", &glyphs);
    let second = write_font(dir.path(), "second.ttf", "Second", &glyphs);

    let engine = DedupEngine::new(Some(vec![second.clone()]));
    let result = engine
        .deduplicate(&[first.clone(), second.clone()], None, None)
        .unwrap();

    assert!(result.kept[&second].contains(0x41));
    assert!(result.removed[&first].contains(0x41));
}

#[test]
fn shape_aware_dedup_preserves_variants_everywhere() {
    let dir = TempDir::new().unwrap();
    let first = write_font(
        dir.path(),
        "first.ttf",
        "First",
        &[
            (0x41, square(100.0, 200.0)),
            (0x4E00, square(50.0, 500.0)),
        ],
    );
    let second = write_font(
        dir.path(),
        "second.ttf",
        "Second",
        &[
            (0x41, square(100.0, 200.0)),
            (0x4E00, triangle(50.0, 500.0)),
        ],
    );

    let engine = DedupEngine::with_shape_analysis(None, 1.0).unwrap();
    let result = engine
        .deduplicate_with_shapes(&[first.clone(), second.clone()], None, None)
        .unwrap();

    // the differing design survives in both fonts
    assert!(result.kept[&first].contains(0x4E00));
    assert!(result.kept[&second].contains(0x4E00));
    assert!(!result.removed[&second].contains(0x4E00));

    // the identical glyph still deduplicates
    assert!(result.kept[&first].contains(0x41));
    assert!(result.removed[&second].contains(0x41));

    // recorded once, with its pairwise score
    assert_eq!(result.preserved_variants.len(), 1);
    let variant = &result.preserved_variants[0];
    assert_eq!(variant.codepoint, 0x4E00);
    assert_eq!(variant.fonts, vec![first.clone(), second.clone()]);
    assert_eq!(result.similarity_data[&0x4E00][&(first, second)], 0.0);
}

#[test]
fn partition_covers_every_original_codepoint_exactly_once() {
    let dir = TempDir::new().unwrap();
    let first = write_font(
        dir.path(),
        "first.ttf",
        "First",
        &[
            (0x41, square(100.0, 200.0)),
            (0x42, square(10.0, 40.0)),
            (0x4E00, square(50.0, 500.0)),
        ],
    );
    let second = write_font(
        dir.path(),
        "second.ttf",
        "Second",
        &[
            (0x41, square(100.0, 200.0)),
            (0x43, triangle(5.0, 30.0)),
            (0x4E00, square(50.0, 500.0)),
        ],
    );

    let fonts = [first, second];
    let engine = DedupEngine::new(None);
    let result = engine
        .deduplicate(&fonts, Some(&[(0x00, 0xFF)]), Some(&[(0x41, 0x41)]))
        .unwrap();

    for font in &fonts {
        let original = gallra::survey(font).unwrap().codepoints;
        let mut union = result.kept[font].clone();
        union.union(&result.removed[font]);
        assert_eq!(union, original);
        let mut overlap = result.kept[font].clone();
        overlap.intersect(&result.removed[font]);
        assert!(overlap.is_empty());
    }
}
