//! Inclusive code point ranges used to scope deduplication.

use crate::DedupError;

const MAX_CODEPOINT: u32 = 0x10FFFF;

/// Parse a list of `START-END` range specs.
pub fn parse_ranges(specs: &[String]) -> Result<Vec<(u32, u32)>, DedupError> {
    specs.iter().map(|spec| parse_range(spec)).collect()
}

/// Parse one inclusive `START-END` range, where each bound is either a hex
/// number with an `0x` prefix or a decimal number. For example:
/// `0x4E00-0x9FFF` covers the CJK Unified Ideographs block.
pub fn parse_range(spec: &str) -> Result<(u32, u32), DedupError> {
    let invalid = || DedupError::InvalidRange(spec.to_owned());
    let (start, end) = spec.split_once('-').ok_or_else(invalid)?;
    let start = parse_codepoint(start).ok_or_else(invalid)?;
    let end = parse_codepoint(end).ok_or_else(invalid)?;
    if start > end || end > MAX_CODEPOINT {
        return Err(invalid());
    }
    Ok((start, end))
}

fn parse_codepoint(input: &str) -> Option<u32> {
    let input = input.trim();
    if let Some(hex) = input.strip_prefix("0x").or_else(|| input.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).ok()
    } else {
        input.parse().ok()
    }
}

/// Whether any of `ranges` contains `codepoint`. Ranges may overlap and
/// appear in any order; membership is tested per range.
pub fn in_any_range(codepoint: u32, ranges: &[(u32, u32)]) -> bool {
    ranges
        .iter()
        .any(|&(start, end)| (start..=end).contains(&codepoint))
}

#[test]
fn test_parse_range() {
    assert_eq!(parse_range("0x4E00-0x9FFF").unwrap(), (0x4E00, 0x9FFF));
    assert_eq!(parse_range("32-127").unwrap(), (32, 127));
    assert_eq!(parse_range("0x41-90").unwrap(), (0x41, 90));
    assert_eq!(parse_range("0x42-0x42").unwrap(), (0x42, 0x42));
}

#[test]
fn test_parse_range_rejects_malformed() {
    assert!(parse_range("4E00").is_err());
    assert!(parse_range("zz-0x41").is_err());
    assert!(parse_range("0x41-").is_err());
    // start past end
    assert!(parse_range("0x9FFF-0x4E00").is_err());
    // outside the Unicode scalar range
    assert!(parse_range("0x0-0x110000").is_err());
}

#[test]
fn test_parse_ranges_propagates_first_error() {
    let specs = vec!["0x20-0x7F".to_owned(), "bogus".to_owned()];
    assert!(parse_ranges(&specs).is_err());

    let specs = vec!["0x20-0x7F".to_owned(), "0x4E00-0x9FFF".to_owned()];
    assert_eq!(
        parse_ranges(&specs).unwrap(),
        vec![(0x20, 0x7F), (0x4E00, 0x9FFF)]
    );
}

#[test]
fn test_in_any_range() {
    let ranges = [(0x20, 0x7F), (0x4E00, 0x9FFF)];
    assert!(in_any_range(0x20, &ranges));
    assert!(in_any_range(0x7F, &ranges));
    assert!(in_any_range(0x4E01, &ranges));
    assert!(!in_any_range(0x1F, &ranges));
    assert!(!in_any_range(0xA000, &ranges));

    // overlapping and unsorted ranges behave the same
    let ranges = [(0x50, 0x60), (0x20, 0x55)];
    assert!(in_any_range(0x52, &ranges));
    assert!(in_any_range(0x21, &ranges));
    assert!(!in_any_range(0x61, &ranges));

    assert!(!in_any_range(0x41, &[]));
}
