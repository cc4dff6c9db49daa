//! Value grammars for `[vars]` entries
//!
//! None of these fail: malformed input falls back to a documented default.

use intv_shared::{FeatureCompatibility, MetadataDateTime, unescape};

/// Integers with more digits than this decode to zero
const MAX_INTEGER_DIGITS: usize = 10;

/// Trim, strip one pair of enclosing quotes, then unescape.
/// A lone quote is the empty string.
pub fn parse_string(value: &str) -> String {
    let trimmed = value.trim();
    let unquoted = if trimmed == "\"" {
        ""
    } else if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    };
    unescape(unquoted)
}

/// Strict integer grammar: optional sign, then decimal digits only.
///
/// `None` for empty input, stray characters, more than ten digits, or a
/// value outside `i32`.
pub fn try_parse_integer(value: &str) -> Option<i32> {
    let trimmed = value.trim();
    let digits = trimmed
        .strip_prefix('+')
        .or_else(|| trimmed.strip_prefix('-'))
        .unwrap_or(trimmed);
    if digits.is_empty() || digits.len() > MAX_INTEGER_DIGITS || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let magnitude: i64 = digits.parse().ok()?;
    let signed = if trimmed.starts_with('-') { -magnitude } else { magnitude };
    i32::try_from(signed).ok()
}

/// Integer value; anything malformed is zero
pub fn parse_integer(value: &str) -> i32 {
    try_parse_integer(value).unwrap_or(0)
}

/// True only for a well-formed non-zero integer
pub fn parse_boolean(value: &str) -> bool {
    parse_integer(value) != 0
}

/// Compatibility level 0-3; anything else is `default`
pub fn parse_feature(value: &str, default: FeatureCompatibility) -> FeatureCompatibility {
    try_parse_integer(value)
        .and_then(|level| FeatureCompatibility::from_level(level.into()))
        .unwrap_or(default)
}

pub fn parse_date(value: &str) -> MetadataDateTime {
    MetadataDateTime::parse(parse_string(value).as_str())
}
