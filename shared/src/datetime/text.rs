//! `.cfg` date/time text grammar
//!
//! `year[-month][-day] [hour][:minute][:second] [±hh[[:]mm]]`, with `/`
//! accepted in place of `-`. Each field is read on its own, so a time may
//! follow a partial date.

use super::{MAX_UTC_OFFSET_HOURS, MetadataDateTime, RawFields};

/// Four-digit years outside this window collapse to the sentinel
const FOUR_DIGIT_YEARS: std::ops::RangeInclusive<i32> = 1901..=2155;

pub(super) fn parse(text: &str) -> MetadataDateTime {
    let mut parts = text.split_whitespace();
    let Some(date_part) = parts.next() else {
        return MetadataDateTime::min_value();
    };

    let separator = if date_part.contains('/') { '/' } else { '-' };
    let mut date_fields = date_part.split(separator);

    let Some(year) = date_fields.next().and_then(parse_year) else {
        return MetadataDateTime::min_value();
    };
    let mut fields = RawFields::year_only(year);

    fields.month = date_fields.next().and_then(leading_number);
    fields.day = date_fields.next().and_then(leading_number);

    // Fields missing from either part fall back to their minimum without a flag
    if let Some(time_part) = parts.next() {
        let mut time_fields = time_part.split(':');
        fields.hour = time_fields.next().and_then(leading_number);
        fields.minute = time_fields.next().and_then(leading_number);
        fields.second = time_fields.next().and_then(leading_number);
        fields.utc_offset = parts.next().and_then(parse_utc_offset);
    }

    fields.assemble()
}

/// Year field: 1-2 digits alias to the 1900s, 4 digits must fall in the
/// supported window, anything else is invalid.
fn parse_year(field: &str) -> Option<i32> {
    let digits = leading_digits(field);
    let value: i32 = digits.parse().ok()?;
    match digits.len() {
        1 | 2 => Some(1900 + value),
        4 if FOUR_DIGIT_YEARS.contains(&value) => Some(value),
        _ => None,
    }
}

/// Offset in minutes; `None` when absent or out of range.
///
/// Only the sign before the hours counts. A `-` in front of the minutes is
/// skipped.
fn parse_utc_offset(field: &str) -> Option<i32> {
    let (negative, rest) = match field.as_bytes().first() {
        Some(b'+') => (false, &field[1..]),
        Some(b'-') => (true, &field[1..]),
        _ => (false, field),
    };

    let (hours, minutes) = match rest.split_once(':') {
        Some((hours, minutes)) => {
            let hours = leading_number(hours)?;
            let minutes = leading_number(minutes.trim_start_matches('-')).unwrap_or(0);
            (hours, minutes)
        }
        None => {
            let digits = leading_digits(rest);
            match digits.len() {
                0 => return None,
                1 | 2 => (digits.parse().ok()?, 0),
                n => {
                    let split = n - 2;
                    (digits[..split].parse().ok()?, digits[split..].parse().ok()?)
                }
            }
        }
    };

    if hours > MAX_UTC_OFFSET_HOURS as u32 || minutes > 59 {
        return None;
    }
    let magnitude = (hours * 60 + minutes) as i32;
    Some(if negative { -magnitude } else { magnitude })
}

fn leading_digits(field: &str) -> &str {
    let end = field
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(field.len());
    &field[..end]
}

/// Leading decimal digits of `field`, saturating on overflow
fn leading_number(field: &str) -> Option<u32> {
    let digits = leading_digits(field);
    if digits.is_empty() {
        return None;
    }
    Some(digits.bytes().fold(0u32, |acc, d| {
        acc.saturating_mul(10).saturating_add(u32::from(d - b'0'))
    }))
}
