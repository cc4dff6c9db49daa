//! Packed date payload used by LUIGI and `.rom` metadata
//!
//! `[year - 1900][month][day][hour][minute][second][offset hours: i8][offset minutes]`,
//! any suffix may be missing.

use super::{MAX_UTC_OFFSET_HOURS, MIN_YEAR, MetadataDateTime, RawFields};

pub(super) fn decode(bytes: &[u8]) -> MetadataDateTime {
    let Some(&year) = bytes.first() else {
        return MetadataDateTime::min_value();
    };

    let field = |index: usize| bytes.get(index).map(|&b| u32::from(b));
    let mut fields = RawFields::year_only(MIN_YEAR + i32::from(year));
    fields.month = field(1);
    fields.day = field(2);
    fields.hour = field(3);
    fields.minute = field(4);
    fields.second = field(5);

    if let Some(&hours) = bytes.get(6) {
        let hours = i32::from(hours as i8);
        let minutes = bytes.get(7).map_or(0, |&m| i32::from(m));
        if hours.abs() <= MAX_UTC_OFFSET_HOURS && minutes <= 59 {
            let magnitude = hours.abs() * 60 + minutes;
            fields.utc_offset = Some(if hours < 0 { -magnitude } else { magnitude });
        }
    }

    fields.assemble()
}

/// Encode `date` in the packed form, emitting only the fields it carries
pub(super) fn encode(date: &MetadataDateTime) -> Vec<u8> {
    use super::MetadataDateTimeFlags as F;

    let flags = date.flags();
    if !flags.contains(F::YEAR) {
        return Vec::new();
    }

    let mut bytes = vec![(date.year() - MIN_YEAR).clamp(0, 255) as u8];
    let second = if flags.contains(F::LEAP_SECOND) {
        60
    } else {
        date.second()
    };
    let optional = [
        (F::MONTH, date.month()),
        (F::DAY, date.day()),
        (F::HOUR, date.hour()),
        (F::MINUTE, date.minute()),
        (F::SECOND, second),
    ];
    for (flag, value) in optional {
        if !flags.contains(flag) {
            return bytes;
        }
        bytes.push(value as u8);
    }

    if flags.contains(F::UTC_OFFSET) {
        let offset = date.utc_offset_minutes();
        let hours = offset / 60;
        bytes.push(hours as i8 as u8);
        bytes.push((offset.abs() % 60) as u8);
    }
    bytes
}
