//! Variable-precision metadata dates
//!
//! Release and build dates in ROM metadata are rarely complete: a `.cfg`
//! may only give a year, a LUIGI record may stop after the day. A
//! [`MetadataDateTime`] pairs an instant with a [`MetadataDateTimeFlags`] set
//! recording which fields were actually supplied.
//!
//! Two parsers produce these values:
//!
//! - [`MetadataDateTime::parse`] - the `.cfg` text grammar
//!   (`yyyy-mm-dd hh:mm:ss +hhmm`, any prefix)
//! - [`MetadataDateTime::from_binary`] - the packed byte form used by LUIGI
//!   and `.rom` metadata
//!
//! Both clamp out-of-range fields instead of failing; only a year outside
//! the representable window collapses the whole value to
//! [`MetadataDateTime::min_value`]. The [`MetadataDateTimeBuilder`] is the
//! strict counterpart and rejects degenerate input.

mod binary;
mod text;

#[cfg(test)]
mod tests;

use std::cmp::Ordering;
use std::fmt;

use bitflags::bitflags;
use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::DateTimeError;

/// Earliest year the packed and text grammars accept
pub const MIN_YEAR: i32 = 1900;

/// Latest year the packed and text grammars accept
pub const MAX_YEAR: i32 = 2155;

/// Largest UTC offset magnitude, in hours
pub const MAX_UTC_OFFSET_HOURS: i32 = 12;

bitflags! {
    /// Which fields of a [`MetadataDateTime`] carry information
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct MetadataDateTimeFlags: u16 {
        const YEAR = 1 << 0;
        const MONTH = 1 << 1;
        const DAY = 1 << 2;
        const HOUR = 1 << 3;
        const MINUTE = 1 << 4;
        const SECOND = 1 << 5;
        const UTC_OFFSET = 1 << 6;
        /// Source said second 60; the stored second is 59
        const LEAP_SECOND = 1 << 7;
    }
}

/// Date/time with per-field validity
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MetadataDateTime {
    date: DateTime<FixedOffset>,
    flags: MetadataDateTimeFlags,
}

impl MetadataDateTime {
    /// The "minimum / invalid" sentinel: 0001-01-01T00:00:00Z with no flags
    pub fn min_value() -> Self {
        Self {
            date: sentinel_instant(),
            flags: MetadataDateTimeFlags::empty(),
        }
    }

    /// Parse the `.cfg` text grammar. Never fails.
    pub fn parse(text: &str) -> Self {
        text::parse(text)
    }

    /// Decode the packed byte form. Never fails.
    pub fn from_binary(bytes: &[u8]) -> Self {
        binary::decode(bytes)
    }

    /// Encode in the packed byte form, stopping at the first absent field
    pub fn to_binary(&self) -> Vec<u8> {
        binary::encode(self)
    }

    pub fn date(&self) -> DateTime<FixedOffset> {
        self.date
    }

    pub fn flags(&self) -> MetadataDateTimeFlags {
        self.flags
    }

    /// True for the sentinel (no field supplied)
    pub fn is_min_value(&self) -> bool {
        self.flags.is_empty() && self.date == sentinel_instant()
    }

    pub fn year(&self) -> i32 {
        self.date.year()
    }

    pub fn month(&self) -> u32 {
        self.date.month()
    }

    pub fn day(&self) -> u32 {
        self.date.day()
    }

    pub fn hour(&self) -> u32 {
        self.date.hour()
    }

    pub fn minute(&self) -> u32 {
        self.date.minute()
    }

    pub fn second(&self) -> u32 {
        self.date.second()
    }

    /// Offset from UTC in minutes (0 when no offset was supplied)
    pub fn utc_offset_minutes(&self) -> i32 {
        self.date.offset().local_minus_utc() / 60
    }

    /// Order two values.
    ///
    /// Strict comparison orders by flag set first and then by instant and
    /// offset. Loose comparison only looks at fields both values mark valid.
    pub fn compare(&self, other: &Self, strict: bool) -> Ordering {
        if strict {
            return self
                .flags
                .bits()
                .cmp(&other.flags.bits())
                .then_with(|| self.date.cmp(&other.date))
                .then_with(|| self.utc_offset_minutes().cmp(&other.utc_offset_minutes()));
        }

        let common = self.flags & other.flags;
        let fields: [(MetadataDateTimeFlags, i64, i64); 7] = [
            (MetadataDateTimeFlags::YEAR, self.year().into(), other.year().into()),
            (MetadataDateTimeFlags::MONTH, self.month().into(), other.month().into()),
            (MetadataDateTimeFlags::DAY, self.day().into(), other.day().into()),
            (MetadataDateTimeFlags::HOUR, self.hour().into(), other.hour().into()),
            (MetadataDateTimeFlags::MINUTE, self.minute().into(), other.minute().into()),
            (MetadataDateTimeFlags::SECOND, self.second().into(), other.second().into()),
            (
                MetadataDateTimeFlags::UTC_OFFSET,
                self.utc_offset_minutes().into(),
                other.utc_offset_minutes().into(),
            ),
        ];
        fields
            .iter()
            .filter(|(flag, _, _)| common.contains(*flag))
            .map(|(_, a, b)| a.cmp(b))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    }

    /// Equality under the same rules as [`compare`](Self::compare)
    pub fn equals(&self, other: &Self, strict: bool) -> bool {
        self.compare(other, strict) == Ordering::Equal
    }
}

impl PartialEq for MetadataDateTime {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other, true)
    }
}

impl Eq for MetadataDateTime {}

impl Default for MetadataDateTime {
    fn default() -> Self {
        Self::min_value()
    }
}

impl fmt::Display for MetadataDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use MetadataDateTimeFlags as F;

        if !self.flags.contains(F::YEAR) {
            return write!(f, "(no date)");
        }
        write!(f, "{:04}", self.year())?;
        if self.flags.contains(F::MONTH) {
            write!(f, "-{:02}", self.month())?;
        }
        if self.flags.contains(F::DAY) {
            write!(f, "-{:02}", self.day())?;
        }
        if self.flags.intersects(F::HOUR | F::MINUTE | F::SECOND) {
            write!(f, " {:02}:{:02}", self.hour(), self.minute())?;
            if self.flags.contains(F::SECOND) {
                let second = if self.flags.contains(F::LEAP_SECOND) {
                    60
                } else {
                    self.second()
                };
                write!(f, ":{second:02}")?;
            }
        }
        if self.flags.contains(F::UTC_OFFSET) {
            let offset = self.utc_offset_minutes();
            let sign = if offset < 0 { '-' } else { '+' };
            write!(f, " {sign}{:02}:{:02}", offset.abs() / 60, offset.abs() % 60)?;
        }
        Ok(())
    }
}

// =============================================================================
// Field assembly shared by both parsers
// =============================================================================

/// Raw fields as read from a source, before clamping
#[derive(Debug, Clone, Copy)]
pub(crate) struct RawFields {
    pub year: i32,
    pub month: Option<u32>,
    pub day: Option<u32>,
    pub hour: Option<u32>,
    pub minute: Option<u32>,
    pub second: Option<u32>,
    /// Signed offset in minutes; already validated
    pub utc_offset: Option<i32>,
}

impl RawFields {
    pub fn year_only(year: i32) -> Self {
        Self {
            year,
            month: None,
            day: None,
            hour: None,
            minute: None,
            second: None,
            utc_offset: None,
        }
    }

    /// Clamp every field into range and build the value.
    ///
    /// Each supplied field sets its flag even when clamped. Second 60 is a
    /// leap second, stored as 59.
    pub fn assemble(self) -> MetadataDateTime {
        use MetadataDateTimeFlags as F;

        if !(MIN_YEAR..=MAX_YEAR).contains(&self.year) {
            return MetadataDateTime::min_value();
        }

        let mut flags = F::YEAR;
        let mut mark = |value: Option<u32>, flag: F, min: u32, max: u32| -> u32 {
            match value {
                Some(v) => {
                    flags |= flag;
                    v.clamp(min, max)
                }
                None => min,
            }
        };

        let month = mark(self.month, F::MONTH, 1, 12);
        let day = mark(self.day, F::DAY, 1, days_in_month(self.year, month));
        let hour = mark(self.hour, F::HOUR, 0, 23);
        let minute = mark(self.minute, F::MINUTE, 0, 59);
        let second = mark(self.second, F::SECOND, 0, 59);
        if self.second == Some(60) {
            flags |= F::LEAP_SECOND;
        }

        let offset_minutes = match self.utc_offset {
            Some(minutes) => {
                flags |= F::UTC_OFFSET;
                minutes
            }
            None => 0,
        };

        match instant(self.year, month, day, hour, minute, second, offset_minutes) {
            Some(date) => MetadataDateTime { date, flags },
            None => MetadataDateTime::min_value(),
        }
    }
}

fn sentinel_instant() -> DateTime<FixedOffset> {
    NaiveDate::from_ymd_opt(1, 1, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().fixed_offset())
        .unwrap_or_default()
}

fn instant(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
    offset_minutes: i32,
) -> Option<DateTime<FixedOffset>> {
    let offset = FixedOffset::east_opt(offset_minutes * 60)?;
    NaiveDate::from_ymd_opt(year, month, day)?
        .and_hms_opt(hour, minute, second)?
        .and_local_timezone(offset)
        .single()
}

pub(crate) fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

pub(crate) fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 31,
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Strict constructor for [`MetadataDateTime`].
///
/// Unlike the parsers, the builder treats out-of-range fields as a usage
/// error.
#[derive(Debug, Clone, Copy)]
pub struct MetadataDateTimeBuilder {
    fields: RawFields,
    utc_offset: Option<(i32, u32)>,
}

impl MetadataDateTimeBuilder {
    pub fn new(year: i32) -> Self {
        Self {
            fields: RawFields::year_only(year),
            utc_offset: None,
        }
    }

    pub fn month(mut self, month: u32) -> Self {
        self.fields.month = Some(month);
        self
    }

    pub fn day(mut self, day: u32) -> Self {
        self.fields.day = Some(day);
        self
    }

    pub fn hour(mut self, hour: u32) -> Self {
        self.fields.hour = Some(hour);
        self
    }

    pub fn minute(mut self, minute: u32) -> Self {
        self.fields.minute = Some(minute);
        self
    }

    /// Second 60 records a leap second
    pub fn second(mut self, second: u32) -> Self {
        self.fields.second = Some(second);
        self
    }

    /// Offset from UTC; the sign of `hours` applies to `minutes` as well
    pub fn utc_offset(mut self, hours: i32, minutes: u32) -> Self {
        self.utc_offset = Some((hours, minutes));
        self
    }

    pub fn build(self) -> Result<MetadataDateTime, DateTimeError> {
        let fields = self.fields;
        let out_of_range = |field: &'static str, value: i64| DateTimeError::OutOfRange { field, value };

        if !(1..=9999).contains(&fields.year) {
            return Err(out_of_range("year", fields.year.into()));
        }
        let month = fields.month.unwrap_or(1);
        if !(1..=12).contains(&month) {
            return Err(out_of_range("month", month.into()));
        }
        if let Some(day) = fields.day {
            if day == 0 || day > days_in_month(fields.year, month) {
                return Err(out_of_range("day", day.into()));
            }
        }
        if let Some(hour) = fields.hour.filter(|h| *h > 23) {
            return Err(out_of_range("hour", hour.into()));
        }
        if let Some(minute) = fields.minute.filter(|m| *m > 59) {
            return Err(out_of_range("minute", minute.into()));
        }
        if let Some(second) = fields.second.filter(|s| *s > 60) {
            return Err(out_of_range("second", second.into()));
        }

        let utc_offset = match self.utc_offset {
            Some((hours, _)) if hours.abs() > MAX_UTC_OFFSET_HOURS => {
                return Err(out_of_range("utc offset hours", hours.into()));
            }
            Some((_, minutes)) if minutes > 59 => {
                return Err(out_of_range("utc offset minutes", minutes.into()));
            }
            Some((hours, minutes)) => {
                let magnitude = hours.abs() * 60 + minutes as i32;
                Some(if hours < 0 { -magnitude } else { magnitude })
            }
            None => None,
        };

        let mut flags = MetadataDateTimeFlags::YEAR;
        let mut set = |value: Option<u32>, flag: MetadataDateTimeFlags| {
            if value.is_some() {
                flags |= flag;
            }
        };
        set(fields.month, MetadataDateTimeFlags::MONTH);
        set(fields.day, MetadataDateTimeFlags::DAY);
        set(fields.hour, MetadataDateTimeFlags::HOUR);
        set(fields.minute, MetadataDateTimeFlags::MINUTE);
        set(fields.second, MetadataDateTimeFlags::SECOND);
        if fields.second == Some(60) {
            flags |= MetadataDateTimeFlags::LEAP_SECOND;
        }
        let offset_minutes = utc_offset.unwrap_or(0);
        if utc_offset.is_some() {
            flags |= MetadataDateTimeFlags::UTC_OFFSET;
        }

        let date = instant(
            fields.year,
            month,
            fields.day.unwrap_or(1),
            fields.hour.unwrap_or(0),
            fields.minute.unwrap_or(0),
            fields.second.unwrap_or(0).min(59),
            offset_minutes,
        )
        .ok_or_else(|| DateTimeError::Unrepresentable(format!("{fields:?}")))?;

        Ok(MetadataDateTime { date, flags })
    }
}
