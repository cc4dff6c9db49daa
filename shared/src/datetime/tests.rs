use std::cmp::Ordering;

use super::*;

type F = MetadataDateTimeFlags;

// =============================================================================
// Text grammar
// =============================================================================

#[test]
fn test_parse_full_date_time_with_offset() {
    let date = MetadataDateTime::parse("2009-11-27 12:13:14 +0400");
    assert_eq!(date.year(), 2009);
    assert_eq!(date.month(), 11);
    assert_eq!(date.day(), 27);
    assert_eq!(date.hour(), 12);
    assert_eq!(date.minute(), 13);
    assert_eq!(date.second(), 14);
    assert_eq!(date.utc_offset_minutes(), 240);
    assert_eq!(
        date.flags(),
        F::YEAR | F::MONTH | F::DAY | F::HOUR | F::MINUTE | F::SECOND | F::UTC_OFFSET
    );
}

#[test]
fn test_year_out_of_range_is_sentinel() {
    let date = MetadataDateTime::parse("2156");
    assert!(date.is_min_value());
    assert_eq!(date, MetadataDateTime::min_value());
    assert_eq!(date.year(), 1);

    assert!(MetadataDateTime::parse("1900").is_min_value());
    assert!(MetadataDateTime::parse("199").is_min_value());
    assert!(MetadataDateTime::parse("").is_min_value());
    assert!(MetadataDateTime::parse("abc").is_min_value());
}

#[test]
fn test_leap_second() {
    let date = MetadataDateTime::parse("2009-11-27 12:13:60");
    assert!(date.flags().contains(F::LEAP_SECOND));
    assert!(date.flags().contains(F::SECOND));
    assert_eq!(date.second(), 59);

    let clamped = MetadataDateTime::parse("2009-11-27 12:13:75");
    assert!(!clamped.flags().contains(F::LEAP_SECOND));
    assert_eq!(clamped.second(), 59);
}

#[test]
fn test_short_years_alias_to_1900s() {
    let date = MetadataDateTime::parse("83");
    assert_eq!(date.year(), 1983);
    assert_eq!(date.flags(), F::YEAR);

    assert_eq!(MetadataDateTime::parse("7").year(), 1907);
}

#[test]
fn test_prefixes_only_set_present_flags() {
    let date = MetadataDateTime::parse("1982-06");
    assert_eq!(date.flags(), F::YEAR | F::MONTH);
    assert_eq!(date.day(), 1);
    assert_eq!(date.hour(), 0);

    let date = MetadataDateTime::parse("1982-06-15 10");
    assert_eq!(date.flags(), F::YEAR | F::MONTH | F::DAY | F::HOUR);
    assert_eq!(date.hour(), 10);
    assert_eq!(date.minute(), 0);
}

#[test]
fn test_time_after_partial_date() {
    let date = MetadataDateTime::parse("2009-11 12:13:14");
    assert_eq!(date.flags(), F::YEAR | F::MONTH | F::HOUR | F::MINUTE | F::SECOND);
    assert_eq!(date.day(), 1);
    assert_eq!((date.hour(), date.minute(), date.second()), (12, 13, 14));

    let date = MetadataDateTime::parse("2009 12:13");
    assert_eq!(date.flags(), F::YEAR | F::HOUR | F::MINUTE);
    assert_eq!((date.month(), date.day()), (1, 1));
    assert_eq!((date.hour(), date.minute()), (12, 13));
}

#[test]
fn test_missing_time_fields_stay_unflagged() {
    let date = MetadataDateTime::parse("1982-06-15 :30");
    assert_eq!(date.flags(), F::YEAR | F::MONTH | F::DAY | F::MINUTE);
    assert_eq!((date.hour(), date.minute()), (0, 30));

    let date = MetadataDateTime::parse("1982-06-15 10 +0200");
    assert!(date.flags().contains(F::HOUR | F::UTC_OFFSET));
    assert_eq!(date.utc_offset_minutes(), 120);
}

#[test]
fn test_slash_separator() {
    let date = MetadataDateTime::parse("1982/06/15");
    assert_eq!((date.year(), date.month(), date.day()), (1982, 6, 15));

    // '/' wins when both appear; the mixed field keeps only its leading digits
    let mixed = MetadataDateTime::parse("1982/06-15/20");
    assert_eq!(mixed.month(), 6);
    assert_eq!(mixed.day(), 20);
}

#[test]
fn test_out_of_range_fields_clamp_but_keep_flags() {
    let date = MetadataDateTime::parse("2001-13-40 25:61:00");
    assert_eq!(date.month(), 12);
    assert_eq!(date.day(), 31);
    assert_eq!(date.hour(), 23);
    assert_eq!(date.minute(), 59);
    assert!(date.flags().contains(F::MONTH | F::DAY | F::HOUR | F::MINUTE));

    let february = MetadataDateTime::parse("2001-02-30");
    assert_eq!(february.day(), 28);
    let leap_february = MetadataDateTime::parse("2004-02-30");
    assert_eq!(leap_february.day(), 29);
}

#[test]
fn test_utc_offset_forms() {
    let offset = |text: &str| {
        let date = MetadataDateTime::parse(text);
        date.flags()
            .contains(F::UTC_OFFSET)
            .then(|| date.utc_offset_minutes())
    };

    assert_eq!(offset("2000-01-01 00:00:00 +05"), Some(300));
    assert_eq!(offset("2000-01-01 00:00:00 -05"), Some(-300));
    assert_eq!(offset("2000-01-01 00:00:00 +05:30"), Some(330));
    assert_eq!(offset("2000-01-01 00:00:00 -0530"), Some(-330));
    assert_eq!(offset("2000-01-01 00:00:00 5"), Some(300));
    assert_eq!(offset("2000-01-01 00:00:00 +13"), None);
    assert_eq!(offset("2000-01-01 00:00:00 +0575"), None);
    assert_eq!(offset("2000-01-01 00:00:00"), None);
}

#[test]
fn test_offset_minutes_ignore_stray_sign() {
    let date = MetadataDateTime::parse("2000-01-01 00:00:00 +02:-30");
    assert_eq!(date.utc_offset_minutes(), 150);
}

// =============================================================================
// Binary form
// =============================================================================

#[test]
fn test_binary_decode() {
    let date = MetadataDateTime::from_binary(&[109, 11, 27, 12, 13, 14, 0xFC, 30]);
    assert_eq!(date.year(), 2009);
    assert_eq!(date.second(), 14);
    assert_eq!(date.utc_offset_minutes(), -(4 * 60 + 30));
    assert!(date.flags().contains(F::UTC_OFFSET));
}

#[test]
fn test_binary_prefix_and_empty() {
    assert!(MetadataDateTime::from_binary(&[]).is_min_value());

    let date = MetadataDateTime::from_binary(&[82, 6]);
    assert_eq!(date.flags(), F::YEAR | F::MONTH);
    assert_eq!((date.year(), date.month()), (1982, 6));
}

#[test]
fn test_binary_leap_second_and_bad_offset() {
    let date = MetadataDateTime::from_binary(&[100, 1, 1, 0, 0, 60, 14, 0]);
    assert!(date.flags().contains(F::LEAP_SECOND));
    assert!(!date.flags().contains(F::UTC_OFFSET));
}

#[test]
fn test_binary_encode_matches_decode() {
    let bytes = [109, 11, 27, 12, 13, 60, 4, 15];
    let date = MetadataDateTime::from_binary(&bytes);
    assert_eq!(date.to_binary(), bytes);

    let partial = MetadataDateTime::parse("1983-05");
    assert_eq!(partial.to_binary(), vec![83, 5]);
    assert!(MetadataDateTime::min_value().to_binary().is_empty());
}

// =============================================================================
// Comparison
// =============================================================================

#[test]
fn test_loose_compare_uses_common_fields() {
    let year_only = MetadataDateTime::parse("1983");
    let full = MetadataDateTime::parse("1983-05-06 07:08:09");
    assert!(year_only.equals(&full, false));
    assert!(!year_only.equals(&full, true));

    let later = MetadataDateTime::parse("1984-01");
    assert_eq!(full.compare(&later, false), Ordering::Less);
    assert_eq!(later.compare(&full, false), Ordering::Greater);
}

#[test]
fn test_strict_compare_orders_flags_first() {
    let year_only = MetadataDateTime::parse("2100");
    let with_month = MetadataDateTime::parse("1983-05");
    assert_eq!(year_only.compare(&with_month, true), Ordering::Less);

    let a = MetadataDateTime::parse("1983-05");
    let b = MetadataDateTime::parse("1983-06");
    assert_eq!(a.compare(&b, true), Ordering::Less);
    assert_eq!(a.compare(&a, true), Ordering::Equal);
}

#[test]
fn test_display() {
    assert_eq!(MetadataDateTime::parse("1983-05").to_string(), "1983-05");
    assert_eq!(
        MetadataDateTime::parse("2009-11-27 12:13:60 -0130").to_string(),
        "2009-11-27 12:13:60 -01:30"
    );
    assert_eq!(MetadataDateTime::min_value().to_string(), "(no date)");
}

// =============================================================================
// Builder
// =============================================================================

#[test]
fn test_builder_valid() {
    let date = MetadataDateTimeBuilder::new(1980)
        .month(2)
        .day(29)
        .hour(23)
        .utc_offset(-8, 0)
        .build()
        .unwrap();
    assert_eq!(date.flags(), F::YEAR | F::MONTH | F::DAY | F::HOUR | F::UTC_OFFSET);
    assert_eq!(date.utc_offset_minutes(), -480);

    let without_offset = MetadataDateTimeBuilder::new(1980).month(2).day(29).hour(23).build().unwrap();
    assert_eq!(without_offset, MetadataDateTime::parse("1980-02-29 23"));
}

#[test]
fn test_builder_rejects_degenerate_values() {
    let err = MetadataDateTimeBuilder::new(1981).month(2).day(29).build().unwrap_err();
    assert_eq!(
        err,
        DateTimeError::OutOfRange {
            field: "day",
            value: 29
        }
    );
    assert!(MetadataDateTimeBuilder::new(0).build().is_err());
    assert!(MetadataDateTimeBuilder::new(2000).month(13).build().is_err());
    assert!(MetadataDateTimeBuilder::new(2000).hour(24).build().is_err());
    assert!(MetadataDateTimeBuilder::new(2000).second(61).build().is_err());
    assert!(MetadataDateTimeBuilder::new(2000).utc_offset(13, 0).build().is_err());
}

#[test]
fn test_builder_leap_second() {
    let date = MetadataDateTimeBuilder::new(2000).month(1).day(1).hour(0).minute(0).second(60).build().unwrap();
    assert!(date.flags().contains(F::LEAP_SECOND));
    assert_eq!(date.second(), 59);
}
