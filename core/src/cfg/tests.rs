use intv_shared::{FeatureCompatibility, MetadataDateTimeFlags};

use super::*;

fn single(line: &str) -> CfgVariable {
    CfgVariable::parse_line(line).unwrap_or_else(|| panic!("no variable in {line:?}"))
}

// =============================================================================
// Line and value grammar
// =============================================================================

#[test]
fn test_jlp_flash_integer() {
    let variable = single("jlp_flash = 256");
    assert_eq!(variable.tag, CfgVarTag::JlpFlash);
    assert_eq!(variable.value, CfgValue::Integer(256));
}

#[test]
fn test_integer_overflow_is_zero() {
    let variable = single("jlp_flash = 99887766554433221100112233445566778899");
    assert_eq!(variable.value, CfgValue::Integer(0));
    assert_eq!(parse_integer("2147483648"), 0);
    assert_eq!(parse_integer("-2147483648"), i32::MIN);
    assert_eq!(parse_integer("12345678901"), 0);
}

#[test]
fn test_integer_grammar() {
    assert_eq!(parse_integer("+42"), 42);
    assert_eq!(parse_integer(" -7 "), -7);
    assert_eq!(parse_integer("4x"), 0);
    assert_eq!(parse_integer(""), 0);
    assert_eq!(parse_integer("-"), 0);
    assert_eq!(try_parse_integer("0"), Some(0));
    assert_eq!(try_parse_integer("a"), None);
}

#[test]
fn test_boolean_grammar() {
    assert!(parse_boolean("1"));
    assert!(parse_boolean("-3"));
    assert!(!parse_boolean("0"));
    assert!(!parse_boolean("a"));
    assert!(!parse_boolean(""));
}

#[test]
fn test_feature_values() {
    assert_eq!(single("tv_compat = 3").value, CfgValue::Feature(FeatureCompatibility::Requires));
    assert_eq!(single("tv_compat = ").value, CfgValue::Feature(FeatureCompatibility::Tolerates));
    assert_eq!(single("tv_compat = 9").value, CfgValue::Feature(FeatureCompatibility::Tolerates));
    assert_eq!(single("tv_compat = 0").value, CfgValue::Feature(FeatureCompatibility::Incompatible));
}

#[test]
fn test_legacy_keys_default_to_incompatible() {
    let variable = single("ecs = ");
    assert_eq!(variable.tag, CfgVarTag::Ecs);
    assert_eq!(variable.value, CfgValue::Feature(FeatureCompatibility::Incompatible));
    assert_eq!(single("voice = x").value, CfgValue::Feature(FeatureCompatibility::Incompatible));
    assert_eq!(single("jlp = 2").value, CfgValue::Feature(FeatureCompatibility::Enhances));
    assert_eq!(single("ecs_compat = ").value, CfgValue::Feature(FeatureCompatibility::Tolerates));
}

#[test]
fn test_aliases_and_case_sensitivity() {
    assert_eq!(single("versions = 1.2").tag, CfgVarTag::Version);
    assert_eq!(single("version = 1.2").tag, CfgVarTag::Version);
    assert_eq!(single("desc = x").tag, CfgVarTag::Description);
    assert!(CfgVariable::parse_line("Name = Astrosmash").is_none());
    assert!(CfgVariable::parse_line("unknown_key = 1").is_none());
    assert_eq!(CfgVarTag::Intellivoice.key(), "voice_compat");
    assert_eq!(CfgVarTag::from_key("intv2"), Some(CfgVarTag::IntellivisionII));
}

#[test]
fn test_string_values() {
    assert_eq!(parse_string("  \"Astrosmash\"  "), "Astrosmash");
    assert_eq!(parse_string("\""), "");
    assert_eq!(parse_string("\"\""), "");
    assert_eq!(parse_string("plain text "), "plain text");
    assert_eq!(parse_string("\"tab\\there\""), "tab\there");
    assert_eq!(parse_string("\"unterminated"), "\"unterminated");
}

#[test]
fn test_value_may_contain_equals() {
    assert_eq!(
        single("desc = a = b").value,
        CfgValue::String("a = b".to_string())
    );
}

#[test]
fn test_comments_and_blank_lines() {
    assert!(CfgVariable::parse_line("; name = hidden").is_none());
    assert!(CfgVariable::parse_line("   ").is_none());
    assert!(CfgVariable::parse_line("name").is_none());
}

#[test]
fn test_date_value() {
    let CfgValue::Date(date) = single("release_date = 2009-11-27 12:13:14 +0400").value else {
        panic!("expected a date");
    };
    assert_eq!(date.year(), 2009);
    assert_eq!(date.utc_offset_minutes(), 240);
    assert!(date.flags().contains(MetadataDateTimeFlags::UTC_OFFSET));

    let CfgValue::Date(date) = single("build_date = \"1983-05\"").value else {
        panic!("expected a date");
    };
    assert_eq!(date.flags(), MetadataDateTimeFlags::YEAR | MetadataDateTimeFlags::MONTH);
}

// =============================================================================
// Sections and aggregation
// =============================================================================

const SAMPLE: &str = "\
[mapping]
$0000 - $0FFF = $5000
name = not a var

[vars]
name = \"Astrosmash\"
short_name = Astro
author = John Sohl
year = 1981
ecs_compat = 0
voice_compat = 2
jlp_flash = 70000
lto_mapper = 1
; comment = ignored

[memattr]
$D000 - $DFFF = RAM 8

[vars]
publisher = Mattel Electronics
release_date = 1981-06-15
";

#[test]
fn test_only_vars_sections_are_read() {
    let variables = parse_vars(SAMPLE);
    assert_eq!(variables.len(), 10);
    assert_eq!(variables[0].value, CfgValue::String("Astrosmash".into()));
    assert_eq!(variables.last().map(|v| v.tag), Some(CfgVarTag::ReleaseDate));
}

#[test]
fn test_parse_information() {
    let info = parse_information(SAMPLE);
    assert_eq!(info.metadata.long_names, vec!["Astrosmash"]);
    assert_eq!(info.metadata.short_names, vec!["Astro"]);
    assert_eq!(info.metadata.programmers, vec!["John Sohl"]);
    assert_eq!(info.metadata.publishers, vec!["Mattel Electronics"]);
    assert_eq!(info.metadata.release_dates.len(), 2);
    assert_eq!(info.metadata.release_dates[0].flags(), MetadataDateTimeFlags::YEAR);
    assert_eq!(info.metadata.release_dates[1].day(), 15);

    assert_eq!(info.features.ecs, FeatureCompatibility::Incompatible);
    assert_eq!(info.features.intellivoice, FeatureCompatibility::Enhances);
    assert_eq!(info.features.tutorvision, FeatureCompatibility::Tolerates);
    assert_eq!(info.features.jlp_flash_sectors, u16::MAX);
    assert!(info.features.lto_flash_mapper);
}

#[test]
fn test_no_vars_section() {
    let info = parse_information("[mapping]\n$0000 - $1FFF = $5000\n");
    assert!(info.metadata.is_empty());
    assert_eq!(info.features, intv_shared::ProgramFeatures::default());
}
