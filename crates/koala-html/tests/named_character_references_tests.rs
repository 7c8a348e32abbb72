//! Integration tests for named character reference lookup.

use koala_html::tokenizer::named_character_references::{any_entity_has_prefix, lookup_entity};

#[test]
fn test_lookup_with_semicolon() {
    assert_eq!(lookup_entity("amp;"), Some("&"));
    assert_eq!(lookup_entity("nbsp;"), Some("\u{00A0}"));
    assert_eq!(lookup_entity("alpha;"), Some("\u{3B1}"));
    assert_eq!(lookup_entity("notin;"), Some("\u{2209}"));
    assert_eq!(lookup_entity("PlusMinus;"), Some("\u{B1}"));
}

#[test]
fn test_legacy_names_match_without_semicolon() {
    assert_eq!(lookup_entity("AMP"), Some("&"));
    assert_eq!(lookup_entity("not"), Some("\u{AC}"));
    assert_eq!(lookup_entity("copy"), Some("\u{A9}"));
    // only the legacy set may drop the semicolon
    assert_eq!(lookup_entity("alpha"), None);
    assert_eq!(lookup_entity("notin"), None);
}

#[test]
fn test_lookup_is_case_sensitive() {
    assert_eq!(lookup_entity("Amp;"), None);
    assert_eq!(lookup_entity("Alpha;"), Some("\u{391}"));
}

#[test]
fn test_prefix_matching() {
    assert!(any_entity_has_prefix("no"));
    assert!(any_entity_has_prefix("noti"));
    assert!(any_entity_has_prefix("notin;"));
    assert!(!any_entity_has_prefix("notit"));
    assert!(!any_entity_has_prefix("zzz"));
}

#[test]
fn test_lookup_full_table() {
    assert_eq!(lookup_entity("check;"), Some("\u{2713}"));
    assert_eq!(lookup_entity("half;"), Some("\u{BD}"));
    assert_eq!(lookup_entity("rarr;"), Some("\u{2192}"));
    assert_eq!(lookup_entity("CounterClockwiseContourIntegral;"), Some("\u{2233}"));
    assert_eq!(lookup_entity("NotNestedGreaterGreater;"), Some("\u{2AA2}\u{338}"));
    assert_eq!(lookup_entity("fjlig;"), Some("fj"));
    assert_eq!(lookup_entity("check"), None);
}
