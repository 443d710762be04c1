//! Integration tests for the built-in filter and format transforms.

use icu_locale_core::{LanguageIdentifier, langid};
use mailmerge::engine::{INVALID_DATE, date, lowercase, phone};
use mailmerge::{MergeContext, Template, TransformKind, TransformRegistry, record, resolve};

fn und() -> LanguageIdentifier {
    langid!("und")
}

// =============================================================================
// lowercase
// =============================================================================

#[test]
fn test_lowercase_ascii() {
    assert_eq!(lowercase("HeLLo World", &und()), "hello world");
}

#[test]
fn test_lowercase_unicode() {
    assert_eq!(lowercase("ÀÉÎÕÜ", &und()), "àéîõü");
    assert_eq!(lowercase("", &und()), "");
}

#[test]
fn test_lowercase_turkish_dotted_i() {
    let tr: LanguageIdentifier = langid!("tr");
    assert_eq!(lowercase("ISTANBUL", &tr), "ıstanbul");
    assert_eq!(lowercase("İzmir", &tr), "izmir");
}

#[test]
fn test_context_language_reaches_filters() {
    let template = Template::compile("{city|filter:lowercase}");
    let transforms = TransformRegistry::new();
    let r = record! { "city" => "ISPARTA" };

    let default = resolve(&template, &MergeContext::new(&r, &transforms));
    assert_eq!(default, "isparta");

    let turkish = resolve(
        &template,
        &MergeContext::new(&r, &transforms).with_language(langid!("tr")),
    );
    assert_eq!(turkish, "ısparta");
}

// =============================================================================
// date
// =============================================================================

#[test]
fn test_date_epoch() {
    assert_eq!(date("0", &und()), "Thu Jan 01 1970");
}

#[test]
fn test_date_known_instant() {
    assert_eq!(date("1700000000000", &und()), "Tue Nov 14 2023");
}

#[test]
fn test_date_before_epoch() {
    assert_eq!(date("-86400000", &und()), "Wed Dec 31 1969");
}

#[test]
fn test_date_uses_integer_prefix() {
    assert_eq!(date("  1700000000000 ms", &und()), "Tue Nov 14 2023");
}

#[test]
fn test_date_five_digit_year_has_no_sign() {
    assert_eq!(date("253402300800000", &und()), "Sat Jan 01 10000");
}

#[test]
fn test_date_range_limits_are_valid() {
    assert_eq!(date("8640000000000000", &und()), "Sat Sep 13 275760");
    assert_eq!(date("-8640000000000000", &und()), "Tue Apr 20 -271821");
}

#[test]
fn test_date_negative_year() {
    assert_eq!(date("-62198755200000", &und()), "Fri Jan 01 -0001");
}

#[test]
fn test_date_invalid_values() {
    assert_eq!(date("yesterday", &und()), INVALID_DATE);
    assert_eq!(date("", &und()), INVALID_DATE);
    assert_eq!(date("99999999999999999999", &und()), INVALID_DATE);
    assert_eq!(date("8640000000000001", &und()), INVALID_DATE);
    assert_eq!(date("-8640000000000001", &und()), INVALID_DATE);
}

// =============================================================================
// phone
// =============================================================================

#[test]
fn test_phone_regroups_eleven_digits() {
    assert_eq!(phone("15551234567", &und()), "(555) 123-4567");
}

#[test]
fn test_phone_ten_digits_unchanged() {
    assert_eq!(phone("5551234567", &und()), "5551234567");
}

#[test]
fn test_phone_keeps_surrounding_text() {
    assert_eq!(
        phone("tel:15551234567 ext 9", &und()),
        "tel:(555) 123-4567 ext 9"
    );
}

#[test]
fn test_phone_uses_first_run() {
    assert_eq!(phone("123456789012", &und()), "(234) 567-89012");
}

#[test]
fn test_phone_separated_digits_unchanged() {
    assert_eq!(phone("+1 555 123 4567", &und()), "+1 555 123 4567");
}

// =============================================================================
// Registry
// =============================================================================

#[test]
fn test_builtin_registry_contents() {
    let registry = TransformRegistry::new();
    assert!(registry.has_transform(TransformKind::Filter, "lowercase"));
    assert!(registry.has_transform(TransformKind::Format, "date"));
    assert!(registry.has_transform(TransformKind::Format, "phone"));
    assert!(!registry.has_transform(TransformKind::Format, "lowercase"));
}

#[test]
fn test_empty_registry_passes_values_through() {
    let registry = TransformRegistry::empty();
    assert_eq!(
        registry.apply(TransformKind::Filter, "lowercase", "ABC", &und()),
        "ABC"
    );
}

#[test]
fn test_register_replaces_existing() {
    fn constant(_: &str, _: &LanguageIdentifier) -> String {
        "fixed".to_string()
    }
    let mut registry = TransformRegistry::new();
    registry.register(TransformKind::Format, "DATE", constant);
    assert_eq!(
        registry.apply(TransformKind::Format, "date", "0", &und()),
        "fixed"
    );
}
