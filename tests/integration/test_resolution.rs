//! Date-resolution behavior through the public API.

use chrono::NaiveDate;

use adscope::query::ComparisonClassifier;
use adscope::resolver::{TimeExpressionResolver, TimeRange};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn resolver() -> TimeExpressionResolver {
    TimeExpressionResolver::with_reference_date(date(2025, 6, 15))
}

#[test]
fn explicit_expressions_resolve_without_any_model() {
    let resolver = resolver();

    let cases: &[(&str, (i32, u32, u32), (i32, u32, u32))] = &[
        ("spend today", (2025, 6, 15), (2025, 6, 15)),
        ("spend yesterday", (2025, 6, 14), (2025, 6, 14)),
        ("last 30 days", (2025, 5, 16), (2025, 6, 14)),
        ("January 2025", (2025, 1, 1), (2025, 1, 31)),
        ("Q3 2024", (2024, 7, 1), (2024, 9, 30)),
        ("June 5-10, 2025", (2025, 6, 5), (2025, 6, 10)),
        ("2025-01-01 to 2025-01-31", (2025, 1, 1), (2025, 1, 31)),
        ("6/1/2025 through 6/15/2025", (2025, 6, 1), (2025, 6, 15)),
    ];

    for (text, (sy, sm, sd), (ey, em, ed)) in cases {
        let ranges = resolver.resolve(text);
        assert_eq!(ranges.len(), 1, "expected one range for {text:?}");
        assert_eq!(ranges[0].start(), date(*sy, *sm, *sd), "start of {text:?}");
        assert_eq!(ranges[0].end(), date(*ey, *em, *ed), "end of {text:?}");
    }
}

#[test]
fn dual_expressions_resolve_in_text_order() {
    let resolver = resolver();
    let ranges = resolver.resolve("clicks for May 2025 compared to May 2024");

    assert_eq!(ranges.len(), 2);
    assert_eq!(ranges[0].start(), date(2025, 5, 1));
    assert_eq!(ranges[1].start(), date(2024, 5, 1));
}

#[test]
fn ranges_never_invert_and_never_exceed_two() {
    let resolver = resolver();

    for text in [
        "this week",
        "this month",
        "last week",
        "October 2024 vs October 2025",
        "Q1 2025 and then Q2 2025",
    ] {
        let ranges = resolver.resolve(text);
        assert!(ranges.len() <= 2, "{text:?} produced {} ranges", ranges.len());
        for range in &ranges {
            assert!(range.start() <= range.end(), "inverted range for {text:?}");
        }
    }
}

#[test]
fn labels_are_resolvable_iso_ranges() {
    let resolver = resolver();

    for text in ["last week", "last 90 days", "Q4 2024", "February 2025"] {
        let original = resolver.resolve(text);
        assert_eq!(original.len(), 1);

        let label = original[0].label();
        let reparsed = resolver.resolve(&label);
        assert_eq!(reparsed, original, "label {label:?} did not round-trip");
    }
}

#[test]
fn time_range_length_is_inclusive() {
    let range = TimeRange::new(date(2025, 1, 1), date(2025, 1, 1)).unwrap();
    assert_eq!(range.len_days(), 1);

    let full_month = TimeRange::full_month(2024, 2).unwrap();
    assert_eq!(full_month.len_days(), 29); // leap year
}

#[test]
fn classifier_matches_comparison_phrasings() {
    let classifier = ComparisonClassifier::new();

    for text in [
        "Compare October 2025 vs October 2024",
        "spend versus last quarter",
        "clicks year over year",
        "conversions against Q1",
        "revenue MoM",
    ] {
        assert!(classifier.is_comparison(text), "{text:?} should classify as comparison");
    }

    for text in ["top keywords this month", "show spend for Q1 2025"] {
        assert!(!classifier.is_comparison(text), "{text:?} should not classify as comparison");
    }
}
