//! Comparison-intent detection.

/// Keywords that mark a query as a period-over-period comparison.
///
/// Matching is case-insensitive substring containment. The bare word "and"
/// is deliberately part of the set even though it fires on unrelated
/// two-clause queries; narrowing it is a product decision, not a code one.
const COMPARISON_KEYWORDS: &[&str] = &[
    "compare",
    "vs",
    "versus",
    "and",
    "against",
    "compared to",
    "year over year",
    "yoy",
    "month over month",
    "mom",
    "previous year",
    "last year",
    "prior year",
];

/// Pure keyword-based comparison detector.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComparisonClassifier;

impl ComparisonClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Whether the query asks for two periods side by side.
    pub fn is_comparison(&self, text: &str) -> bool {
        let text_lower = text.to_lowercase();
        COMPARISON_KEYWORDS
            .iter()
            .any(|keyword| text_lower.contains(keyword))
    }
}
