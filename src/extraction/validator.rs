//! LLM extraction and per-candidate evidence validation.

use std::sync::Arc;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::error::ExtractionError;
use crate::llm::LlmProvider;
use crate::resolver::{month_number, TimeRange, MONTH_ALTERNATION, YEAR_MAX, YEAR_MIN};

const SYSTEM_PROMPT: &str = "You extract date ranges from advertising performance queries. \
Respond with JSON only, no prose: \
{\"dateRanges\": [\"<Month YYYY or YYYY>\", ...], \"intent\": \"<short label>\"}. \
List each distinct period mentioned in the query, in the order it appears. \
Only report periods that are literally present in the query. \
If the query names no explicit month or year, return an empty dateRanges array.";

/// Fallback intent label when the model omits one.
const DEFAULT_INTENT: &str = "comparison";

// ============================================================================
// Extraction Validator
// ============================================================================

/// Wraps one LLM call and strictly validates its output against the
/// source text.
pub struct ExtractionValidator {
    llm: Arc<dyn LlmProvider>,
}

/// Extraction output that survived validation.
#[derive(Debug, Clone)]
pub struct ValidatedExtraction {
    /// The first two validated periods, in the order the model listed them.
    pub ranges: [TimeRange; 2],
    /// Intent label reported by the model, or a generic default.
    pub intent: String,
}

/// Raw shape of the model's answer.
#[derive(Debug, Deserialize)]
struct AiExtraction {
    #[serde(alias = "dateRanges", default)]
    date_ranges: Vec<String>,
    #[serde(default)]
    intent: Option<String>,
}

impl ExtractionValidator {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }

    /// Ask the model for date ranges and validate every candidate against
    /// the source query. Fails unless at least two candidates survive.
    pub async fn extract(&self, query: &str) -> Result<ValidatedExtraction, ExtractionError> {
        let user_prompt = format!("Query: {query}");
        let response = self
            .llm
            .complete(SYSTEM_PROMPT, &user_prompt)
            .await
            .map_err(|e| ExtractionError::Provider(e.to_string()))?;

        let extraction = parse_response(&response)?;
        let proposed = extraction.date_ranges.len();

        let mut validated = Vec::new();
        for candidate in &extraction.date_ranges {
            match validate_candidate(candidate, query) {
                Some(range) => validated.push(range),
                None => {
                    // Hallucinated or unparseable candidates are silently
                    // dropped; only the aggregate count surfaces.
                    tracing::debug!(candidate, "rejected AI date candidate without evidence");
                }
            }
            if validated.len() == 2 {
                break;
            }
        }

        if validated.len() < 2 {
            return Err(ExtractionError::Insufficient {
                validated: validated.len(),
                proposed,
            });
        }

        let intent = extraction
            .intent
            .filter(|i| !i.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_INTENT.to_string());

        Ok(ValidatedExtraction {
            ranges: [validated[0], validated[1]],
            intent,
        })
    }
}

// ============================================================================
// Response Parsing
// ============================================================================

/// Parse the model response, tolerating markdown code fences and
/// surrounding prose.
fn parse_response(response: &str) -> Result<AiExtraction, ExtractionError> {
    let body = extract_json_object(response)
        .ok_or_else(|| ExtractionError::Malformed("no JSON object in response".to_string()))?;
    serde_json::from_str(body).map_err(|e| ExtractionError::Malformed(e.to_string()))
}

fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

// ============================================================================
// Candidate Validation
// ============================================================================

/// Validate one candidate against the source query. Returns the resolved
/// range only when the candidate is syntactically valid AND every part of
/// it is evidenced by the literal source text.
fn validate_candidate(candidate: &str, source: &str) -> Option<TimeRange> {
    if let Some(caps) = MONTH_YEAR_CANDIDATE.captures(candidate) {
        let month = month_number(&caps[1])?;
        let year_text = &caps[2];
        let year: i32 = year_text.parse().ok()?;
        if !(YEAR_MIN..=YEAR_MAX).contains(&year) {
            return None;
        }
        if !source.contains(year_text) {
            return None;
        }
        if !month_evidenced(month, year, source) {
            return None;
        }
        return TimeRange::full_month(year, month);
    }

    if let Some(caps) = BARE_YEAR_CANDIDATE.captures(candidate) {
        let year_text = &caps[1];
        let year: i32 = year_text.parse().ok()?;
        if !(YEAR_MIN..=YEAR_MAX).contains(&year) {
            return None;
        }
        if !source.contains(year_text) {
            return None;
        }
        return TimeRange::full_year(year);
    }

    None
}

/// A month is evidenced either by any of its name forms occurring in the
/// source as a whole word, or, for numeric input, by an M/D/Y slash
/// pattern in the source with a matching month and year. Alias substrings
/// inside unrelated words ("mar" in "marketing") are not evidence.
fn month_evidenced(month: u32, year: i32, source: &str) -> bool {
    let named = SOURCE_MONTH_NAME
        .captures_iter(source)
        .any(|caps| month_number(&caps[1]) == Some(month));
    if named {
        return true;
    }

    for caps in SOURCE_SLASH_DATE.captures_iter(source) {
        let Ok(m) = caps[1].parse::<u32>() else {
            continue;
        };
        let Ok(mut y) = caps[3].parse::<i32>() else {
            continue;
        };
        if y < 100 {
            y += 2000;
        }
        if m == month && y == year {
            return true;
        }
    }
    false
}

static MONTH_YEAR_CANDIDATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*([a-z]+)\.?\s+(\d{4})\s*$").expect("Invalid regex")
});
static BARE_YEAR_CANDIDATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d{4})\s*$").expect("Invalid regex"));
static SOURCE_SLASH_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2})/(\d{1,2})/(\d{2,4})\b").expect("Invalid regex"));
static SOURCE_MONTH_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\b({MONTH_ALTERNATION})\b")).expect("Invalid regex")
});

// ============================================================================
// Tests
// ============================================================================
