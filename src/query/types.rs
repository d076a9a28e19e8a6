//! Types for comparison-query orchestration.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::resolver::TimeRange;

// ============================================================================
// Comparison Request
// ============================================================================

/// A resolved comparison request. Created per request, discarded after the
/// response.
#[derive(Debug, Clone)]
pub struct ComparisonRequest {
    /// The original user query.
    pub raw_query: String,
    /// Intent label attached to both downstream executions.
    pub intent_label: String,
    /// Baseline period (chronologically earlier).
    pub period_a: TimeRange,
    /// Primary period (most recent).
    pub period_b: TimeRange,
}

impl ComparisonRequest {
    /// Build a request from two resolved ranges. The chronologically
    /// earlier range becomes the baseline `period_a`, the later the
    /// primary `period_b`, regardless of mention order.
    pub fn new(
        raw_query: impl Into<String>,
        intent_label: impl Into<String>,
        first: TimeRange,
        second: TimeRange,
    ) -> Self {
        let (period_a, period_b) = if first.start() <= second.start() {
            (first, second)
        } else {
            (second, first)
        };
        Self {
            raw_query: raw_query.into(),
            intent_label: intent_label.into(),
            period_a,
            period_b,
        }
    }
}

// ============================================================================
// Period Result
// ============================================================================

/// Outcome of one period's execution, independently successful or failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodResult {
    /// Human-readable label of the period's range.
    pub date_range: String,
    /// Downstream result rows (empty on failure).
    pub rows: Vec<Value>,
    /// Aggregated metrics (empty object on failure).
    pub totals: Value,
    /// Number of rows returned.
    pub row_count: usize,
    /// Failure marker; never aborts the sibling period.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PeriodResult {
    /// A failed period: error recorded inline, rows and totals empty.
    pub fn failure(range: &TimeRange, error: impl Into<String>) -> Self {
        Self {
            date_range: range.label(),
            rows: Vec::new(),
            totals: Value::Object(serde_json::Map::new()),
            row_count: 0,
            error: Some(error.into()),
        }
    }
}

// ============================================================================
// Query Outcome
// ============================================================================

/// The payload produced by orchestration.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum QueryOutcome {
    /// Not a comparison: one range handed to downstream query generation.
    SinglePeriod { range: TimeRange, intent: String },
    /// A reconciled two-period comparison.
    Comparison(ComparisonResponse),
}

/// Comparison payload envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonResponse {
    pub is_comparison: bool,
    pub comparison: ComparisonBody,
}

/// The reconciled comparison itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonBody {
    pub intent: String,
    /// Baseline period first, primary period second.
    pub periods: Vec<PeriodResult>,
}

impl QueryOutcome {
    pub fn comparison(intent: impl Into<String>, periods: Vec<PeriodResult>) -> Self {
        Self::Comparison(ComparisonResponse {
            is_comparison: true,
            comparison: ComparisonBody {
                intent: intent.into(),
                periods,
            },
        })
    }

    /// Whether this outcome is a comparison payload.
    pub fn is_comparison(&self) -> bool {
        matches!(self, Self::Comparison(_))
    }
}
