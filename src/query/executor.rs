//! Comparison orchestration: date resolution, isolated per-period
//! execution, and reconciliation into a single payload.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{ResolveError, Result};
use crate::extraction::ExtractionValidator;
use crate::llm::LlmProvider;
use crate::reconcile::ResultReconciler;
use crate::resolver::{TimeExpressionResolver, TimeRange};

use super::classifier::ComparisonClassifier;
use super::types::{ComparisonRequest, PeriodResult, QueryOutcome};

/// Intent label for single-period queries, which never see the model.
const SINGLE_PERIOD_INTENT: &str = "performance";

/// Intent label for comparisons resolved without the model.
const COMPARISON_INTENT: &str = "comparison";

// ============================================================================
// Query Execution
// ============================================================================

/// Downstream execution of one resolved period. Implementations run the
/// actual reporting query for the given range.
#[async_trait]
pub trait QueryExecution: Send + Sync {
    async fn run(&self, range: &TimeRange, intent: &str) -> Result<Vec<Value>>;
}

// ============================================================================
// Comparison Orchestrator
// ============================================================================

/// Drives a query end to end: classify, resolve two periods (deterministic
/// first, AI fallback second), execute both concurrently, reconcile.
pub struct ComparisonOrchestrator {
    classifier: ComparisonClassifier,
    resolver: TimeExpressionResolver,
    extractor: ExtractionValidator,
    execution: Arc<dyn QueryExecution>,
    reconciler: ResultReconciler,
}

impl ComparisonOrchestrator {
    pub fn new(
        config: &Config,
        llm: Arc<dyn LlmProvider>,
        execution: Arc<dyn QueryExecution>,
    ) -> Self {
        Self {
            classifier: ComparisonClassifier::new(),
            resolver: TimeExpressionResolver::new(),
            extractor: ExtractionValidator::new(llm),
            execution,
            reconciler: ResultReconciler::new(config.reconcile.rounding),
        }
    }

    /// Pin the resolver's reference date. Used by tests; production code
    /// resolves against the current local date.
    pub fn with_reference_date(mut self, reference_date: NaiveDate) -> Self {
        self.resolver = TimeExpressionResolver::with_reference_date(reference_date);
        self
    }

    /// Handle one user query. Comparison queries produce a two-period
    /// payload; everything else produces a single resolved range.
    pub async fn handle(&self, raw_query: &str) -> Result<QueryOutcome> {
        if self.classifier.is_comparison(raw_query) {
            debug!(query = raw_query, "classified as comparison");
            self.handle_comparison(raw_query).await
        } else {
            debug!(query = raw_query, "classified as single period");
            self.handle_single(raw_query)
        }
    }

    fn handle_single(&self, raw_query: &str) -> Result<QueryOutcome> {
        let mut ranges = self.resolver.resolve(raw_query);
        if ranges.is_empty() {
            return Err(ResolveError::UnresolvableDateRange {
                query: raw_query.to_string(),
                needed: 1,
            }
            .into());
        }
        Ok(QueryOutcome::SinglePeriod {
            range: ranges.remove(0),
            intent: SINGLE_PERIOD_INTENT.to_string(),
        })
    }

    async fn handle_comparison(&self, raw_query: &str) -> Result<QueryOutcome> {
        let Some((ranges, intent)) = self.resolve_comparison_periods(raw_query).await else {
            return Err(ResolveError::UnresolvableDateRange {
                query: raw_query.to_string(),
                needed: 2,
            }
            .into());
        };

        let request = ComparisonRequest::new(raw_query, intent, ranges[0], ranges[1]);
        debug!(
            period_a = %request.period_a,
            period_b = %request.period_b,
            intent = %request.intent_label,
            "comparison periods resolved"
        );

        // Periods run concurrently; a failure in one never poisons the
        // other, it becomes an inline error entry instead.
        let (result_a, result_b) = tokio::join!(
            self.execute_period(&request.period_a, &request.intent_label),
            self.execute_period(&request.period_b, &request.intent_label),
        );

        Ok(QueryOutcome::comparison(
            request.intent_label,
            vec![result_a, result_b],
        ))
    }

    /// Resolve exactly two periods: deterministic strategies first, the
    /// validated AI extraction only when they fall short.
    async fn resolve_comparison_periods(
        &self,
        raw_query: &str,
    ) -> Option<([TimeRange; 2], String)> {
        let deterministic = self.resolver.resolve(raw_query);
        if deterministic.len() == 2 {
            return Some((
                [deterministic[0], deterministic[1]],
                COMPARISON_INTENT.to_string(),
            ));
        }

        match self.extractor.extract(raw_query).await {
            Ok(extraction) => Some((extraction.ranges, extraction.intent)),
            Err(e) => {
                debug!(error = %e, "AI extraction produced no usable periods");
                None
            }
        }
    }

    async fn execute_period(&self, range: &TimeRange, intent: &str) -> PeriodResult {
        match self.execution.run(range, intent).await {
            Ok(rows) => {
                let totals = self.reconciler.aggregate(&rows);
                let totals = serde_json::to_value(&totals)
                    .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));
                PeriodResult {
                    date_range: range.label(),
                    row_count: rows.len(),
                    rows,
                    totals,
                    error: None,
                }
            }
            Err(e) => {
                warn!(range = %range, error = %e, "period execution failed");
                PeriodResult::failure(range, e.to_string())
            }
        }
    }
}
