//! End-to-end pipeline tests with fake LLM and execution backends.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{json, Value};

use adscope::config::Config;
use adscope::error::{AdscopeError, ExecutionError, ResolveError};
use adscope::llm::LlmProvider;
use adscope::query::{ComparisonOrchestrator, QueryExecution, QueryOutcome};
use adscope::resolver::TimeRange;

/// LLM fake that returns a canned response and counts invocations.
struct FakeLlm {
    response: String,
    calls: AtomicUsize,
}

impl FakeLlm {
    fn new(response: &str) -> Arc<Self> {
        Arc::new(Self {
            response: response.to_string(),
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl LlmProvider for FakeLlm {
    async fn complete(&self, _system: &str, _user: &str) -> adscope::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.response.clone())
    }
}

/// Execution fake keyed by range label: each period gets its own rows,
/// or an error.
struct FakeBackend {
    by_range: Vec<(String, Result<Vec<Value>, String>)>,
}

#[async_trait]
impl QueryExecution for FakeBackend {
    async fn run(&self, range: &TimeRange, _intent: &str) -> adscope::Result<Vec<Value>> {
        for (label, result) in &self.by_range {
            if *label == range.label() {
                return match result {
                    Ok(rows) => Ok(rows.clone()),
                    Err(message) => Err(ExecutionError::Failed(message.clone()).into()),
                };
            }
        }
        Ok(Vec::new())
    }
}

fn reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
}

fn build(
    llm: Arc<dyn LlmProvider>,
    backend: FakeBackend,
) -> ComparisonOrchestrator {
    ComparisonOrchestrator::new(&Config::default(), llm, Arc::new(backend))
        .with_reference_date(reference_date())
}

fn periods(outcome: &QueryOutcome) -> &[adscope::query::PeriodResult] {
    match outcome {
        QueryOutcome::Comparison(response) => {
            assert!(response.is_comparison);
            &response.comparison.periods
        }
        QueryOutcome::SinglePeriod { .. } => panic!("expected a comparison outcome"),
    }
}

#[tokio::test]
async fn comparison_resolves_executes_and_reconciles() {
    let llm = FakeLlm::new("{}");
    let backend = FakeBackend {
        by_range: vec![
            (
                "2024-10-01 to 2024-10-31".to_string(),
                Ok(vec![
                    json!({"clicks": 10, "impressions": 200, "cost_micros": 5_000_000}),
                    json!({"clicks": 5, "impressions": 100, "cost_micros": 2_000_000}),
                ]),
            ),
            (
                "2025-10-01 to 2025-10-31".to_string(),
                Ok(vec![json!({"clicks": 30, "impressions": 300, "cost_micros": 9_000_000})]),
            ),
        ],
    };
    let orchestrator = build(llm.clone(), backend);

    let outcome = orchestrator
        .handle("Compare October 2025 vs October 2024")
        .await
        .unwrap();
    let periods = periods(&outcome);

    // Deterministic resolution, so the LLM stays untouched.
    assert_eq!(llm.calls.load(Ordering::SeqCst), 0);

    // Chronological order: 2024 is the baseline.
    let baseline = &periods[0];
    assert_eq!(baseline.date_range, "2024-10-01 to 2024-10-31");
    assert_eq!(baseline.row_count, 2);
    assert_eq!(baseline.totals["clicks"], 15.0);
    assert_eq!(baseline.totals["impressions"], 300.0);
    assert_eq!(baseline.totals["cost_currency"], 7.0);
    assert_eq!(baseline.totals["avg_cpc"], 0.47);
    assert_eq!(baseline.totals["ctr"], 5.0);

    let primary = &periods[1];
    assert_eq!(primary.date_range, "2025-10-01 to 2025-10-31");
    assert_eq!(primary.totals["ctr"], 10.0);
}

#[tokio::test]
async fn one_failing_period_does_not_poison_the_other() {
    let backend = FakeBackend {
        by_range: vec![
            (
                "2024-10-01 to 2024-10-31".to_string(),
                Err("quota exceeded".to_string()),
            ),
            (
                "2025-10-01 to 2025-10-31".to_string(),
                Ok(vec![json!({"clicks": 8, "impressions": 80})]),
            ),
        ],
    };
    let orchestrator = build(FakeLlm::new("{}"), backend);

    let outcome = orchestrator
        .handle("Compare October 2025 vs October 2024")
        .await
        .unwrap();
    let periods = periods(&outcome);

    assert!(periods[0].error.as_deref().unwrap().contains("quota exceeded"));
    assert!(periods[0].rows.is_empty());
    assert_eq!(periods[0].row_count, 0);
    assert_eq!(periods[0].totals, json!({}));

    assert!(periods[1].error.is_none());
    assert_eq!(periods[1].totals["ctr"], 10.0);
}

#[tokio::test]
async fn ai_fallback_only_fires_when_deterministic_resolution_falls_short() {
    let llm = FakeLlm::new(
        r#"{"dateRanges": ["June 2025", "June 2024"], "intent": "spend comparison"}"#,
    );
    let backend = FakeBackend { by_range: vec![] };
    let orchestrator = build(llm.clone(), backend);

    let outcome = orchestrator
        .handle("compare June 2025 spend against the same month of 2024")
        .await
        .unwrap();

    assert_eq!(llm.calls.load(Ordering::SeqCst), 1);
    let QueryOutcome::Comparison(response) = &outcome else {
        panic!("expected comparison");
    };
    assert_eq!(response.comparison.intent, "spend comparison");
    assert_eq!(
        response.comparison.periods[0].date_range,
        "2024-06-01 to 2024-06-30"
    );
    assert_eq!(
        response.comparison.periods[1].date_range,
        "2025-06-01 to 2025-06-30"
    );
}

#[tokio::test]
async fn hallucinated_ai_dates_surface_as_unresolvable() {
    // The model proposes months with no textual evidence in the query.
    let llm = FakeLlm::new(r#"{"dateRanges": ["March 2019", "March 2018"], "intent": "x"}"#);
    let backend = FakeBackend { by_range: vec![] };
    let orchestrator = build(llm, backend);

    let err = orchestrator
        .handle("compare recent spend against earlier spend")
        .await
        .unwrap_err();

    let AdscopeError::Resolve(ResolveError::UnresolvableDateRange { needed, query }) = err else {
        panic!("expected unresolvable error");
    };
    assert_eq!(needed, 2);
    assert!(query.contains("recent spend"));
}

#[tokio::test]
async fn unresolvable_error_message_lists_accepted_formats() {
    let llm = FakeLlm::new(r#"{"dateRanges": []}"#);
    let orchestrator = build(llm, FakeBackend { by_range: vec![] });

    let err = orchestrator
        .handle("compare the good times vs the bad times")
        .await
        .unwrap_err();
    let message = err.to_string();

    assert!(message.contains("today"));
    assert!(message.contains("last 7 days"));
    assert!(message.contains("January 2025"));
    assert!(message.contains("Q1 2025"));
    assert!(message.contains("2025-01-01 to 2025-01-31"));
}

#[tokio::test]
async fn single_period_query_returns_one_range() {
    let orchestrator = build(FakeLlm::new("{}"), FakeBackend { by_range: vec![] });

    let outcome = orchestrator
        .handle("show campaign performance last 7 days")
        .await
        .unwrap();

    let QueryOutcome::SinglePeriod { range, .. } = outcome else {
        panic!("expected single-period outcome");
    };
    assert_eq!(range.label(), "2025-06-08 to 2025-06-14");
}

#[tokio::test]
async fn comparison_payload_serializes_with_expected_shape() {
    let backend = FakeBackend {
        by_range: vec![(
            "2025-10-01 to 2025-10-31".to_string(),
            Err("timeout".to_string()),
        )],
    };
    let orchestrator = build(FakeLlm::new("{}"), backend);

    let outcome = orchestrator
        .handle("Compare October 2025 vs October 2024")
        .await
        .unwrap();
    let payload = serde_json::to_value(&outcome).unwrap();

    assert_eq!(payload["is_comparison"], true);
    let periods = payload["comparison"]["periods"].as_array().unwrap();
    assert_eq!(periods.len(), 2);
    // Successful period has no error key at all.
    assert!(periods[0].get("error").is_none());
    assert!(periods[1]["error"].as_str().unwrap().contains("timeout"));
    assert_eq!(periods[1]["totals"], json!({}));
}
