//! Per-period metric aggregation.
//!
//! Raw fields are summed across rows first; derived metrics are computed
//! only from those sums. Deriving per-row and averaging would weight every
//! row equally regardless of volume, so it is never done here. Nothing is
//! ever carried across periods.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::RoundingMode;

/// Number of micros per currency unit.
const MICROS_PER_UNIT: f64 = 1_000_000.0;

/// Aggregate metrics for one period.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateMetrics {
    pub clicks: f64,
    pub impressions: f64,
    pub conversions: f64,
    pub conversions_value: f64,
    pub cost_micros: f64,
    /// `cost_micros / 1_000_000`, rounded to 2 decimals.
    pub cost_currency: f64,
    /// `cost_currency / clicks`, 0 when there are no clicks.
    pub avg_cpc: f64,
    /// `clicks / impressions * 100`, 0 when there are no impressions.
    pub ctr: f64,
    /// `cost_currency / conversions`, 0 when there are no conversions.
    pub cost_per_conversion: f64,
}

/// Pure aggregation of downstream result rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultReconciler {
    rounding: RoundingMode,
}

impl ResultReconciler {
    pub fn new(rounding: RoundingMode) -> Self {
        Self { rounding }
    }

    /// Sum raw numeric fields across rows and derive ratio metrics from
    /// the sums. Missing or non-numeric fields contribute zero; numeric
    /// strings are parsed transparently.
    pub fn aggregate(&self, rows: &[Value]) -> AggregateMetrics {
        let mut metrics = AggregateMetrics::default();

        for row in rows {
            metrics.clicks += numeric_field(row, "clicks");
            metrics.impressions += numeric_field(row, "impressions");
            metrics.conversions += numeric_field(row, "conversions");
            metrics.conversions_value += numeric_field(row, "conversions_value");
            metrics.cost_micros += numeric_field(row, "cost_micros");
        }

        // Derived metrics only after summation, ratios rounded after the
        // division, never before.
        metrics.cost_currency = self.round2(metrics.cost_micros / MICROS_PER_UNIT);
        metrics.avg_cpc = if metrics.clicks > 0.0 {
            self.round2(metrics.cost_currency / metrics.clicks)
        } else {
            0.0
        };
        metrics.ctr = if metrics.impressions > 0.0 {
            self.round2(metrics.clicks / metrics.impressions * 100.0)
        } else {
            0.0
        };
        metrics.cost_per_conversion = if metrics.conversions > 0.0 {
            self.round2(metrics.cost_currency / metrics.conversions)
        } else {
            0.0
        };

        metrics
    }

    fn round2(&self, value: f64) -> f64 {
        let scaled = value * 100.0;
        let rounded = match self.rounding {
            RoundingMode::HalfUp => scaled.round(),
            RoundingMode::HalfEven => scaled.round_ties_even(),
        };
        rounded / 100.0
    }
}

/// Read a numeric field from a row, looking inside a nested `metrics`
/// object when the field is absent at top level.
fn numeric_field(row: &Value, key: &str) -> f64 {
    let value = row
        .get(key)
        .or_else(|| row.get("metrics").and_then(|m| m.get(key)));

    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        // "NaN"/"inf" parse as f64 but would poison every derived metric.
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .unwrap_or(0.0),
        _ => 0.0,
    }
}
