//! Collaborator-facing scenario input.
//!
//! Mirrors what an input form collects: sales, event timing as a day count
//! or a calendar date, rates as percentages, and the plan distribution as
//! fixed buckets or freeform text. [`run_simulation`] resolves it into
//! [`SimulationParameters`] and runs the engine inside the standard envelope.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::receivables::distribution::{
    parse_plan_text, InstallmentPlanDistribution, LineError, DEFAULT_BUCKET_PCT,
    FIXED_INSTALLMENT_BUCKETS,
};
use crate::receivables::simulation::{simulate, ReceiptKind, SimulationParameters, SimulationResult};
use crate::types::{pct_to_rate, with_metadata, ComputationOutput, Days, Money, Percent};
use crate::ReceivablesResult;

/// Tolerance when checking whether raw plan percentages add up to 100%.
const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// When the event takes place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventTiming {
    /// Days from today.
    Days(Days),
    /// Calendar date; the horizon is `date - today` with no floor at zero.
    Date(NaiveDate),
}

impl EventTiming {
    pub fn days_until(&self, today: NaiveDate) -> Days {
        match self {
            EventTiming::Days(days) => *days,
            EventTiming::Date(date) => (*date - today).num_days(),
        }
    }
}

impl Default for EventTiming {
    fn default() -> Self {
        EventTiming::Days(90)
    }
}

/// One fixed bucket: an installment plan and its percentage of sales.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanBucket {
    pub installments: u32,
    pub pct: Percent,
}

/// The plan distribution as entered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistributionInput {
    /// Fixed categories with one percentage each.
    Buckets(Vec<PlanBucket>),
    /// Freeform `count;percentage` lines.
    Text(String),
}

impl Default for DistributionInput {
    fn default() -> Self {
        DistributionInput::Buckets(
            FIXED_INSTALLMENT_BUCKETS
                .iter()
                .map(|&installments| PlanBucket {
                    installments,
                    pct: DEFAULT_BUCKET_PCT,
                })
                .collect(),
        )
    }
}

fn default_total_sales() -> Money {
    100_000.0
}

fn default_advance_rate_pct() -> Percent {
    2.0
}

fn default_reinvestment_rate_pct() -> Percent {
    1.05
}

/// Full scenario input. Rates are monthly percentages (2.0 = 2%).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationInput {
    #[serde(default = "default_total_sales")]
    pub total_sales: Money,
    #[serde(default)]
    pub event: EventTiming,
    #[serde(default = "default_advance_rate_pct")]
    pub advance_rate_pct: Percent,
    #[serde(default)]
    pub flow_rate_pct: Percent,
    #[serde(default = "default_reinvestment_rate_pct")]
    pub reinvestment_rate_pct: Percent,
    #[serde(default)]
    pub distribution: DistributionInput,
}

impl Default for SimulationInput {
    fn default() -> Self {
        SimulationInput {
            total_sales: default_total_sales(),
            event: EventTiming::default(),
            advance_rate_pct: default_advance_rate_pct(),
            flow_rate_pct: 0.0,
            reinvestment_rate_pct: default_reinvestment_rate_pct(),
            distribution: DistributionInput::default(),
        }
    }
}

impl SimulationInput {
    pub fn parameters(&self, today: NaiveDate) -> SimulationParameters {
        SimulationParameters {
            total_sales: self.total_sales,
            days_until_event: self.event.days_until(today),
            advance_rate: pct_to_rate(self.advance_rate_pct),
            flow_rate: pct_to_rate(self.flow_rate_pct),
            reinvestment_rate: pct_to_rate(self.reinvestment_rate_pct),
        }
    }

    /// Raw (unnormalized) distribution plus any rejected freeform lines.
    pub fn distribution(
        &self,
    ) -> ReceivablesResult<(InstallmentPlanDistribution, Vec<LineError>)> {
        match &self.distribution {
            DistributionInput::Buckets(buckets) => {
                let pairs: Vec<(u32, Percent)> =
                    buckets.iter().map(|b| (b.installments, b.pct)).collect();
                Ok((InstallmentPlanDistribution::from_buckets(&pairs)?, Vec::new()))
            }
            DistributionInput::Text(text) => {
                let parsed = parse_plan_text(text);
                Ok((parsed.distribution, parsed.errors))
            }
        }
    }
}

/// Parse an ISO `YYYY-MM-DD` event date.
pub fn parse_event_date(s: &str) -> ReceivablesResult<NaiveDate> {
    Ok(NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")?)
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Engine result plus the resolved inputs that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRun {
    pub parameters: SimulationParameters,
    /// Normalized weights actually simulated, as `(installments, weight)`.
    pub plan_weights: Vec<(u32, f64)>,
    pub line_errors: Vec<String>,
    pub flow_count: usize,
    pub advanced_count: usize,
    #[serde(flatten)]
    pub result: SimulationResult,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Resolve a scenario and simulate it.
///
/// `today` anchors date-based event timing. Parameters are range-checked
/// before the engine runs; rejected plan lines become warnings.
pub fn run_simulation(
    input: &SimulationInput,
    today: NaiveDate,
) -> ReceivablesResult<ComputationOutput<SimulationRun>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let params = input.parameters(today);
    params.validate()?;

    let (distribution, line_errors) = input.distribution()?;
    for err in &line_errors {
        warnings.push(err.to_string());
    }

    let raw_total = distribution.total_weight();
    if distribution.is_empty() || raw_total <= 0.0 {
        warnings.push("Plan distribution is empty or all zero: no installments generated".into());
    } else if (raw_total - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        warnings.push(format!(
            "Plan percentages sum to {:.2}%, normalized to 100%",
            raw_total * 100.0
        ));
    }
    if params.days_until_event < 0 {
        warnings.push(format!(
            "Event date is {} day(s) in the past: every installment is advanced",
            -params.days_until_event
        ));
    }

    let result = simulate(&params, &distribution);

    let run = SimulationRun {
        parameters: params,
        plan_weights: distribution
            .normalize()
            .iter()
            .map(|e| (e.installments, e.weight))
            .collect(),
        line_errors: line_errors.iter().map(|e| e.to_string()).collect(),
        flow_count: result.count_by_kind(ReceiptKind::Flow),
        advanced_count: result.count_by_kind(ReceiptKind::Advanced),
        result,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Receivable flow simulation -- flow vs. advance with reinvestment, 30-day months",
        &serde_json::json!({
            "day_count": "30/month",
            "days_until_event": params.days_until_event,
            "advance_rate_monthly": params.advance_rate,
            "flow_rate_monthly": params.flow_rate,
            "reinvestment_rate_monthly": params.reinvestment_rate,
            "classification": "flow if days_until_receipt <= days_until_event",
        }),
        warnings,
        elapsed,
        run,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReceivablesError;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[test]
    fn test_event_date_resolution() {
        let event = EventTiming::Date(NaiveDate::from_ymd_opt(2027, 1, 17).unwrap());
        assert_eq!(event.days_until(today()), 90);
        let past = EventTiming::Date(NaiveDate::from_ymd_opt(2026, 10, 9).unwrap());
        assert_eq!(past.days_until(today()), -10);
    }

    #[test]
    fn test_default_input_matches_form_defaults() {
        let input = SimulationInput::default();
        let p = input.parameters(today());
        assert_eq!(p.total_sales, 100_000.0);
        assert_eq!(p.days_until_event, 90);
        assert_eq!(p.advance_rate, 0.02);
        assert_eq!(p.flow_rate, 0.0);
        assert!((p.reinvestment_rate - 0.0105).abs() < 1e-15);
        let (dist, errors) = input.distribution().unwrap();
        assert!(errors.is_empty());
        assert_eq!(dist.len(), 5);
    }

    #[test]
    fn test_deserialize_text_distribution_with_date() {
        let input: SimulationInput = serde_json::from_value(serde_json::json!({
            "total_sales": 50000.0,
            "event": { "date": "2026-11-18" },
            "advance_rate_pct": 2.0,
            "flow_rate_pct": 1.0,
            "reinvestment_rate_pct": 1.05,
            "distribution": { "text": "1;50\n3;50" }
        }))
        .unwrap();
        assert_eq!(input.event.days_until(today()), 30);
        let (dist, _) = input.distribution().unwrap();
        assert_eq!(dist.weight(3), Some(0.5));
    }

    #[test]
    fn test_run_simulation_reports_line_errors_as_warnings() {
        let input = SimulationInput {
            distribution: DistributionInput::Text("1;50\noops\n2;50".into()),
            ..SimulationInput::default()
        };
        let out = run_simulation(&input, today()).unwrap();
        assert_eq!(out.result.line_errors.len(), 1);
        assert!(out.warnings.iter().any(|w| w.contains("oops")));
        assert_eq!(out.result.result.records.len(), 3);
    }

    #[test]
    fn test_run_simulation_warns_on_unnormalized_weights() {
        let input = SimulationInput {
            distribution: DistributionInput::Text("1;10\n2;10".into()),
            ..SimulationInput::default()
        };
        let out = run_simulation(&input, today()).unwrap();
        assert!(out.warnings.iter().any(|w| w.contains("normalized")));
        let weights: f64 = out.result.plan_weights.iter().map(|(_, w)| w).sum();
        assert!((weights - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_run_simulation_rejects_out_of_range_rates() {
        let input = SimulationInput {
            advance_rate_pct: 120.0,
            ..SimulationInput::default()
        };
        assert!(matches!(
            run_simulation(&input, today()),
            Err(ReceivablesError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_run_simulation_empty_distribution() {
        let input = SimulationInput {
            distribution: DistributionInput::Text(String::new()),
            ..SimulationInput::default()
        };
        let out = run_simulation(&input, today()).unwrap();
        assert!(out.result.result.records.is_empty());
        assert_eq!(out.result.result.fee_loss, 0.0);
        assert!(out.warnings.iter().any(|w| w.contains("empty")));
    }

    #[test]
    fn test_run_simulation_past_event_warning() {
        let input = SimulationInput {
            event: EventTiming::Days(-5),
            ..SimulationInput::default()
        };
        let out = run_simulation(&input, today()).unwrap();
        assert!(out.warnings.iter().any(|w| w.contains("in the past")));
        assert_eq!(out.result.flow_count, 0);
    }

    #[test]
    fn test_parse_event_date() {
        assert_eq!(
            parse_event_date(" 2026-12-25 ").unwrap(),
            NaiveDate::from_ymd_opt(2026, 12, 25).unwrap()
        );
        assert!(matches!(
            parse_event_date("25/12/2026"),
            Err(ReceivablesError::DateError(_))
        ));
    }
}
