use chrono::{Local, NaiveDate};
use clap::Args;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use receivables_core::receivables::distribution::FIXED_INSTALLMENT_BUCKETS;
use receivables_core::receivables::input::{parse_event_date, PlanBucket};
use receivables_core::receivables::{DistributionInput, EventTiming, SimulationInput};

use crate::input;

/// Scenario inputs shared by every simulation command
#[derive(Args, Debug, Default)]
pub struct ScenarioArgs {
    /// Path to a JSON or YAML scenario file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Total gross ticket sales
    #[arg(long)]
    pub total_sales: Option<Decimal>,

    /// Days from today until the event (negative if it has passed)
    #[arg(long, conflicts_with = "event_date", allow_negative_numbers = true)]
    pub event_days: Option<i64>,

    /// Event date (YYYY-MM-DD); the horizon is counted from today
    #[arg(long)]
    pub event_date: Option<String>,

    /// Monthly advance (factoring) rate in percent, e.g. 2.0
    #[arg(long)]
    pub advance_rate: Option<Decimal>,

    /// Monthly discount on installments received on schedule, in percent
    #[arg(long)]
    pub flow_rate: Option<Decimal>,

    /// Monthly reinvestment yield in percent, e.g. 1.05
    #[arg(long)]
    pub reinvestment_rate: Option<Decimal>,

    /// Freeform plan line "installments;percentage" (repeatable)
    #[arg(long = "plan", conflicts_with_all = ["plan_file", "buckets"])]
    pub plan: Vec<String>,

    /// File with one "installments;percentage" line per plan
    #[arg(long, conflicts_with = "buckets")]
    pub plan_file: Option<String>,

    /// Percentages for the fixed 1x,2x,3x,6x,12x plans, comma separated
    #[arg(long, value_delimiter = ',', num_args = 1)]
    pub buckets: Vec<Decimal>,
}

/// Today's date in local time; anchors `--event-date`.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Resolve the scenario: input file, then piped JSON, then flags over defaults.
pub fn load_scenario(args: &ScenarioArgs) -> Result<SimulationInput, Box<dyn std::error::Error>> {
    if let Some(ref path) = args.input {
        tracing::debug!(path = %path, "loading scenario file");
        return input::file::read_document(path);
    }
    if let Some(data) = input::stdin::read_stdin_json()? {
        tracing::debug!("loading scenario from stdin");
        return Ok(serde_json::from_value(data)?);
    }
    scenario_from_flags(args)
}

pub fn scenario_from_flags(
    args: &ScenarioArgs,
) -> Result<SimulationInput, Box<dyn std::error::Error>> {
    let mut scenario = SimulationInput::default();

    if let Some(total) = args.total_sales {
        scenario.total_sales = to_f64(total, "--total-sales")?;
    }
    if let Some(days) = args.event_days {
        scenario.event = EventTiming::Days(days);
    }
    if let Some(ref date) = args.event_date {
        scenario.event = EventTiming::Date(parse_event_date(date)?);
    }
    if let Some(rate) = args.advance_rate {
        scenario.advance_rate_pct = to_f64(rate, "--advance-rate")?;
    }
    if let Some(rate) = args.flow_rate {
        scenario.flow_rate_pct = to_f64(rate, "--flow-rate")?;
    }
    if let Some(rate) = args.reinvestment_rate {
        scenario.reinvestment_rate_pct = to_f64(rate, "--reinvestment-rate")?;
    }

    if !args.plan.is_empty() {
        scenario.distribution = DistributionInput::Text(args.plan.join("\n"));
    } else if let Some(ref path) = args.plan_file {
        scenario.distribution = DistributionInput::Text(input::file::read_text(path)?);
    } else if !args.buckets.is_empty() {
        if args.buckets.len() != FIXED_INSTALLMENT_BUCKETS.len() {
            return Err(format!(
                "--buckets takes {} percentages (for {:?} installments), got {}",
                FIXED_INSTALLMENT_BUCKETS.len(),
                FIXED_INSTALLMENT_BUCKETS,
                args.buckets.len()
            )
            .into());
        }
        let buckets = FIXED_INSTALLMENT_BUCKETS
            .iter()
            .zip(args.buckets.iter())
            .map(|(&installments, &pct)| {
                Ok(PlanBucket {
                    installments,
                    pct: to_f64(pct, "--buckets")?,
                })
            })
            .collect::<Result<Vec<_>, Box<dyn std::error::Error>>>()?;
        scenario.distribution = DistributionInput::Buckets(buckets);
    }

    Ok(scenario)
}

fn to_f64(value: Decimal, flag: &str) -> Result<f64, Box<dyn std::error::Error>> {
    value
        .to_f64()
        .ok_or_else(|| format!("{flag} is out of range: {value}").into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_flags_override_defaults() {
        let args = ScenarioArgs {
            total_sales: Some(dec("12000")),
            event_days: Some(30),
            advance_rate: Some(dec("2.5")),
            plan: vec!["12;100".into()],
            ..ScenarioArgs::default()
        };
        let scenario = scenario_from_flags(&args).unwrap();
        assert_eq!(scenario.total_sales, 12_000.0);
        assert_eq!(scenario.event, EventTiming::Days(30));
        assert_eq!(scenario.advance_rate_pct, 2.5);
        assert_eq!(scenario.reinvestment_rate_pct, 1.05);
        assert_eq!(scenario.distribution, DistributionInput::Text("12;100".into()));
    }

    #[test]
    fn test_no_flags_gives_form_defaults() {
        let scenario = scenario_from_flags(&ScenarioArgs::default()).unwrap();
        assert_eq!(scenario, SimulationInput::default());
    }

    #[test]
    fn test_buckets_map_to_fixed_plans() {
        let args = ScenarioArgs {
            buckets: ["50", "0", "0", "25", "25"].iter().map(|s| dec(s)).collect(),
            ..ScenarioArgs::default()
        };
        let scenario = scenario_from_flags(&args).unwrap();
        match scenario.distribution {
            DistributionInput::Buckets(b) => {
                assert_eq!(b.len(), 5);
                assert_eq!(b[3].installments, 6);
                assert_eq!(b[3].pct, 25.0);
            }
            other => panic!("expected buckets, got {other:?}"),
        }
    }

    #[test]
    fn test_wrong_bucket_count_rejected() {
        let args = ScenarioArgs {
            buckets: vec![dec("100")],
            ..ScenarioArgs::default()
        };
        assert!(scenario_from_flags(&args).is_err());
    }

    #[test]
    fn test_bad_event_date_rejected() {
        let args = ScenarioArgs {
            event_date: Some("next friday".into()),
            ..ScenarioArgs::default()
        };
        assert!(scenario_from_flags(&args).is_err());
    }
}
