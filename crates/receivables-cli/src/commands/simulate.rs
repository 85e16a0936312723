use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

use receivables_core::receivables::{run_simulation, SimulationRun};
use receivables_core::report::{ReportRow, SimulationReport};
use receivables_core::types::{ComputationOutput, Days};

use super::scenario::{load_scenario, today, ScenarioArgs};

/// Arguments for a receivable flow simulation
#[derive(Args)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub scenario: ScenarioArgs,
}

/// Rounded view of a run, as shown to users.
#[derive(Debug, Serialize)]
struct SimulationView {
    days_until_event: Days,
    flow_count: usize,
    advanced_count: usize,
    total_gross: Decimal,
    total_net: Decimal,
    fee_loss: Decimal,
    records: Vec<ReportRow>,
}

impl SimulationView {
    fn from_run(run: &SimulationRun) -> Self {
        let report = SimulationReport::from_result(&run.result);
        SimulationView {
            days_until_event: run.parameters.days_until_event,
            flow_count: run.flow_count,
            advanced_count: run.advanced_count,
            total_gross: report.total_gross,
            total_net: report.total_net,
            fee_loss: report.fee_loss,
            records: report.records,
        }
    }
}

/// Run a scenario and return the full-precision envelope.
pub fn simulate_scenario(
    scenario: &ScenarioArgs,
) -> Result<ComputationOutput<SimulationRun>, Box<dyn std::error::Error>> {
    let input = load_scenario(scenario)?;
    let output = run_simulation(&input, today())?;
    for warning in &output.warnings {
        tracing::warn!("{}", warning);
    }
    tracing::debug!(
        records = output.result.result.records.len(),
        elapsed_us = output.metadata.computation_time_us,
        "simulation complete"
    );
    Ok(output)
}

pub fn run_simulate(args: SimulateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let output = simulate_scenario(&args.scenario)?;
    let view = ComputationOutput {
        result: SimulationView::from_run(&output.result),
        methodology: output.methodology,
        assumptions: output.assumptions,
        warnings: output.warnings,
        metadata: output.metadata,
    };
    Ok(serde_json::to_value(view)?)
}
