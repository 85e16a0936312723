use clap::Args;
use serde_json::Value;

use receivables_core::report::{chart_series, render_text_chart};

use super::scenario::ScenarioArgs;
use super::simulate::simulate_scenario;

/// Arguments for the receipt timeline chart
#[derive(Args)]
pub struct ChartArgs {
    #[command(flatten)]
    pub scenario: ScenarioArgs,

    /// Width of the longest bar, in characters
    #[arg(long, default_value = "40")]
    pub width: usize,

    /// Emit the bar data instead of the rendered chart
    #[arg(long)]
    pub data: bool,
}

/// Net value by receipt day, grouped by Flow / Advanced.
pub fn run_chart(args: ChartArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let output = simulate_scenario(&args.scenario)?;
    let bars = chart_series(&output.result.result);

    if args.data {
        return Ok(serde_json::json!({ "results": bars }));
    }
    Ok(Value::String(render_text_chart(&bars, args.width)))
}
