use chrono::{Local, NaiveDate};
use napi::Result as NapiResult;
use napi_derive::napi;

use receivables_core::receivables::input::parse_event_date;
use receivables_core::receivables::{self, SimulationInput, SimulationRun};
use receivables_core::report;
use receivables_core::types::ComputationOutput;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// `today` anchors date-based event timing; defaults to the local date.
fn resolve_today(today: Option<String>) -> NapiResult<NaiveDate> {
    match today {
        Some(s) => parse_event_date(&s).map_err(to_napi_error),
        None => Ok(Local::now().date_naive()),
    }
}

fn run(input_json: &str, today: Option<String>) -> NapiResult<ComputationOutput<SimulationRun>> {
    let input: SimulationInput = serde_json::from_str(input_json).map_err(to_napi_error)?;
    receivables::run_simulation(&input, resolve_today(today)?).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------

#[napi]
pub fn simulate_receivables(input_json: String, today: Option<String>) -> NapiResult<String> {
    let output = run(&input_json, today)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn parse_installment_plan(plan_text: String) -> NapiResult<String> {
    let parsed = receivables::parse_plan_text(&plan_text);
    serde_json::to_string(&serde_json::json!({
        "distribution": parsed.distribution,
        "normalized": parsed.distribution.normalize(),
        "errors": parsed.errors,
        "messages": parsed.errors.iter().map(|e| e.to_string()).collect::<Vec<_>>(),
    }))
    .map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Reporting
// ---------------------------------------------------------------------------

#[napi]
pub fn simulation_report(input_json: String, today: Option<String>) -> NapiResult<String> {
    let output = run(&input_json, today)?;
    let report = report::SimulationReport::from_result(&output.result.result);
    serde_json::to_string(&report).map_err(to_napi_error)
}

#[napi]
pub fn simulation_chart(input_json: String, today: Option<String>) -> NapiResult<String> {
    let output = run(&input_json, today)?;
    let bars = report::chart_series(&output.result.result);
    serde_json::to_string(&bars).map_err(to_napi_error)
}

#[napi]
pub fn simulation_workbook(input_json: String, today: Option<String>) -> NapiResult<String> {
    let output = run(&input_json, today)?;
    let workbook = report::build_workbook(&output.result.result);
    serde_json::to_string(&workbook).map_err(to_napi_error)
}

#[napi]
pub fn simulation_document(
    input_json: String,
    lines_per_page: Option<u32>,
    today: Option<String>,
) -> NapiResult<String> {
    let output = run(&input_json, today)?;
    let lines = lines_per_page
        .map(|n| n as usize)
        .unwrap_or(report::export::DEFAULT_LINES_PER_PAGE);
    report::render_document(&output.result.result, lines).map_err(to_napi_error)
}

#[napi]
pub fn format_currency(amount: f64) -> String {
    report::format_currency(amount)
}
