use clap::Args;
use serde_json::Value;

use receivables_core::receivables::distribution::DEFAULT_PLAN_TEXT;
use receivables_core::receivables::parse_plan_text;

use crate::input;

/// Arguments for checking a freeform installment plan
#[derive(Args)]
pub struct ParsePlanArgs {
    /// Plan text, one "installments;percentage" per line
    #[arg(long, conflicts_with = "plan_file")]
    pub plan_text: Option<String>,

    /// File containing the plan text
    #[arg(long)]
    pub plan_file: Option<String>,
}

/// Parse a plan and report accepted entries, normalized weights and line errors.
pub fn run_parse_plan(args: ParsePlanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let text = if let Some(text) = args.plan_text {
        text
    } else if let Some(ref path) = args.plan_file {
        input::file::read_text(path)?
    } else if let Some(text) = input::stdin::read_stdin_text()? {
        text
    } else {
        DEFAULT_PLAN_TEXT.to_string()
    };

    let parsed = parse_plan_text(&text);
    for err in &parsed.errors {
        tracing::warn!(line = err.line_number, "{}", err);
    }

    let normalized = parsed.distribution.normalize();
    Ok(serde_json::json!({
        "result": {
            "accepted": parsed.distribution.len(),
            "rejected": parsed.errors.len(),
            "raw_total_pct": parsed.distribution.total_weight() * 100.0,
            "entries": normalized,
            "errors": parsed.errors,
        },
        "warnings": parsed.errors.iter().map(|e| e.to_string()).collect::<Vec<_>>(),
    }))
}
