use clap::Args;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use receivables_core::report::export::DEFAULT_LINES_PER_PAGE;
use receivables_core::report::{build_workbook, render_document, Sheet, Workbook};

use super::scenario::ScenarioArgs;
use super::simulate::simulate_scenario;

/// Arguments for exporting a simulation
#[derive(Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub scenario: ScenarioArgs,

    /// Path stem for the workbook; one CSV per sheet is written as <stem>-<sheet>.csv
    #[arg(long)]
    pub csv_stem: Option<PathBuf>,

    /// Path for the paginated text report
    #[arg(long)]
    pub text: Option<PathBuf>,

    /// Body lines per page in the text report
    #[arg(long, default_value_t = DEFAULT_LINES_PER_PAGE)]
    pub lines_per_page: usize,
}

pub fn run_export(args: ExportArgs) -> Result<Value, Box<dyn std::error::Error>> {
    if args.csv_stem.is_none() && args.text.is_none() {
        return Err("--csv-stem <path> and/or --text <path> required for export".into());
    }

    let output = simulate_scenario(&args.scenario)?;
    let result = &output.result.result;
    let mut written: Vec<String> = Vec::new();

    if let Some(ref stem) = args.csv_stem {
        for path in write_workbook(&build_workbook(result), stem)? {
            written.push(path.display().to_string());
        }
    }

    if let Some(ref path) = args.text {
        let document = render_document(result, args.lines_per_page)?;
        fs::write(path, document)
            .map_err(|e| format!("Failed to write '{}': {}", path.display(), e))?;
        tracing::info!(path = %path.display(), "wrote text report");
        written.push(path.display().to_string());
    }

    Ok(serde_json::json!({
        "result": {
            "records": result.records.len(),
            "files_written": written,
        },
        "warnings": output.warnings,
    }))
}

/// Write each sheet as `<stem>-<sheet name>.csv` and return the paths.
pub fn write_workbook(
    workbook: &Workbook,
    stem: &Path,
) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    let mut paths = Vec::with_capacity(workbook.sheets.len());
    for sheet in &workbook.sheets {
        let path = sheet_path(stem, sheet);
        let mut wtr = csv::Writer::from_path(&path)
            .map_err(|e| format!("Failed to create '{}': {}", path.display(), e))?;
        wtr.write_record(&sheet.headers)?;
        for row in &sheet.rows {
            wtr.write_record(row)?;
        }
        wtr.flush()?;
        tracing::info!(path = %path.display(), rows = sheet.rows.len(), "wrote sheet");
        paths.push(path);
    }
    Ok(paths)
}

fn sheet_path(stem: &Path, sheet: &Sheet) -> PathBuf {
    let file_stem = stem
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    stem.with_file_name(format!("{}-{}.csv", file_stem, sheet.name.to_lowercase()))
}
