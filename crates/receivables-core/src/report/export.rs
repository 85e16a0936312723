//! Export layouts: a two-sheet workbook and a paginated text document.
//! Writers for concrete file formats live with the callers.

use serde::Serialize;

use crate::error::ReceivablesError;
use crate::receivables::simulation::SimulationResult;
use crate::report::format::{format_currency, round_money};
use crate::ReceivablesResult;

pub const RECORDS_SHEET: &str = "Simulation";
pub const SUMMARY_SHEET: &str = "Summary";
pub const DOCUMENT_TITLE: &str = "Ticket Receivables Flow Simulation";
pub const DEFAULT_LINES_PER_PAGE: usize = 40;

/// Form feed between document pages.
const PAGE_BREAK: &str = "\u{000C}";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }
}

/// Ledger sheet plus a three-line summary sheet. Money cells hold amounts
/// rounded to cents, without currency formatting.
pub fn build_workbook(result: &SimulationResult) -> Workbook {
    let records = Sheet {
        name: RECORDS_SHEET.to_string(),
        headers: [
            "installments",
            "kind",
            "days_until_receipt",
            "gross_value",
            "net_value",
        ]
        .iter()
        .map(|h| h.to_string())
        .collect(),
        rows: result
            .records
            .iter()
            .map(|r| {
                vec![
                    r.installments.to_string(),
                    r.kind.label().to_string(),
                    r.days_until_receipt.to_string(),
                    round_money(r.gross_value).to_string(),
                    round_money(r.net_value).to_string(),
                ]
            })
            .collect(),
    };

    let summary = Sheet {
        name: SUMMARY_SHEET.to_string(),
        headers: vec!["description".to_string(), "value".to_string()],
        rows: summary_lines(result)
            .into_iter()
            .map(|(label, amount)| vec![label.to_string(), round_money(amount).to_string()])
            .collect(),
    };

    Workbook {
        sheets: vec![records, summary],
    }
}

fn summary_lines(result: &SimulationResult) -> [(&'static str, f64); 3] {
    [
        ("Total gross", result.total_gross),
        ("Total net", result.total_net),
        ("Fee loss", result.fee_loss),
    ]
}

/// Plain-text document: totals first, then one line per installment.
///
/// Every page opens with the title and page number; pages are separated by
/// a form feed. `lines_per_page` counts body lines only.
pub fn render_document(
    result: &SimulationResult,
    lines_per_page: usize,
) -> ReceivablesResult<String> {
    if lines_per_page == 0 {
        return Err(ReceivablesError::InvalidInput {
            field: "lines_per_page".into(),
            reason: "A page must hold at least one line".into(),
        });
    }

    let mut body: Vec<String> = summary_lines(result)
        .iter()
        .map(|(label, amount)| format!("{}: {}", label, format_currency(*amount)))
        .collect();
    body.push(String::new());
    body.push("Per-installment summary:".to_string());
    body.extend(result.records.iter().map(|r| {
        format!(
            "{}x ({}) - {} days: {}",
            r.installments,
            r.kind,
            r.days_until_receipt,
            format_currency(r.net_value)
        )
    }));

    let pages: Vec<&[String]> = body.chunks(lines_per_page).collect();
    let page_count = pages.len();
    let rendered: Vec<String> = pages
        .iter()
        .enumerate()
        .map(|(i, lines)| {
            let mut page = format!("{} -- page {} of {}\n\n", DOCUMENT_TITLE, i + 1, page_count);
            for line in lines.iter() {
                page.push_str(line);
                page.push('\n');
            }
            page
        })
        .collect();

    Ok(rendered.join(PAGE_BREAK))
}
