//! Reporting boundary: rounding, currency formatting, chart series and
//! export layouts. Nothing here feeds back into the simulation.

pub mod chart;
pub mod export;
pub mod format;

pub use chart::{chart_series, render_text_chart, ChartBar};
pub use export::{build_workbook, render_document, Sheet, Workbook};
pub use format::{format_currency, round_money, ReportRow, SimulationReport};
