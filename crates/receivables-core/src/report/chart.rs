use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write;

use crate::receivables::simulation::{ReceiptKind, SimulationResult};
use crate::report::format::format_currency;
use crate::types::{Days, Money};

const BAR_GLYPH_FLOW: char = '#';
const BAR_GLYPH_ADVANCED: char = '=';

/// Net value landing on one receipt day for one receipt kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartBar {
    pub days_until_receipt: Days,
    pub kind: ReceiptKind,
    pub net_value: Money,
}

/// Net value per (receipt day, kind), ordered by day then kind.
///
/// Installments from different plans that land on the same day stack into
/// one bar.
pub fn chart_series(result: &SimulationResult) -> Vec<ChartBar> {
    let mut buckets: BTreeMap<(Days, ReceiptKind), Money> = BTreeMap::new();
    for r in &result.records {
        *buckets.entry((r.days_until_receipt, r.kind)).or_insert(0.0) += r.net_value;
    }
    buckets
        .into_iter()
        .map(|((days_until_receipt, kind), net_value)| ChartBar {
            days_until_receipt,
            kind,
            net_value,
        })
        .collect()
}

/// Horizontal text bar chart, one line per bar, scaled to `width` glyphs.
pub fn render_text_chart(bars: &[ChartBar], width: usize) -> String {
    let mut out = String::new();
    let max = bars.iter().map(|b| b.net_value).fold(0.0_f64, f64::max);

    for bar in bars {
        let len = if max > 0.0 && bar.net_value > 0.0 {
            ((bar.net_value / max) * width as f64).round().max(1.0) as usize
        } else {
            0
        };
        let glyph = match bar.kind {
            ReceiptKind::Flow => BAR_GLYPH_FLOW,
            ReceiptKind::Advanced => BAR_GLYPH_ADVANCED,
        };
        let _ = writeln!(
            out,
            "{:>4}d {:<8} |{:<width$}| {}",
            bar.days_until_receipt,
            bar.kind.label(),
            glyph.to_string().repeat(len),
            format_currency(bar.net_value),
            width = width
        );
    }
    let _ = writeln!(
        out,
        "legend: {} Flow  {} Advanced",
        BAR_GLYPH_FLOW, BAR_GLYPH_ADVANCED
    );
    out
}
