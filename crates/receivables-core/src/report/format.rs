use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::receivables::simulation::{ReceiptKind, SimulationResult};
use crate::types::{Days, Money};

/// Currency prefix used on every formatted amount.
pub const CURRENCY_SYMBOL: &str = "R$";

/// Decimal places shown for money.
pub const MONEY_DP: u32 = 2;

/// Round a simulated amount to cents, always carrying two decimal places.
/// Non-finite values map to zero.
pub fn round_money(amount: Money) -> Decimal {
    let mut rounded = Decimal::from_f64(amount)
        .unwrap_or(Decimal::ZERO)
        .round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(MONEY_DP);
    rounded
}

/// `R$ 1,234.56`; negatives as `R$ -1,234.56`.
pub fn format_currency(amount: Money) -> String {
    let rounded = round_money(amount);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let digits = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));
    format!(
        "{} {}{}.{}",
        CURRENCY_SYMBOL,
        sign,
        group_thousands(int_part),
        frac_part
    )
}

fn group_thousands(int_part: &str) -> String {
    let len = int_part.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// One ledger line rounded for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub installments: u32,
    pub kind: ReceiptKind,
    pub days_until_receipt: Days,
    pub gross_value: Decimal,
    pub net_value: Decimal,
}

/// Display view of a [`SimulationResult`].
///
/// Totals are rounded from the unrounded sums, so they may differ by a cent
/// from the sum of the rounded rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub records: Vec<ReportRow>,
    pub total_gross: Decimal,
    pub total_net: Decimal,
    pub fee_loss: Decimal,
}

impl SimulationReport {
    pub fn from_result(result: &SimulationResult) -> Self {
        SimulationReport {
            records: result
                .records
                .iter()
                .map(|r| ReportRow {
                    installments: r.installments,
                    kind: r.kind,
                    days_until_receipt: r.days_until_receipt,
                    gross_value: round_money(r.gross_value),
                    net_value: round_money(r.net_value),
                })
                .collect(),
            total_gross: round_money(result.total_gross),
            total_net: round_money(result.total_net),
            fee_loss: round_money(result.fee_loss),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::receivables::simulation::{aggregate, InstallmentRecord};
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_money() {
        assert_eq!(round_money(970.004), dec!(970.00));
        assert_eq!(round_money(f64::NAN), Decimal::ZERO);
        assert_eq!(round_money(1000.0).to_string(), "1000.00");
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(100_000.0), "R$ 100,000.00");
        assert_eq!(format_currency(1_234_567.891), "R$ 1,234,567.89");
        assert_eq!(format_currency(999.999), "R$ 1,000.00");
        assert_eq!(format_currency(12.5), "R$ 12.50");
        assert_eq!(format_currency(0.0), "R$ 0.00");
        assert_eq!(format_currency(-0.001), "R$ 0.00");
        assert_eq!(format_currency(-2500.0), "R$ -2,500.00");
    }

    #[test]
    fn test_report_rounds_only_at_boundary() {
        let result = aggregate(vec![InstallmentRecord {
            installments: 12,
            kind: ReceiptKind::Advanced,
            days_until_receipt: 60,
            gross_value: 1000.0,
            net_value: 970.004,
        }]);
        let report = SimulationReport::from_result(&result);
        assert_eq!(report.records[0].net_value, dec!(970.00));
        assert_eq!(report.total_gross, dec!(1000.00));
        assert_eq!(report.fee_loss, dec!(30.00));
        // The engine value is untouched.
        assert_eq!(result.records[0].net_value, 970.004);
    }
}
