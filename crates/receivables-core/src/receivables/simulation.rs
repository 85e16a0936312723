//! Receivable flow simulation.
//!
//! Each installment of each plan either arrives on its scheduled date
//! (`Flow`) or, when it falls after the event, is factored today and the
//! proceeds are reinvested until the event (`Advanced`). All months are 30
//! days and exponents are real-valued.

use serde::{Deserialize, Serialize};

use crate::error::ReceivablesError;
use crate::receivables::distribution::InstallmentPlanDistribution;
use crate::types::{Days, Money, Rate, DAYS_PER_MONTH};
use crate::ReceivablesResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Scalar inputs for one simulation run. Rates are monthly decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationParameters {
    /// Gross ticket sales to be received in installments.
    pub total_sales: Money,
    /// Days from today until the event. Negative if the event has passed.
    pub days_until_event: Days,
    /// Monthly discount charged to advance a receivable.
    pub advance_rate: Rate,
    /// Monthly discount applied to installments received on schedule.
    #[serde(default)]
    pub flow_rate: Rate,
    /// Monthly yield earned on advanced proceeds until the event.
    pub reinvestment_rate: Rate,
}

impl SimulationParameters {
    /// Range checks for collaborators. [`simulate`] itself never calls this.
    pub fn validate(&self) -> ReceivablesResult<()> {
        if !self.total_sales.is_finite() || self.total_sales < 0.0 {
            return Err(ReceivablesError::InvalidInput {
                field: "total_sales".into(),
                reason: "Total sales must be a non-negative amount".into(),
            });
        }
        check_discount_rate(self.advance_rate, "advance_rate")?;
        check_discount_rate(self.flow_rate, "flow_rate")?;
        if !self.reinvestment_rate.is_finite() || self.reinvestment_rate < 0.0 {
            return Err(ReceivablesError::InvalidInput {
                field: "reinvestment_rate".into(),
                reason: "Reinvestment yield must be non-negative".into(),
            });
        }
        Ok(())
    }

    /// Event horizon in (fractional) months.
    pub fn months_until_event(&self) -> f64 {
        self.days_until_event as f64 / DAYS_PER_MONTH as f64
    }
}

fn check_discount_rate(rate: Rate, field: &str) -> ReceivablesResult<()> {
    if !rate.is_finite() || !(0.0..1.0).contains(&rate) {
        return Err(ReceivablesError::InvalidInput {
            field: field.into(),
            reason: "Monthly discount rate must be in [0%, 100%)".into(),
        });
    }
    Ok(())
}

/// How an installment is received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ReceiptKind {
    /// Paid on its scheduled date, on or before the event.
    Flow,
    /// Due after the event: factored now and reinvested until the event.
    Advanced,
}

impl ReceiptKind {
    pub fn label(&self) -> &'static str {
        match self {
            ReceiptKind::Flow => "Flow",
            ReceiptKind::Advanced => "Advanced",
        }
    }
}

impl std::fmt::Display for ReceiptKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One installment of one plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallmentRecord {
    pub installments: u32,
    pub kind: ReceiptKind,
    pub days_until_receipt: Days,
    pub gross_value: Money,
    pub net_value: Money,
}

/// Full ledger plus aggregates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub records: Vec<InstallmentRecord>,
    pub total_gross: Money,
    pub total_net: Money,
    pub fee_loss: Money,
}

impl SimulationResult {
    pub fn count_by_kind(&self, kind: ReceiptKind) -> usize {
        self.records.iter().filter(|r| r.kind == kind).count()
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Simulate every installment of every plan and aggregate the ledger.
///
/// `distribution` is normalized here; callers may pass raw weights. An empty
/// or all-zero distribution yields no records and zero totals; otherwise every
/// plan is expanded, zero-weight plans as zero-value rows. Inputs are not
/// range-checked (see [`SimulationParameters::validate`]).
pub fn simulate(
    params: &SimulationParameters,
    distribution: &InstallmentPlanDistribution,
) -> SimulationResult {
    let normalized = distribution.normalize();
    let total_weight = normalized.total_weight();
    if total_weight <= 0.0 || total_weight.is_nan() {
        return aggregate(Vec::new());
    }

    let mut records = Vec::new();
    for plan in normalized.iter() {
        let installment_gross = params.total_sales * plan.weight / plan.installments as f64;

        for index in 1..=plan.installments {
            let days_until_receipt = index as Days * DAYS_PER_MONTH;
            records.push(value_installment(
                params,
                plan.installments,
                days_until_receipt,
                installment_gross,
            ));
        }
    }

    aggregate(records)
}

/// Classify and value a single installment.
pub fn value_installment(
    params: &SimulationParameters,
    installments: u32,
    days_until_receipt: Days,
    gross_value: Money,
) -> InstallmentRecord {
    let kind = classify(days_until_receipt, params.days_until_event);
    let months_to_receipt = days_until_receipt as f64 / DAYS_PER_MONTH as f64;

    let net_value = match kind {
        ReceiptKind::Flow => gross_value * (1.0 - params.flow_rate).powf(months_to_receipt),
        ReceiptKind::Advanced => {
            let advanced = gross_value * (1.0 - params.advance_rate).powf(months_to_receipt);
            advanced * (1.0 + params.reinvestment_rate).powf(params.months_until_event())
        }
    };

    InstallmentRecord {
        installments,
        kind,
        days_until_receipt,
        gross_value,
        net_value,
    }
}

/// An installment due on the event day itself is still `Flow`.
pub fn classify(days_until_receipt: Days, days_until_event: Days) -> ReceiptKind {
    if days_until_receipt <= days_until_event {
        ReceiptKind::Flow
    } else {
        ReceiptKind::Advanced
    }
}

/// Sum the ledger. `fee_loss` is always exactly `total_gross - total_net`.
pub fn aggregate(records: Vec<InstallmentRecord>) -> SimulationResult {
    let total_gross: Money = records.iter().map(|r| r.gross_value).sum();
    let total_net: Money = records.iter().map(|r| r.net_value).sum();

    SimulationResult {
        records,
        total_gross,
        total_net,
        fee_loss: total_gross - total_net,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
