//! Installment-plan distributions: how gross ticket sales split across
//! "pay in N installments" plans.
//!
//! Raw input arrives either as fixed slider buckets or as freeform
//! `count;percentage` lines. Parsing collects per-line diagnostics and never
//! aborts; normalization is a separate pure step.

use serde::Serialize;
use thiserror::Error;

use crate::error::ReceivablesError;
use crate::types::{pct_to_rate, Percent};
use crate::ReceivablesResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Installment plans offered by the fixed-bucket input form.
pub const FIXED_INSTALLMENT_BUCKETS: [u32; 5] = [1, 2, 3, 6, 12];

/// Starting percentage for each fixed bucket.
pub const DEFAULT_BUCKET_PCT: Percent = 20.0;

/// Starting text for the freeform input form.
pub const DEFAULT_PLAN_TEXT: &str = "1;10\n2;10\n3;30\n6;25\n12;25";

/// Field separator in a freeform plan line.
pub const PLAN_SEPARATOR: char = ';';

/// Longest accepted plan: 30 years of monthly installments.
pub const MAX_INSTALLMENTS: u32 = 360;

// ---------------------------------------------------------------------------
// Distribution
// ---------------------------------------------------------------------------

/// One installment plan and its share of sales.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlanWeight {
    /// Number of monthly installments (always > 0).
    pub installments: u32,
    /// Raw or normalized weight, as a fraction.
    pub weight: f64,
}

/// Ordered mapping from installment count to weight.
///
/// Iteration follows insertion order. Inserting a count that is already
/// present replaces its weight but keeps its original position.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct InstallmentPlanDistribution {
    entries: Vec<PlanWeight>,
}

impl InstallmentPlanDistribution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from fixed buckets given as `(installments, percentage)`.
    pub fn from_buckets(buckets: &[(u32, Percent)]) -> ReceivablesResult<Self> {
        let mut dist = Self::new();
        for &(installments, pct) in buckets {
            if installments == 0 || installments > MAX_INSTALLMENTS {
                return Err(ReceivablesError::InvalidInput {
                    field: "installments".into(),
                    reason: format!(
                        "Installment count must be between 1 and {MAX_INSTALLMENTS}, got {installments}"
                    ),
                });
            }
            if !pct.is_finite() || pct < 0.0 {
                return Err(ReceivablesError::InvalidInput {
                    field: "pct".into(),
                    reason: format!("Plan percentage must be a non-negative number, got {pct}"),
                });
            }
            dist.insert(installments, pct_to_rate(pct));
        }
        Ok(dist)
    }

    /// The fixed buckets with [`DEFAULT_BUCKET_PCT`] each.
    pub fn default_buckets() -> Self {
        let mut dist = Self::new();
        for installments in FIXED_INSTALLMENT_BUCKETS {
            dist.insert(installments, pct_to_rate(DEFAULT_BUCKET_PCT));
        }
        dist
    }

    pub fn insert(&mut self, installments: u32, weight: f64) {
        match self
            .entries
            .iter_mut()
            .find(|e| e.installments == installments)
        {
            Some(existing) => existing.weight = weight,
            None => self.entries.push(PlanWeight {
                installments,
                weight,
            }),
        }
    }

    pub fn weight(&self, installments: u32) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| e.installments == installments)
            .map(|e| e.weight)
    }

    pub fn entries(&self) -> &[PlanWeight] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlanWeight> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_weight(&self) -> f64 {
        self.entries.iter().map(|e| e.weight).sum()
    }

    /// Scale weights so they sum to 1.0.
    ///
    /// A mapping whose total is not positive is returned unchanged; it yields
    /// no value downstream because every share is zero.
    pub fn normalize(&self) -> Self {
        let total = self.total_weight();
        if total <= 0.0 || total.is_nan() {
            return self.clone();
        }
        Self {
            entries: self
                .entries
                .iter()
                .map(|e| PlanWeight {
                    installments: e.installments,
                    weight: e.weight / total,
                })
                .collect(),
        }
    }
}

impl FromIterator<(u32, f64)> for InstallmentPlanDistribution {
    fn from_iter<I: IntoIterator<Item = (u32, f64)>>(iter: I) -> Self {
        let mut dist = Self::new();
        for (installments, weight) in iter {
            dist.insert(installments, weight);
        }
        dist
    }
}

// ---------------------------------------------------------------------------
// Freeform parsing
// ---------------------------------------------------------------------------

/// Why a freeform plan line was rejected.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", content = "detail")]
pub enum LineErrorReason {
    #[error("expected 'count;percentage', found {0} field(s)")]
    FieldCount(usize),
    #[error("installment count '{0}' is not an integer")]
    InvalidCount(String),
    #[error("installment count must be positive, got {0}")]
    NonPositiveCount(i64),
    #[error("installment count must be at most {}, got {}", MAX_INSTALLMENTS, .0)]
    TooManyInstallments(i64),
    #[error("percentage '{0}' is not a number")]
    InvalidPercentage(String),
    #[error("percentage must not be negative, got {0}")]
    NegativePercentage(f64),
}

/// A rejected freeform line. Recoverable: parsing continues with the next line.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[error("line {line_number}: could not interpret '{line}': {reason}")]
pub struct LineError {
    /// 1-based line number in the original text.
    pub line_number: usize,
    pub line: String,
    pub reason: LineErrorReason,
}

/// Accepted entries plus the diagnostics for every rejected line.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParsedPlan {
    pub distribution: InstallmentPlanDistribution,
    pub errors: Vec<LineError>,
}

impl ParsedPlan {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Parse freeform `count;percentage` lines.
///
/// Blank lines are ignored. Percentages are stored as fractions (`pct / 100`).
/// A repeated count keeps its first position and takes the last value.
pub fn parse_plan_text(text: &str) -> ParsedPlan {
    let mut parsed = ParsedPlan::default();

    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        match parse_plan_line(line) {
            Ok((installments, pct)) => parsed
                .distribution
                .insert(installments, pct_to_rate(pct)),
            Err(reason) => parsed.errors.push(LineError {
                line_number: idx + 1,
                line: line.to_string(),
                reason,
            }),
        }
    }

    parsed
}

fn parse_plan_line(line: &str) -> Result<(u32, Percent), LineErrorReason> {
    let fields: Vec<&str> = line.split(PLAN_SEPARATOR).map(str::trim).collect();
    if fields.len() != 2 {
        return Err(LineErrorReason::FieldCount(fields.len()));
    }
    let (count_str, pct_str) = (fields[0], fields[1]);

    let count: i64 = count_str
        .parse()
        .map_err(|_| LineErrorReason::InvalidCount(count_str.to_string()))?;
    if count <= 0 {
        return Err(LineErrorReason::NonPositiveCount(count));
    }
    if count > i64::from(MAX_INSTALLMENTS) {
        return Err(LineErrorReason::TooManyInstallments(count));
    }
    let installments =
        u32::try_from(count).map_err(|_| LineErrorReason::InvalidCount(count_str.to_string()))?;

    let pct: f64 = pct_str
        .parse()
        .map_err(|_| LineErrorReason::InvalidPercentage(pct_str.to_string()))?;
    if !pct.is_finite() {
        return Err(LineErrorReason::InvalidPercentage(pct_str.to_string()));
    }
    if pct < 0.0 {
        return Err(LineErrorReason::NegativePercentage(pct));
    }

    Ok((installments, pct))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_default_plan_text() {
        let parsed = parse_plan_text(DEFAULT_PLAN_TEXT);
        assert!(parsed.is_clean());
        let counts: Vec<u32> = parsed.distribution.iter().map(|e| e.installments).collect();
        assert_eq!(counts, vec![1, 2, 3, 6, 12]);
        assert_eq!(parsed.distribution.weight(3), Some(0.30));
        assert!((parsed.distribution.total_weight() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_parse_tolerates_whitespace() {
        let parsed = parse_plan_text("  3 ; 40 \n\n 6;60\n");
        assert!(parsed.is_clean());
        assert_eq!(parsed.distribution.weight(3), Some(0.40));
        assert_eq!(parsed.distribution.weight(6), Some(0.60));
    }

    #[test]
    fn test_malformed_lines_reported_and_skipped() {
        let parsed = parse_plan_text("1;50\nabc\n2;x\n0;10\n-3;10\n4;-5\n5;10;1\n6;50");
        assert_eq!(parsed.distribution.len(), 2);
        assert_eq!(parsed.distribution.weight(1), Some(0.5));
        assert_eq!(parsed.distribution.weight(6), Some(0.5));

        let reasons: Vec<LineErrorReason> = parsed.errors.iter().map(|e| e.reason.clone()).collect();
        assert_eq!(
            reasons,
            vec![
                LineErrorReason::FieldCount(1),
                LineErrorReason::InvalidPercentage("x".into()),
                LineErrorReason::NonPositiveCount(0),
                LineErrorReason::NonPositiveCount(-3),
                LineErrorReason::NegativePercentage(-5.0),
                LineErrorReason::FieldCount(3),
            ]
        );
        let numbers: Vec<usize> = parsed.errors.iter().map(|e| e.line_number).collect();
        assert_eq!(numbers, vec![2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_fractional_count_rejected() {
        let parsed = parse_plan_text("2.5;10");
        assert!(parsed.distribution.is_empty());
        assert_eq!(
            parsed.errors[0].reason,
            LineErrorReason::InvalidCount("2.5".into())
        );
    }

    #[test]
    fn test_oversized_count_rejected() {
        let parsed = parse_plan_text("360;50\n361;25\n1000000000;25");
        assert_eq!(parsed.distribution.len(), 1);
        assert_eq!(parsed.distribution.weight(360), Some(0.5));
        let reasons: Vec<LineErrorReason> = parsed.errors.iter().map(|e| e.reason.clone()).collect();
        assert_eq!(
            reasons,
            vec![
                LineErrorReason::TooManyInstallments(361),
                LineErrorReason::TooManyInstallments(1_000_000_000),
            ]
        );
    }

    #[test]
    fn test_non_finite_percentage_rejected() {
        let parsed = parse_plan_text("2;inf\n3;NaN");
        assert!(parsed.distribution.is_empty());
        assert_eq!(parsed.errors.len(), 2);
    }

    #[test]
    fn test_line_error_display() {
        let parsed = parse_plan_text("1;10\nbad");
        assert_eq!(
            parsed.errors[0].to_string(),
            "line 2: could not interpret 'bad': expected 'count;percentage', found 1 field(s)"
        );
    }

    #[test]
    fn test_duplicate_count_last_value_wins_first_position_kept() {
        let parsed = parse_plan_text("3;10\n6;20\n3;70");
        assert_eq!(
            parsed.distribution.entries(),
            &[
                PlanWeight { installments: 3, weight: 0.70 },
                PlanWeight { installments: 6, weight: 0.20 },
            ]
        );
    }

    #[test]
    fn test_normalize_sums_to_one() {
        let dist: InstallmentPlanDistribution =
            [(1, 0.1), (2, 0.1), (3, 0.3), (6, 0.25), (12, 0.3)].into_iter().collect();
        let norm = dist.normalize();
        assert!((norm.total_weight() - 1.0).abs() < 1e-9);
        assert!((norm.weight(12).unwrap() - 0.3 / 1.05).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_keeps_order() {
        let dist: InstallmentPlanDistribution = [(12, 1.0), (1, 3.0)].into_iter().collect();
        let norm = dist.normalize();
        assert_eq!(
            norm.entries(),
            &[
                PlanWeight { installments: 12, weight: 0.25 },
                PlanWeight { installments: 1, weight: 0.75 },
            ]
        );
    }

    #[test]
    fn test_normalize_zero_sum_unchanged() {
        let dist: InstallmentPlanDistribution = [(1, 0.0), (2, 0.0)].into_iter().collect();
        assert_eq!(dist.normalize(), dist);
        let empty = InstallmentPlanDistribution::new();
        assert_eq!(empty.normalize(), empty);
    }

    #[test]
    fn test_default_buckets() {
        let dist = InstallmentPlanDistribution::default_buckets();
        assert_eq!(dist.len(), FIXED_INSTALLMENT_BUCKETS.len());
        assert!(dist.iter().all(|e| e.weight == 0.2));
    }

    #[test]
    fn test_from_buckets_rejects_zero_count() {
        let err = InstallmentPlanDistribution::from_buckets(&[(1, 50.0), (0, 50.0)]).unwrap_err();
        assert!(matches!(err, ReceivablesError::InvalidInput { ref field, .. } if field == "installments"));

        let err = InstallmentPlanDistribution::from_buckets(&[(361, 100.0)]).unwrap_err();
        assert!(matches!(err, ReceivablesError::InvalidInput { ref field, .. } if field == "installments"));
    }

    #[test]
    fn test_from_buckets_rejects_negative_or_non_finite_pct() {
        for pct in [-50.0, f64::NAN, f64::INFINITY] {
            let err = InstallmentPlanDistribution::from_buckets(&[(1, 100.0), (2, pct)]).unwrap_err();
            assert!(
                matches!(err, ReceivablesError::InvalidInput { ref field, .. } if field == "pct"),
                "pct {pct} should be rejected"
            );
        }
        assert!(InstallmentPlanDistribution::from_buckets(&[(1, 100.0), (2, 0.0)]).is_ok());
    }
}
