use serde::{Deserialize, Serialize};

/// Monetary amounts. Simulation arithmetic is IEEE-754 double precision;
/// rounding to cents happens only in the `report` module.
pub type Money = f64;

/// Rates expressed as decimals (0.02 = 2% per month). Never as percentages.
pub type Rate = f64;

/// Percentages as entered by a user (2.0 = 2%). Converted with [`pct_to_rate`].
pub type Percent = f64;

/// Signed day count. Negative when the event date is already in the past.
pub type Days = i64;

/// Length of the model month in days. No calendar arithmetic is performed.
pub const DAYS_PER_MONTH: i64 = 30;

/// Convert a user-facing percentage into a decimal rate.
pub fn pct_to_rate(pct: Percent) -> Rate {
    pct / 100.0
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "ieee754_f64".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pct_to_rate() {
        assert_eq!(pct_to_rate(2.0), 0.02);
        assert_eq!(pct_to_rate(0.0), 0.0);
    }

    #[test]
    fn test_with_metadata_envelope() {
        let out = with_metadata(
            "test",
            &serde_json::json!({"k": 1}),
            vec!["w".into()],
            42,
            1.5_f64,
        );
        assert_eq!(out.result, 1.5);
        assert_eq!(out.methodology, "test");
        assert_eq!(out.assumptions["k"], 1);
        assert_eq!(out.warnings, vec!["w".to_string()]);
        assert_eq!(out.metadata.computation_time_us, 42);
        assert_eq!(out.metadata.precision, "ieee754_f64");
    }
}
