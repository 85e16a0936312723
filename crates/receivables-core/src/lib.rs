pub mod error;
pub mod types;

#[cfg(feature = "receivables")]
pub mod receivables;

#[cfg(feature = "report")]
pub mod report;

pub use error::ReceivablesError;
pub use types::*;

/// Standard result type for all receivables operations
pub type ReceivablesResult<T> = Result<T, ReceivablesError>;
