use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReceivablesError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for ReceivablesError {
    fn from(e: serde_json::Error) -> Self {
        ReceivablesError::SerializationError(e.to_string())
    }
}

impl From<chrono::ParseError> for ReceivablesError {
    fn from(e: chrono::ParseError) -> Self {
        ReceivablesError::DateError(e.to_string())
    }
}
