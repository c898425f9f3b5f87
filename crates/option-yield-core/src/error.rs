use thiserror::Error;

#[derive(Debug, Error)]
pub enum OptionYieldError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl OptionYieldError {
    pub(crate) fn invalid(field: &str, reason: &str) -> Self {
        OptionYieldError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Arithmetic on `field` would leave Decimal's range.
    pub(crate) fn out_of_range(field: &str) -> Self {
        Self::invalid(field, "magnitude is outside the representable decimal range")
    }
}

impl From<serde_json::Error> for OptionYieldError {
    fn from(e: serde_json::Error) -> Self {
        OptionYieldError::SerializationError(e.to_string())
    }
}
