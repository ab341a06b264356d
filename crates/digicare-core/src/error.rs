use thiserror::Error;

/// Core error types for DigiCare operations
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid DateTime: {0}")]
    InvalidDateTime(String),

    #[error("Invalid card number: {0}")]
    InvalidCardNumber(String),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Time parsing error: {0}")]
    TimeError(#[from] time::error::Parse),

    #[error("UUID error: {0}")]
    UuidError(#[from] uuid::Error),
}

impl CoreError {
    /// Create a new InvalidDateTime error
    pub fn invalid_date_time(datetime: impl Into<String>) -> Self {
        Self::InvalidDateTime(datetime.into())
    }

    /// Create a new InvalidCardNumber error
    pub fn invalid_card_number(number: impl Into<String>) -> Self {
        Self::InvalidCardNumber(number.into())
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
