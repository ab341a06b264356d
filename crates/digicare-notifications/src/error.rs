use thiserror::Error;

/// Errors raised by notification adapters.
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Dispatch failed: {message}")]
    Dispatch { message: String },

    #[error("Adapter unavailable: {message}")]
    Unavailable { message: String },
}

impl NotificationError {
    pub fn dispatch(message: impl Into<String>) -> Self {
        Self::Dispatch {
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}
