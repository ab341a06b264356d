//! Card service and scan verification error types.
//!
//! Two families live here. [`CardError`] covers owner-side operations and
//! internal failures; messages may be specific because the caller has already
//! authenticated through a separate channel. [`ScanDenied`] is the closed set
//! of public scan denials; the HTTP layer maps each variant to a fixed,
//! generic response body so that no denial is distinguishable beyond its
//! status code.

use std::fmt;

/// Errors from owner-side card operations and lower layers.
#[derive(Debug, thiserror::Error)]
pub enum CardError {
    /// PIN is not 6-8 ASCII digits (bounds are configurable).
    #[error("Invalid PIN format: {message}")]
    InvalidPinFormat {
        /// Description of the format violation.
        message: String,
    },

    /// PIN matched the weak-pattern denylist.
    #[error("Weak PIN: {message}")]
    WeakPin {
        /// Description of the rejected pattern.
        message: String,
    },

    /// The current PIN must verify before it can be changed or removed.
    #[error("Current PIN verification failed")]
    PinVerificationFailed,

    /// No card exists for the requested identity.
    #[error("Card not found")]
    CardNotFound,

    /// Credential hashing or verification failed.
    #[error("Credential hashing error: {message}")]
    Hashing {
        /// Description of the hashing failure.
        message: String,
    },

    /// An error occurred while storing or retrieving card data.
    #[error("Storage error: {message}")]
    Storage {
        /// Description of the storage error.
        message: String,
    },

    /// A unique field (card number or access token) collided with an
    /// existing card. Callers regenerate and retry.
    #[error("Duplicate card field")]
    DuplicateCard,

    /// Token generation kept colliding with existing tokens.
    #[error("Token generation exhausted retries")]
    TokenGenerationExhausted,

    /// An unexpected internal error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl CardError {
    /// Creates a new `InvalidPinFormat` error.
    #[must_use]
    pub fn invalid_pin_format(message: impl Into<String>) -> Self {
        Self::InvalidPinFormat {
            message: message.into(),
        }
    }

    /// Creates a new `WeakPin` error.
    #[must_use]
    pub fn weak_pin(message: impl Into<String>) -> Self {
        Self::WeakPin {
            message: message.into(),
        }
    }

    /// Creates a new `Hashing` error.
    #[must_use]
    pub fn hashing(message: impl Into<String>) -> Self {
        Self::Hashing {
            message: message.into(),
        }
    }

    /// Creates a new `Storage` error.
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

pub type CardResult<T> = std::result::Result<T, CardError>;

/// Terminal denial of a public scan request.
///
/// Variants deliberately carry no detail beyond what their status code
/// already reveals. Lockout and rate limiting are the two mechanisms allowed
/// to name themselves; neither correlates with card identity secrets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanDenied {
    /// Source IP exhausted its request budget (429).
    RateLimited,
    /// Token did not resolve to a card (404).
    UnknownToken,
    /// Card is not Active, or is expired. One variant for both so the
    /// response cannot reveal which rule fired (403).
    CardNotScannable,
    /// Token is under an active PIN lockout; even the correct PIN is
    /// rejected (423).
    Locked,
    /// Card has a PIN and none was supplied; discovery response (401).
    PinRequired,
    /// Supplied PIN did not verify (401).
    InvalidPin,
    /// A lower layer failed; detail goes to operational logging only (500).
    Internal,
}

impl fmt::Display for ScanDenied {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Generic public wording; the specific reason is only ever logged.
        let message = match self {
            Self::RateLimited => "Too many requests",
            Self::UnknownToken => "Unable to access health card",
            Self::CardNotScannable => "Unable to access health card",
            Self::Locked => "Card is temporarily locked",
            Self::PinRequired => "PIN required",
            Self::InvalidPin => "Unable to access health card",
            Self::Internal => "Unable to access health card",
        };
        write!(f, "{message}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_correlated_denials_share_wording() {
        // Unknown token, bad state and wrong PIN must be textually identical.
        assert_eq!(
            ScanDenied::UnknownToken.to_string(),
            ScanDenied::CardNotScannable.to_string()
        );
        assert_eq!(
            ScanDenied::UnknownToken.to_string(),
            ScanDenied::InvalidPin.to_string()
        );
    }

    #[test]
    fn test_mechanism_denials_may_name_themselves() {
        assert_eq!(ScanDenied::RateLimited.to_string(), "Too many requests");
        assert_eq!(ScanDenied::Locked.to_string(), "Card is temporarily locked");
    }
}
