//! HTTP error mapping.
//!
//! Owner routes run behind an authenticated session, so their errors may be
//! specific. Public scan denials go through [`scan_denied_response`], which
//! maps each [`ScanDenied`] variant to its status code and the fixed generic
//! wording from its `Display` impl.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use digicare_card::error::{CardError, ScanDenied};

/// Error envelope for the owner-side routes.
#[derive(Debug)]
pub enum ApiError {
    /// Missing, malformed or unresolvable bearer session.
    Unauthenticated,
    Card(CardError),
}

impl From<CardError> for ApiError {
    fn from(err: CardError) -> Self {
        Self::Card(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Unauthenticated => {
                (StatusCode::UNAUTHORIZED, "Authentication required".to_string())
            }
            Self::Card(err @ (CardError::InvalidPinFormat { .. } | CardError::WeakPin { .. })) => {
                (StatusCode::BAD_REQUEST, err.to_string())
            }
            Self::Card(CardError::PinVerificationFailed) => (
                StatusCode::UNAUTHORIZED,
                CardError::PinVerificationFailed.to_string(),
            ),
            Self::Card(CardError::CardNotFound) => {
                (StatusCode::NOT_FOUND, "No health card found".to_string())
            }
            Self::Card(err) => {
                tracing::error!(error = %err, "owner route internal failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        (status, Json(json!({ "success": false, "error": message }))).into_response()
    }
}

/// Maps a scan denial to its response. Bodies stay generic; only the status
/// code and, for the PIN discovery case, `requires_pin` vary.
pub fn scan_denied_response(denied: ScanDenied) -> Response {
    let status = match denied {
        ScanDenied::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        ScanDenied::UnknownToken => StatusCode::NOT_FOUND,
        ScanDenied::CardNotScannable => StatusCode::FORBIDDEN,
        ScanDenied::Locked => StatusCode::LOCKED,
        ScanDenied::PinRequired | ScanDenied::InvalidPin => StatusCode::UNAUTHORIZED,
        ScanDenied::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let mut body = json!({ "success": false, "error": denied.to_string() });
    if denied == ScanDenied::PinRequired {
        body["requires_pin"] = json!(true);
    }
    (status, Json(body)).into_response()
}
