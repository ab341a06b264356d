//! Owner session extraction.
//!
//! Owner routes carry `Authorization: Bearer <session>`; the session token is
//! resolved through the [`SessionStorage`] trait. Session issuance and expiry
//! belong to the identity system behind that trait.

use axum::{extract::FromRequestParts, http::header, http::request::Parts};
use uuid::Uuid;

use crate::error::ApiError;
use crate::server::AppState;
use digicare_card::storage::SessionStorage;

/// The authenticated card owner, resolved from the bearer session.
#[derive(Debug, Clone, Copy)]
pub struct CurrentOwner(pub Uuid);

impl FromRequestParts<AppState> for CurrentOwner {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::Unauthenticated)?;
        let session_token = header_value
            .strip_prefix("Bearer ")
            .ok_or(ApiError::Unauthenticated)?;

        let owner_id = state
            .sessions
            .resolve(session_token)
            .await
            .map_err(ApiError::from)?
            .ok_or(ApiError::Unauthenticated)?;
        Ok(CurrentOwner(owner_id))
    }
}
