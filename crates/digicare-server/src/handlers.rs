use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;

use digicare_card::bundle::BundleAudience;
use digicare_card::verifier::ScanRequest;

use crate::auth::CurrentOwner;
use crate::error::{ApiError, scan_denied_response};
use crate::server::AppState;

#[derive(Deserialize)]
pub struct ScanQuery {
    pub pin: Option<String>,
}

#[derive(Deserialize)]
pub struct SetPinRequest {
    pub pin: String,
    pub current_pin: Option<String>,
}

#[derive(Deserialize)]
pub struct RemovePinRequest {
    pub pin: String,
}

#[derive(Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

pub async fn root() -> impl IntoResponse {
    let body = json!({
        "service": "DigiCare Server",
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    });
    (StatusCode::OK, Json(body))
}

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}

/// Public QR scan endpoint. The only unauthenticated route that touches
/// card data.
pub async fn scan_card(
    State(state): State<AppState>,
    Path(access_token): Path<String>,
    Query(query): Query<ScanQuery>,
    headers: HeaderMap,
) -> Response {
    let request = ScanRequest {
        access_token,
        pin: query.pin,
        source_ip: client_ip(&headers),
        user_agent: user_agent(&headers),
    };

    match state.verifier.verify(&request).await {
        Ok(success) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": success.bundle,
                "scanned_at": success.scanned_at,
            })),
        )
            .into_response(),
        Err(denied) => scan_denied_response(denied),
    }
}

/// Card summary for the authenticated owner.
pub async fn my_card(
    State(state): State<AppState>,
    CurrentOwner(owner_id): CurrentOwner,
) -> Result<Response, ApiError> {
    let card = state.service.my_card(owner_id).await?;
    let now = state.service.clock().now();
    let body = json!({
        "success": true,
        "card": {
            "card_number": card.card_number,
            "card_type": card.card_type.display(),
            "status": card.status.display(),
            "has_pin": card.has_pin(),
            "issued_at": card.issued_at,
            "expires_at": card.expires_at,
            "days_until_expiry": card.days_until_expiry(now),
            "scan_count": card.scan_count,
            "last_scanned_at": card.last_scanned_at,
        },
    });
    Ok((StatusCode::OK, Json(body)).into_response())
}

/// Rotates the access token and returns the new QR payload. The old QR code
/// stops working the moment this returns.
pub async fn regenerate_qr(
    State(state): State<AppState>,
    CurrentOwner(owner_id): CurrentOwner,
) -> Result<Response, ApiError> {
    let (card, payload) = state.service.rotate_token(owner_id).await?;
    let body = json!({
        "success": true,
        "card_number": card.card_number,
        "access_token": card.access_token,
        "qr_payload": payload,
    });
    Ok((StatusCode::OK, Json(body)).into_response())
}

pub async fn set_pin(
    State(state): State<AppState>,
    CurrentOwner(owner_id): CurrentOwner,
    Json(request): Json<SetPinRequest>,
) -> Result<Response, ApiError> {
    state
        .service
        .set_pin(owner_id, &request.pin, request.current_pin.as_deref())
        .await?;
    Ok((
        StatusCode::OK,
        Json(json!({ "success": true, "message": "PIN updated" })),
    )
        .into_response())
}

pub async fn remove_pin(
    State(state): State<AppState>,
    CurrentOwner(owner_id): CurrentOwner,
    Json(request): Json<RemovePinRequest>,
) -> Result<Response, ApiError> {
    state.service.remove_pin(owner_id, &request.pin).await?;
    Ok((
        StatusCode::OK,
        Json(json!({ "success": true, "message": "PIN removed" })),
    )
        .into_response())
}

/// Recent scan attempts against the owner's card, successes and failures
/// alike, plus the all-time total.
pub async fn scan_history(
    State(state): State<AppState>,
    CurrentOwner(owner_id): CurrentOwner,
    Query(query): Query<HistoryQuery>,
) -> Result<Response, ApiError> {
    let limit = query.limit.unwrap_or(10);
    let history = state.service.scan_history(owner_id, limit).await?;
    let body = json!({
        "success": true,
        "card_number": history.card_number,
        "total_scans": history.total_scans,
        "entries": history.entries,
    });
    Ok((StatusCode::OK, Json(body)).into_response())
}

/// Full unredacted record bundle for the owner's own card.
pub async fn download_records(
    State(state): State<AppState>,
    CurrentOwner(owner_id): CurrentOwner,
) -> Result<Response, ApiError> {
    let card = state.service.my_card(owner_id).await?;
    let bundle = state
        .assembler
        .assemble(&card, BundleAudience::Owner)
        .await?;
    Ok((
        StatusCode::OK,
        Json(json!({ "success": true, "data": bundle })),
    )
        .into_response())
}

/// Client address as seen by the rate limiter. The deployment's edge proxy
/// sets X-Forwarded-For; the leftmost entry is the original client.
fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

fn user_agent(headers: &HeaderMap) -> String {
    headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_ip_takes_leftmost_forwarded_entry() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            "203.0.113.9, 10.0.0.1".parse().unwrap(),
        );
        assert_eq!(client_ip(&headers), "203.0.113.9");
    }

    #[test]
    fn test_client_ip_falls_back_when_absent() {
        assert_eq!(client_ip(&HeaderMap::new()), "unknown");
    }
}
