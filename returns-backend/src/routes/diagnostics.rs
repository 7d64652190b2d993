//! Operator routes for checking carrier connectivity by hand.
//!
//! Only mounted when `diagnostics.enabled` is set.

use axum::{
    Json,
    body::Bytes,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde_json::{Value, json};

use returns_common::TrackingFilter;

use crate::carrier::{CarrierError, Token, TokenRequestStyle};
use crate::error::ApiError;
use crate::orders::resolver::strategies;
use crate::state::SharedState;

fn readable_expiry(token: &Token) -> String {
    DateTime::<Utc>::from_timestamp(token.expires_at, 0)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "Invalid expiry".to_string())
}

fn status_of(err: &CarrierError) -> Value {
    match err.upstream_status() {
        Some(status) => json!(status),
        None => json!(err.to_string()),
    }
}

pub async fn test_token(State(state): State<SharedState>) -> Result<Response, ApiError> {
    let token = state
        .carrier
        .regenerate_token(TokenRequestStyle::QueryParameter)
        .await
        .map_err(|e| ApiError::upstream("Failed to generate token", &e))?;

    Ok(Json(json!({
        "success": true,
        "message": "Token generated successfully",
        "data": {
            "accessToken": token.access_token,
            "refreshToken": token.refresh_token,
            "expiresAt": token.expires_at,
            "expiresAtReadable": readable_expiry(&token),
            "generatedAt": Utc::now().to_rfc3339(),
        }
    }))
    .into_response())
}

/// Query-parameter style first, body style second.
pub async fn test_token_alt(State(state): State<SharedState>) -> Result<Response, ApiError> {
    let first = TokenRequestStyle::QueryParameter;
    let query_err = match state.carrier.regenerate_token(first).await {
        Ok(token) => return Ok(token_report(first, &token)),
        Err(e) => {
            tracing::warn!("Token request with {} failed: {}", first.as_str(), e);
            e
        }
    };

    let second = TokenRequestStyle::BodyParameter;
    match state.carrier.regenerate_token(second).await {
        Ok(token) => Ok(token_report(second, &token)),
        Err(body_err) => {
            tracing::error!("Token request with {} failed: {}", second.as_str(), body_err);
            Err(ApiError::Upstream {
                message: "Both token request styles failed".to_string(),
                detail: json!({
                    (first.as_str()): status_of(&query_err),
                    (second.as_str()): status_of(&body_err),
                })
                .to_string(),
            })
        }
    }
}

fn token_report(style: TokenRequestStyle, token: &Token) -> Response {
    Json(json!({
        "success": true,
        "approach": style.as_str(),
        "data": {
            "accessToken": token.access_token,
            "expiresAt": token.expires_at,
            "expiresAtReadable": readable_expiry(token),
        }
    }))
    .into_response()
}

pub async fn debug_tracking_query(
    State(state): State<SharedState>,
    Query(filter): Query<TrackingFilter>,
) -> Result<Response, ApiError> {
    debug_tracking(&state, filter).await
}

/// An empty body means no filter.
pub async fn debug_tracking_body(
    State(state): State<SharedState>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let filter = if body.iter().all(u8::is_ascii_whitespace) {
        TrackingFilter::all()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {}", e)))?
    };
    debug_tracking(&state, filter).await
}

async fn debug_tracking(state: &SharedState, filter: TrackingFilter) -> Result<Response, ApiError> {
    let filter = filter.normalized();
    if filter.is_empty() {
        return Ok(Json(probe_all(state).await).into_response());
    }

    tracing::info!("Relaying diagnostic tracking call: {}", filter.label());
    let response = state
        .carrier
        .track_raw(&filter)
        .await
        .map_err(|e| ApiError::upstream("Tracking request failed", &e))?;

    Ok(Json(json!({
        "success": true,
        "requestPayload": filter,
        "apiResponse": response,
    }))
    .into_response())
}

async fn probe_all(state: &SharedState) -> Value {
    let mut results = serde_json::Map::new();
    for filter in strategies(None) {
        let report = match state.carrier.track(&filter).await {
            Ok(response) => json!({
                "success": response.success,
                "trackingCount": response.tracking.len(),
                "error": response.error_text(),
            }),
            Err(e) => json!({
                "success": false,
                "trackingCount": 0,
                "error": e.to_string(),
            }),
        };
        results.insert(filter.label(), report);
    }

    json!({ "success": true, "results": results })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_readable_expiry() {
        let token = Token {
            access_token: "a".into(),
            refresh_token: "r".into(),
            expires_at: 0,
        };
        assert_eq!(readable_expiry(&token), "1970-01-01 00:00:00 UTC");
    }
}
