//! Auth routes under `/api/auth`

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::{AppendHeaders, IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;

use returns_common::UserData;
use returns_common::de::lenient_string;

use crate::auth::cookies::{REFRESH_TOKEN_COOKIE, read_cookie, read_user_data};
use crate::auth::gate::{GateMode, is_signed_in, verified_session};
use crate::error::ApiError;
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    #[serde(default, deserialize_with = "lenient_string")]
    email: String,
    #[serde(default, deserialize_with = "lenient_string")]
    password: String,
    #[serde(default)]
    display_name: Option<String>,
}

impl Credentials {
    fn parse(payload: Result<Json<Credentials>, JsonRejection>) -> Result<Self, ApiError> {
        let Json(credentials) = payload
            .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {}", e.body_text())))?;
        if credentials.email.trim().is_empty() || credentials.password.is_empty() {
            return Err(ApiError::BadRequest("Email and password are required".to_string()));
        }
        Ok(credentials)
    }
}

/// Every cookie that marks the browser as signed in as `user`.
fn sign_in_cookies(state: &SharedState, user: &UserData, id_token: &str, refresh_token: &str) -> Vec<String> {
    let session = state
        .signer
        .mint(&user.uid, user.email.as_deref(), state.session_expiry());
    vec![
        state.cookies.auth_token(id_token),
        state.cookies.user_data(user),
        state.cookies.refresh_token(refresh_token),
        state.cookies.session(&session),
    ]
}

fn with_cookies(cookies: Vec<String>, body: serde_json::Value) -> Response {
    let headers: Vec<_> = cookies.into_iter().map(|c| (SET_COOKIE, c)).collect();
    (AppendHeaders(headers), Json(body)).into_response()
}

pub async fn login(
    State(state): State<SharedState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<Response, ApiError> {
    let credentials = Credentials::parse(payload)?;
    let session = state
        .identity
        .sign_in(credentials.email.trim(), &credentials.password)
        .await
        .map_err(|e| ApiError::identity(e, "Failed to sign in"))?;

    tracing::info!("User {} signed in", session.user.uid);
    let cookies = sign_in_cookies(&state, &session.user, &session.id_token, &session.refresh_token);
    Ok(with_cookies(cookies, json!({ "success": true, "user": session.user })))
}

pub async fn register(
    State(state): State<SharedState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<Response, ApiError> {
    let credentials = Credentials::parse(payload)?;
    let display_name = credentials
        .display_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());

    let session = state
        .identity
        .sign_up(credentials.email.trim(), &credentials.password, display_name)
        .await
        .map_err(|e| ApiError::identity(e, "Failed to create account"))?;

    tracing::info!("Registered user {}", session.user.uid);
    let cookies = sign_in_cookies(&state, &session.user, &session.id_token, &session.refresh_token);
    Ok(with_cookies(cookies, json!({ "success": true, "user": session.user })))
}

pub async fn logout(State(state): State<SharedState>) -> Response {
    with_cookies(state.cookies.cleared(), json!({ "success": true }))
}

pub async fn refresh(State(state): State<SharedState>, headers: HeaderMap) -> Result<Response, ApiError> {
    let refresh_token = read_cookie(&headers, REFRESH_TOKEN_COOKIE)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::Identity {
            message: "Not signed in".to_string(),
            status: StatusCode::UNAUTHORIZED,
        })?;

    let tokens = state
        .identity
        .refresh(&refresh_token)
        .await
        .map_err(|e| ApiError::identity(e, "Failed to refresh session"))?;

    let user = read_user_data(&headers)
        .filter(|u| u.uid == tokens.uid)
        .unwrap_or_else(|| UserData {
            uid: tokens.uid.clone(),
            ..UserData::default()
        });

    tracing::debug!("Refreshed ID token for {}", user.uid);
    let cookies = sign_in_cookies(&state, &user, &tokens.id_token, &tokens.refresh_token);
    Ok(with_cookies(cookies, json!({ "success": true, "user": user })))
}

/// Whether the caller counts as signed in under the configured gate mode.
pub async fn session(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    if !is_signed_in(&state, &headers) {
        return Json(json!({ "success": true, "authenticated": false, "user": null })).into_response();
    }

    let user = match state.gate_mode {
        GateMode::Presence => read_user_data(&headers),
        GateMode::Verified => verified_session(&state, &headers).map(|claims| {
            read_user_data(&headers)
                .filter(|u| u.uid == claims.uid)
                .unwrap_or(UserData {
                    uid: claims.uid,
                    email: claims.email,
                    ..UserData::default()
                })
        }),
    };

    Json(json!({ "success": true, "authenticated": true, "user": user })).into_response()
}

pub async fn google() -> ApiError {
    ApiError::Forbidden("Google sign-in is disabled".to_string())
}
