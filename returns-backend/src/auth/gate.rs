//! Request gate in front of every non-public route

use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use super::cookies::{AUTH_TOKEN_COOKIE, SESSION_COOKIE, USER_DATA_COOKIE, has_cookie, read_cookie};
use super::session::SessionClaims;
use crate::state::SharedState;

/// How the gate decides a request is signed in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GateMode {
    /// Either `firebase-auth-token` or `user-data` is present. Nothing is
    /// verified, so any client can forge its way in.
    Presence,
    /// `session-token` carries a valid signature and has not expired.
    #[default]
    Verified,
}

/// Matched as prefixes; `/` is only public by itself.
const PUBLIC_PREFIXES: &[&str] = &[
    "/login",
    "/register",
    "/reset-password",
    "/api/auth",
    "/api/shipdelight/generate-token",
    "/api/shipdelight/track-order",
    "/health",
];

const PUBLIC_FRAGMENTS: &[&str] = &["/_next", "/favicon.ico", "/assets/"];

pub fn is_public_path(path: &str) -> bool {
    path == "/"
        || PUBLIC_PREFIXES.iter().any(|p| path.starts_with(p))
        || PUBLIC_FRAGMENTS.iter().any(|f| path.contains(f))
}

/// Session claims when the request carries a valid session cookie.
pub fn verified_session(state: &SharedState, headers: &HeaderMap) -> Option<SessionClaims> {
    let token = read_cookie(headers, SESSION_COOKIE)?;
    match state.signer.verify(&token, state.now()) {
        Ok(claims) => Some(claims),
        Err(e) => {
            tracing::debug!("Rejected session cookie: {}", e);
            None
        }
    }
}

pub fn is_signed_in(state: &SharedState, headers: &HeaderMap) -> bool {
    match state.gate_mode {
        GateMode::Presence => {
            has_cookie(headers, AUTH_TOKEN_COOKIE) || has_cookie(headers, USER_DATA_COOKIE)
        }
        GateMode::Verified => verified_session(state, headers).is_some(),
    }
}

pub fn login_redirect(path: &str) -> Response {
    let location = format!("/login?from={}", urlencoding::encode(path));
    (StatusCode::TEMPORARY_REDIRECT, [(header::LOCATION, location)]).into_response()
}

pub async fn auth_gate(State(state): State<SharedState>, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();

    if is_public_path(&path) || is_signed_in(&state, request.headers()) {
        return next.run(request).await;
    }

    tracing::info!("Unauthenticated request to {}, redirecting to login", path);
    login_redirect(&path)
}
