//! HTTP surface of the dashboard backend

pub mod auth;
pub mod diagnostics;
pub mod shipdelight;

use axum::{
    Json, Router,
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::auth_gate;
use crate::state::SharedState;

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "running",
        "service": "returns-backend",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

fn shipdelight_routes(diagnostics: bool) -> Router<SharedState> {
    let router = Router::new()
        .route("/get-reverse-orders", get(shipdelight::get_reverse_orders))
        .route("/reverse-pickup", post(shipdelight::reverse_pickup))
        .route("/track-order", post(shipdelight::track))
        .route("/get-orders", get(shipdelight::get_orders))
        .route("/token", post(shipdelight::token));

    if !diagnostics {
        return router;
    }

    router
        .route(
            "/test-token",
            get(diagnostics::test_token).post(diagnostics::test_token),
        )
        .route(
            "/test-token-alt",
            get(diagnostics::test_token_alt).post(diagnostics::test_token_alt),
        )
        .route(
            "/debug-tracking",
            get(diagnostics::debug_tracking_query).post(diagnostics::debug_tracking_body),
        )
}

fn auth_routes() -> Router<SharedState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
        .route("/logout", post(auth::logout))
        .route("/refresh", post(auth::refresh))
        .route("/session", get(auth::session))
        .route("/google", post(auth::google))
}

/// Every route behind the auth gate, with CORS and request tracing.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/shipdelight", shipdelight_routes(state.diagnostics))
        .nest("/api/auth", auth_routes())
        .layer(from_fn_with_state(state.clone(), auth_gate))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
