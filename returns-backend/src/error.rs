use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use thiserror::Error;

use crate::auth::identity::IdentityError;
use crate::carrier::CarrierError;
use crate::orders::validation::ValidationError;
use crate::orders::{BookingError, TrackError};

/// Error answered by a route as `{success: false, error, ...}`
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{message}")]
    Identity { message: String, status: StatusCode },

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Invalid(#[from] ValidationError),

    #[error("Failed to create reverse pickup")]
    SoftFailure(Vec<String>),

    #[error("{message}")]
    Upstream { message: String, detail: String },
}

impl ApiError {
    /// Carrier failure reported under a route-specific headline.
    pub fn upstream(message: &str, err: &CarrierError) -> Self {
        tracing::error!("{}: {}", message, err);
        ApiError::Upstream {
            message: message.to_string(),
            detail: err.to_string(),
        }
    }

    pub fn identity(err: IdentityError, fallback: &str) -> Self {
        tracing::warn!("{}: {}", fallback, err);
        ApiError::Identity {
            message: err.user_message(fallback),
            status: StatusCode::from_u16(err.status()).unwrap_or(StatusCode::BAD_GATEWAY),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Invalid(_) => StatusCode::BAD_REQUEST,
            ApiError::Identity { status, .. } => *status,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::SoftFailure(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Upstream { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> Value {
        let mut body = json!({ "success": false, "error": self.to_string() });
        match self {
            ApiError::Invalid(err) => {
                body["error"] = json!(err.kind.title());
                body["message"] = json!(err.message());
                body["fields"] = json!(err.fields);
                body["section"] = json!(err.section());
                body["focus"] = json!(err.focus());
            }
            ApiError::SoftFailure(details) => {
                body["details"] = json!(details);
            }
            ApiError::Upstream { detail, .. } => {
                body["details"] = json!(detail);
            }
            _ => {}
        }
        body
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}

impl From<BookingError> for ApiError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::Invalid(e) => ApiError::Invalid(e),
            BookingError::Rejected(details) => ApiError::SoftFailure(details),
            BookingError::Carrier(e) => ApiError::upstream("Failed to create reverse pickup", &e),
        }
    }
}

impl From<TrackError> for ApiError {
    fn from(err: TrackError) -> Self {
        match &err {
            TrackError::MissingAwb => ApiError::BadRequest(err.to_string()),
            TrackError::NotFound(_) => ApiError::NotFound(err.to_string()),
            TrackError::Carrier(e) => ApiError::upstream("Failed to track order", e),
        }
    }
}
