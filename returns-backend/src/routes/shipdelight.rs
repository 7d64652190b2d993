//! Dashboard-facing carrier routes under `/api/shipdelight`

use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use returns_common::de::lenient_string;
use returns_common::{OrderPage, Pagination, ReturnOrderForm};

use crate::carrier::{OrdersQuery, TokenRequestStyle};
use crate::error::ApiError;
use crate::orders::pagination::{DEFAULT_LIMIT, DEFAULT_PAGE};
use crate::orders::{ListFilters, ResolveOutcome, create_return_order, list_return_orders, track_order};
use crate::state::SharedState;

/// Positive integer query parameter; absent or blank means `default`.
pub(crate) fn positive_param<T>(name: &str, raw: Option<&str>, default: T) -> Result<T, ApiError>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(default),
        Some(s) => match s.parse::<T>() {
            Ok(n) if n > T::default() => Ok(n),
            _ => Err(ApiError::BadRequest(format!(
                "Invalid parameter {}: expected a positive integer",
                name
            ))),
        },
    }
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {}", e.body_text())))
}

#[derive(Debug, Deserialize)]
pub struct ReverseOrdersParams {
    page: Option<String>,
    limit: Option<String>,
    status: Option<String>,
    search: Option<String>,
}

pub async fn get_reverse_orders(
    State(state): State<SharedState>,
    Query(params): Query<ReverseOrdersParams>,
) -> Result<Response, ApiError> {
    let filters = ListFilters {
        page: positive_param("page", params.page.as_deref(), DEFAULT_PAGE)?,
        limit: positive_param("limit", params.limit.as_deref(), DEFAULT_LIMIT)?,
        status: params.status,
        search: params.search,
    };

    match list_return_orders(&state.carrier, &filters, Utc::now()).await {
        ResolveOutcome::Found { strategy, data } => {
            tracing::info!(
                "Returning {} of {} orders (strategy {})",
                data.orders.len(),
                data.pagination.total,
                strategy.label()
            );
            Ok(Json(json!({ "success": true, "data": data })).into_response())
        }
        ResolveOutcome::Empty => {
            let empty = OrderPage {
                orders: Vec::new(),
                pagination: Pagination {
                    total: 0,
                    total_pages: 0,
                    current_page: filters.page,
                    per_page: filters.limit,
                },
            };
            Ok(Json(json!({
                "success": true,
                "data": empty,
                "message": "No return orders found",
            }))
            .into_response())
        }
        ResolveOutcome::UpstreamError(reason) => {
            tracing::error!("All API request strategies failed: {}", reason);
            Err(ApiError::Upstream {
                message: "Failed to fetch orders: All API strategies failed".to_string(),
                detail: reason,
            })
        }
    }
}

pub async fn reverse_pickup(
    State(state): State<SharedState>,
    payload: Result<Json<ReturnOrderForm>, JsonRejection>,
) -> Result<Response, ApiError> {
    let form = json_body(payload)?;
    let booked = create_return_order(&state.carrier, form).await?;

    Ok(Json(json!({
        "success": true,
        "data": booked.response,
        "awb": booked.awb,
    }))
    .into_response())
}

#[derive(Debug, Deserialize)]
pub struct TrackOrderRequest {
    #[serde(rename = "awbNumber", default, deserialize_with = "lenient_string")]
    awb_number: String,
}

pub async fn track(
    State(state): State<SharedState>,
    payload: Result<Json<TrackOrderRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let request = json_body(payload)?;
    let tracked = track_order(&state.carrier, &request.awb_number).await?;

    Ok(Json(json!({
        "success": true,
        "data": tracked.raw,
        "isReturnOrder": tracked.summary.is_return_order,
        "orderSummary": tracked.summary,
    }))
    .into_response())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrdersParams {
    order_type: Option<String>,
    days: Option<String>,
    page: Option<String>,
    limit: Option<String>,
}

pub async fn get_orders(
    State(state): State<SharedState>,
    Query(params): Query<OrdersParams>,
) -> Result<Response, ApiError> {
    let defaults = OrdersQuery::default();
    let query = OrdersQuery {
        order_type: params.order_type.filter(|t| !t.trim().is_empty()),
        days: positive_param("days", params.days.as_deref(), defaults.days)?,
        page: positive_param("page", params.page.as_deref(), defaults.page)?,
        limit: positive_param("limit", params.limit.as_deref(), defaults.limit)?,
    };

    let data = state
        .carrier
        .list_orders(&query)
        .await
        .map_err(|e| ApiError::upstream("Failed to fetch orders", &e))?;

    Ok(Json(json!({ "success": true, "data": data })).into_response())
}

pub async fn token(State(state): State<SharedState>) -> Result<Response, ApiError> {
    let token = state
        .carrier
        .regenerate_token(TokenRequestStyle::QueryParameter)
        .await
        .map_err(|e| ApiError::upstream("Failed to generate token", &e))?;

    tracing::info!("Issued carrier token {}, expires at {}", token.preview(), token.expires_at);

    Ok(Json(json!({
        "success": true,
        "accessToken": token.access_token,
        "expiresAt": token.expires_at,
    }))
    .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_param() {
        assert_eq!(positive_param::<usize>("page", None, 1).unwrap(), 1);
        assert_eq!(positive_param::<usize>("page", Some(" "), 1).unwrap(), 1);
        assert_eq!(positive_param::<usize>("page", Some("3"), 1).unwrap(), 3);
        assert!(positive_param::<usize>("page", Some("0"), 1).is_err());
        assert!(positive_param::<usize>("page", Some("-2"), 1).is_err());
        assert!(positive_param::<u32>("limit", Some("ten"), 50).is_err());
    }
}
