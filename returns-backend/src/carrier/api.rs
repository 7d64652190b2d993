//! HTTP access to the Shipdelight carrier API
//!
//! [`CarrierApi`] is the seam between the service and the carrier: the
//! reqwest-backed [`ShipdelightApi`] talks to the real endpoints, tests plug
//! in fakes.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use returns_common::{TrackingFilter, TrackingResponse};

use super::error::CarrierError;
use super::types::{BookingRequest, OrdersQuery, Token, TokenEnvelope, TokenRequestStyle};

/// Longest body excerpt kept in error messages and debug logs
const BODY_PREVIEW_CHARS: usize = 200;

#[async_trait]
pub trait CarrierApi: Send + Sync {
    /// `POST /generate-token`
    async fn generate_token(&self, style: TokenRequestStyle) -> Result<Token, CarrierError>;

    /// `POST /booking`, returning the carrier's JSON untouched
    async fn book(&self, access_token: &str, request: &BookingRequest) -> Result<Value, CarrierError>;

    /// `POST /tracking`, returning the carrier's JSON untouched
    async fn track_raw(&self, access_token: &str, filter: &TrackingFilter) -> Result<Value, CarrierError>;

    /// `GET /orders`
    async fn list_orders(&self, access_token: &str, query: &OrdersQuery) -> Result<Value, CarrierError>;

    /// `POST /tracking`, parsed
    async fn track(&self, access_token: &str, filter: &TrackingFilter) -> Result<TrackingResponse, CarrierError> {
        let raw = self.track_raw(access_token, filter).await?;
        serde_json::from_value(raw).map_err(|e| CarrierError::Malformed(e.to_string()))
    }
}

fn preview(body: &str) -> String {
    if body.chars().count() > BODY_PREVIEW_CHARS {
        let head: String = body.chars().take(BODY_PREVIEW_CHARS).collect();
        format!("{}...", head)
    } else {
        body.to_string()
    }
}

/// reqwest client for the carrier
pub struct ShipdelightApi {
    client: Client,
    base_url: String,
    api_key: String,
}

impl ShipdelightApi {
    pub fn new(base_url: &str, api_key: &str, timeout_secs: u64) -> Result<Self, CarrierError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Read the body, fail on non-2xx, parse JSON.
    async fn read_json(response: reqwest::Response, what: &str) -> Result<Value, CarrierError> {
        let status = response.status();
        let body = response.text().await?;
        tracing::debug!("{} response: {} {}", what, status, preview(&body));

        if !status.is_success() {
            return Err(CarrierError::Status {
                status: status.as_u16(),
                body: preview(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::warn!("Failed to parse {} response as JSON: {}", what, e);
            CarrierError::Malformed(format!("{}: {}", e, preview(&body)))
        })
    }
}

#[async_trait]
impl CarrierApi for ShipdelightApi {
    async fn generate_token(&self, style: TokenRequestStyle) -> Result<Token, CarrierError> {
        let request = match style {
            TokenRequestStyle::QueryParameter => self.client.post(format!(
                "{}?api_key={}",
                self.url("generate-token"),
                urlencoding::encode(&self.api_key)
            )),
            TokenRequestStyle::BodyParameter => self
                .client
                .post(self.url("generate-token"))
                .json(&serde_json::json!({ "api_key": self.api_key })),
        };

        let response = request
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await?;
        let raw = Self::read_json(response, "generate-token").await?;

        let envelope: TokenEnvelope =
            serde_json::from_value(raw).map_err(|e| CarrierError::Malformed(e.to_string()))?;

        if !envelope.success {
            return Err(CarrierError::Rejected(
                envelope.message.unwrap_or_else(|| "token generation refused".to_string()),
            ));
        }

        let data = envelope
            .data
            .ok_or_else(|| CarrierError::Malformed("token response without data".to_string()))?;

        tracing::info!("Carrier token generated ({}), expires at {}", style.as_str(), data.expires_at);

        Ok(Token {
            access_token: data.access_token,
            refresh_token: data.refresh_token,
            expires_at: data.expires_at,
        })
    }

    async fn book(&self, access_token: &str, request: &BookingRequest) -> Result<Value, CarrierError> {
        tracing::debug!("Booking request for order {}", request.order_number);

        let response = self
            .client
            .post(self.url("booking"))
            .bearer_auth(access_token)
            .json(request)
            .send()
            .await?;

        Self::read_json(response, "booking").await
    }

    async fn track_raw(&self, access_token: &str, filter: &TrackingFilter) -> Result<Value, CarrierError> {
        tracing::debug!("Tracking request: {}", filter.label());

        let response = self
            .client
            .post(self.url("tracking"))
            .bearer_auth(access_token)
            .json(filter)
            .send()
            .await?;

        Self::read_json(response, "tracking").await
    }

    async fn list_orders(&self, access_token: &str, query: &OrdersQuery) -> Result<Value, CarrierError> {
        let url = format!("{}?{}", self.url("orders"), query.to_query_string());

        let response = self
            .client
            .get(url)
            .bearer_auth(access_token)
            .send()
            .await?;

        Self::read_json(response, "orders").await
    }
}
