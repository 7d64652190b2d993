//! In-process carrier for tests
//!
//! Scripted per tracking filter, counts token requests and records every
//! call so tests can assert on what reached the "carrier".

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Value, json};

use returns_common::TrackingFilter;

use super::api::CarrierApi;
use super::error::CarrierError;
use super::types::{BookingRequest, OrdersQuery, Token, TokenRequestStyle};

/// Scripted reply to one tracking filter
#[derive(Debug, Clone)]
pub enum TrackingReply {
    Json(Value),
    Status(u16),
}

#[derive(Default)]
struct Recorded {
    token_requests: usize,
    token_styles: Vec<TokenRequestStyle>,
    tokens_seen: Vec<String>,
    tracking_calls: Vec<String>,
    bookings: Vec<BookingRequest>,
    orders_queries: Vec<OrdersQuery>,
}

pub struct MockCarrier {
    token_lifetime: i64,
    base_time: i64,
    failing_styles: HashSet<TokenRequestStyle>,
    token_failure_status: u16,
    tracking: HashMap<String, TrackingReply>,
    default_tracking: TrackingReply,
    booking_reply: Result<Value, u16>,
    orders_reply: Value,
    recorded: Mutex<Recorded>,
}

impl Default for MockCarrier {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCarrier {
    pub fn new() -> Self {
        Self {
            token_lifetime: 3_600,
            base_time: 1_000,
            failing_styles: HashSet::new(),
            token_failure_status: 401,
            tracking: HashMap::new(),
            default_tracking: TrackingReply::Json(json!({"success": true, "error": false, "tracking": []})),
            booking_reply: Ok(json!({"success": true, "data": {"response": {"airwaybilno": "AWB0001"}}})),
            orders_reply: json!({"success": true, "orders": []}),
            recorded: Mutex::new(Recorded::default()),
        }
    }

    /// Tokens expire `lifetime` seconds after the issue time.
    pub fn with_token_lifetime(mut self, lifetime: i64) -> Self {
        self.token_lifetime = lifetime;
        self
    }

    /// Issue time of every token, in unix seconds. Defaults to 1000 to line
    /// up with a fixed test clock.
    pub fn issued_at(mut self, unix_secs: i64) -> Self {
        self.base_time = unix_secs;
        self
    }

    /// Issue tokens as of the wall clock, for clients on the system clock.
    pub fn issued_now(self) -> Self {
        self.issued_at(chrono::Utc::now().timestamp())
    }

    pub fn fail_tokens_with_status(mut self, status: u16) -> Self {
        self.failing_styles.insert(TokenRequestStyle::QueryParameter);
        self.failing_styles.insert(TokenRequestStyle::BodyParameter);
        self.token_failure_status = status;
        self
    }

    pub fn fail_token_style(mut self, style: TokenRequestStyle, status: u16) -> Self {
        self.failing_styles.insert(style);
        self.token_failure_status = status;
        self
    }

    /// Reply for the filter with this label (see [`TrackingFilter::label`]).
    pub fn on_tracking(mut self, label: &str, reply: TrackingReply) -> Self {
        self.tracking.insert(label.to_string(), reply);
        self
    }

    /// Reply for every filter not scripted with [`MockCarrier::on_tracking`].
    pub fn default_tracking(mut self, reply: TrackingReply) -> Self {
        self.default_tracking = reply;
        self
    }

    pub fn on_booking(mut self, reply: Result<Value, u16>) -> Self {
        self.booking_reply = reply;
        self
    }

    pub fn on_orders(mut self, reply: Value) -> Self {
        self.orders_reply = reply;
        self
    }

    fn recorded(&self) -> std::sync::MutexGuard<'_, Recorded> {
        self.recorded.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn token_requests(&self) -> usize {
        self.recorded().token_requests
    }

    pub fn token_styles(&self) -> Vec<TokenRequestStyle> {
        self.recorded().token_styles.clone()
    }

    /// Access tokens attached to tracking, booking and order calls, in order.
    pub fn tokens_seen(&self) -> Vec<String> {
        self.recorded().tokens_seen.clone()
    }

    /// Labels of the tracking filters received, in order.
    pub fn tracking_calls(&self) -> Vec<String> {
        self.recorded().tracking_calls.clone()
    }

    pub fn bookings(&self) -> Vec<BookingRequest> {
        self.recorded().bookings.clone()
    }

    pub fn orders_queries(&self) -> Vec<OrdersQuery> {
        self.recorded().orders_queries.clone()
    }
}

#[async_trait]
impl CarrierApi for MockCarrier {
    async fn generate_token(&self, style: TokenRequestStyle) -> Result<Token, CarrierError> {
        let mut recorded = self.recorded();
        recorded.token_requests += 1;
        recorded.token_styles.push(style);

        if self.failing_styles.contains(&style) {
            return Err(CarrierError::Status {
                status: self.token_failure_status,
                body: "token refused".to_string(),
            });
        }

        let n = recorded.token_requests;
        Ok(Token {
            access_token: format!("token-{}", n),
            refresh_token: format!("refresh-{}", n),
            expires_at: self.base_time + self.token_lifetime,
        })
    }

    async fn book(&self, access_token: &str, request: &BookingRequest) -> Result<Value, CarrierError> {
        let mut recorded = self.recorded();
        recorded.tokens_seen.push(access_token.to_string());
        recorded.bookings.push(request.clone());

        match &self.booking_reply {
            Ok(value) => Ok(value.clone()),
            Err(status) => Err(CarrierError::Status {
                status: *status,
                body: "booking failed".to_string(),
            }),
        }
    }

    async fn track_raw(&self, access_token: &str, filter: &TrackingFilter) -> Result<Value, CarrierError> {
        let label = filter.label();
        let mut recorded = self.recorded();
        recorded.tokens_seen.push(access_token.to_string());
        recorded.tracking_calls.push(label.clone());

        match self.tracking.get(&label).unwrap_or(&self.default_tracking) {
            TrackingReply::Json(value) => Ok(value.clone()),
            TrackingReply::Status(status) => Err(CarrierError::Status {
                status: *status,
                body: "tracking failed".to_string(),
            }),
        }
    }

    async fn list_orders(&self, access_token: &str, query: &OrdersQuery) -> Result<Value, CarrierError> {
        let mut recorded = self.recorded();
        recorded.tokens_seen.push(access_token.to_string());
        recorded.orders_queries.push(query.clone());
        Ok(self.orders_reply.clone())
    }
}
