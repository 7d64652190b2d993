use std::sync::Arc;

use serde_json::Value;
use tokio::sync::Mutex;

use returns_common::{TrackingFilter, TrackingResponse};

use super::api::CarrierApi;
use super::error::CarrierError;
use super::token::TokenCache;
use super::types::{BookingRequest, OrdersQuery, Token, TokenRequestStyle};

/// Source of "now" in unix seconds
pub type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

pub fn system_clock() -> Clock {
    Arc::new(|| chrono::Utc::now().timestamp())
}

/// Carrier access with a cached bearer token.
///
/// Every call goes through [`CarrierClient::valid_token`], which reuses the
/// cached token until its expiry second and regenerates it afterwards.
/// Regeneration is single-flight: concurrent callers wait on the same
/// refresh instead of each requesting a token.
pub struct CarrierClient {
    api: Arc<dyn CarrierApi>,
    cache: Arc<dyn TokenCache>,
    clock: Clock,
    refresh_lock: Mutex<()>,
}

impl CarrierClient {
    pub fn new(api: Arc<dyn CarrierApi>, cache: Arc<dyn TokenCache>) -> Self {
        Self::with_clock(api, cache, system_clock())
    }

    pub fn with_clock(api: Arc<dyn CarrierApi>, cache: Arc<dyn TokenCache>, clock: Clock) -> Self {
        Self {
            api,
            cache,
            clock,
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn now(&self) -> i64 {
        (self.clock)()
    }

    async fn cached_if_fresh(&self) -> Option<Token> {
        let now = self.now();
        self.cache.get().await.filter(|t| !t.is_expired_at(now))
    }

    /// Cached token if still valid, otherwise a freshly generated one.
    pub async fn valid_token(&self) -> Result<Token, CarrierError> {
        if let Some(token) = self.cached_if_fresh().await {
            return Ok(token);
        }

        let _guard = self.refresh_lock.lock().await;
        // Another caller may have refreshed while we waited.
        if let Some(token) = self.cached_if_fresh().await {
            return Ok(token);
        }

        tracing::info!("Carrier token missing or expired, generating a new one");
        self.generate_and_store(TokenRequestStyle::QueryParameter).await
    }

    /// Unconditionally request a new token and cache it.
    pub async fn regenerate_token(&self, style: TokenRequestStyle) -> Result<Token, CarrierError> {
        let _guard = self.refresh_lock.lock().await;
        self.generate_and_store(style).await
    }

    async fn generate_and_store(&self, style: TokenRequestStyle) -> Result<Token, CarrierError> {
        let token = self.api.generate_token(style).await?;
        self.cache.set(token.clone()).await;
        Ok(token)
    }

    pub async fn invalidate_token(&self) {
        self.cache.clear().await;
    }

    pub async fn book(&self, request: &BookingRequest) -> Result<Value, CarrierError> {
        let token = self.valid_token().await?;
        self.api.book(&token.access_token, request).await
    }

    pub async fn track(&self, filter: &TrackingFilter) -> Result<TrackingResponse, CarrierError> {
        let token = self.valid_token().await?;
        tracing::debug!("Tracking {} with token {}", filter.label(), token.preview());
        self.api.track(&token.access_token, filter).await
    }

    pub async fn track_raw(&self, filter: &TrackingFilter) -> Result<Value, CarrierError> {
        let token = self.valid_token().await?;
        self.api.track_raw(&token.access_token, filter).await
    }

    pub async fn list_orders(&self, query: &OrdersQuery) -> Result<Value, CarrierError> {
        let token = self.valid_token().await?;
        self.api.list_orders(&token.access_token, query).await
    }
}
