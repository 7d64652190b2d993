//! Carrier (Shipdelight) access layer
//!
//! Token cache, typed API calls, and the client that ties them together.

pub mod api;
pub mod client;
pub mod error;
#[cfg(any(test, feature = "test-support"))]
pub mod mock;
pub mod token;
pub mod types;

pub use api::{CarrierApi, ShipdelightApi};
pub use client::{CarrierClient, Clock, system_clock};
pub use error::CarrierError;
pub use token::{MemoryTokenCache, TokenCache};
pub use types::{BookingRequest, OrdersQuery, Token, TokenRequestStyle};
