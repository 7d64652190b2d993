//! Return order operations built on the carrier client

pub mod booking;
pub mod classify;
pub mod pagination;
pub mod presenter;
pub mod probe;
pub mod resolver;
pub mod tracking;
pub mod validation;

pub use booking::{Booked, BookingError, create_return_order};
pub use presenter::{OrderSummary, format_time_ago, to_order_view};
pub use resolver::{ListFilters, ResolveOutcome, list_return_orders};
pub use tracking::{TrackError, TrackedOrder, track_order};
pub use validation::{ValidationError, ValidationKind};
