pub mod de;
pub mod orders;
pub mod tracking;
pub mod user;

pub use orders::{OrderPage, OrderView, Pagination, PaymentMethod, ReturnOrderForm};
pub use tracking::{FilterType, TrackingEvent, TrackingFilter, TrackingRecord, TrackingResponse};
pub use user::UserData;
