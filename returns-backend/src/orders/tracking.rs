use serde_json::Value;
use thiserror::Error;

use returns_common::{FilterType, TrackingFilter, TrackingResponse};

use super::presenter::{OrderSummary, summarize};
use crate::carrier::{CarrierClient, CarrierError};

#[derive(Debug, Error)]
pub enum TrackError {
    #[error("Missing required parameter: awbNumber")]
    MissingAwb,
    #[error("No tracking information found for AWB {0}")]
    NotFound(String),
    #[error(transparent)]
    Carrier(#[from] CarrierError),
}

/// Single shipment lookup by AWB
#[derive(Debug, Clone)]
pub struct TrackedOrder {
    /// Carrier response as received
    pub raw: Value,
    pub summary: OrderSummary,
}

pub async fn track_order(client: &CarrierClient, awb: &str) -> Result<TrackedOrder, TrackError> {
    let awb = awb.trim();
    if awb.is_empty() {
        return Err(TrackError::MissingAwb);
    }

    tracing::info!("Tracking order with AWB: {}", awb);
    let raw = client
        .track_raw(&TrackingFilter::by(FilterType::AirwayBill, awb))
        .await?;
    let response: TrackingResponse = serde_json::from_value(raw.clone())
        .map_err(|e| CarrierError::Malformed(e.to_string()))?;

    if let Some(error) = response.error_text() {
        tracing::warn!("Carrier reported an error tracking {}: {}", awb, error);
    }

    let mut tracking = response.tracking;
    if tracking.is_empty() {
        return Err(TrackError::NotFound(awb.to_string()));
    }
    // Prefer the exact AWB; the carrier may answer with neighbours.
    let position = tracking
        .iter()
        .position(|r| r.airwaybilno == awb)
        .unwrap_or(0);
    let record = tracking.swap_remove(position);

    let summary = summarize(&record);
    Ok(TrackedOrder { raw, summary })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::carrier::mock::{MockCarrier, TrackingReply};
    use crate::carrier::token::MemoryTokenCache;
    use serde_json::json;
    use std::sync::Arc;

    fn client(mock: Arc<MockCarrier>) -> CarrierClient {
        CarrierClient::with_clock(mock, Arc::new(MemoryTokenCache::new()), Arc::new(|| 1_000))
    }

    #[tokio::test]
    async fn test_blank_awb_is_rejected_before_any_call() {
        let mock = Arc::new(MockCarrier::new());
        let err = track_order(&client(mock.clone()), "   ").await.unwrap_err();
        assert!(matches!(err, TrackError::MissingAwb));
        assert!(mock.tracking_calls().is_empty());
    }

    #[tokio::test]
    async fn test_no_records_is_not_found() {
        let mock = Arc::new(MockCarrier::new());
        let err = track_order(&client(mock.clone()), "123").await.unwrap_err();
        assert!(matches!(err, TrackError::NotFound(ref awb) if awb == "123"));
        assert_eq!(mock.tracking_calls(), vec!["airwaybilno=123"]);
    }

    #[tokio::test]
    async fn test_summary_of_matching_record() {
        let reply = json!({
            "success": true,
            "error": false,
            "tracking": [{
                "airwaybilno": "555",
                "orderno": "RET-9",
                "ordertype": "REVERSE",
                "latest_status_code": "R100",
                "latest_status": "REVERSE PICKUP DONE",
                "exp_delivery": "2024-03-18",
                "tracking_history": [
                    {"status": "REVERSE INITIATED", "status_code": "R085", "location": "Pune",
                     "remarks": "", "updated_at": "2024-03-12 10:00:00"},
                    {"status": "PICKUP DONE", "status_code": "R100", "location": "Pune",
                     "remarks": "Colour mismatch", "updated_at": "2024-03-13 10:00:00"}
                ]
            }]
        });
        let mock = Arc::new(MockCarrier::new().on_tracking("airwaybilno=555", TrackingReply::Json(reply.clone())));

        let tracked = track_order(&client(mock), " 555 ").await.unwrap();
        assert_eq!(tracked.raw, reply);
        let summary = tracked.summary;
        assert!(summary.is_return_order);
        assert_eq!(summary.order_number, "RET-9");
        assert_eq!(summary.source, "Pune");
        assert_eq!(summary.destination, "Not specified");
        assert_eq!(summary.reason, "Colour mismatch");
        assert_eq!(summary.expected_delivery.as_deref(), Some("2024-03-18"));
        assert_eq!(summary.event_count, 2);
        assert_eq!(summary.history[0].status, "PICKUP DONE");
    }

    #[tokio::test]
    async fn test_carrier_failure_propagates() {
        let mock = Arc::new(MockCarrier::new().default_tracking(TrackingReply::Status(500)));
        let err = track_order(&client(mock), "123").await.unwrap_err();
        assert!(matches!(err, TrackError::Carrier(CarrierError::Status { status: 500, .. })));
    }
}
