//! Tracking record → table row / tracking summary

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::Serialize;

use returns_common::{OrderView, TrackingEvent, TrackingRecord};

use super::classify::is_reverse_order;

/// Carrier timestamps without an offset are India Standard Time.
const CARRIER_UTC_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
];

const NOT_SPECIFIED: &str = "Not specified";

pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    let offset = FixedOffset::east_opt(CARRIER_UTC_OFFSET_SECS)?;
    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })?;

    offset
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

/// "N minutes ago" / "N hours ago" / "a day ago" / "N days ago";
/// empty for a missing or unreadable timestamp.
pub fn format_time_ago(timestamp: &str, now: DateTime<Utc>) -> String {
    let Some(at) = parse_timestamp(timestamp) else {
        return String::new();
    };

    let elapsed = (now - at).max(chrono::Duration::zero());
    let minutes = elapsed.num_minutes();
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();

    if minutes < 60 {
        format!("{} minutes ago", minutes)
    } else if hours < 24 {
        format!("{} hours ago", hours)
    } else if days == 1 {
        "a day ago".to_string()
    } else {
        format!("{} days ago", days)
    }
}

/// History oldest first. Entries with unreadable times go last, in their
/// original order.
pub fn sorted_history(history: &[TrackingEvent]) -> Vec<&TrackingEvent> {
    let mut sorted: Vec<&TrackingEvent> = history.iter().collect();
    sorted.sort_by_key(|event| {
        let at = parse_timestamp(&event.updated_at);
        (at.is_none(), at)
    });
    sorted
}

fn is_source_event(event: &TrackingEvent) -> bool {
    event.status_code == "99" || event.status.contains("PICKUP") || event.status.contains("ORIGIN")
}

fn is_destination_event(event: &TrackingEvent) -> bool {
    event.status_code == "501"
        || event.status.contains("DELIVERED")
        || event.status.contains("DESTINATION")
        || event.status.contains("UNDELIVERED")
}

/// Places inferred from history; the carrier has no source/destination fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Route {
    pub source: String,
    pub destination: String,
    pub created_at: String,
}

pub fn infer_route(history: &[TrackingEvent]) -> Route {
    let sorted = sorted_history(history);

    let created_at = sorted.first().map(|e| e.updated_at.clone()).unwrap_or_default();
    let source = sorted
        .iter()
        .find(|e| is_source_event(e))
        .map(|e| e.location.clone())
        .unwrap_or_default();
    let destination = sorted
        .iter()
        .find(|e| is_destination_event(e))
        .map(|e| e.location.clone())
        .unwrap_or_default();

    Route {
        source,
        destination,
        created_at,
    }
}

/// First non-blank remark, else "Return".
pub fn return_reason(history: &[TrackingEvent]) -> String {
    history
        .iter()
        .find(|h| !h.remarks.trim().is_empty())
        .map(|h| h.remarks.clone())
        .unwrap_or_else(|| "Return".to_string())
}

fn or_default(value: String, fallback: &str) -> String {
    if value.is_empty() { fallback.to_string() } else { value }
}

pub fn to_order_view(record: &TrackingRecord, now: DateTime<Utc>) -> OrderView {
    let route = infer_route(&record.tracking_history);

    OrderView {
        // The tracking feed carries no customer company.
        company: "Customer".to_string(),
        company_id: record.orderno.clone(),
        user: record.orderno.clone(),
        time_ago: format_time_ago(&route.created_at, now),
        awb: record.airwaybilno.clone(),
        order_number: record.orderno.clone(),
        source: or_default(route.source, NOT_SPECIFIED),
        destination: or_default(route.destination, NOT_SPECIFIED),
        reason: return_reason(&record.tracking_history),
        status: or_default(record.latest_status.clone(), "Pending"),
    }
}

/// Condensed view of a tracked shipment
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub awb: String,
    pub order_number: String,
    pub order_type: String,
    pub latest_status: String,
    pub latest_status_code: String,
    pub expected_delivery: Option<String>,
    pub source: String,
    pub destination: String,
    pub reason: String,
    pub is_return_order: bool,
    pub event_count: usize,
    /// Newest first
    pub history: Vec<TrackingEvent>,
}

pub fn summarize(record: &TrackingRecord) -> OrderSummary {
    let route = infer_route(&record.tracking_history);
    let mut history: Vec<TrackingEvent> = sorted_history(&record.tracking_history)
        .into_iter()
        .cloned()
        .collect();
    history.reverse();

    OrderSummary {
        awb: record.airwaybilno.clone(),
        order_number: record.orderno.clone(),
        order_type: record.ordertype.clone(),
        latest_status: or_default(record.latest_status.clone(), "Pending"),
        latest_status_code: record.latest_status_code.clone(),
        expected_delivery: record.exp_delivery.clone().filter(|d| !d.trim().is_empty()),
        source: or_default(route.source, NOT_SPECIFIED),
        destination: or_default(route.destination, NOT_SPECIFIED),
        reason: return_reason(&record.tracking_history),
        is_return_order: is_reverse_order(record),
        event_count: record.tracking_history.len(),
        history,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(status: &str, code: &str, location: &str, remarks: &str, at: &str) -> TrackingEvent {
        TrackingEvent {
            status: status.into(),
            status_code: code.into(),
            location: location.into(),
            remarks: remarks.into(),
            updated_at: at.into(),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 20, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let utc = parse_timestamp("2024-03-12T10:00:00Z").unwrap();
        assert_eq!(utc, Utc.with_ymd_and_hms(2024, 3, 12, 10, 0, 0).unwrap());

        // Naive carrier times are IST.
        let ist = parse_timestamp("2024-03-12 15:30:00").unwrap();
        assert_eq!(ist, Utc.with_ymd_and_hms(2024, 3, 12, 10, 0, 0).unwrap());

        assert!(parse_timestamp("12-03-2024 15:30:00").is_some());
        assert!(parse_timestamp("2024-03-12").is_some());
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("").is_none());
    }

    #[test]
    fn test_format_time_ago_buckets() {
        assert_eq!(format_time_ago("2024-03-20T11:15:00Z", now()), "45 minutes ago");
        assert_eq!(format_time_ago("2024-03-20T07:00:00Z", now()), "5 hours ago");
        assert_eq!(format_time_ago("2024-03-19T10:00:00Z", now()), "a day ago");
        assert_eq!(format_time_ago("2024-03-10T12:00:00Z", now()), "10 days ago");
        assert_eq!(format_time_ago("", now()), "");
        assert_eq!(format_time_ago("2024-03-21T12:00:00Z", now()), "0 minutes ago");
    }

    #[test]
    fn test_route_inference_uses_time_order() {
        let history = vec![
            event("DELIVERED", "501", "Bangalore Hub", "", "2024-03-15T10:00:00Z"),
            event("PICKUP DONE", "R100", "Pune", "Wrong size", "2024-03-12T10:00:00Z"),
            event("IN TRANSIT", "200", "Mumbai", "", "2024-03-13T10:00:00Z"),
        ];
        let route = infer_route(&history);
        assert_eq!(route.source, "Pune");
        assert_eq!(route.destination, "Bangalore Hub");
        assert_eq!(route.created_at, "2024-03-12T10:00:00Z");
    }

    #[test]
    fn test_unparseable_times_sort_last_stably() {
        let history = vec![
            event("A", "", "", "", "garbage"),
            event("B", "", "", "", "2024-03-13T10:00:00Z"),
            event("C", "", "", "", ""),
            event("D", "", "", "", "2024-03-12T10:00:00Z"),
        ];
        let order: Vec<&str> = sorted_history(&history).iter().map(|e| e.status.as_str()).collect();
        assert_eq!(order, vec!["D", "B", "A", "C"]);
    }

    #[test]
    fn test_order_view_defaults() {
        let record = TrackingRecord {
            airwaybilno: "123".into(),
            orderno: "RET-7".into(),
            ..Default::default()
        };
        let view = to_order_view(&record, now());
        assert_eq!(view.company, "Customer");
        assert_eq!(view.company_id, "RET-7");
        assert_eq!(view.source, "Not specified");
        assert_eq!(view.destination, "Not specified");
        assert_eq!(view.reason, "Return");
        assert_eq!(view.status, "Pending");
        assert_eq!(view.time_ago, "");
    }

    #[test]
    fn test_order_view_from_history() {
        let record = TrackingRecord {
            airwaybilno: "123".into(),
            orderno: "RET-7".into(),
            latest_status: "REVERSE PICKUP DONE".into(),
            tracking_history: vec![
                event("REVERSE INITIATED", "R085", "", "  ", "2024-03-18T12:00:00Z"),
                event("PICKUP DONE", "99", "Chennai", "Damaged item", "2024-03-19T12:00:00Z"),
            ],
            ..Default::default()
        };
        let view = to_order_view(&record, now());
        assert_eq!(view.source, "Chennai");
        assert_eq!(view.reason, "Damaged item");
        assert_eq!(view.time_ago, "2 days ago");
        assert_eq!(view.status, "REVERSE PICKUP DONE");
    }

    #[test]
    fn test_summary_history_newest_first() {
        let record = TrackingRecord {
            airwaybilno: "123".into(),
            ordertype: "REVERSE".into(),
            exp_delivery: Some("".into()),
            tracking_history: vec![
                event("OLD", "", "", "", "2024-03-12T10:00:00Z"),
                event("NEW", "", "", "", "2024-03-14T10:00:00Z"),
            ],
            ..Default::default()
        };
        let summary = summarize(&record);
        assert!(summary.is_return_order);
        assert_eq!(summary.event_count, 2);
        assert_eq!(summary.history[0].status, "NEW");
        assert_eq!(summary.expected_delivery, None);
    }
}
