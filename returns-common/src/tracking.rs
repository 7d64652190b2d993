use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::de::null_as_default;

/// One entry of a shipment's tracking history
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackingEvent {
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status_code: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub location: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub remarks: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub updated_at: String,
}

/// A shipment as returned by the carrier tracking endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackingRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub airwaybilno: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub orderno: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ordertype: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub latest_status_code: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub latest_status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp_delivery: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tracking_history: Vec<TrackingEvent>,
}

/// Envelope of `POST /tracking`
///
/// `error` is a bool on most responses but some failures carry a message,
/// so it is kept as a raw value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackingResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tracking: Vec<TrackingRecord>,
}

impl TrackingResponse {
    /// Successful and carrying at least one record.
    pub fn has_data(&self) -> bool {
        self.success && !self.tracking.is_empty()
    }

    /// Human readable error text, if the carrier sent any.
    pub fn error_text(&self) -> Option<String> {
        match &self.error {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(Value::Bool(true)) => self
                .message
                .clone()
                .or_else(|| Some("carrier reported an error".to_string())),
            _ => None,
        }
    }
}

/// Filter types understood by the tracking endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterType {
    #[serde(rename = "airwaybilno")]
    AirwayBill,
    #[serde(rename = "orderno")]
    OrderNumber,
    #[serde(rename = "ordertype")]
    OrderType,
    #[serde(rename = "status_code")]
    StatusCode,
}

impl FilterType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterType::AirwayBill => "airwaybilno",
            FilterType::OrderNumber => "orderno",
            FilterType::OrderType => "ordertype",
            FilterType::StatusCode => "status_code",
        }
    }
}

impl std::fmt::Display for FilterType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for FilterType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "airwaybilno" | "awb" => Ok(FilterType::AirwayBill),
            "orderno" => Ok(FilterType::OrderNumber),
            "ordertype" => Ok(FilterType::OrderType),
            "status_code" | "statuscode" => Ok(FilterType::StatusCode),
            _ => Err(format!("Unknown filter type: {}", s)),
        }
    }
}

/// Request body of `POST /tracking`. Both fields absent means "no filter".
///
/// The filter type is kept as text so diagnostic callers can pass values the
/// carrier accepts but [`FilterType`] does not model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_value: Option<String>,
}

impl TrackingFilter {
    /// The empty payload `{}`
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by(filter_type: FilterType, value: impl Into<String>) -> Self {
        Self {
            filter_type: Some(filter_type.to_string()),
            filter_value: Some(value.into()),
        }
    }

    /// Rewrites a known filter type alias (`awb`, `statuscode`, any casing)
    /// to the name the carrier expects. Unknown types pass through untouched.
    pub fn normalized(mut self) -> Self {
        if let Some(known) = self
            .filter_type
            .as_deref()
            .and_then(|t| t.trim().parse::<FilterType>().ok())
        {
            self.filter_type = Some(known.to_string());
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.filter_type.is_none() && self.filter_value.is_none()
    }

    /// Short label used in logs and diagnostic reports, e.g. `ordertype=REVERSE`.
    pub fn label(&self) -> String {
        if self.is_empty() {
            return "empty payload".to_string();
        }
        format!(
            "{}={}",
            self.filter_type.as_deref().unwrap_or(""),
            self.filter_value.as_deref().unwrap_or("")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tracking_response_with_nulls() {
        let json = r#"{
            "success": true,
            "error": false,
            "tracking": [{
                "airwaybilno": "77481168811",
                "orderno": "RET-1001",
                "ordertype": null,
                "latest_status_code": "R085",
                "latest_status": "REVERSE INITIATED",
                "tracking_history": [
                    {"status": "REVERSE INITIATED", "status_code": "R085", "location": null,
                     "remarks": "Size issue", "updated_at": "2024-03-12 10:22:33"}
                ]
            }]
        }"#;
        let resp: TrackingResponse = serde_json::from_str(json).unwrap();
        assert!(resp.has_data());
        assert_eq!(resp.error_text(), None);
        let record = &resp.tracking[0];
        assert_eq!(record.ordertype, "");
        assert_eq!(record.exp_delivery, None);
        assert_eq!(record.tracking_history[0].location, "");
    }

    #[test]
    fn test_filter_serialization() {
        assert_eq!(serde_json::to_string(&TrackingFilter::all()).unwrap(), "{}");
        let filter = TrackingFilter::by(FilterType::StatusCode, "R087");
        assert_eq!(
            serde_json::to_string(&filter).unwrap(),
            r#"{"filter_type":"status_code","filter_value":"R087"}"#
        );
        assert_eq!(filter.label(), "status_code=R087");
        assert_eq!(TrackingFilter::all().label(), "empty payload");
    }

    #[test]
    fn test_filter_type_from_str() {
        assert_eq!("AirwayBilNo".parse::<FilterType>(), Ok(FilterType::AirwayBill));
        assert!("customer".parse::<FilterType>().is_err());
    }

    #[test]
    fn test_normalized_filter_aliases() {
        let filter = TrackingFilter {
            filter_type: Some("AWB".to_string()),
            filter_value: Some("77481168811".to_string()),
        };
        assert_eq!(filter.normalized(), TrackingFilter::by(FilterType::AirwayBill, "77481168811"));

        let filter = TrackingFilter {
            filter_type: Some(" StatusCode ".to_string()),
            filter_value: Some("R087".to_string()),
        };
        assert_eq!(filter.normalized().filter_type.as_deref(), Some("status_code"));

        let custom = TrackingFilter {
            filter_type: Some("customer_phone".to_string()),
            filter_value: Some("9876543210".to_string()),
        };
        assert_eq!(custom.clone().normalized(), custom);
        assert_eq!(TrackingFilter::all().normalized(), TrackingFilter::all());
    }

    #[test]
    fn test_error_text_variants() {
        let resp: TrackingResponse =
            serde_json::from_str(r#"{"success": false, "error": "Invalid token"}"#).unwrap();
        assert_eq!(resp.error_text().as_deref(), Some("Invalid token"));
        assert!(!resp.has_data());
    }
}
