//! Wire types of the carrier API

use serde::{Deserialize, Serialize};

/// Bearer token issued by `POST /generate-token`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: String,
    /// Unix seconds
    pub expires_at: i64,
}

impl Token {
    /// A token is stale from its expiry second onwards.
    pub fn is_expired_at(&self, now: i64) -> bool {
        now >= self.expires_at
    }

    /// First characters of the access token, for logs.
    pub fn preview(&self) -> String {
        let head: String = self.access_token.chars().take(10).collect();
        format!("{}...", head)
    }
}

/// Envelope of `POST /generate-token`
#[derive(Debug, Deserialize)]
pub(crate) struct TokenEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<TokenData>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenData {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
    pub expires_at: i64,
}

/// How the API key is handed to `POST /generate-token`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenRequestStyle {
    /// `?api_key=...` on the URL, the style the carrier documents
    QueryParameter,
    /// `{"api_key": "..."}` as the JSON body
    BodyParameter,
}

impl TokenRequestStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenRequestStyle::QueryParameter => "query_parameter",
            TokenRequestStyle::BodyParameter => "body_parameter",
        }
    }
}

/// Query of `GET /orders`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrdersQuery {
    #[serde(default)]
    pub order_type: Option<String>,
    pub days: u32,
    pub page: u32,
    pub limit: u32,
}

impl Default for OrdersQuery {
    fn default() -> Self {
        Self {
            order_type: None,
            days: 30,
            page: 1,
            limit: 50,
        }
    }
}

impl OrdersQuery {
    pub fn to_query_string(&self) -> String {
        let mut query = format!("days={}&page={}&limit={}", self.days, self.page, self.limit);
        if let Some(order_type) = self.order_type.as_deref().filter(|t| !t.is_empty()) {
            query.push_str("&order_type=");
            query.push_str(&urlencoding::encode(order_type));
        }
        query
    }
}

/// Address block used for shipping, pickup and RTO
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub first_name: String,
    pub last_name: String,
    pub address_1: String,
    pub address_2: String,
    pub city: String,
    pub state: String,
    pub postcode: String,
    pub country: String,
    pub phone: String,
    pub cust_email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VendorAddress {
    pub vendor_name: String,
    pub address_1: String,
    pub address_2: String,
    pub city: String,
    pub state: String,
    pub postcode: String,
    pub country: String,
    pub phone: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    pub quantity: String,
    pub sku: String,
    pub product_id: String,
    pub variant_id: String,
    pub unit_price: String,
    pub actual_weight: String,
    pub item_color: String,
    pub item_size: String,
    pub item_category: String,
    pub item_image: String,
    pub item_brand: String,
    pub item_imei: String,
    pub special_ins: String,
    pub return_reasons: String,
    pub item_tag: String,
    pub item_box: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GstDetails {
    pub gst_number: String,
    pub cgst: String,
    pub igst: String,
    pub sgst: String,
    pub hsn_number: String,
    pub ewaybill_number: String,
}

/// Body of `POST /booking`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub auto_approve: String,
    pub order_number: String,
    pub service_type: String,
    pub invoice_number: String,
    pub transaction_ref_no: String,
    pub payment_method: String,
    pub discount_total: String,
    pub cod_shipping_charge: String,
    pub invoice_total: String,
    pub cod_total: String,
    pub length: String,
    pub breadth: String,
    pub height: String,
    pub actual_weight: String,
    pub volumetric_weight: String,
    pub qc: String,
    pub shipping: ShippingAddress,
    pub line_items: Vec<LineItem>,
    pub pickup: VendorAddress,
    pub rto: VendorAddress,
    pub gst_details: GstDetails,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_expiry_boundary() {
        let token = Token {
            access_token: "abcdefghijklmnop".into(),
            refresh_token: "r".into(),
            expires_at: 1_000,
        };
        assert!(!token.is_expired_at(999));
        assert!(token.is_expired_at(1_000));
        assert!(token.is_expired_at(1_001));
        assert_eq!(token.preview(), "abcdefghij...");
    }

    #[test]
    fn test_orders_query_string() {
        assert_eq!(OrdersQuery::default().to_query_string(), "days=30&page=1&limit=50");
        let query = OrdersQuery {
            order_type: Some("REVERSE".into()),
            days: 7,
            page: 2,
            limit: 10,
        };
        assert_eq!(query.to_query_string(), "days=7&page=2&limit=10&order_type=REVERSE");
    }
}
