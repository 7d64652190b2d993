use serde_json::Value;
use thiserror::Error;

use returns_common::{PaymentMethod, ReturnOrderForm};

use super::validation::{ValidationError, derive_volumetric_weights, validate};
use crate::carrier::types::{BookingRequest, GstDetails, LineItem, ShippingAddress, VendorAddress};
use crate::carrier::{CarrierClient, CarrierError};

const COUNTRY: &str = "India";
const DEFAULT_ITEM_CATEGORY: &str = "Electronics";
pub const PENDING_AWB: &str = "Pending approval";

#[derive(Debug, Error)]
pub enum BookingError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    /// 200 from the carrier carrying an `errors` array
    #[error("Carrier rejected the booking: {}", .0.join("; "))]
    Rejected(Vec<String>),
    #[error(transparent)]
    Carrier(#[from] CarrierError),
}

/// A booking the carrier accepted
#[derive(Debug, Clone, PartialEq)]
pub struct Booked {
    /// `Pending approval` until the carrier assigns one
    pub awb: String,
    pub response: Value,
}

fn or_else<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() { fallback } else { value }
}

/// "none" is the form's unanswered marker for tag/box.
fn answered(value: &str) -> String {
    if value == "none" { String::new() } else { value.to_string() }
}

pub fn to_booking_request(form: &ReturnOrderForm) -> BookingRequest {
    let payment = PaymentMethod::from_pay_type(&form.pay_type);
    let cod_total = match payment {
        PaymentMethod::CashOnDelivery => form.invoice_value.clone(),
        PaymentMethod::Prepaid => "0.0".to_string(),
    };

    let rto = VendorAddress {
        vendor_name: form.vendor_name.clone(),
        address_1: form.delivery_address_line1.clone(),
        address_2: form.delivery_address_line2.clone(),
        city: form.delivery_city.clone(),
        state: form.delivery_state.clone(),
        postcode: form.delivery_pincode.clone(),
        country: COUNTRY.to_string(),
        phone: form.delivery_contact_number.clone(),
    };

    BookingRequest {
        auto_approve: "false".to_string(),
        order_number: form.return_order_no.clone(),
        service_type: "r".to_string(),
        invoice_number: form.return_order_no.clone(),
        transaction_ref_no: or_else(&form.transaction_id, &form.return_order_no).to_string(),
        payment_method: payment.as_str().to_string(),
        discount_total: "0.00".to_string(),
        cod_shipping_charge: "0.00".to_string(),
        invoice_total: form.invoice_value.clone(),
        cod_total,
        length: form.length.clone(),
        breadth: form.breadth.clone(),
        height: form.height.clone(),
        actual_weight: form.weight.clone(),
        volumetric_weight: form.volumetric_weight.clone(),
        qc: "y".to_string(),
        shipping: ShippingAddress {
            first_name: form.delivery_location.clone(),
            last_name: form.customer_last_name.clone(),
            address_1: form.delivery_address_line1.clone(),
            address_2: form.delivery_address_line2.clone(),
            city: form.delivery_city.clone(),
            state: form.delivery_state.clone(),
            postcode: form.delivery_pincode.clone(),
            country: COUNTRY.to_string(),
            phone: form.delivery_contact_number.clone(),
            cust_email: String::new(),
        },
        line_items: vec![LineItem {
            name: or_else(&form.item_name, &form.item_description).to_string(),
            quantity: form.quantity.clone(),
            sku: form.sku.clone(),
            product_id: form.product_id.clone(),
            variant_id: form.variant_id.clone(),
            unit_price: form.unit_price.clone(),
            actual_weight: or_else(&form.actual_weight, &form.weight).to_string(),
            item_color: form.item_color.clone(),
            item_size: form.item_size.clone(),
            item_category: or_else(&form.item_category, DEFAULT_ITEM_CATEGORY).to_string(),
            item_image: form.item_image.clone(),
            item_brand: form.item_brand.clone(),
            item_imei: form.item_imei.clone(),
            special_ins: form.special_instructions.clone(),
            return_reasons: form.reason_for_item.clone(),
            item_tag: answered(&form.has_original_tag),
            item_box: answered(&form.has_original_box),
        }],
        pickup: VendorAddress {
            vendor_name: form.customer_name.clone(),
            address_1: form.pickup_address_line1.clone(),
            address_2: form.pickup_address_line2.clone(),
            city: form.pickup_city.clone(),
            state: form.pickup_state.clone(),
            postcode: form.pickup_pincode.clone(),
            country: COUNTRY.to_string(),
            phone: form.pickup_contact_number.clone(),
        },
        rto,
        gst_details: GstDetails {
            gst_number: form.gst_number.clone(),
            cgst: form.cgst_percentage.clone(),
            igst: form.igst_percentage.clone(),
            sgst: form.sgst_percentage.clone(),
            hsn_number: form.hsn_number.clone(),
            ewaybill_number: form.e_way_bill_number.clone(),
        },
    }
}

fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

/// Rendered entries of the `errors` array, if the response has one.
///
/// Entries render as `"<loc[1]>: <msg>"`, or just `msg` when `loc` is short.
pub fn soft_failures(response: &Value) -> Option<Vec<String>> {
    let errors = response.get("errors")?;
    let entries = match errors {
        Value::Array(entries) => entries.as_slice(),
        Value::Null => return None,
        other => return Some(vec![text_of(other).unwrap_or_default()]),
    };

    let rendered = entries
        .iter()
        .map(|entry| {
            let msg = entry.get("msg").and_then(text_of).unwrap_or_default();
            match entry.get("loc").and_then(|loc| loc.get(1)).and_then(text_of) {
                Some(field) => format!("{}: {}", field, msg),
                None if !msg.is_empty() => msg,
                None => text_of(entry).unwrap_or_default(),
            }
        })
        .collect();
    Some(rendered)
}

/// `data.response.airwaybilno`, then `response.airwaybilno`.
pub fn extract_awb(response: &Value) -> String {
    ["/data/response/airwaybilno", "/response/airwaybilno"]
        .iter()
        .filter_map(|pointer| response.pointer(pointer))
        .filter_map(text_of)
        .find(|awb| !awb.is_empty())
        .unwrap_or_else(|| PENDING_AWB.to_string())
}

/// Validate, derive weights, book with the carrier and interpret the reply.
pub async fn create_return_order(
    client: &CarrierClient,
    mut form: ReturnOrderForm,
) -> Result<Booked, BookingError> {
    derive_volumetric_weights(&mut form);
    validate(&form)?;

    let request = to_booking_request(&form);
    tracing::info!(
        "Booking reverse pickup {} ({})",
        request.order_number,
        request.payment_method
    );

    let response = client.book(&request).await?;

    if let Some(errors) = soft_failures(&response) {
        tracing::warn!(
            "Carrier returned errors for {}: {}",
            request.order_number,
            errors.join("; ")
        );
        return Err(BookingError::Rejected(errors));
    }

    let awb = extract_awb(&response);
    tracing::info!("Reverse pickup {} booked, AWB {}", request.order_number, awb);
    Ok(Booked { awb, response })
}
