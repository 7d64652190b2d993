use serde::{Deserialize, Serialize};

use crate::de::lenient_string;

/// Declares the return order form: every field is text on the wire and
/// reachable by its camelCase name for validation.
macro_rules! form_fields {
    ($( $(#[$doc:meta])* $field:ident => $wire:literal ),* $(,)?) => {
        /// Return order request as submitted by the dashboard form.
        ///
        /// Field names follow the form (`returnOrderNo`, `pickupPincode`, ...).
        /// Numbers sent as JSON numbers are kept as their text form.
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        pub struct ReturnOrderForm {
            $(
                $(#[$doc])*
                #[serde(rename = $wire, default, deserialize_with = "lenient_string")]
                pub $field: String,
            )*
        }

        impl ReturnOrderForm {
            /// Look a field up by its wire name.
            pub fn get(&self, name: &str) -> Option<&str> {
                match name {
                    $( $wire => Some(self.$field.as_str()), )*
                    _ => None,
                }
            }
        }
    };
}

form_fields! {
    // Order details
    forward_airway_bill_no => "forwardAirwayBillNo",
    forward_order_no => "forwardOrderNo",
    return_order_no => "returnOrderNo",
    transaction_id => "transactionId",
    /// `Prepaid` or `COD`
    pay_type => "payType",
    invoice_value => "invoiceValue",
    weight => "weight",
    /// Derived from length, breadth and height when all three are numbers
    volumetric_weight => "volumetricWeight",
    length => "length",
    breadth => "breadth",
    height => "height",

    // Item details
    item_name => "itemName",
    item_description => "itemDescription",
    sku => "sku",
    product_id => "productId",
    variant_id => "variantId",
    quantity => "quantity",
    actual_weight => "actualWeight",
    unit_price => "unitPrice",
    item_vol_weight => "itemVolWeight",
    item_length => "itemLength",
    item_breadth => "itemBreadth",
    item_height => "itemHeight",
    item_color => "itemColor",
    item_size => "itemSize",
    item_category => "itemCategory",
    item_image => "itemImage",
    item_brand => "itemBrand",
    item_imei => "itemImei",
    special_instructions => "specialInstructions",
    reason_for_item => "reasonForItem",
    /// "none" means the tag question was left unanswered
    has_original_tag => "hasOriginalTag",
    has_original_box => "hasOriginalBox",

    // Pickup details
    customer_name => "customerName",
    pickup_contact_number => "pickupContactNumber",
    pickup_pincode => "pickupPincode",
    pickup_address_line1 => "pickupAddressLine1",
    pickup_address_line2 => "pickupAddressLine2",
    pickup_city => "pickupCity",
    pickup_state => "pickupState",

    // Delivery details
    delivery_location => "deliveryLocation",
    vendor_name => "vendorName",
    customer_last_name => "customerLastName",
    delivery_contact_number => "deliveryContactNumber",
    delivery_pincode => "deliveryPincode",
    delivery_address_line1 => "deliveryAddressLine1",
    delivery_address_line2 => "deliveryAddressLine2",
    delivery_city => "deliveryCity",
    delivery_state => "deliveryState",

    // GST details
    gst_number => "gstNumber",
    hsn_number => "hsnNumber",
    e_way_bill_number => "eWayBillNumber",
    cgst_percentage => "cgstPercentage",
    sgst_percentage => "sgstPercentage",
    igst_percentage => "igstPercentage",
}

/// Carrier payment method codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[serde(rename = "PPD")]
    Prepaid,
    #[serde(rename = "COD")]
    CashOnDelivery,
}

impl PaymentMethod {
    /// Anything other than `COD` books as prepaid.
    pub fn from_pay_type(pay_type: &str) -> Self {
        if pay_type.trim().eq_ignore_ascii_case("cod") {
            PaymentMethod::CashOnDelivery
        } else {
            PaymentMethod::Prepaid
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Prepaid => "PPD",
            PaymentMethod::CashOnDelivery => "COD",
        }
    }
}

/// Flat row shown in the return orders table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub company: String,
    pub company_id: String,
    pub user: String,
    pub time_ago: String,
    pub awb: String,
    pub order_number: String,
    pub source: String,
    pub destination: String,
    pub reason: String,
    pub status: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub total: usize,
    pub total_pages: usize,
    pub current_page: usize,
    pub per_page: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderPage {
    pub orders: Vec<OrderView>,
    pub pagination: Pagination,
}
