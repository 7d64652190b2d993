//! Return order form checks

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use returns_common::ReturnOrderForm;

/// Section of the dashboard form a field lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Section {
    OrderDetails,
    ItemDetails,
    PickupDetails,
    DeliveryDetails,
}

impl Section {
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::OrderDetails => "orderDetails",
            Section::ItemDetails => "itemDetails",
            Section::PickupDetails => "pickupDetails",
            Section::DeliveryDetails => "deliveryDetails",
        }
    }
}

struct FieldSpec {
    name: &'static str,
    label: &'static str,
    section: Section,
}

const fn field(name: &'static str, label: &'static str, section: Section) -> FieldSpec {
    FieldSpec { name, label, section }
}

const FIELD_SPECS: &[FieldSpec] = &[
    field("returnOrderNo", "Return Order No.", Section::OrderDetails),
    field("invoiceValue", "Invoice Value", Section::OrderDetails),
    field("weight", "Weight", Section::OrderDetails),
    field("volumetricWeight", "Volumetric Weight", Section::OrderDetails),
    field("length", "Length", Section::OrderDetails),
    field("breadth", "Breadth", Section::OrderDetails),
    field("height", "Height", Section::OrderDetails),
    field("itemDescription", "Item Description", Section::ItemDetails),
    field("quantity", "Quantity", Section::ItemDetails),
    field("unitPrice", "Unit Price", Section::ItemDetails),
    field("reasonForItem", "Reason for Item", Section::ItemDetails),
    field("customerName", "Customer Name", Section::PickupDetails),
    field("pickupContactNumber", "Pickup Contact Number", Section::PickupDetails),
    field("pickupPincode", "Pickup Pincode", Section::PickupDetails),
    field("pickupAddressLine1", "Pickup Address Line 1", Section::PickupDetails),
    field("pickupCity", "Pickup City", Section::PickupDetails),
    field("pickupState", "Pickup State", Section::PickupDetails),
    field("deliveryContactNumber", "Delivery Contact Number", Section::DeliveryDetails),
    field("deliveryPincode", "Delivery Pincode", Section::DeliveryDetails),
    field("deliveryAddressLine1", "Delivery Address Line 1", Section::DeliveryDetails),
    field("deliveryCity", "Delivery City", Section::DeliveryDetails),
    field("deliveryState", "Delivery State", Section::DeliveryDetails),
];

pub const REQUIRED_FIELDS: &[&str] = &[
    "returnOrderNo",
    "invoiceValue",
    "weight",
    "length",
    "breadth",
    "height",
    "itemDescription",
    "quantity",
    "unitPrice",
    "reasonForItem",
    "customerName",
    "pickupContactNumber",
    "pickupPincode",
    "pickupAddressLine1",
    "pickupCity",
    "pickupState",
    "deliveryContactNumber",
    "deliveryPincode",
    "deliveryAddressLine1",
    "deliveryCity",
    "deliveryState",
];

pub const NUMERIC_FIELDS: &[&str] = &[
    "invoiceValue",
    "weight",
    "volumetricWeight",
    "length",
    "breadth",
    "height",
    "quantity",
    "unitPrice",
    "pickupContactNumber",
    "pickupPincode",
    "deliveryContactNumber",
    "deliveryPincode",
];

pub const PHONE_FIELDS: &[&str] = &["pickupContactNumber", "deliveryContactNumber"];
pub const PINCODE_FIELDS: &[&str] = &["pickupPincode", "deliveryPincode"];

const PHONE_PATTERN: &str = r"^\d{10}$";
const PINCODE_PATTERN: &str = r"^\d{6}$";

static PHONE_RE: LazyLock<Option<Regex>> = LazyLock::new(|| compile(PHONE_PATTERN));
static PINCODE_RE: LazyLock<Option<Regex>> = LazyLock::new(|| compile(PINCODE_PATTERN));

fn compile(pattern: &str) -> Option<Regex> {
    Regex::new(pattern)
        .map_err(|e| tracing::error!("Invalid validation pattern {}: {}", pattern, e))
        .ok()
}

/// Validation stage that rejected the form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationKind {
    Required,
    Numeric,
    Phone,
    Pincode,
}

impl ValidationKind {
    pub fn title(&self) -> &'static str {
        match self {
            ValidationKind::Required => "Missing Required Fields",
            ValidationKind::Numeric => "Invalid Numeric Fields",
            ValidationKind::Phone => "Invalid Phone Numbers",
            ValidationKind::Pincode => "Invalid Pincodes",
        }
    }

    fn intro(&self) -> &'static str {
        match self {
            ValidationKind::Required => "Please fill in the following required fields:",
            ValidationKind::Numeric => "Please enter valid numbers for the following fields:",
            ValidationKind::Phone => "Please enter valid 10-digit phone numbers for:",
            ValidationKind::Pincode => "Please enter valid 6-digit pincodes for:",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvalidField {
    pub name: String,
    pub label: String,
    pub section: Section,
}

impl InvalidField {
    fn new(name: &str) -> Self {
        let spec = FIELD_SPECS.iter().find(|s| s.name == name);
        Self {
            name: name.to_string(),
            label: spec.map(|s| s.label).unwrap_or(name).to_string(),
            section: spec.map(|s| s.section).unwrap_or(Section::OrderDetails),
        }
    }
}

/// Every offending field of the first failing stage.
///
/// `fields` is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", .kind.title())]
pub struct ValidationError {
    pub kind: ValidationKind,
    pub fields: Vec<InvalidField>,
}

impl ValidationError {
    fn from_names(kind: ValidationKind, names: Vec<&str>) -> Self {
        Self {
            kind,
            fields: names.into_iter().map(InvalidField::new).collect(),
        }
    }

    /// Field the form should focus.
    pub fn focus(&self) -> &str {
        self.fields.first().map(|f| f.name.as_str()).unwrap_or_default()
    }

    /// Section holding the focused field.
    pub fn section(&self) -> Section {
        self.fields
            .first()
            .map(|f| f.section)
            .unwrap_or(Section::OrderDetails)
    }

    /// e.g. "Please fill in the following required fields:\n• Weight"
    pub fn message(&self) -> String {
        let mut message = self.kind.intro().to_string();
        for field in &self.fields {
            message.push_str("\n• ");
            message.push_str(&field.label);
        }
        message
    }
}

fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

fn volumetric(l: &str, b: &str, h: &str) -> Option<String> {
    let (l, b, h) = (parse_number(l)?, parse_number(b)?, parse_number(h)?);
    Some(format!("{:.2}", l * b * h / 5000.0))
}

/// Fill `volumetricWeight` and `itemVolWeight` from their dimensions.
///
/// A weight is only overwritten when all three of its dimensions parse.
pub fn derive_volumetric_weights(form: &mut ReturnOrderForm) {
    if let Some(weight) = volumetric(&form.length, &form.breadth, &form.height) {
        form.volumetric_weight = weight;
    }
    if let Some(weight) = volumetric(&form.item_length, &form.item_breadth, &form.item_height) {
        form.item_vol_weight = weight;
    }
}

fn value<'a>(form: &'a ReturnOrderForm, name: &str) -> &'a str {
    form.get(name).unwrap_or_default().trim()
}

/// A pattern that failed to compile matches nothing.
fn matches(re: &Option<Regex>, value: &str) -> bool {
    re.as_ref().is_some_and(|re| re.is_match(value))
}

fn failing<'a>(
    names: &[&'a str],
    form: &ReturnOrderForm,
    is_invalid: impl Fn(&str) -> bool,
) -> Vec<&'a str> {
    names
        .iter()
        .copied()
        .filter(|name| is_invalid(value(form, name)))
        .collect()
}

/// Run the stages in order: required, numeric, phone, pincode.
///
/// Optional stages only look at fields that have a value.
pub fn validate(form: &ReturnOrderForm) -> Result<(), ValidationError> {
    let stages: [(ValidationKind, Vec<&str>); 4] = [
        (
            ValidationKind::Required,
            failing(REQUIRED_FIELDS, form, |v| v.is_empty()),
        ),
        (
            ValidationKind::Numeric,
            failing(NUMERIC_FIELDS, form, |v| {
                !v.is_empty() && parse_number(v).is_none_or(|n| n <= 0.0)
            }),
        ),
        (
            ValidationKind::Phone,
            failing(PHONE_FIELDS, form, |v| !v.is_empty() && !matches(&PHONE_RE, v)),
        ),
        (
            ValidationKind::Pincode,
            failing(PINCODE_FIELDS, form, |v| !v.is_empty() && !matches(&PINCODE_RE, v)),
        ),
    ];

    for (kind, names) in stages {
        if !names.is_empty() {
            return Err(ValidationError::from_names(kind, names));
        }
    }
    Ok(())
}
