use chrono::{offset::Utc, DateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::status;

/// Endpoint for English responses.
pub const ENGLISH_URL: &str = "http://sellonline.canadapost.ca:30000";
/// Endpoint for French responses.
pub const FRENCH_URL: &str = "http://cybervente.canadapost.ca:30000";

/// The language rates are requested in. Each language has its own endpoint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    French,
}

impl Language {
    /// The locale code sent in the `language` element.
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::French => "fr",
        }
    }

    /// The endpoint serving this language.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Language::English => ENGLISH_URL,
            Language::French => FRENCH_URL,
        }
    }
}

/// A postal location, used for the origin and destination of a shipment and for the
/// address of a postal outlet.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// First street line.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub address1: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub city: String,
    /// Province for Canadian addresses, state otherwise.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub province: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub country: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub postal_code: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub phone_number: String,
}

impl Location {
    /// The location used to check credentials: the Sell Online office in Ottawa.
    pub fn default_location() -> Self {
        Location {
            address1: "61A York St".to_string(),
            city: "Ottawa".to_string(),
            province: "ON".to_string(),
            country: "CA".to_string(),
            postal_code: "K1N5T2".to_string(),
            phone_number: String::new(),
        }
    }
}

/// An item in the shopping cart.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub quantity: u32,
    /// Weight in kilograms.
    pub weight: f64,
    /// Length in centimeters.
    pub length: f64,
    /// Width in centimeters.
    pub width: f64,
    /// Height in centimeters.
    pub height: f64,
    #[serde(default)]
    pub description: String,
    /// Price of the item. Only used to compute the total price of the cart.
    #[serde(default)]
    pub price: Decimal,
    /// When true, Sell Online will not pack this item in the boxes defined in the merchant
    /// profile.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ready_to_ship: Option<bool>,
}

/// What was sent for a rate request. The vendor does not echo any of this back, so it is
/// attached to the parsed response by the carrier.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RateRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<Location>,
    pub destination: Location,
    /// Hours needed to get an order ready for shipping.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turn_around_time: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub line_items: Vec<LineItem>,
}

/// A rate for one Canada Post service.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RateEstimate {
    /// Always "Canada Post".
    pub carrier: String,
    pub service_name: String,
    /// Product id of the service, e.g. "1040".
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub service_code: String,
    pub total_price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_date: Option<DateTime<Utc>>,
    /// The packing (set of boxes) this rate was calculated for.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub packing_id: String,
}

/// A box Sell Online packed the line items into.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PackingBox {
    pub name: String,
    pub weight: f64,
    pub expediter_weight: f64,
    pub length: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub packed_items: Vec<PackedItem>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PackedItem {
    pub quantity: u32,
    pub description: String,
}

/// A post office near the origin.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PostalOutlet {
    pub sequence_no: String,
    pub distance: String,
    pub name: String,
    pub business_name: String,
    /// The outlet address. The country is always "Canada".
    pub postal_address: Location,
    #[serde(default)]
    pub business_hours: Vec<BusinessHours>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BusinessHours {
    pub day_of_week: String,
    pub time: String,
}

/// The parsed answer to a rate request.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RateResponse {
    pub success: bool,
    /// The vendor's status message.
    pub message: String,
    pub status_code: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub request_id: String,
    #[serde(default)]
    pub rates: Vec<RateEstimate>,
    #[serde(default)]
    pub boxes: Vec<PackingBox>,
    #[serde(default)]
    pub postal_outlets: Vec<PostalOutlet>,
    /// The request this response answers, when it was sent through the carrier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<RateRequest>,
    /// The raw response body.
    #[serde(default)]
    pub xml: String,
    /// The parsed response envelope.
    #[serde(default)]
    pub params: serde_json::Value,
}

impl RateResponse {
    /// Returns true when Sell Online could not fully process the request and fell back to
    /// the merchant's default rates. Such a response still counts as a success, so the
    /// rates may be inaccurate.
    pub fn is_degraded(&self) -> bool {
        self.status_code.trim() == status::STATUS_DEFAULT_RATES
    }

    /// The documented meaning of the status code.
    pub fn status_description(&self) -> Option<&'static str> {
        status::describe(&self.status_code)
    }
}
