//! Listing form - the validated, normalized content of a submission.
//!
//! Raw submissions come from a web-app form as loosely typed JSON. They are
//! normalized (digit scripts, bidi marks, decimal separators) and validated
//! field by field; the first failing field is reported.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use super::price::Price;
use super::text::{normalize_decimal_separator, normalize_digits, strip_hidden_marks};
use crate::domain::foundation::ValidationError;

static VEHICLE_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\x{0622}-\x{06CC}A-Za-z0-9\s]{2,40}$").expect("static vehicle grammar")
});
static YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(1[34][0-9]{2}|20[012][0-9])$").expect("static year grammar"));
static COLOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\x{0622}-\x{06CC}\s]{1,12}$").expect("static color grammar"));
static MILEAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{1,6}$").expect("static mileage grammar"));
static INSURANCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{1,2}$").expect("static insurance grammar"));
static PHONE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^09[0-9]{9}$").expect("static phone grammar"));

/// Fields a moderator may overwrite after submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditableField {
    Price,
    Description,
}

impl EditableField {
    /// Stable wire name, also used in callback payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            EditableField::Price => "price",
            EditableField::Description => "desc",
        }
    }
}

impl fmt::Display for EditableField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EditableField {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "price" => Ok(EditableField::Price),
            "desc" | "description" => Ok(EditableField::Description),
            other => Err(ValidationError::invalid_format(
                "field",
                format!("'{}' is not editable", other),
            )),
        }
    }
}

/// Raw submission payload as produced by the web-app form.
///
/// Every field is optional at this layer; `million_price` wins over `price`
/// and either may arrive as a JSON string or number.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSubmission {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub car: Option<String>,
    #[serde(default)]
    pub year: Option<Value>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub km: Option<Value>,
    #[serde(default)]
    pub insurance: Option<Value>,
    #[serde(default)]
    pub gear: Option<String>,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub phone: Option<Value>,
    #[serde(default)]
    pub million_price: Option<Value>,
    #[serde(default)]
    pub price: Option<Value>,
}

impl RawSubmission {
    /// Parses the JSON payload; anything unparseable is treated as an empty form.
    pub fn from_json(payload: &str) -> Self {
        serde_json::from_str(payload).unwrap_or_default()
    }
}

fn text_of(value: &Option<String>) -> String {
    value.as_deref().unwrap_or_default().trim().to_string()
}

fn loose_text(value: &Option<Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn digits_of(value: &Option<Value>) -> String {
    normalize_digits(&strip_hidden_marks(&loose_text(value)))
}

/// A validated listing.
///
/// Immutable except for price and description, which only the draft
/// aggregate changes on behalf of a moderator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingForm {
    category: String,
    vehicle_name: String,
    year: u16,
    color: String,
    mileage_km: u32,
    insurance_months: Option<u8>,
    transmission: String,
    description: String,
    contact_phone: String,
    submitter_handle: Option<String>,
    price: Price,
}

impl ListingForm {
    /// Validates and normalizes a raw submission.
    pub fn from_submission(
        raw: &RawSubmission,
        submitter_handle: Option<String>,
    ) -> Result<Self, ValidationError> {
        let category = text_of(&raw.category);
        let vehicle_name = strip_hidden_marks(&text_of(&raw.car));
        let year = digits_of(&raw.year);
        let color = strip_hidden_marks(&text_of(&raw.color));
        let km = digits_of(&raw.km);
        let insurance = digits_of(&raw.insurance);
        let transmission = text_of(&raw.gear);
        let description = text_of(&raw.desc);
        let phone = digits_of(&raw.phone);
        let price_source = if raw.million_price.is_some() {
            &raw.million_price
        } else {
            &raw.price
        };
        let price_raw = normalize_decimal_separator(&digits_of(price_source));

        if !VEHICLE_NAME.is_match(&normalize_digits(&vehicle_name)) {
            return Err(ValidationError::invalid_format(
                "car",
                "2-40 letters, digits or spaces",
            ));
        }
        if !YEAR.is_match(&year) {
            return Err(ValidationError::invalid_format(
                "year",
                "four digits, e.g. 1403 or 2024",
            ));
        }
        if !COLOR.is_match(&color) {
            return Err(ValidationError::invalid_format("color", "1-12 Persian letters"));
        }
        if !MILEAGE.is_match(&km) {
            return Err(ValidationError::invalid_format("km", "1-6 digits"));
        }
        if !insurance.is_empty() && !INSURANCE.is_match(&insurance) {
            return Err(ValidationError::invalid_format("insurance", "1-2 digits"));
        }
        if !PHONE.is_match(&phone) {
            return Err(ValidationError::invalid_format("phone", "11 digits starting with 09"));
        }
        let price = Price::parse_millions(&price_raw)?;

        let year = year
            .parse()
            .map_err(|_| ValidationError::invalid_format("year", "not a number"))?;
        let mileage_km = km
            .parse()
            .map_err(|_| ValidationError::invalid_format("km", "not a number"))?;
        let insurance_months = if insurance.is_empty() {
            None
        } else {
            Some(
                insurance
                    .parse()
                    .map_err(|_| ValidationError::invalid_format("insurance", "not a number"))?,
            )
        };

        Ok(Self {
            category,
            vehicle_name,
            year,
            color,
            mileage_km,
            insurance_months,
            transmission,
            description,
            contact_phone: phone,
            submitter_handle: submitter_handle
                .map(|h| h.trim_start_matches('@').to_string())
                .filter(|h| !h.is_empty()),
            price,
        })
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn vehicle_name(&self) -> &str {
        &self.vehicle_name
    }

    pub fn year(&self) -> u16 {
        self.year
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn mileage_km(&self) -> u32 {
        self.mileage_km
    }

    pub fn insurance_months(&self) -> Option<u8> {
        self.insurance_months
    }

    pub fn transmission(&self) -> &str {
        &self.transmission
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn contact_phone(&self) -> &str {
        &self.contact_phone
    }

    pub fn submitter_handle(&self) -> Option<&str> {
        self.submitter_handle.as_deref()
    }

    pub fn price(&self) -> Price {
        self.price
    }

    /// Price spelled out in words; empty only for a zero price.
    pub fn price_words(&self) -> String {
        if self.price.units() == 0 {
            String::new()
        } else {
            self.price.to_words()
        }
    }

    pub(crate) fn set_price(&mut self, price: Price) {
        self.price = price;
    }

    pub(crate) fn set_description(&mut self, description: String) {
        self.description = description;
    }
}
