//! Price value object.
//!
//! Prices are entered as a decimal quantity of *millions* ("80" or "120.5")
//! and stored as a whole number of currency units (tomans).

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::text::{contains_non_latin_digits, normalize_decimal_separator, strip_hidden_marks};
use crate::domain::foundation::ValidationError;

/// Units per "million" input step.
pub const UNITS_PER_MILLION: u64 = 1_000_000;

/// Words are capped at one hundred billion units.
pub const MAX_WORDS_AMOUNT: u64 = 100_000_000_000;

static MILLIONS_GRAMMAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]+)(?:\.([0-9]{1,3}))?$").expect("static price grammar"));

/// A validated price in whole currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(u64);

impl Price {
    /// Wraps an amount already expressed in whole units.
    pub const fn from_units(units: u64) -> Self {
        Self(units)
    }

    /// Parses a decimal "millions" quantity with at most three fractional digits.
    ///
    /// Non-Latin digits are rejected outright; whitespace and bidi marks are
    /// ignored and `,`/`٫` are accepted as the decimal separator.
    pub fn parse_millions(raw: &str) -> Result<Self, ValidationError> {
        if contains_non_latin_digits(raw) {
            return Err(ValidationError::non_latin_digits("price"));
        }
        let cleaned: String = normalize_decimal_separator(&strip_hidden_marks(raw))
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        if cleaned.is_empty() {
            return Err(ValidationError::empty_field("price"));
        }

        let captures = MILLIONS_GRAMMAR.captures(&cleaned).ok_or_else(|| {
            ValidationError::invalid_format(
                "price",
                "expected millions with up to 3 decimals, e.g. 120.5",
            )
        })?;

        let whole: u64 = captures[1]
            .parse()
            .map_err(|_| ValidationError::invalid_format("price", "amount too large"))?;
        let fraction = captures
            .get(2)
            .map(|m| format!("{:0<3}", m.as_str()))
            .unwrap_or_else(|| "000".to_string());
        let thousands: u64 = fraction
            .parse()
            .map_err(|_| ValidationError::invalid_format("price", "bad fraction"))?;

        whole
            .checked_mul(UNITS_PER_MILLION)
            .and_then(|units| units.checked_add(thousands * 1_000))
            .map(Self)
            .ok_or_else(|| ValidationError::invalid_format("price", "amount too large"))
    }

    /// Returns the amount in whole units.
    pub fn units(&self) -> u64 {
        self.0
    }

    /// Spells the amount as "N میلیارد و N میلیون و N هزار و N تومان".
    pub fn to_words(&self) -> String {
        let mut rest = self.0.min(MAX_WORDS_AMOUNT);
        let mut parts = Vec::new();
        for (size, label) in [
            (1_000_000_000, "میلیارد"),
            (1_000_000, "میلیون"),
            (1_000, "هزار"),
        ] {
            if rest >= size {
                parts.push(format!("{} {}", rest / size, label));
                rest %= size;
            }
        }
        if rest > 0 || parts.is_empty() {
            parts.push(rest.to_string());
        }
        format!("{} تومان", parts.join(" و "))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_words())
    }
}
