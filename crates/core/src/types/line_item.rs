//! Cart line items as they are stored in the session.
//!
//! The stored shape is `{ "quantity": <int>, "price": "<decimal string>" }`.
//! The price stays a string until it is needed for arithmetic, so a corrupted
//! value in a session surfaces as a [`UnitPriceError`] at the point of use.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced when interpreting a stored unit price.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnitPriceError {
    /// The stored string is not a decimal number.
    #[error("invalid price {value:?}: {reason}")]
    Invalid { value: String, reason: String },

    /// Price times quantity does not fit in a decimal.
    #[error("price {value:?} overflows when multiplied by {quantity}")]
    Overflow { value: String, quantity: u32 },
}

/// Unit price captured when the product was added, kept in its string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitPrice(String);

impl UnitPrice {
    /// Wrap a raw stored value without validating it.
    #[must_use]
    pub fn from_raw(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The raw stored string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse the stored string into an exact decimal.
    ///
    /// # Errors
    ///
    /// Returns `UnitPriceError::Invalid` if the string is not a decimal.
    pub fn parse(&self) -> Result<Decimal, UnitPriceError> {
        Decimal::from_str(self.0.trim()).map_err(|e| UnitPriceError::Invalid {
            value: self.0.clone(),
            reason: e.to_string(),
        })
    }
}

impl From<Decimal> for UnitPrice {
    fn from(amount: Decimal) -> Self {
        Self(amount.to_string())
    }
}

impl fmt::Display for UnitPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single cart entry: how many of a product, at what captured price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub quantity: u32,
    pub price: UnitPrice,
}

impl LineItem {
    /// A fresh entry with zero quantity at the given price.
    #[must_use]
    pub fn empty(price: impl Into<UnitPrice>) -> Self {
        Self {
            quantity: 0,
            price: price.into(),
        }
    }

    /// `price * quantity` in exact decimal arithmetic.
    ///
    /// # Errors
    ///
    /// Returns `UnitPriceError` if the stored price is malformed or the
    /// product overflows.
    pub fn total_price(&self) -> Result<Decimal, UnitPriceError> {
        self.price
            .parse()?
            .checked_mul(Decimal::from(self.quantity))
            .ok_or_else(|| UnitPriceError::Overflow {
                value: self.price.0.clone(),
                quantity: self.quantity,
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_price_from_decimal_keeps_scale() {
        let price = UnitPrice::from(Decimal::new(500, 2));
        assert_eq!(price.as_str(), "5.00");
    }

    #[test]
    fn test_total_price_is_exact() {
        let item = LineItem {
            quantity: 3,
            price: UnitPrice::from_raw("9.99"),
        };
        assert_eq!(item.total_price().unwrap(), Decimal::new(2997, 2));
    }

    #[test]
    fn test_total_price_rejects_garbage() {
        let item = LineItem {
            quantity: 1,
            price: UnitPrice::from_raw("nine ninety-nine"),
        };
        let err = item.total_price().unwrap_err();
        assert!(matches!(err, UnitPriceError::Invalid { .. }));
    }

    #[test]
    fn test_total_price_overflow() {
        let item = LineItem {
            quantity: u32::MAX,
            price: UnitPrice::from(Decimal::MAX),
        };
        assert!(matches!(
            item.total_price().unwrap_err(),
            UnitPriceError::Overflow { .. }
        ));
    }

    #[test]
    fn test_stored_shape() {
        let item = LineItem::empty(Decimal::new(999, 2));
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json, serde_json::json!({ "quantity": 0, "price": "9.99" }));
    }
}
