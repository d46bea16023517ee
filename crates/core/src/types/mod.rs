//! Core types for Shopcart.
//!
//! This module provides type-safe wrappers for the catalog and cart domain.

pub mod id;
pub mod line_item;
pub mod price;
pub mod product;

pub use id::*;
pub use line_item::{LineItem, UnitPrice, UnitPriceError};
pub use price::{CurrencyCode, Price, UnknownCurrency};
pub use product::Product;
