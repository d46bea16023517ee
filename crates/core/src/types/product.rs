//! Catalog product.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;

/// A product as resolved from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// URL-safe identifier, unique across the catalog.
    pub slug: String,
    #[serde(default)]
    pub description: String,
    /// Current catalog price. Carts capture this value at add time.
    pub price: Decimal,
}
