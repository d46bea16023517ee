//! Cart error types.

use thiserror::Error;

use shopcart_core::{ProductId, UnitPriceError};

use super::session::SessionStoreError;
use crate::db::RepositoryError;

/// Errors that can occur during cart operations.
///
/// Missing session keys, unknown product ids, and products that vanished from
/// the catalog are not errors; the cart treats them as no-ops or skips.
#[derive(Debug, Error)]
pub enum CartError {
    /// The session holds cart data that cannot be interpreted.
    #[error("malformed cart data{}: {}", fmt_product(.product_id.as_ref()), .reason)]
    MalformedCartData {
        product_id: Option<ProductId>,
        reason: String,
    },

    /// Reading or writing the session failed.
    #[error("session error: {0}")]
    Session(#[from] SessionStoreError),

    /// The product catalog could not be queried.
    #[error("catalog error: {0}")]
    Catalog(#[from] RepositoryError),
}

impl CartError {
    pub(crate) fn malformed_price(product_id: ProductId, err: &UnitPriceError) -> Self {
        Self::MalformedCartData {
            product_id: Some(product_id),
            reason: err.to_string(),
        }
    }
}

fn fmt_product(product_id: Option<&ProductId>) -> String {
    product_id.map_or_else(String::new, |id| format!(" for product {id}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_display_with_product() {
        let err = CartError::MalformedCartData {
            product_id: Some(ProductId::new(2)),
            reason: "bad price".to_string(),
        };
        assert_eq!(err.to_string(), "malformed cart data for product 2: bad price");
    }

    #[test]
    fn test_malformed_display_without_product() {
        let err = CartError::MalformedCartData {
            product_id: None,
            reason: "not an object".to_string(),
        };
        assert_eq!(err.to_string(), "malformed cart data: not an object");
    }
}
