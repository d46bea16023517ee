//! Session-backed shopping cart.
//!
//! The cart is a map of product id to [`LineItem`] stored as one JSON object
//! under a configured session key:
//!
//! ```json
//! { "1": { "quantity": 2, "price": "9.99" } }
//! ```
//!
//! A [`SessionCart`] is built per request from the caller's session, mutated
//! through [`SessionCart::add`] and [`SessionCart::remove`], and written back
//! to the session after every mutation. Prices are captured as decimal strings
//! at add time; product names and other display fields are resolved from the
//! catalog on every call to [`SessionCart::lines`].
//!
//! # Example
//!
//! ```rust,ignore
//! let mut cart = SessionCart::initialize(session, "cart").await?;
//! cart.add(&product, 2, false).await?;
//!
//! for line in cart.lines(&catalog).await? {
//!     let line = line?;
//!     println!("{} x{} = {}", line.product.name, line.quantity, line.total_price);
//! }
//! ```

pub mod catalog;
pub mod error;
pub mod session;

use std::collections::{BTreeMap, HashMap, btree_map};

use rust_decimal::Decimal;
use serde_json::Value;

use shopcart_core::{LineItem, Product, ProductId};

pub use catalog::{CatalogBackend, MemoryCatalog, ProductCatalog};
pub use error::CartError;
pub use session::{MemorySession, SessionStore, SessionStoreError};

/// Default session key holding the cart.
pub const DEFAULT_CART_SESSION_KEY: &str = "cart";

/// A cart line resolved against the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    /// Current catalog record for the product.
    pub product: Product,
    pub quantity: u32,
    /// Unit price captured when the product was added.
    pub price: Decimal,
    /// `price * quantity`.
    pub total_price: Decimal,
}

/// Cart stored in a user's session.
#[derive(Debug)]
pub struct SessionCart<S> {
    session: S,
    key: String,
    items: BTreeMap<ProductId, LineItem>,
}

impl<S: SessionStore> SessionCart<S> {
    /// Load the cart from `session`, creating an empty one if absent.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Session` if the session backend fails, or
    /// `CartError::MalformedCartData` if the stored blob is not a cart.
    pub async fn initialize(session: S, key: impl Into<String>) -> Result<Self, CartError> {
        let key = key.into();

        let items = match session.get(&key).await? {
            Some(Value::Null) | None => {
                session.set(&key, Value::Object(serde_json::Map::new())).await?;
                BTreeMap::new()
            }
            Some(blob) => serde_json::from_value(blob).map_err(|e| {
                CartError::MalformedCartData {
                    product_id: None,
                    reason: e.to_string(),
                }
            })?,
        };

        Ok(Self {
            session,
            key,
            items,
        })
    }

    /// Add `quantity` of `product`, or set the quantity when `replace` is true.
    ///
    /// A product not yet in the cart is inserted with its current catalog
    /// price. Increments saturate at `u32::MAX`.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Session` if the cart cannot be written back.
    pub async fn add(
        &mut self,
        product: &Product,
        quantity: u32,
        replace: bool,
    ) -> Result<(), CartError> {
        let item = self
            .items
            .entry(product.id)
            .or_insert_with(|| LineItem::empty(product.price));

        item.quantity = if replace {
            quantity
        } else {
            item.quantity.saturating_add(quantity)
        };

        tracing::debug!(
            product_id = %product.id,
            quantity = item.quantity,
            replace,
            "Cart line updated"
        );

        self.persist().await
    }

    /// Remove a product from the cart. Returns whether it was present.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Session` if the cart cannot be written back.
    pub async fn remove(&mut self, product_id: ProductId) -> Result<bool, CartError> {
        if self.items.remove(&product_id).is_none() {
            return Ok(false);
        }

        tracing::debug!(product_id = %product_id, "Cart line removed");
        self.persist().await?;
        Ok(true)
    }

    /// Resolve every line against `catalog` with a single batched lookup.
    ///
    /// The returned iterator works on a snapshot of the cart and computes each
    /// line lazily. Lines whose product is no longer in the catalog are
    /// skipped, although they still count toward [`Self::size`] and
    /// [`Self::total`].
    ///
    /// # Errors
    ///
    /// Returns `CartError::Catalog` if the lookup fails. Individual lines yield
    /// `CartError::MalformedCartData` if their stored price is unreadable.
    pub async fn lines<C: ProductCatalog>(&self, catalog: &C) -> Result<CartLines, CartError> {
        let products = if self.items.is_empty() {
            HashMap::new()
        } else {
            let ids: Vec<ProductId> = self.items.keys().copied().collect();
            catalog
                .find_by_ids(&ids)
                .await?
                .into_iter()
                .map(|product| (product.id, product))
                .collect()
        };

        Ok(CartLines {
            entries: self.items.clone().into_iter(),
            products,
        })
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.items.values().map(|item| u64::from(item.quantity)).sum()
    }

    /// Sum of `price * quantity` over every line, in exact decimal arithmetic.
    ///
    /// # Errors
    ///
    /// Returns `CartError::MalformedCartData` if a stored price is unreadable.
    pub fn total(&self) -> Result<Decimal, CartError> {
        self.items
            .iter()
            .try_fold(Decimal::ZERO, |acc, (id, item)| {
                let line_total = item
                    .total_price()
                    .map_err(|e| CartError::malformed_price(*id, &e))?;
                acc.checked_add(line_total)
                    .ok_or_else(|| CartError::MalformedCartData {
                        product_id: Some(*id),
                        reason: "cart total overflows".to_owned(),
                    })
            })
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The stored line for `product_id`.
    #[must_use]
    pub fn get(&self, product_id: ProductId) -> Option<&LineItem> {
        self.items.get(&product_id)
    }

    /// Delete the cart from the session.
    ///
    /// The cart is consumed; the next [`Self::initialize`] on the same session
    /// starts from an empty cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Session` if the key cannot be deleted.
    pub async fn clear(self) -> Result<(), CartError> {
        tracing::debug!(lines = self.items.len(), "Cart cleared");
        Self::clear_session(&self.session, &self.key).await
    }

    /// Delete the cart stored under `key` without reading it.
    ///
    /// Works on carts that [`Self::initialize`] rejects as malformed.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Session` if the key cannot be deleted.
    pub async fn clear_session(session: &S, key: &str) -> Result<(), CartError> {
        session.delete(key).await?;
        session.mark_dirty().await;
        Ok(())
    }

    async fn persist(&self) -> Result<(), CartError> {
        let blob = serde_json::to_value(&self.items).map_err(SessionStoreError::from)?;
        self.session.set(&self.key, blob).await?;
        self.session.mark_dirty().await;
        Ok(())
    }
}

/// Lazy iterator over resolved cart lines, produced by [`SessionCart::lines`].
#[derive(Debug)]
pub struct CartLines {
    entries: btree_map::IntoIter<ProductId, LineItem>,
    products: HashMap<ProductId, Product>,
}

impl Iterator for CartLines {
    type Item = Result<CartLine, CartError>;

    fn next(&mut self) -> Option<Self::Item> {
        for (id, item) in self.entries.by_ref() {
            let Some(product) = self.products.remove(&id) else {
                tracing::warn!(product_id = %id, "Cart line has no catalog product, skipping");
                continue;
            };
            return Some(resolve_line(id, &item, product));
        }
        None
    }
}

fn resolve_line(id: ProductId, item: &LineItem, product: Product) -> Result<CartLine, CartError> {
    let price = item
        .price
        .parse()
        .map_err(|e| CartError::malformed_price(id, &e))?;
    let total_price = item
        .total_price()
        .map_err(|e| CartError::malformed_price(id, &e))?;

    Ok(CartLine {
        product,
        quantity: item.quantity,
        price,
        total_price,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    const KEY: &str = DEFAULT_CART_SESSION_KEY;

    fn product(id: i32, cents: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            slug: format!("product-{id}"),
            description: String::new(),
            price: Decimal::new(cents, 2),
        }
    }

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    async fn collect_lines(
        cart: &SessionCart<MemorySession>,
        catalog: &MemoryCatalog,
    ) -> Vec<CartLine> {
        cart.lines(catalog)
            .await
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    #[tokio::test]
    async fn test_initialize_creates_empty_cart() {
        let session = MemorySession::new();
        let cart = SessionCart::initialize(session.clone(), KEY).await.unwrap();

        assert!(cart.is_empty());
        assert_eq!(cart.size(), 0);
        assert_eq!(cart.total().unwrap(), Decimal::ZERO);
        assert_eq!(session.raw(KEY).await, Some(json!({})));
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let session = MemorySession::new();
        let catalog = MemoryCatalog::new([product(1, 999)]);

        let mut cart = SessionCart::initialize(session.clone(), KEY).await.unwrap();
        cart.add(&product(1, 999), 2, false).await.unwrap();

        let again = SessionCart::initialize(session.clone(), KEY).await.unwrap();
        let once_more = SessionCart::initialize(session, KEY).await.unwrap();

        assert_eq!(again.size(), 2);
        assert_eq!(
            collect_lines(&again, &catalog).await,
            collect_lines(&once_more, &catalog).await
        );
    }

    #[tokio::test]
    async fn test_scenario_add_replace_remove() {
        let session = MemorySession::new();
        let catalog = MemoryCatalog::new([product(1, 999)]);
        let mut cart = SessionCart::initialize(session, KEY).await.unwrap();

        cart.add(&product(1, 999), 2, false).await.unwrap();
        assert_eq!(cart.size(), 2);
        assert_eq!(cart.total().unwrap(), dec("19.98"));

        cart.add(&product(1, 999), 3, true).await.unwrap();
        assert_eq!(cart.size(), 3);
        assert_eq!(cart.total().unwrap(), dec("29.97"));

        assert!(cart.remove(ProductId::new(1)).await.unwrap());
        assert_eq!(cart.size(), 0);
        assert!(collect_lines(&cart, &catalog).await.is_empty());
    }

    #[tokio::test]
    async fn test_missing_catalog_product_is_skipped_but_counted() {
        let session = MemorySession::new();
        session
            .set(KEY, json!({ "2": { "quantity": 4, "price": "5.00" } }))
            .await
            .unwrap();
        let catalog = MemoryCatalog::default();

        let cart = SessionCart::initialize(session, KEY).await.unwrap();

        assert!(collect_lines(&cart, &catalog).await.is_empty());
        assert_eq!(cart.total().unwrap(), dec("20.00"));
        assert_eq!(cart.size(), 4);
    }

    #[tokio::test]
    async fn test_add_increments_and_keeps_add_time_price() {
        let session = MemorySession::new();
        let catalog = MemoryCatalog::new([product(1, 999)]);
        let mut cart = SessionCart::initialize(session, KEY).await.unwrap();

        cart.add(&product(1, 999), 1, false).await.unwrap();
        // Catalog price changes after the product is in the cart
        catalog.upsert(product(1, 1299)).await;
        cart.add(&product(1, 1299), 2, false).await.unwrap();

        let lines = collect_lines(&cart, &catalog).await;
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 3);
        assert_eq!(lines[0].price, dec("9.99"));
        assert_eq!(lines[0].total_price, dec("29.97"));
        assert_eq!(lines[0].product.price, dec("12.99"));
    }

    #[tokio::test]
    async fn test_lines_follow_product_id_order() {
        let session = MemorySession::new();
        let catalog = MemoryCatalog::new([product(3, 100), product(1, 200), product(2, 300)]);
        let mut cart = SessionCart::initialize(session, KEY).await.unwrap();

        for id in [3, 1, 2] {
            cart.add(&product(id, 100), 1, false).await.unwrap();
        }

        let ids: Vec<i32> = collect_lines(&cart, &catalog)
            .await
            .iter()
            .map(|line| line.product.id.as_i32())
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_lines_twice_are_equal() {
        let session = MemorySession::new();
        let catalog = MemoryCatalog::new([product(1, 999), product(2, 500)]);
        let mut cart = SessionCart::initialize(session, KEY).await.unwrap();
        cart.add(&product(1, 999), 2, false).await.unwrap();
        cart.add(&product(2, 500), 1, false).await.unwrap();

        let first = collect_lines(&cart, &catalog).await;
        let second = collect_lines(&cart, &catalog).await;

        assert_eq!(first, second);
        assert_eq!(cart.total().unwrap(), dec("24.98"));
    }

    #[tokio::test]
    async fn test_remove_absent_is_noop() {
        let session = MemorySession::new();
        let mut cart = SessionCart::initialize(session.clone(), KEY).await.unwrap();
        session.reset_dirty();

        assert!(!cart.remove(ProductId::new(42)).await.unwrap());
        assert!(!session.is_dirty());
    }

    #[tokio::test]
    async fn test_mutations_mark_session_dirty() {
        let session = MemorySession::new();
        let mut cart = SessionCart::initialize(session.clone(), KEY).await.unwrap();
        session.reset_dirty();

        cart.add(&product(1, 999), 1, false).await.unwrap();
        assert!(session.is_dirty());
        assert_eq!(
            session.raw(KEY).await,
            Some(json!({ "1": { "quantity": 1, "price": "9.99" } }))
        );
    }

    #[tokio::test]
    async fn test_clear_then_initialize_is_empty() {
        let session = MemorySession::new();
        let catalog = MemoryCatalog::new([product(1, 999)]);
        let mut cart = SessionCart::initialize(session.clone(), KEY).await.unwrap();
        cart.add(&product(1, 999), 5, false).await.unwrap();
        session.reset_dirty();

        cart.clear().await.unwrap();
        assert!(session.is_dirty());
        assert_eq!(session.raw(KEY).await, None);

        let cart = SessionCart::initialize(session, KEY).await.unwrap();
        assert_eq!(cart.size(), 0);
        assert_eq!(cart.total().unwrap(), Decimal::ZERO);
        assert!(collect_lines(&cart, &catalog).await.is_empty());
    }

    #[tokio::test]
    async fn test_clear_session_recovers_malformed_cart() {
        let session = MemorySession::new();
        session
            .set(KEY, json!({ "1": { "quantity": -1, "price": "9.99" } }))
            .await
            .unwrap();
        assert!(SessionCart::initialize(session.clone(), KEY).await.is_err());
        session.reset_dirty();

        SessionCart::clear_session(&session, KEY).await.unwrap();
        assert!(session.is_dirty());
        assert_eq!(session.raw(KEY).await, None);

        let cart = SessionCart::initialize(session, KEY).await.unwrap();
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_replace_with_zero_keeps_line() {
        let session = MemorySession::new();
        let catalog = MemoryCatalog::new([product(1, 999)]);
        let mut cart = SessionCart::initialize(session, KEY).await.unwrap();
        cart.add(&product(1, 999), 3, false).await.unwrap();

        cart.add(&product(1, 999), 0, true).await.unwrap();

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.get(ProductId::new(1)).unwrap().quantity, 0);
        assert_eq!(cart.size(), 0);
        assert_eq!(cart.total().unwrap(), Decimal::ZERO);
        let lines = collect_lines(&cart, &catalog).await;
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].total_price, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_size_follows_operation_sequence() {
        let session = MemorySession::new();
        let mut cart = SessionCart::initialize(session, KEY).await.unwrap();
        let mut expected: BTreeMap<i32, u64> = BTreeMap::new();

        // (product, quantity, replace, remove)
        let ops = [
            (1, 2, false, false),
            (2, 5, false, false),
            (1, 1, false, false),
            (3, 7, true, false),
            (2, 0, false, true),
            (1, 4, true, false),
            (2, 1, false, false),
            (3, 0, false, true),
            (4, 0, false, true),
        ];

        for (id, quantity, replace, remove) in ops {
            if remove {
                cart.remove(ProductId::new(id)).await.unwrap();
                expected.remove(&id);
            } else {
                cart.add(&product(id, 100), quantity, replace).await.unwrap();
                let entry = expected.entry(id).or_default();
                *entry = if replace {
                    u64::from(quantity)
                } else {
                    *entry + u64::from(quantity)
                };
            }
            assert_eq!(cart.size(), expected.values().sum::<u64>());
        }

        assert_eq!(cart.size(), 5);
        assert_eq!(cart.total().unwrap(), dec("5.00"));
    }

    #[tokio::test]
    async fn test_add_saturates() {
        let session = MemorySession::new();
        let mut cart = SessionCart::initialize(session, KEY).await.unwrap();

        cart.add(&product(1, 1), u32::MAX, false).await.unwrap();
        cart.add(&product(1, 1), 10, false).await.unwrap();

        assert_eq!(cart.get(ProductId::new(1)).unwrap().quantity, u32::MAX);
    }

    #[tokio::test]
    async fn test_malformed_price_is_reported() {
        let session = MemorySession::new();
        session
            .set(
                KEY,
                json!({
                    "1": { "quantity": 1, "price": "9.99" },
                    "2": { "quantity": 1, "price": "not-a-price" }
                }),
            )
            .await
            .unwrap();
        let catalog = MemoryCatalog::new([product(1, 999), product(2, 500)]);
        let cart = SessionCart::initialize(session, KEY).await.unwrap();

        let err = cart.total().unwrap_err();
        assert!(matches!(
            err,
            CartError::MalformedCartData { product_id: Some(id), .. } if id == ProductId::new(2)
        ));

        let results: Vec<_> = cart.lines(&catalog).await.unwrap().collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(CartError::MalformedCartData { .. })));
    }

    #[tokio::test]
    async fn test_malformed_blob_shape_is_reported() {
        let session = MemorySession::new();
        session.set(KEY, json!(["not", "a", "cart"])).await.unwrap();

        let err = SessionCart::initialize(session, KEY).await.unwrap_err();
        assert!(matches!(
            err,
            CartError::MalformedCartData {
                product_id: None,
                ..
            }
        ));
    }
}
