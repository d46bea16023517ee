//! Product lookup contract consumed by the cart.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::RwLock;

use shopcart_core::{Product, ProductId};

use crate::db::{PgProductCatalog, RepositoryError};

/// Batch lookup of products by id.
///
/// Implementations return the subset of requested ids that exist; missing
/// ids are simply absent from the result.
pub trait ProductCatalog: Send + Sync {
    /// Resolve all `ids` in a single lookup.
    fn find_by_ids(
        &self,
        ids: &[ProductId],
    ) -> impl Future<Output = Result<Vec<Product>, RepositoryError>> + Send;

    /// Resolve one product.
    fn find_by_id(
        &self,
        id: ProductId,
    ) -> impl Future<Output = Result<Option<Product>, RepositoryError>> + Send {
        async move {
            let products = self.find_by_ids(&[id]).await?;
            Ok(products.into_iter().find(|p| p.id == id))
        }
    }
}

/// Catalog held in memory, keyed by product id.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    products: Arc<RwLock<BTreeMap<ProductId, Product>>>,
}

impl MemoryCatalog {
    /// Create a catalog from a list of products.
    #[must_use]
    pub fn new(products: impl IntoIterator<Item = Product>) -> Self {
        Self {
            products: Arc::new(RwLock::new(
                products.into_iter().map(|p| (p.id, p)).collect(),
            )),
        }
    }

    /// Insert or replace a product.
    pub async fn upsert(&self, product: Product) {
        self.products.write().await.insert(product.id, product);
    }

    /// Delete a product, returning it if it existed.
    pub async fn delete(&self, id: ProductId) -> Option<Product> {
        self.products.write().await.remove(&id)
    }
}

impl ProductCatalog for MemoryCatalog {
    async fn find_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        let products = self.products.read().await;
        Ok(ids.iter().filter_map(|id| products.get(id).cloned()).collect())
    }
}

/// Catalog backend selected at startup.
#[derive(Debug, Clone)]
pub enum CatalogBackend {
    Postgres(PgProductCatalog),
    Memory(MemoryCatalog),
}

impl CatalogBackend {
    /// Check that the backend is reachable.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if Postgres cannot be queried.
    pub async fn ping(&self) -> Result<(), RepositoryError> {
        match self {
            Self::Postgres(catalog) => catalog.ping().await,
            Self::Memory(_) => Ok(()),
        }
    }
}

impl ProductCatalog for CatalogBackend {
    async fn find_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        match self {
            Self::Postgres(catalog) => catalog.find_by_ids(ids).await,
            Self::Memory(catalog) => catalog.find_by_ids(ids).await,
        }
    }
}
