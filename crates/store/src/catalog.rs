use async_trait::async_trait;

use crate::filter::{ProductFilter, ProductPage};
use crate::{Result, StoreError};
use common::ProductId;
use domain::Product;

/// Persistence for catalog products.
///
/// All implementations must be thread-safe (Send + Sync). Single-product
/// updates are atomic; nothing here spans multiple products in one
/// transaction.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Persists a new product.
    async fn insert(&self, product: &Product) -> Result<()>;

    /// Looks a product up by id.
    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>>;

    /// Looks a product up by its unique slug.
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Product>>;

    /// Lists products matching a filter, with the total match count.
    async fn list(&self, filter: &ProductFilter) -> Result<ProductPage>;

    /// Replaces a stored product wholesale. Returns false when absent.
    async fn update(&self, product: &Product) -> Result<bool>;

    /// Deletes a product. Returns false when absent.
    async fn delete(&self, id: ProductId) -> Result<bool>;

    /// Atomically records a confirmed sale: decrements `total_stock`
    /// (clamped at zero), increments `sold_count`, re-derives `in_stock`.
    /// Returns the updated product snapshot.
    async fn apply_sale(&self, id: ProductId, quantity: u32) -> Result<Product>;
}

/// Extension helpers shared by all catalog store implementations.
#[async_trait]
pub trait CatalogStoreExt: CatalogStore {
    /// Looks a product up by id, failing when absent.
    async fn get(&self, id: ProductId) -> Result<Product> {
        self.find_by_id(id)
            .await?
            .ok_or(StoreError::ProductNotFound(id))
    }
}

impl<T: CatalogStore + ?Sized> CatalogStoreExt for T {}
