use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::cart::CartStore;
use crate::catalog::CatalogStore;
use crate::filter::{ProductFilter, ProductPage, SortField, SortOrder};
use crate::{Result, StoreError};
use common::{CartId, ProductId, UserId};
use domain::{Cart, Product};

/// In-memory catalog store.
///
/// Backs tests and database-less runs with the same interface as the
/// PostgreSQL implementation.
#[derive(Clone, Default)]
pub struct InMemoryCatalogStore {
    products: Arc<RwLock<HashMap<ProductId, Product>>>,
}

impl InMemoryCatalogStore {
    /// Creates a new empty in-memory catalog store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored products.
    pub async fn product_count(&self) -> usize {
        self.products.read().await.len()
    }
}

fn compare(a: &Product, b: &Product, field: SortField) -> Ordering {
    match field {
        SortField::Popularity => a.popularity.cmp(&b.popularity),
        SortField::Price => a.price.cmp(&b.price),
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::SoldCount => a.sold_count.cmp(&b.sold_count),
        SortField::Name => a.name.cmp(&b.name),
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn insert(&self, product: &Product) -> Result<()> {
        self.products
            .write()
            .await
            .insert(product.id, product.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>> {
        Ok(self.products.read().await.get(&id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Product>> {
        Ok(self
            .products
            .read()
            .await
            .values()
            .find(|p| p.slug == slug)
            .cloned())
    }

    async fn list(&self, filter: &ProductFilter) -> Result<ProductPage> {
        let products = self.products.read().await;
        let mut matched: Vec<Product> = products
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();

        matched.sort_by(|a, b| {
            let ord = compare(a, b, filter.sort_by);
            match filter.order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
        });

        let total = matched.len() as u64;
        let page: Vec<Product> = matched
            .into_iter()
            .skip(filter.offset() as usize)
            .take(filter.limit as usize)
            .collect();

        Ok(ProductPage::new(page, total, filter))
    }

    async fn update(&self, product: &Product) -> Result<bool> {
        let mut products = self.products.write().await;
        if !products.contains_key(&product.id) {
            return Ok(false);
        }
        products.insert(product.id, product.clone());
        Ok(true)
    }

    async fn delete(&self, id: ProductId) -> Result<bool> {
        Ok(self.products.write().await.remove(&id).is_some())
    }

    async fn apply_sale(&self, id: ProductId, quantity: u32) -> Result<Product> {
        let mut products = self.products.write().await;
        let product = products
            .get_mut(&id)
            .ok_or(StoreError::ProductNotFound(id))?;
        product.apply_sale(quantity);
        Ok(product.clone())
    }
}

/// In-memory cart store with whole-cart, last-write-wins saves.
#[derive(Clone, Default)]
pub struct InMemoryCartStore {
    carts: Arc<RwLock<HashMap<CartId, Cart>>>,
}

impl InMemoryCartStore {
    /// Creates a new empty in-memory cart store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored carts.
    pub async fn cart_count(&self) -> usize {
        self.carts.read().await.len()
    }
}

#[async_trait]
impl CartStore for InMemoryCartStore {
    async fn find_by_user(&self, user_id: UserId) -> Result<Option<Cart>> {
        Ok(self
            .carts
            .read()
            .await
            .values()
            .find(|cart| cart.user_id == user_id)
            .cloned())
    }

    async fn find_by_id(&self, id: CartId) -> Result<Option<Cart>> {
        Ok(self.carts.read().await.get(&id).cloned())
    }

    async fn save(&self, cart: &Cart) -> Result<()> {
        self.carts.write().await.insert(cart.id, cart.clone());
        Ok(())
    }
}
