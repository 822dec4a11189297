//! Cart operations: add, view, update, remove, clear.
//!
//! Every mutation re-reads the owning cart, applies the change in
//! memory, and saves the cart wholesale. Stock is checked against the
//! resulting line quantity at mutation time; it is checked again at
//! checkout, so a cart is allowed to go stale in between.

use std::sync::Arc;

use common::{LineId, ProductId, UserId};
use domain::{Cart, CartView, DomainError, Product};
use store::{CartStore, CatalogStore};

use crate::error::{CheckoutError, Result};

/// Orchestrates cart mutations against the catalog and cart stores.
#[derive(Clone)]
pub struct CartService {
    catalog: Arc<dyn CatalogStore>,
    carts: Arc<dyn CartStore>,
}

impl CartService {
    /// Creates a cart service over the given stores.
    pub fn new(catalog: Arc<dyn CatalogStore>, carts: Arc<dyn CartStore>) -> Self {
        Self { catalog, carts }
    }

    /// Adds `quantity` of a product variant to the user's cart, creating
    /// the cart on first use. Merges into an existing line when the
    /// (product, colour, size) triple already appears; the stock check
    /// covers the merged quantity, not just the increment.
    #[tracing::instrument(skip(self), fields(user_id = %user_id, product_id = %product_id))]
    pub async fn add_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
        colour: Option<String>,
        size: Option<String>,
    ) -> Result<CartView> {
        if quantity == 0 {
            return Err(DomainError::InvalidQuantity(quantity).into());
        }

        let product = self
            .catalog
            .find_by_id(product_id)
            .await?
            .ok_or(CheckoutError::ProductNotFound(product_id))?;
        check_variant(&product, colour.as_deref(), size.as_deref())?;

        if !product.in_stock {
            return Err(CheckoutError::OutOfStock {
                name: product.name.clone(),
            });
        }

        let mut cart = match self.carts.find_by_user(user_id).await? {
            Some(cart) => cart,
            None => Cart::new(user_id),
        };

        let resulting = cart.quantity_of(product_id, colour.as_deref(), size.as_deref()) + quantity;
        if resulting > product.total_stock {
            return Err(CheckoutError::InsufficientStock {
                name: product.name.clone(),
                available: product.total_stock,
            });
        }

        cart.add_line(product_id, quantity, colour, size);
        self.carts.save(&cart).await?;

        metrics::counter!("cart_items_added_total").increment(u64::from(quantity));
        tracing::info!(cart_id = %cart.id, quantity, "item added to cart");

        self.resolve(&cart).await
    }

    /// Returns the user's cart with product data resolved. A user who
    /// has never carted anything gets the empty view, not an error.
    #[tracing::instrument(skip(self), fields(user_id = %user_id))]
    pub async fn get_cart(&self, user_id: UserId) -> Result<CartView> {
        match self.carts.find_by_user(user_id).await? {
            Some(cart) => self.resolve(&cart).await,
            None => Ok(CartView::empty()),
        }
    }

    /// Sets a line's quantity to an absolute value, re-checking stock
    /// against that value.
    #[tracing::instrument(skip(self), fields(user_id = %user_id, line_id = %line_id))]
    pub async fn update_item(
        &self,
        user_id: UserId,
        line_id: LineId,
        quantity: u32,
    ) -> Result<CartView> {
        if quantity == 0 {
            return Err(DomainError::InvalidQuantity(quantity).into());
        }

        let mut cart = self
            .carts
            .find_by_user(user_id)
            .await?
            .ok_or(CheckoutError::CartNotFound)?;
        let line = cart
            .line(line_id)
            .ok_or(CheckoutError::LineNotFound(line_id))?;

        let product = self
            .catalog
            .find_by_id(line.product_id)
            .await?
            .ok_or(CheckoutError::ProductNotFound(line.product_id))?;

        if !product.in_stock {
            return Err(CheckoutError::OutOfStock {
                name: product.name.clone(),
            });
        }
        if quantity > product.total_stock {
            return Err(CheckoutError::InsufficientStock {
                name: product.name.clone(),
                available: product.total_stock,
            });
        }

        cart.set_line_quantity(line_id, quantity);
        self.carts.save(&cart).await?;

        self.resolve(&cart).await
    }

    /// Removes a line from the user's cart.
    #[tracing::instrument(skip(self), fields(user_id = %user_id, line_id = %line_id))]
    pub async fn remove_item(&self, user_id: UserId, line_id: LineId) -> Result<CartView> {
        let mut cart = self
            .carts
            .find_by_user(user_id)
            .await?
            .ok_or(CheckoutError::CartNotFound)?;

        if !cart.remove_line(line_id) {
            return Err(CheckoutError::LineNotFound(line_id));
        }
        self.carts.save(&cart).await?;

        self.resolve(&cart).await
    }

    /// Empties the user's cart. The cart itself survives for reuse.
    #[tracing::instrument(skip(self), fields(user_id = %user_id))]
    pub async fn clear_cart(&self, user_id: UserId) -> Result<CartView> {
        let mut cart = self
            .carts
            .find_by_user(user_id)
            .await?
            .ok_or(CheckoutError::CartNotFound)?;

        cart.clear();
        self.carts.save(&cart).await?;
        self.resolve(&cart).await
    }

    /// Pairs each line with its current product. Lines whose product has
    /// since been deleted are skipped with a warning rather than failing
    /// the whole view.
    async fn resolve(&self, cart: &Cart) -> Result<CartView> {
        let mut pairs = Vec::with_capacity(cart.items.len());
        for line in &cart.items {
            match self.catalog.find_by_id(line.product_id).await? {
                Some(product) => pairs.push((line.clone(), product)),
                None => {
                    tracing::warn!(
                        cart_id = %cart.id,
                        product_id = %line.product_id,
                        "cart line references a product that no longer exists"
                    );
                }
            }
        }
        Ok(CartView::from_lines(cart.id, &pairs))
    }
}

/// Rejects a colour or size the product is not offered in. Absent
/// options are always accepted.
fn check_variant(product: &Product, colour: Option<&str>, size: Option<&str>) -> Result<()> {
    if let Some(colour) = colour
        && !product.colours.iter().any(|c| c == colour)
    {
        return Err(DomainError::InvalidColour(colour.to_string()).into());
    }
    if let Some(size) = size
        && !product.sizes.iter().any(|s| s == size)
    {
        return Err(DomainError::InvalidSize(size.to_string()).into());
    }
    Ok(())
}
