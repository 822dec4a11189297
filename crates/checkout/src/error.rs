//! Checkout and cart error taxonomy.

use common::{LineId, ProductId};
use domain::DomainError;
use gateway::GatewayError;
use store::StoreError;
use thiserror::Error;

/// Errors that can occur during cart and checkout operations.
///
/// Business-rule rejections (`OutOfStock`, `InsufficientStock`,
/// `EmptyCart`, `BelowMinimum`) are distinct from absences
/// (`*NotFound`) and from collaborator failures (`Store`, `Gateway`)
/// so the HTTP layer can map them to the right status category.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Input failed domain validation.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The referenced product does not exist.
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    /// The user has no cart.
    #[error("Cart not found")]
    CartNotFound,

    /// The referenced cart no longer exists.
    #[error("Cart from checkout session no longer exists")]
    SessionCartGone,

    /// The cart has no line with this id.
    #[error("Item not found in cart: {0}")]
    LineNotFound(LineId),

    /// The product is flagged out of stock.
    #[error("{name} is currently out of stock")]
    OutOfStock { name: String },

    /// Stock cannot cover the requested quantity.
    #[error("Only {available} items of {name} available in stock")]
    InsufficientStock { name: String, available: u32 },

    /// Checkout requires a non-empty cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Order total below the gateway's minimum chargeable amount.
    #[error("Order total of {total_cents} minor units is below the {minimum_cents} minimum")]
    BelowMinimum { total_cents: i64, minimum_cents: i64 },

    /// Payment gateway error.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// Store error.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type for cart and checkout operations.
pub type Result<T> = std::result::Result<T, CheckoutError>;
