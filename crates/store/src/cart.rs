use async_trait::async_trait;

use crate::Result;
use common::{CartId, UserId};
use domain::Cart;

/// Persistence for per-user carts.
///
/// A cart is saved wholesale: the last write wins, mirroring a single
/// document store. No lock is held between a read and the following
/// save.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Looks up the cart owned by a user.
    async fn find_by_user(&self, user_id: UserId) -> Result<Option<Cart>>;

    /// Looks up a cart by its id. Used when resolving a checkout
    /// session's metadata back to the cart it was opened for.
    async fn find_by_id(&self, id: CartId) -> Result<Option<Cart>>;

    /// Inserts or replaces the cart.
    async fn save(&self, cart: &Cart) -> Result<()>;
}
