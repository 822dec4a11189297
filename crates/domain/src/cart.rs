//! Per-user cart and its line items.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use common::{CartId, LineId, ProductId, UserId};

/// A single entry in a cart.
///
/// Line identity is the (product, colour, size) triple: the same product
/// in a different colour or size is a distinct line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: LineId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub colour: Option<String>,
    pub size: Option<String>,
}

impl CartLine {
    /// Returns true when this line holds the given variant of the product.
    pub fn matches_variant(
        &self,
        product_id: ProductId,
        colour: Option<&str>,
        size: Option<&str>,
    ) -> bool {
        self.product_id == product_id
            && self.colour.as_deref() == colour
            && self.size.as_deref() == size
    }
}

/// A user's cart: an ordered list of lines, owned by exactly one user.
///
/// Created lazily on the first add; cleared (never deleted) on explicit
/// clear or confirmed payment. Invariant: every line has quantity >= 1
/// and no two lines share the same (product, colour, size) triple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    pub id: CartId,
    pub user_id: UserId,
    pub items: Vec<CartLine>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    /// Creates an empty cart for a user.
    pub fn new(user_id: UserId) -> Self {
        let now = Utc::now();
        Self {
            id: CartId::new(),
            user_id,
            items: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns the quantity already carted for a variant, 0 if absent.
    pub fn quantity_of(
        &self,
        product_id: ProductId,
        colour: Option<&str>,
        size: Option<&str>,
    ) -> u32 {
        self.items
            .iter()
            .find(|line| line.matches_variant(product_id, colour, size))
            .map(|line| line.quantity)
            .unwrap_or(0)
    }

    /// Adds `quantity` of a variant, merging into an existing line when
    /// the (product, colour, size) triple already appears.
    pub fn add_line(
        &mut self,
        product_id: ProductId,
        quantity: u32,
        colour: Option<String>,
        size: Option<String>,
    ) {
        if let Some(line) = self
            .items
            .iter_mut()
            .find(|line| line.matches_variant(product_id, colour.as_deref(), size.as_deref()))
        {
            line.quantity += quantity;
        } else {
            self.items.push(CartLine {
                id: LineId::new(),
                product_id,
                quantity,
                colour,
                size,
            });
        }
        self.updated_at = Utc::now();
    }

    /// Looks up a line by its identifier.
    pub fn line(&self, line_id: LineId) -> Option<&CartLine> {
        self.items.iter().find(|line| line.id == line_id)
    }

    /// Replaces the quantity of a line. Returns false when the line is absent.
    pub fn set_line_quantity(&mut self, line_id: LineId, quantity: u32) -> bool {
        match self.items.iter_mut().find(|line| line.id == line_id) {
            Some(line) => {
                line.quantity = quantity;
                self.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }

    /// Removes a line. Returns false when the line is absent.
    pub fn remove_line(&mut self, line_id: LineId) -> bool {
        let before = self.items.len();
        self.items.retain(|line| line.id != line_id);
        if self.items.len() == before {
            return false;
        }
        self.updated_at = Utc::now();
        true
    }

    /// Empties the line list; the cart itself survives.
    pub fn clear(&mut self) {
        self.items.clear();
        self.updated_at = Utc::now();
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_line_appends_new_variant() {
        let mut cart = Cart::new(UserId::new());
        let product = ProductId::new();

        cart.add_line(product, 2, Some("red".into()), Some("md".into()));
        cart.add_line(product, 1, Some("blue".into()), Some("md".into()));

        assert_eq!(cart.items.len(), 2);
        assert_eq!(cart.items[0].quantity, 2);
        assert_eq!(cart.items[1].quantity, 1);
    }

    #[test]
    fn add_line_merges_same_variant() {
        let mut cart = Cart::new(UserId::new());
        let product = ProductId::new();

        cart.add_line(product, 2, Some("red".into()), None);
        cart.add_line(product, 3, Some("red".into()), None);

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].quantity, 5);
    }

    #[test]
    fn variant_identity_distinguishes_none_from_some() {
        let mut cart = Cart::new(UserId::new());
        let product = ProductId::new();

        cart.add_line(product, 1, None, None);
        cart.add_line(product, 1, Some("red".into()), None);

        assert_eq!(cart.items.len(), 2);
        assert_eq!(cart.quantity_of(product, None, None), 1);
        assert_eq!(cart.quantity_of(product, Some("red"), None), 1);
    }

    #[test]
    fn set_line_quantity_replaces() {
        let mut cart = Cart::new(UserId::new());
        cart.add_line(ProductId::new(), 2, None, None);
        let line_id = cart.items[0].id;

        assert!(cart.set_line_quantity(line_id, 7));
        assert_eq!(cart.items[0].quantity, 7);

        assert!(!cart.set_line_quantity(LineId::new(), 1));
    }

    #[test]
    fn remove_line() {
        let mut cart = Cart::new(UserId::new());
        cart.add_line(ProductId::new(), 1, None, None);
        let line_id = cart.items[0].id;

        assert!(cart.remove_line(line_id));
        assert!(cart.is_empty());
        assert!(!cart.remove_line(line_id));
    }

    #[test]
    fn clear_keeps_cart_identity() {
        let mut cart = Cart::new(UserId::new());
        cart.add_line(ProductId::new(), 4, None, None);
        let id = cart.id;

        cart.clear();

        assert!(cart.is_empty());
        assert_eq!(cart.id, id);
    }
}
