//! Read models computed from a cart and its resolved products.
//!
//! Amounts here are major-unit decimals ready for the HTTP boundary;
//! they are recomputed from live product prices on every read and never
//! cached on the cart.

use serde::{Deserialize, Serialize};

use crate::cart::CartLine;
use crate::product::Product;
use common::{CartId, LineId, ProductId};

/// One cart line with its product data resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartViewLine {
    pub line_id: LineId,
    pub product_id: ProductId,
    pub name: String,
    pub slug: String,
    pub image: Option<String>,
    pub unit_price: f64,
    pub quantity: u32,
    pub colour: Option<String>,
    pub size: Option<String>,
    pub line_total: f64,
    pub in_stock: bool,
}

/// The cart as presented to its owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartView {
    pub cart_id: Option<CartId>,
    pub items: Vec<CartViewLine>,
    pub total_items: u32,
    pub total_amount: f64,
}

impl CartView {
    /// The view of a user who has no cart yet: a valid empty state,
    /// not an error.
    pub fn empty() -> Self {
        Self {
            cart_id: None,
            items: Vec::new(),
            total_items: 0,
            total_amount: 0.0,
        }
    }

    /// Builds the view from cart lines paired with their products.
    pub fn from_lines(cart_id: CartId, lines: &[(CartLine, Product)]) -> Self {
        let items: Vec<CartViewLine> = lines
            .iter()
            .map(|(line, product)| CartViewLine {
                line_id: line.id,
                product_id: product.id,
                name: product.name.clone(),
                slug: product.slug.clone(),
                image: product.images.first().cloned(),
                unit_price: product.price.as_major_f64(),
                quantity: line.quantity,
                colour: line.colour.clone(),
                size: line.size.clone(),
                line_total: product.price.multiply(line.quantity).as_major_f64(),
                in_stock: product.in_stock,
            })
            .collect();

        let total_items = lines.iter().map(|(line, _)| line.quantity).sum();
        let total_amount = lines
            .iter()
            .map(|(line, product)| product.price.multiply(line.quantity).cents())
            .sum::<i64>() as f64
            / 100.0;

        Self {
            cart_id: Some(cart_id),
            items,
            total_items,
            total_amount,
        }
    }
}

/// One priced entry of an order summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryLine {
    pub product_id: ProductId,
    pub name: String,
    pub price: f64,
    pub quantity: u32,
    pub total: f64,
    pub colour: Option<String>,
    pub size: Option<String>,
}

/// A read-only order summary: one entry per cart line plus totals.
/// This is a preview, not a commitment; nothing is reserved by it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderSummary {
    pub lines: Vec<SummaryLine>,
    pub total_amount: f64,
    pub total_items: u32,
}

impl OrderSummary {
    /// Builds the summary from cart lines paired with their products.
    ///
    /// `total_items` is the sum of line quantities, the same definition
    /// the cart view uses.
    pub fn from_lines(lines: &[(CartLine, Product)]) -> Self {
        let entries: Vec<SummaryLine> = lines
            .iter()
            .map(|(line, product)| SummaryLine {
                product_id: product.id,
                name: product.name.clone(),
                price: product.price.as_major_f64(),
                quantity: line.quantity,
                total: product.price.multiply(line.quantity).as_major_f64(),
                colour: line.colour.clone(),
                size: line.size.clone(),
            })
            .collect();

        let total_amount = lines
            .iter()
            .map(|(line, product)| product.price.multiply(line.quantity).cents())
            .sum::<i64>() as f64
            / 100.0;
        let total_items = lines.iter().map(|(line, _)| line.quantity).sum();

        Self {
            lines: entries,
            total_amount,
            total_items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::Cart;
    use crate::money::Money;
    use chrono::Utc;
    use common::UserId;

    fn product(price_cents: i64, stock: u32) -> Product {
        let now = Utc::now();
        Product {
            id: ProductId::new(),
            name: "Widget".to_string(),
            slug: "widget".to_string(),
            description: String::new(),
            category: "general".to_string(),
            tags: vec![],
            colours: vec!["default".to_string()],
            sizes: vec!["md".to_string()],
            images: vec!["https://img.example/1.jpg".to_string()],
            price: Money::from_cents(price_cents),
            total_stock: stock,
            in_stock: stock > 0,
            sold_count: 0,
            is_trending: false,
            popularity: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn paired(quantities: &[(i64, u32)]) -> (Cart, Vec<(CartLine, Product)>) {
        let mut cart = Cart::new(UserId::new());
        let mut pairs = Vec::new();
        for &(price, qty) in quantities {
            let p = product(price, 100);
            cart.add_line(p.id, qty, None, None);
            let line = cart.items.last().unwrap().clone();
            pairs.push((line, p));
        }
        (cart, pairs)
    }

    #[test]
    fn empty_view_is_all_zeroes() {
        let view = CartView::empty();
        assert!(view.items.is_empty());
        assert_eq!(view.total_items, 0);
        assert_eq!(view.total_amount, 0.0);
    }

    #[test]
    fn cart_view_totals_recomputed_from_prices() {
        let (cart, pairs) = paired(&[(1000, 2), (2550, 1)]);
        let view = CartView::from_lines(cart.id, &pairs);

        assert_eq!(view.items.len(), 2);
        assert_eq!(view.total_items, 3);
        assert_eq!(view.total_amount, 45.50);
        assert_eq!(view.items[0].line_total, 20.0);
    }

    #[test]
    fn summary_totals_match_cart_view_definition() {
        let (_, pairs) = paired(&[(199, 3), (500, 2)]);
        let summary = OrderSummary::from_lines(&pairs);

        assert_eq!(summary.lines.len(), 2);
        // Sum of quantities, not distinct line count.
        assert_eq!(summary.total_items, 5);
        assert_eq!(summary.total_amount, 15.97);
        assert_eq!(summary.lines[0].total, 5.97);
    }
}
