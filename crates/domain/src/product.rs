//! Catalog product and its stock invariants.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::money::Money;
use common::ProductId;

/// Colours a product variant may declare.
pub const VALID_COLOURS: &[&str] = &[
    "red", "blue", "green", "black", "white", "yellow", "purple", "pink", "orange", "gray",
    "brown", "default",
];

/// Sizes a product variant may declare.
pub const VALID_SIZES: &[&str] = &["xs", "sm", "md", "lg", "xl", "xxl"];

/// A catalog product.
///
/// Invariant: `in_stock == (total_stock > 0)` holds after every mutation
/// that touches stock; `sold_count` never decreases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub category: String,
    pub tags: Vec<String>,
    pub colours: Vec<String>,
    pub sizes: Vec<String>,
    pub images: Vec<String>,
    pub price: Money,
    pub total_stock: u32,
    pub in_stock: bool,
    pub sold_count: u32,
    pub is_trending: bool,
    pub popularity: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns true when `quantity` more units can be taken from stock.
    pub fn has_stock_for(&self, quantity: u32) -> bool {
        self.in_stock && self.total_stock >= quantity
    }

    /// Records a confirmed sale of `quantity` units.
    ///
    /// Stock is clamped at zero and `in_stock` is re-derived, matching
    /// the reconciliation step after a confirmed payment. The sale is
    /// applied even when it exceeds remaining stock: confirmation time
    /// is authoritative and an oversell surfaces as clamped stock, not
    /// as a rejected payment.
    pub fn apply_sale(&mut self, quantity: u32) {
        self.total_stock = self.total_stock.saturating_sub(quantity);
        self.sold_count += quantity;
        self.in_stock = self.total_stock > 0;
        self.updated_at = Utc::now();
    }

    /// Replaces the stock level, re-deriving `in_stock`.
    pub fn set_stock(&mut self, total_stock: u32) {
        self.total_stock = total_stock;
        self.in_stock = total_stock > 0;
        self.updated_at = Utc::now();
    }
}

/// Derives a URL slug from a product name.
pub fn slugify(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

/// Validates a colour list against the accepted vocabulary.
pub fn validate_colours(colours: &[String]) -> Result<(), DomainError> {
    for colour in colours {
        let normalized = colour.trim().to_lowercase();
        if !VALID_COLOURS.contains(&normalized.as_str()) {
            return Err(DomainError::InvalidColour(colour.clone()));
        }
    }
    Ok(())
}

/// Validates a size list against the accepted vocabulary.
pub fn validate_sizes(sizes: &[String]) -> Result<(), DomainError> {
    for size in sizes {
        let normalized = size.trim().to_lowercase();
        if !VALID_SIZES.contains(&normalized.as_str()) {
            return Err(DomainError::InvalidSize(size.clone()));
        }
    }
    Ok(())
}
