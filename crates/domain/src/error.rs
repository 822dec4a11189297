//! Domain error types.

use thiserror::Error;

/// Errors raised by pure domain validation.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Quantity must be at least 1.
    #[error("Quantity must be at least 1, got {0}")]
    InvalidQuantity(u32),

    /// Price must not be negative.
    #[error("Price must not be negative, got {0}")]
    InvalidPrice(f64),

    /// Colour outside the accepted vocabulary.
    #[error("Invalid colour '{0}'")]
    InvalidColour(String),

    /// Size outside the accepted vocabulary.
    #[error("Invalid size '{0}'")]
    InvalidSize(String),

    /// A required field was empty.
    #[error("{0} must not be empty")]
    EmptyField(&'static str),
}
