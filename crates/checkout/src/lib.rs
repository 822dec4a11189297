//! Cart operations and the checkout sequencer.
//!
//! `CartService` owns the advisory stock checks at cart-mutation time;
//! `CheckoutService` drives the summary → session → confirmation →
//! reconciliation sequence against the catalog store, cart store, and
//! payment gateway it is constructed with.

pub mod cart_service;
pub mod error;
pub mod sequencer;

pub use cart_service::CartService;
pub use error::{CheckoutError, Result};
pub use sequencer::{
    CheckoutService, CheckoutPolicy, ConfirmationOutcome, CreatedCheckout, PaymentStatusView,
    MINIMUM_CHARGE_CENTS,
};
