//! Domain layer for the storefront backend.
//!
//! Pure types and business rules: money arithmetic, product stock
//! invariants, cart line identity and merging, and the read models
//! (cart view, order summary) computed from live product data.
//! No I/O happens here.

pub mod cart;
pub mod error;
pub mod money;
pub mod product;
pub mod view;
pub mod wire;

pub use cart::{Cart, CartLine};
pub use common::{CartId, LineId, ProductId, UserId};
pub use error::DomainError;
pub use money::Money;
pub use product::{Product, slugify, validate_colours, validate_sizes};
pub use view::{CartView, CartViewLine, OrderSummary, SummaryLine};
pub use wire::StringList;
