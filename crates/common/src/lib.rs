pub mod types;

pub use types::{CartId, LineId, ProductId, UserId};
