//! Persistence layer: catalog and cart stores.
//!
//! Both stores are defined as traits with a PostgreSQL implementation
//! for production and an in-memory implementation backing tests and
//! database-less runs. Stock math lives in the domain layer; the stores
//! only make its application durable (and, for `apply_sale`, atomic).

pub mod cart;
pub mod catalog;
pub mod error;
pub mod filter;
pub mod memory;
pub mod postgres;

pub use cart::CartStore;
pub use catalog::{CatalogStore, CatalogStoreExt};
pub use error::{Result, StoreError};
pub use filter::{ProductFilter, ProductPage, SortField, SortOrder};
pub use memory::{InMemoryCartStore, InMemoryCatalogStore};
pub use postgres::{PostgresCartStore, PostgresCatalogStore, run_migrations};
