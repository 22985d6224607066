//! Read side of the catalog (branches, products, prices).
//!
//! Master-data writes belong to another service; the in-memory store exposes
//! inserts only for tests and demo seeding.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;
pub mod seed;

pub use in_memory::InMemoryCatalogStore;
pub use postgres::PostgresCatalogStore;
pub use r#trait::CatalogStore;
pub use seed::{DemoCatalog, seed_demo_catalog};
