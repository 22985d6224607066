//! Catalog (master data) as seen by the stock ledger: branches, products and prices.
//!
//! Master-data CRUD lives elsewhere; this crate only models the records and the
//! pure price-resolution rule.

pub mod branch;
pub mod price;
pub mod product;

pub use branch::Branch;
pub use price::{Price, resolve_price, resolve_prices};
pub use product::{Product, sort_by_name};
