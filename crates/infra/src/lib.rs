//! Infrastructure layer: config, Postgres wiring, stores, services and projections.

pub mod catalog_store;
pub mod config;
pub mod db;
pub mod error;
pub mod ledger_store;
pub mod projections;
pub mod services;


pub use error::{StockError, StoreError};
