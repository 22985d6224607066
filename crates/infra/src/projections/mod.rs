//! Read-side projections computed on demand from the ledger and catalog.
//!
//! Nothing here is cached: every call is a point-in-time fold, so there is no
//! read model to rebuild.

pub mod stock_summary;

pub use stock_summary::{StockSummaryProjector, StockSummaryRow};
