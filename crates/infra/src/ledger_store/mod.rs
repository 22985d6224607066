//! Append-only stock ledger boundary.
//!
//! Entries are never updated or deleted; balances are derived by aggregation.
//! Every write goes through a [`UnitOfWork`] that is committed atomically.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;
pub mod unit_of_work;

pub use in_memory::InMemoryLedgerStore;
pub use postgres::PostgresLedgerStore;
pub use r#trait::{LedgerOrder, LedgerStore};
pub use unit_of_work::{CommittedUnit, UnitOfWork};
