//! Inventory domain module (append-only stock ledger).
//!
//! This crate contains business rules for stock movements, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage). Balances are never
//! stored here; they are folds over ledger entries.

pub mod balance;
pub mod entry;
pub mod mutation;
pub mod reason;
pub mod transfer;

pub use balance::{LEDGER_PAGE_SIZE, StockAggregate, aggregate_by_product, saldo_as_of};
pub use entry::{LedgerEntry, LedgerEntryDraft, LedgerRef, MAX_ENTRY_QTY, RefType};
pub use mutation::RecordMutation;
pub use reason::{Direction, Reason};
pub use transfer::{CreateTransfer, Transfer, TransferItem, TransferPlan, TransferStatus, TwinSide};
