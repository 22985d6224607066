//! Application services: validate a command, build a unit of work, commit it.
//!
//! Services hold no state besides their store handles and contain no IO of
//! their own; they compose the store traits.

pub mod mutation;
pub mod transfer;

pub use mutation::StockMutationService;
pub use transfer::{TRANSFER_PAGE_SIZE, TransferDetail, TransferService};
