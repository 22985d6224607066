use chrono::{SubsecRound, Utc};
use serde::Serialize;
use tracing::instrument;

use stockbook_core::{BranchId, TransferId};
use stockbook_inventory::{CreateTransfer, LedgerEntry, Transfer};

use crate::error::StockError;
use crate::ledger_store::{LedgerStore, UnitOfWork};

/// Default (and maximum) number of transfers returned by a listing.
pub const TRANSFER_PAGE_SIZE: usize = 100;

/// A transfer together with the ledger entries it produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferDetail {
    pub transfer: Transfer,
    pub entries: Vec<LedgerEntry>,
}

/// Atomic inter-branch movements.
#[derive(Debug, Clone)]
pub struct TransferService<L> {
    ledger: L,
}

impl<L> TransferService<L>
where
    L: LedgerStore,
{
    pub fn new(ledger: L) -> Self {
        Self { ledger }
    }

    /// Create a `COMPLETED` transfer and its 2N twin entries in one unit of work.
    ///
    /// Every precondition is checked before anything is written; on failure
    /// neither the transfer nor any of its entries is visible.
    #[instrument(
        skip(self, cmd),
        fields(
            from_branch_id = %cmd.from_branch_id,
            to_branch_id = %cmd.to_branch_id,
            items = cmd.items.len(),
            transfer_id = tracing::field::Empty
        ),
        err
    )]
    pub async fn create_transfer(&self, cmd: CreateTransfer) -> Result<Transfer, StockError> {
        let id = TransferId::new();
        tracing::Span::current().record("transfer_id", tracing::field::display(id));

        let plan = cmd.plan(id, Utc::now().trunc_subsecs(6))?;
        let committed = self.ledger.commit(UnitOfWork::from_plan(plan)).await?;

        let transfer = committed
            .transfers
            .into_iter()
            .next()
            .ok_or_else(|| StockError::TransactionFailure("transfer was not committed".to_string()))?;

        tracing::info!(entries = committed.entries.len(), "transfer completed");
        Ok(transfer)
    }

    /// Latest transfers first; a branch filter matches either side.
    #[instrument(skip(self), err)]
    pub async fn list_transfers(
        &self,
        branch_id: Option<BranchId>,
        limit: Option<usize>,
    ) -> Result<Vec<Transfer>, StockError> {
        let limit = limit.unwrap_or(TRANSFER_PAGE_SIZE).clamp(1, TRANSFER_PAGE_SIZE);
        Ok(self.ledger.list_transfers(branch_id, limit).await?)
    }

    #[instrument(skip(self), fields(transfer_id = %transfer_id), err)]
    pub async fn get_transfer(&self, transfer_id: TransferId) -> Result<TransferDetail, StockError> {
        let transfer = self
            .ledger
            .get_transfer(transfer_id)
            .await?
            .ok_or_else(|| StockError::NotFound(format!("transfer {transfer_id}")))?;
        let entries = self.ledger.entries_for_transfer(transfer_id).await?;
        Ok(TransferDetail { transfer, entries })
    }
}
