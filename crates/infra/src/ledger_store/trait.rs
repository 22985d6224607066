use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use stockbook_core::{BranchId, ProductId, TransferId};
use stockbook_inventory::{LedgerEntry, LedgerEntryDraft, StockAggregate, Transfer};

use super::unit_of_work::{CommittedUnit, UnitOfWork};
use crate::error::StoreError;

/// Ordering of ledger listings. Ties on `created_at` break on `sequence`.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerOrder {
    #[default]
    CreatedAtDesc,
    CreatedAtAsc,
}

/// Append-only stock ledger.
///
/// ## Write semantics
///
/// `commit()`:
/// - validates every draft and every transfer twin set before anything becomes visible
/// - assigns ids, `created_at` and strictly increasing `sequence` numbers
/// - persists the whole unit atomically (all or nothing)
///
/// `append()` is a one-draft unit of work.
///
/// ## Read semantics
///
/// Reads are non-locking and point-in-time. Unknown branches or products
/// yield empty results, not errors.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn append(&self, draft: LedgerEntryDraft) -> Result<LedgerEntry, StoreError> {
        let committed = self.commit(UnitOfWork::single(draft)).await?;
        committed
            .entries
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Transaction("append committed no entry".to_string()))
    }

    async fn commit(&self, unit: UnitOfWork) -> Result<CommittedUnit, StoreError>;

    async fn list_by_branch_and_product(
        &self,
        branch_id: BranchId,
        product_id: ProductId,
        limit: usize,
        order: LedgerOrder,
    ) -> Result<Vec<LedgerEntry>, StoreError>;

    /// `product -> {sum(qty), max(created_at)}` for one branch.
    async fn aggregate_by_product(
        &self,
        branch_id: BranchId,
    ) -> Result<HashMap<ProductId, StockAggregate>, StoreError>;

    /// Entries referencing a transfer, in sequence order.
    async fn entries_for_transfer(
        &self,
        transfer_id: TransferId,
    ) -> Result<Vec<LedgerEntry>, StoreError>;

    /// Latest transfers first. A branch filter matches either side.
    async fn list_transfers(
        &self,
        branch_id: Option<BranchId>,
        limit: usize,
    ) -> Result<Vec<Transfer>, StoreError>;

    async fn get_transfer(&self, transfer_id: TransferId) -> Result<Option<Transfer>, StoreError>;
}

#[async_trait]
impl<S> LedgerStore for Arc<S>
where
    S: LedgerStore + ?Sized,
{
    async fn append(&self, draft: LedgerEntryDraft) -> Result<LedgerEntry, StoreError> {
        (**self).append(draft).await
    }

    async fn commit(&self, unit: UnitOfWork) -> Result<CommittedUnit, StoreError> {
        (**self).commit(unit).await
    }

    async fn list_by_branch_and_product(
        &self,
        branch_id: BranchId,
        product_id: ProductId,
        limit: usize,
        order: LedgerOrder,
    ) -> Result<Vec<LedgerEntry>, StoreError> {
        (**self)
            .list_by_branch_and_product(branch_id, product_id, limit, order)
            .await
    }

    async fn aggregate_by_product(
        &self,
        branch_id: BranchId,
    ) -> Result<HashMap<ProductId, StockAggregate>, StoreError> {
        (**self).aggregate_by_product(branch_id).await
    }

    async fn entries_for_transfer(
        &self,
        transfer_id: TransferId,
    ) -> Result<Vec<LedgerEntry>, StoreError> {
        (**self).entries_for_transfer(transfer_id).await
    }

    async fn list_transfers(
        &self,
        branch_id: Option<BranchId>,
        limit: usize,
    ) -> Result<Vec<Transfer>, StoreError> {
        (**self).list_transfers(branch_id, limit).await
    }

    async fn get_transfer(&self, transfer_id: TransferId) -> Result<Option<Transfer>, StoreError> {
        (**self).get_transfer(transfer_id).await
    }
}
