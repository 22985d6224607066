use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use stockbook_core::{BranchId, LedgerEntryId, ProductId, TransferId};
use stockbook_inventory::{LedgerEntry, LedgerRef, StockAggregate, Transfer, aggregate_by_product};

use super::r#trait::{LedgerOrder, LedgerStore};
use super::unit_of_work::{CommittedUnit, UnitOfWork};
use crate::error::StoreError;

#[derive(Debug, Default)]
struct LedgerState {
    entries: Vec<LedgerEntry>,
    transfers: Vec<Transfer>,
    last_sequence: u64,
}

/// In-memory append-only ledger.
///
/// Intended for tests/dev. A unit of work is validated and staged outside the
/// write guard, then appended under a single guard, so readers never observe
/// a partial unit.
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    state: RwLock<LedgerState>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of entries ever appended.
    pub fn len(&self) -> Result<usize, StoreError> {
        let state = self.state.read().map_err(|_| Self::poisoned())?;
        Ok(state.entries.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    fn poisoned() -> StoreError {
        StoreError::Transaction("lock poisoned".to_string())
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn commit(&self, unit: UnitOfWork) -> Result<CommittedUnit, StoreError> {
        unit.validate()?;

        let mut state = self.state.write().map_err(|_| Self::poisoned())?;

        for t in unit.transfers() {
            if state.transfers.iter().any(|existing| existing.id == t.id) {
                return Err(StoreError::Transaction(format!(
                    "transfer {} already exists",
                    t.id
                )));
            }
        }

        let (transfers, drafts) = unit.into_parts();
        let created_at = Utc::now();
        let mut next = state.last_sequence;
        let entries: Vec<LedgerEntry> = drafts
            .into_iter()
            .map(|draft| {
                next += 1;
                draft.into_entry(LedgerEntryId::new(), created_at, next)
            })
            .collect();

        // Nothing below can fail: the unit becomes visible as a whole.
        state.last_sequence = next;
        state.transfers.extend(transfers.iter().cloned());
        state.entries.extend(entries.iter().cloned());

        tracing::debug!(
            transfers = transfers.len(),
            entries = entries.len(),
            last_sequence = next,
            "ledger unit committed"
        );

        Ok(CommittedUnit { transfers, entries })
    }

    async fn list_by_branch_and_product(
        &self,
        branch_id: BranchId,
        product_id: ProductId,
        limit: usize,
        order: LedgerOrder,
    ) -> Result<Vec<LedgerEntry>, StoreError> {
        let state = self.state.read().map_err(|_| Self::poisoned())?;

        let mut rows: Vec<LedgerEntry> = state
            .entries
            .iter()
            .filter(|e| e.branch_id == branch_id && e.product_id == product_id)
            .cloned()
            .collect();

        match order {
            LedgerOrder::CreatedAtAsc => rows.sort_by_key(LedgerEntry::recency_key),
            LedgerOrder::CreatedAtDesc => {
                rows.sort_by_key(|e| std::cmp::Reverse(e.recency_key()))
            }
        }
        rows.truncate(limit);
        Ok(rows)
    }

    async fn aggregate_by_product(
        &self,
        branch_id: BranchId,
    ) -> Result<HashMap<ProductId, StockAggregate>, StoreError> {
        let state = self.state.read().map_err(|_| Self::poisoned())?;
        Ok(aggregate_by_product(
            state.entries.iter().filter(|e| e.branch_id == branch_id),
        ))
    }

    async fn entries_for_transfer(
        &self,
        transfer_id: TransferId,
    ) -> Result<Vec<LedgerEntry>, StoreError> {
        let state = self.state.read().map_err(|_| Self::poisoned())?;
        Ok(state
            .entries
            .iter()
            .filter(|e| e.reference == LedgerRef::Transfer(transfer_id))
            .cloned()
            .collect())
    }

    async fn list_transfers(
        &self,
        branch_id: Option<BranchId>,
        limit: usize,
    ) -> Result<Vec<Transfer>, StoreError> {
        let state = self.state.read().map_err(|_| Self::poisoned())?;
        // Insertion order is commit order, so reversing yields newest first.
        Ok(state
            .transfers
            .iter()
            .rev()
            .filter(|t| {
                branch_id.is_none_or(|b| t.from_branch_id == b || t.to_branch_id == b)
            })
            .take(limit)
            .cloned()
            .collect())
    }

    async fn get_transfer(&self, transfer_id: TransferId) -> Result<Option<Transfer>, StoreError> {
        let state = self.state.read().map_err(|_| Self::poisoned())?;
        Ok(state.transfers.iter().find(|t| t.id == transfer_id).cloned())
    }
}
