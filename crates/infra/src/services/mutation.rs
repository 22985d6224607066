use tracing::instrument;

use stockbook_core::{BranchId, ProductId};
use stockbook_inventory::{LEDGER_PAGE_SIZE, LedgerEntry, RecordMutation};

use crate::error::StockError;
use crate::ledger_store::{LedgerOrder, LedgerStore};

/// Manual stock adjustments at one branch, plus the per-product ledger view.
#[derive(Debug, Clone)]
pub struct StockMutationService<L> {
    ledger: L,
}

impl<L> StockMutationService<L>
where
    L: LedgerStore,
{
    pub fn new(ledger: L) -> Self {
        Self { ledger }
    }

    /// Append exactly one entry with `qty = signed(direction, qty)` and a
    /// `Mutation` reference. Negative resulting balances are allowed.
    #[instrument(
        skip(self, cmd),
        fields(
            branch_id = %cmd.branch_id,
            product_id = %cmd.product_id,
            reason = %cmd.reason
        ),
        err
    )]
    pub async fn record_mutation(&self, cmd: RecordMutation) -> Result<LedgerEntry, StockError> {
        let draft = cmd.to_draft()?;
        let entry = self.ledger.append(draft).await?;
        tracing::info!(entry_id = %entry.id, qty = entry.qty, "stock mutation recorded");
        Ok(entry)
    }

    /// Newest entries first. `limit` is clamped to `1..=LEDGER_PAGE_SIZE`;
    /// `None` means a full page.
    #[instrument(skip(self), err)]
    pub async fn list_ledger(
        &self,
        branch_id: BranchId,
        product_id: ProductId,
        limit: Option<usize>,
    ) -> Result<Vec<LedgerEntry>, StockError> {
        branch_id.require()?;
        product_id.require()?;
        let limit = limit.unwrap_or(LEDGER_PAGE_SIZE).clamp(1, LEDGER_PAGE_SIZE);
        Ok(self
            .ledger
            .list_by_branch_and_product(branch_id, product_id, limit, LedgerOrder::CreatedAtDesc)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use stockbook_inventory::{Direction, MAX_ENTRY_QTY, Reason, RefType};

    use crate::ledger_store::InMemoryLedgerStore;

    fn cmd(
        branch_id: BranchId,
        product_id: ProductId,
        direction: Direction,
        qty: i64,
        reason: Reason,
    ) -> RecordMutation {
        RecordMutation {
            branch_id,
            product_id,
            direction,
            qty,
            reason,
            note: None,
        }
    }

    #[tokio::test]
    async fn in_then_out_leaves_derived_saldo() {
        let ledger = Arc::new(InMemoryLedgerStore::new());
        let svc = StockMutationService::new(ledger.clone());
        let (b1, p1) = (BranchId::new(), ProductId::new());

        let first = svc
            .record_mutation(cmd(b1, p1, Direction::In, 10, Reason::Produksi))
            .await
            .unwrap();
        assert_eq!(first.qty, 10);
        assert_eq!(first.ref_type(), RefType::Mutation);
        assert_eq!(first.ref_id(), None);

        let second = svc
            .record_mutation(cmd(b1, p1, Direction::Out, 3, Reason::Penjualan))
            .await
            .unwrap();
        assert_eq!(second.qty, -3);

        let agg = ledger.aggregate_by_product(b1).await.unwrap();
        assert_eq!(agg[&p1].saldo, 7);
        assert_eq!(ledger.len().unwrap(), 2);
    }

    #[tokio::test]
    async fn negative_balances_are_allowed() {
        let ledger = Arc::new(InMemoryLedgerStore::new());
        let svc = StockMutationService::new(ledger.clone());
        let (b, p) = (BranchId::new(), ProductId::new());

        svc.record_mutation(cmd(b, p, Direction::Out, 5, Reason::Waste))
            .await
            .unwrap();
        assert_eq!(ledger.aggregate_by_product(b).await.unwrap()[&p].saldo, -5);
    }

    #[tokio::test]
    async fn invalid_mutations_write_nothing() {
        let ledger = Arc::new(InMemoryLedgerStore::new());
        let svc = StockMutationService::new(ledger.clone());
        let (b, p) = (BranchId::new(), ProductId::new());

        for bad in [
            cmd(b, p, Direction::In, 0, Reason::Produksi),
            cmd(b, p, Direction::In, -2, Reason::Produksi),
            cmd(b, p, Direction::In, 1, Reason::TransferIn),
        ] {
            let err = svc.record_mutation(bad).await.unwrap_err();
            assert!(matches!(err, StockError::Validation(_)), "{err:?}");
        }
        assert!(ledger.is_empty().unwrap());
    }

    #[tokio::test]
    async fn huge_quantities_are_rejected_and_aggregation_keeps_working() {
        let ledger = Arc::new(InMemoryLedgerStore::new());
        let svc = StockMutationService::new(ledger.clone());
        let (b, p) = (BranchId::new(), ProductId::new());

        let err = svc
            .record_mutation(cmd(b, p, Direction::In, i64::MAX, Reason::Produksi))
            .await
            .unwrap_err();
        assert!(matches!(err, StockError::Validation(_)), "{err:?}");

        for _ in 0..2 {
            svc.record_mutation(cmd(b, p, Direction::In, MAX_ENTRY_QTY, Reason::Produksi))
                .await
                .unwrap();
        }
        svc.record_mutation(cmd(b, p, Direction::In, 1, Reason::Produksi))
            .await
            .unwrap();

        let agg = ledger.aggregate_by_product(b).await.unwrap();
        assert_eq!(agg[&p].saldo, 2 * MAX_ENTRY_QTY + 1);
        assert_eq!(ledger.len().unwrap(), 3);
    }

    #[tokio::test]
    async fn ledger_listing_is_clamped_to_a_page() {
        let ledger = Arc::new(InMemoryLedgerStore::new());
        let svc = StockMutationService::new(ledger);
        let (b, p) = (BranchId::new(), ProductId::new());
        for _ in 0..3 {
            svc.record_mutation(cmd(b, p, Direction::In, 1, Reason::Retur))
                .await
                .unwrap();
        }

        assert_eq!(svc.list_ledger(b, p, None).await.unwrap().len(), 3);
        assert_eq!(svc.list_ledger(b, p, Some(0)).await.unwrap().len(), 1);
        assert_eq!(svc.list_ledger(b, p, Some(10_000)).await.unwrap().len(), 3);
    }
}
