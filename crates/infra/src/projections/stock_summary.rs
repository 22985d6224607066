use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use stockbook_catalog::resolve_prices;
use stockbook_core::{BranchId, ProductId};

use crate::catalog_store::CatalogStore;
use crate::error::StockError;
use crate::ledger_store::LedgerStore;

/// Current stock of one catalog product at one branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockSummaryRow {
    pub product_id: ProductId,
    pub name: String,
    pub category: Option<String>,
    pub unit: Option<String>,
    /// Resolved selling price; `None` when no row applies.
    pub price: Option<Decimal>,
    pub saldo: i64,
    pub last_mutation_at: Option<DateTime<Utc>>,
}

/// Joins the per-product ledger aggregate with the catalog and resolved prices.
#[derive(Debug, Clone)]
pub struct StockSummaryProjector<L, C> {
    ledger: L,
    catalog: C,
}

impl<L, C> StockSummaryProjector<L, C>
where
    L: LedgerStore,
    C: CatalogStore,
{
    pub fn new(ledger: L, catalog: C) -> Self {
        Self { ledger, catalog }
    }

    /// One row per catalog product in catalog (name) order, including products
    /// that never moved at this branch (`saldo = 0`, no timestamp).
    #[instrument(skip(self), fields(branch_id = %branch_id), err)]
    pub async fn summarize(&self, branch_id: BranchId) -> Result<Vec<StockSummaryRow>, StockError> {
        branch_id.require()?;

        let products = self.catalog.list_products().await?;
        let aggregates = self.ledger.aggregate_by_product(branch_id).await?;
        let candidates = self.catalog.price_candidates(branch_id).await?;
        let prices = resolve_prices(&candidates, branch_id);

        let rows: Vec<StockSummaryRow> = products
            .into_iter()
            .map(|p| {
                let agg = aggregates.get(&p.id).copied().unwrap_or_default();
                StockSummaryRow {
                    product_id: p.id,
                    price: prices.get(&p.id).map(|price| price.price),
                    name: p.name,
                    category: p.category,
                    unit: p.unit,
                    saldo: agg.saldo,
                    last_mutation_at: agg.last_mutation_at,
                }
            })
            .collect();

        tracing::debug!(rows = rows.len(), "stock summary computed");
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use stockbook_catalog::{Price, Product};
    use stockbook_core::{PriceId, UserId};
    use stockbook_inventory::{CreateTransfer, Direction, Reason, RecordMutation, TransferItem};

    use crate::catalog_store::InMemoryCatalogStore;
    use crate::ledger_store::InMemoryLedgerStore;
    use crate::services::{StockMutationService, TransferService};

    struct Fixture {
        ledger: Arc<InMemoryLedgerStore>,
        catalog: Arc<InMemoryCatalogStore>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                ledger: Arc::new(InMemoryLedgerStore::new()),
                catalog: Arc::new(InMemoryCatalogStore::new()),
            }
        }

        fn product(&self, sku: &str, name: &str) -> ProductId {
            let p = Product::new(sku, name).with_unit("pcs");
            let id = p.id;
            self.catalog.insert_product(p).unwrap();
            id
        }

        fn price(&self, product_id: ProductId, branch_id: Option<BranchId>, amount: i64) {
            self.catalog
                .insert_price(Price {
                    id: PriceId::new(),
                    product_id,
                    branch_id,
                    price: Decimal::from(amount),
                    cost: None,
                    effective_at: Utc::now(),
                })
                .unwrap();
        }

        fn projector(&self) -> StockSummaryProjector<Arc<InMemoryLedgerStore>, Arc<InMemoryCatalogStore>> {
            StockSummaryProjector::new(self.ledger.clone(), self.catalog.clone())
        }
    }

    fn mutation(b: BranchId, p: ProductId, direction: Direction, qty: i64, reason: Reason) -> RecordMutation {
        RecordMutation {
            branch_id: b,
            product_id: p,
            direction,
            qty,
            reason,
            note: None,
        }
    }

    #[tokio::test]
    async fn every_catalog_product_appears_in_name_order() {
        let fx = Fixture::new();
        let kulit = fx.product("KULIT", "Kulit");
        let adaan = fx.product("ADAAN", "Adaan");
        let b = BranchId::new();

        StockMutationService::new(fx.ledger.clone())
            .record_mutation(mutation(b, kulit, Direction::In, 5, Reason::Produksi))
            .await
            .unwrap();

        let rows = fx.projector().summarize(b).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].product_id, adaan);
        assert_eq!(rows[0].saldo, 0);
        assert_eq!(rows[0].last_mutation_at, None);
        assert_eq!(rows[1].product_id, kulit);
        assert_eq!(rows[1].saldo, 5);
        assert!(rows[1].last_mutation_at.is_some());
    }

    #[tokio::test]
    async fn mutation_and_transfer_scenario() {
        let fx = Fixture::new();
        let p1 = fx.product("LENJER-S", "Lenjer (S)");
        let (b1, b2) = (BranchId::new(), BranchId::new());

        let mutations = StockMutationService::new(fx.ledger.clone());
        mutations
            .record_mutation(mutation(b1, p1, Direction::In, 10, Reason::Produksi))
            .await
            .unwrap();
        mutations
            .record_mutation(mutation(b1, p1, Direction::Out, 3, Reason::Penjualan))
            .await
            .unwrap();
        assert_eq!(fx.projector().summarize(b1).await.unwrap()[0].saldo, 7);

        TransferService::new(fx.ledger.clone())
            .create_transfer(CreateTransfer {
                from_branch_id: b1,
                to_branch_id: b2,
                items: vec![TransferItem { product_id: p1, qty: 4 }],
                actor_id: UserId::new(),
            })
            .await
            .unwrap();

        assert_eq!(fx.projector().summarize(b1).await.unwrap()[0].saldo, 3);
        assert_eq!(fx.projector().summarize(b2).await.unwrap()[0].saldo, 4);
    }

    #[tokio::test]
    async fn branch_price_beats_global_price() {
        let fx = Fixture::new();
        let p = fx.product("KAPSEL", "Kapal Selam");
        let (x, y) = (BranchId::new(), BranchId::new());
        fx.price(p, None, 12000);
        fx.price(p, Some(x), 13000);

        let at_x = fx.projector().summarize(x).await.unwrap();
        let at_y = fx.projector().summarize(y).await.unwrap();
        assert_eq!(at_x[0].price, Some(Decimal::from(13000)));
        assert_eq!(at_y[0].price, Some(Decimal::from(12000)));
    }

    #[tokio::test]
    async fn product_without_price_has_none() {
        let fx = Fixture::new();
        fx.product("ADAAN", "Adaan");
        let rows = fx.projector().summarize(BranchId::new()).await.unwrap();
        assert_eq!(rows[0].price, None);
    }
}
