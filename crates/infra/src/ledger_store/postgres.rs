//! Postgres-backed stock ledger.
//!
//! One SQL transaction per unit of work. Any error returned before `commit`
//! drops the transaction, which rolls it back, so a failed unit leaves no rows.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::{Span, instrument};
use uuid::Uuid;

use stockbook_core::{BranchId, LedgerEntryId, ProductId, TransferId, UserId};
use stockbook_inventory::{
    LedgerEntry, LedgerEntryDraft, LedgerRef, RefType, StockAggregate, Transfer, TransferItem,
};

use super::r#trait::{LedgerOrder, LedgerStore};
use super::unit_of_work::{CommittedUnit, UnitOfWork};
use crate::db::{map_decode_error, map_sqlx_error};
use crate::error::StoreError;

#[derive(Debug, Clone)]
pub struct PostgresLedgerStore {
    pool: Arc<PgPool>,
}

impl PostgresLedgerStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply the stock ledger schema.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        crate::db::migrate(&self.pool).await
    }

    async fn load_items(
        &self,
        transfer_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<TransferItem>>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT transfer_id, product_id, qty
            FROM transfer_items
            WHERE transfer_id = ANY($1)
            ORDER BY transfer_id, position
            "#,
        )
        .bind(transfer_ids)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("load_transfer_items", e))?;

        let mut items: HashMap<Uuid, Vec<TransferItem>> = HashMap::new();
        for row in rows {
            let transfer_id: Uuid = row.try_get("transfer_id").map_err(|e| map_decode_error("transfer_item", e))?;
            let product_id: Uuid = row.try_get("product_id").map_err(|e| map_decode_error("transfer_item", e))?;
            let qty: i64 = row.try_get("qty").map_err(|e| map_decode_error("transfer_item", e))?;
            items.entry(transfer_id).or_default().push(TransferItem {
                product_id: ProductId::from_uuid(product_id),
                qty,
            });
        }
        Ok(items)
    }
}

#[async_trait]
impl LedgerStore for PostgresLedgerStore {
    #[instrument(
        skip(self, unit),
        fields(
            transfers = unit.transfers().len(),
            entries = unit.entries().len()
        ),
        err
    )]
    async fn commit(&self, unit: UnitOfWork) -> Result<CommittedUnit, StoreError> {
        unit.validate()?;

        let (transfers, drafts) = unit.into_parts();
        // Postgres keeps microseconds; match it so returned rows equal re-read rows.
        let created_at = Utc::now().trunc_subsecs(6);

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        for transfer in &transfers {
            insert_transfer(&mut tx, transfer).await?;
        }

        let mut entries = Vec::with_capacity(drafts.len());
        for draft in drafts {
            entries.push(insert_entry(&mut tx, draft, created_at).await?);
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        tracing::debug!(
            last_sequence = entries.last().map(|e| e.sequence),
            "ledger unit committed"
        );
        Ok(CommittedUnit { transfers, entries })
    }

    #[instrument(
        skip(self),
        fields(branch_id = %branch_id, product_id = %product_id, rows = tracing::field::Empty),
        err
    )]
    async fn list_by_branch_and_product(
        &self,
        branch_id: BranchId,
        product_id: ProductId,
        limit: usize,
        order: LedgerOrder,
    ) -> Result<Vec<LedgerEntry>, StoreError> {
        let sql = match order {
            LedgerOrder::CreatedAtDesc => {
                "SELECT * FROM stock_ledger WHERE branch_id = $1 AND product_id = $2 \
                 ORDER BY created_at DESC, sequence DESC LIMIT $3"
            }
            LedgerOrder::CreatedAtAsc => {
                "SELECT * FROM stock_ledger WHERE branch_id = $1 AND product_id = $2 \
                 ORDER BY created_at ASC, sequence ASC LIMIT $3"
            }
        };

        let rows = sqlx::query(sql)
            .bind(branch_id.as_uuid())
            .bind(product_id.as_uuid())
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_by_branch_and_product", e))?;

        Span::current().record("rows", rows.len());
        rows.iter().map(entry_from_row).collect()
    }

    #[instrument(skip(self), fields(branch_id = %branch_id), err)]
    async fn aggregate_by_product(
        &self,
        branch_id: BranchId,
    ) -> Result<HashMap<ProductId, StockAggregate>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT product_id, SUM(qty)::BIGINT AS saldo, MAX(created_at) AS last_mutation_at
            FROM stock_ledger
            WHERE branch_id = $1
            GROUP BY product_id
            "#,
        )
        .bind(branch_id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("aggregate_by_product", e))?;

        let mut out = HashMap::with_capacity(rows.len());
        for row in rows {
            let product_id: Uuid = row.try_get("product_id").map_err(|e| map_decode_error("aggregate", e))?;
            let saldo: i64 = row.try_get("saldo").map_err(|e| map_decode_error("aggregate", e))?;
            let last_mutation_at: Option<DateTime<Utc>> =
                row.try_get("last_mutation_at").map_err(|e| map_decode_error("aggregate", e))?;
            out.insert(
                ProductId::from_uuid(product_id),
                StockAggregate {
                    saldo,
                    last_mutation_at,
                },
            );
        }
        Ok(out)
    }

    #[instrument(skip(self), fields(transfer_id = %transfer_id), err)]
    async fn entries_for_transfer(
        &self,
        transfer_id: TransferId,
    ) -> Result<Vec<LedgerEntry>, StoreError> {
        let rows = sqlx::query("SELECT * FROM stock_ledger WHERE ref_id = $1 ORDER BY sequence ASC")
            .bind(transfer_id.as_uuid())
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("entries_for_transfer", e))?;
        rows.iter().map(entry_from_row).collect()
    }

    #[instrument(skip(self), err)]
    async fn list_transfers(
        &self,
        branch_id: Option<BranchId>,
        limit: usize,
    ) -> Result<Vec<Transfer>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, from_branch_id, to_branch_id, created_by_id, status, created_at
            FROM transfers
            WHERE $1::uuid IS NULL OR from_branch_id = $1 OR to_branch_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(branch_id.map(|b| *b.as_uuid()))
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_transfers", e))?;

        let mut transfers: Vec<Transfer> = rows
            .iter()
            .map(transfer_from_row)
            .collect::<Result<_, _>>()?;

        let ids: Vec<Uuid> = transfers.iter().map(|t| *t.id.as_uuid()).collect();
        let mut items = self.load_items(&ids).await?;
        for t in &mut transfers {
            t.items = items.remove(t.id.as_uuid()).unwrap_or_default();
        }
        Ok(transfers)
    }

    #[instrument(skip(self), fields(transfer_id = %transfer_id), err)]
    async fn get_transfer(&self, transfer_id: TransferId) -> Result<Option<Transfer>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, from_branch_id, to_branch_id, created_by_id, status, created_at
            FROM transfers
            WHERE id = $1
            "#,
        )
        .bind(transfer_id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_transfer", e))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut transfer = transfer_from_row(&row)?;
        transfer.items = self
            .load_items(&[*transfer_id.as_uuid()])
            .await?
            .remove(transfer_id.as_uuid())
            .unwrap_or_default();
        Ok(Some(transfer))
    }
}

async fn insert_transfer(
    tx: &mut Transaction<'_, Postgres>,
    transfer: &Transfer,
) -> Result<(), StoreError> {
    sqlx::query(
        r#"
        INSERT INTO transfers (id, from_branch_id, to_branch_id, created_by_id, status, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(transfer.id.as_uuid())
    .bind(transfer.from_branch_id.as_uuid())
    .bind(transfer.to_branch_id.as_uuid())
    .bind(transfer.created_by_id.as_uuid())
    .bind(transfer.status.as_str())
    .bind(transfer.created_at)
    .execute(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("insert_transfer", e))?;

    for (position, item) in transfer.items.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO transfer_items (transfer_id, position, product_id, qty)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(transfer.id.as_uuid())
        .bind(position as i32)
        .bind(item.product_id.as_uuid())
        .bind(item.qty)
        .execute(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("insert_transfer_item", e))?;
    }
    Ok(())
}

async fn insert_entry(
    tx: &mut Transaction<'_, Postgres>,
    draft: LedgerEntryDraft,
    created_at: DateTime<Utc>,
) -> Result<LedgerEntry, StoreError> {
    let id = LedgerEntryId::new();
    let row = sqlx::query(
        r#"
        INSERT INTO stock_ledger (id, branch_id, product_id, qty, reason, ref_type, ref_id, note, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING sequence
        "#,
    )
    .bind(id.as_uuid())
    .bind(draft.branch_id.as_uuid())
    .bind(draft.product_id.as_uuid())
    .bind(draft.qty)
    .bind(draft.reason.as_str())
    .bind(draft.reference.ref_type().as_str())
    .bind(draft.reference.ref_id().map(|t| *t.as_uuid()))
    .bind(draft.note.as_deref())
    .bind(created_at)
    .fetch_one(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("insert_entry", e))?;

    let sequence: i64 = row.try_get("sequence").map_err(|e| map_decode_error("stock_ledger", e))?;
    Ok(draft.into_entry(id, created_at, sequence as u64))
}

fn entry_from_row(row: &PgRow) -> Result<LedgerEntry, StoreError> {
    let decode = |e: sqlx::Error| map_decode_error("stock_ledger", e);

    let reason: String = row.try_get("reason").map_err(decode)?;
    let ref_type: String = row.try_get("ref_type").map_err(decode)?;
    let ref_id: Option<Uuid> = row.try_get("ref_id").map_err(decode)?;
    let sequence: i64 = row.try_get("sequence").map_err(decode)?;

    let reference = LedgerRef::from_parts(
        ref_type.parse::<RefType>()?,
        ref_id.map(TransferId::from_uuid),
    )?;

    Ok(LedgerEntry {
        id: LedgerEntryId::from_uuid(row.try_get("id").map_err(decode)?),
        branch_id: BranchId::from_uuid(row.try_get("branch_id").map_err(decode)?),
        product_id: ProductId::from_uuid(row.try_get("product_id").map_err(decode)?),
        qty: row.try_get("qty").map_err(decode)?,
        reason: reason.parse()?,
        reference,
        note: row.try_get("note").map_err(decode)?,
        created_at: row.try_get("created_at").map_err(decode)?,
        sequence: sequence as u64,
    })
}

fn transfer_from_row(row: &PgRow) -> Result<Transfer, StoreError> {
    let decode = |e: sqlx::Error| map_decode_error("transfers", e);
    let status: String = row.try_get("status").map_err(decode)?;

    Ok(Transfer {
        id: TransferId::from_uuid(row.try_get("id").map_err(decode)?),
        from_branch_id: BranchId::from_uuid(row.try_get("from_branch_id").map_err(decode)?),
        to_branch_id: BranchId::from_uuid(row.try_get("to_branch_id").map_err(decode)?),
        created_by_id: UserId::from_uuid(row.try_get("created_by_id").map_err(decode)?),
        status: status.parse()?,
        items: Vec::new(),
        created_at: row.try_get("created_at").map_err(decode)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockbook_inventory::{CreateTransfer, LedgerRef, Reason};

    use crate::error::StockError;

    // Run with: DATABASE_URL=postgres://... cargo test -p stockbook-infra -- --ignored

    async fn store() -> PostgresLedgerStore {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for postgres tests");
        let store = PostgresLedgerStore::new(PgPool::connect(&url).await.unwrap());
        store.migrate().await.unwrap();
        store
    }

    async fn insert_branch(pool: &PgPool) -> BranchId {
        let id = BranchId::new();
        sqlx::query("INSERT INTO branches (id, code, name) VALUES ($1, $2, $3)")
            .bind(id.as_uuid())
            .bind(format!("T-{id}"))
            .bind("Test branch")
            .execute(pool)
            .await
            .unwrap();
        id
    }

    async fn insert_product(pool: &PgPool) -> ProductId {
        let id = ProductId::new();
        sqlx::query("INSERT INTO products (id, sku, name) VALUES ($1, $2, $3)")
            .bind(id.as_uuid())
            .bind(format!("SKU-{id}"))
            .bind("Test product")
            .execute(pool)
            .await
            .unwrap();
        id
    }

    async fn visible_rows(pool: &PgPool, transfer_id: TransferId, branches: &[BranchId]) -> (i64, i64, i64) {
        let branch_ids: Vec<Uuid> = branches.iter().map(|b| *b.as_uuid()).collect();
        let transfers: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transfers WHERE id = $1")
            .bind(transfer_id.as_uuid())
            .fetch_one(pool)
            .await
            .unwrap();
        let items: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transfer_items WHERE transfer_id = $1")
            .bind(transfer_id.as_uuid())
            .fetch_one(pool)
            .await
            .unwrap();
        let entries: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM stock_ledger WHERE ref_id = $1 OR branch_id = ANY($2)",
        )
        .bind(transfer_id.as_uuid())
        .bind(&branch_ids)
        .fetch_one(pool)
        .await
        .unwrap();
        (transfers, items, entries)
    }

    fn transfer_unit(
        id: TransferId,
        from: BranchId,
        to: BranchId,
        items: Vec<(ProductId, i64)>,
    ) -> UnitOfWork {
        let plan = CreateTransfer {
            from_branch_id: from,
            to_branch_id: to,
            items: items
                .into_iter()
                .map(|(product_id, qty)| TransferItem { product_id, qty })
                .collect(),
            actor_id: UserId::new(),
        }
        .plan(id, Utc::now().trunc_subsecs(6))
        .unwrap();
        UnitOfWork::from_plan(plan)
    }

    #[tokio::test]
    #[ignore] // Requires Postgres (DATABASE_URL)
    async fn unknown_product_in_second_item_rolls_back_the_whole_transfer() {
        let store = store().await;
        let pool = store.pool().clone();
        let (from, to) = (insert_branch(&pool).await, insert_branch(&pool).await);
        let known = insert_product(&pool).await;

        let transfer_id = TransferId::new();
        let unit = transfer_unit(transfer_id, from, to, vec![(known, 2), (ProductId::new(), 3)]);

        let err = store.commit(unit).await.unwrap_err();
        assert!(matches!(StockError::from(err), StockError::NotFound(_)));
        assert_eq!(visible_rows(&pool, transfer_id, &[from, to]).await, (0, 0, 0));
    }

    #[tokio::test]
    #[ignore] // Requires Postgres (DATABASE_URL)
    async fn failure_after_twin_entries_are_written_rolls_back_everything() {
        let store = store().await;
        let pool = store.pool().clone();
        let (from, to) = (insert_branch(&pool).await, insert_branch(&pool).await);
        let (p1, p2) = (insert_product(&pool).await, insert_product(&pool).await);

        let transfer_id = TransferId::new();
        let mut unit = transfer_unit(transfer_id, from, to, vec![(p1, 2), (p2, 5)]);
        // Trailing draft at a branch that does not exist: fails on the last insert.
        unit.push_entry(LedgerEntryDraft::new(
            BranchId::new(),
            p1,
            1,
            Reason::Penyesuaian,
            LedgerRef::Mutation,
            None,
        ));

        let err = store.commit(unit).await.unwrap_err();
        assert!(matches!(StockError::from(err), StockError::NotFound(_)));
        assert_eq!(visible_rows(&pool, transfer_id, &[from, to]).await, (0, 0, 0));

        let committed = store
            .commit(transfer_unit(TransferId::new(), from, to, vec![(p1, 2)]))
            .await
            .unwrap();
        assert_eq!(committed.entries.len(), 2);
        let agg = store.aggregate_by_product(from).await.unwrap();
        assert_eq!(agg[&p1].saldo, -2);
    }
}
