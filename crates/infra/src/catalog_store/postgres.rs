//! Read-only Postgres catalog.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;

use stockbook_catalog::{Branch, Price, Product};
use stockbook_core::{BranchId, PriceId, ProductId};

use super::r#trait::CatalogStore;
use crate::db::{map_decode_error, map_sqlx_error};
use crate::error::StoreError;

#[derive(Debug, Clone)]
pub struct PostgresCatalogStore {
    pool: Arc<PgPool>,
}

impl PostgresCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

#[async_trait]
impl CatalogStore for PostgresCatalogStore {
    #[instrument(skip(self), err)]
    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, sku, name, category, unit, is_active FROM products ORDER BY name ASC, id ASC",
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_products", e))?;
        rows.iter().map(product_from_row).collect()
    }

    #[instrument(skip(self), err)]
    async fn list_branches(&self) -> Result<Vec<Branch>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, code, name, address, is_active FROM branches ORDER BY name ASC, id ASC",
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_branches", e))?;
        rows.iter().map(branch_from_row).collect()
    }

    #[instrument(skip(self), fields(branch_id = %branch_id), err)]
    async fn price_candidates(&self, branch_id: BranchId) -> Result<Vec<Price>, StoreError> {
        // Storage order is irrelevant: resolution applies its own comparator.
        let rows = sqlx::query(
            r#"
            SELECT id, product_id, branch_id, price, cost, effective_at
            FROM prices
            WHERE branch_id = $1 OR branch_id IS NULL
            "#,
        )
        .bind(branch_id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("price_candidates", e))?;
        rows.iter().map(price_from_row).collect()
    }
}

fn product_from_row(row: &PgRow) -> Result<Product, StoreError> {
    let decode = |e: sqlx::Error| map_decode_error("products", e);
    Ok(Product {
        id: ProductId::from_uuid(row.try_get("id").map_err(decode)?),
        sku: row.try_get("sku").map_err(decode)?,
        name: row.try_get("name").map_err(decode)?,
        category: row.try_get("category").map_err(decode)?,
        unit: row.try_get("unit").map_err(decode)?,
        is_active: row.try_get("is_active").map_err(decode)?,
    })
}

fn branch_from_row(row: &PgRow) -> Result<Branch, StoreError> {
    let decode = |e: sqlx::Error| map_decode_error("branches", e);
    Ok(Branch {
        id: BranchId::from_uuid(row.try_get("id").map_err(decode)?),
        code: row.try_get("code").map_err(decode)?,
        name: row.try_get("name").map_err(decode)?,
        address: row.try_get("address").map_err(decode)?,
        is_active: row.try_get("is_active").map_err(decode)?,
    })
}

fn price_from_row(row: &PgRow) -> Result<Price, StoreError> {
    let decode = |e: sqlx::Error| map_decode_error("prices", e);
    let branch_id: Option<uuid::Uuid> = row.try_get("branch_id").map_err(decode)?;
    Ok(Price {
        id: PriceId::from_uuid(row.try_get("id").map_err(decode)?),
        product_id: ProductId::from_uuid(row.try_get("product_id").map_err(decode)?),
        branch_id: branch_id.map(BranchId::from_uuid),
        price: row.try_get("price").map_err(decode)?,
        cost: row.try_get("cost").map_err(decode)?,
        effective_at: row.try_get("effective_at").map_err(decode)?,
    })
}
