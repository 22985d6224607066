use std::sync::Arc;

use async_trait::async_trait;

use stockbook_catalog::{Branch, Price, Product};
use stockbook_core::BranchId;

use crate::error::StoreError;

#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// All products, name ascending.
    async fn list_products(&self) -> Result<Vec<Product>, StoreError>;

    /// All branches, name ascending.
    async fn list_branches(&self) -> Result<Vec<Branch>, StoreError>;

    /// Price rows that may apply at `branch_id`: its own rows plus global rows.
    async fn price_candidates(&self, branch_id: BranchId) -> Result<Vec<Price>, StoreError>;
}

#[async_trait]
impl<S> CatalogStore for Arc<S>
where
    S: CatalogStore + ?Sized,
{
    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        (**self).list_products().await
    }

    async fn list_branches(&self) -> Result<Vec<Branch>, StoreError> {
        (**self).list_branches().await
    }

    async fn price_candidates(&self, branch_id: BranchId) -> Result<Vec<Price>, StoreError> {
        (**self).price_candidates(branch_id).await
    }
}
