use std::sync::RwLock;

use async_trait::async_trait;

use stockbook_catalog::{Branch, Price, Product, sort_by_name};
use stockbook_core::BranchId;

use super::r#trait::CatalogStore;
use crate::error::StoreError;

#[derive(Debug, Default)]
struct CatalogState {
    branches: Vec<Branch>,
    products: Vec<Product>,
    prices: Vec<Price>,
}

/// In-memory catalog. Intended for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryCatalogStore {
    state: RwLock<CatalogState>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_branch(&self, branch: Branch) -> Result<(), StoreError> {
        self.write(|s| s.branches.push(branch))
    }

    pub fn insert_product(&self, product: Product) -> Result<(), StoreError> {
        self.write(|s| s.products.push(product))
    }

    pub fn insert_price(&self, price: Price) -> Result<(), StoreError> {
        self.write(|s| s.prices.push(price))
    }

    fn write(&self, f: impl FnOnce(&mut CatalogState)) -> Result<(), StoreError> {
        let mut state = self
            .state
            .write()
            .map_err(|_| StoreError::Transaction("lock poisoned".to_string()))?;
        f(&mut state);
        Ok(())
    }

    fn read<T>(&self, f: impl FnOnce(&CatalogState) -> T) -> Result<T, StoreError> {
        let state = self
            .state
            .read()
            .map_err(|_| StoreError::Transaction("lock poisoned".to_string()))?;
        Ok(f(&state))
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        let mut products = self.read(|s| s.products.clone())?;
        sort_by_name(&mut products);
        Ok(products)
    }

    async fn list_branches(&self) -> Result<Vec<Branch>, StoreError> {
        let mut branches = self.read(|s| s.branches.clone())?;
        branches.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(branches)
    }

    async fn price_candidates(&self, branch_id: BranchId) -> Result<Vec<Price>, StoreError> {
        self.read(|s| {
            s.prices
                .iter()
                .filter(|p| p.applies_to(branch_id))
                .cloned()
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use stockbook_core::{PriceId, ProductId};

    #[tokio::test]
    async fn listings_are_name_ordered() {
        let store = InMemoryCatalogStore::new();
        store.insert_product(Product::new("KULIT", "Kulit")).unwrap();
        store.insert_product(Product::new("ADAAN", "Adaan")).unwrap();
        store.insert_branch(Branch::new("TMR", "Timur")).unwrap();
        store.insert_branch(Branch::new("PST", "Pusat")).unwrap();

        let products = store.list_products().await.unwrap();
        assert_eq!(products[0].name, "Adaan");
        let branches = store.list_branches().await.unwrap();
        assert_eq!(branches[0].code, "PST");
    }

    #[tokio::test]
    async fn price_candidates_exclude_other_branches() {
        let store = InMemoryCatalogStore::new();
        let (x, y) = (BranchId::new(), BranchId::new());
        let product_id = ProductId::new();
        for branch_id in [None, Some(x), Some(y)] {
            store
                .insert_price(Price {
                    id: PriceId::new(),
                    product_id,
                    branch_id,
                    price: Decimal::from(4000),
                    cost: None,
                    effective_at: Utc::now(),
                })
                .unwrap();
        }

        let rows = store.price_candidates(x).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|p| p.branch_id != Some(y)));
    }
}
