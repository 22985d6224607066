//! Demo catalog: one head-office branch and the five starter products, each
//! with a global price and an identical head-office price.

use chrono::Utc;
use rust_decimal::Decimal;

use stockbook_catalog::{Branch, Price, Product};
use stockbook_core::{BranchId, PriceId, ProductId};

use super::in_memory::InMemoryCatalogStore;
use crate::error::StoreError;

/// `(sku, name, category, cost, price)`
const DEMO_PRODUCTS: &[(&str, &str, &str, i64, i64)] = &[
    ("LENJER-S", "Lenjer (S)", "Lenjer", 2500, 4000),
    ("LENJER-M", "Lenjer (M)", "Lenjer", 3500, 6000),
    ("KAPSEL", "Kapal Selam", "Kapal Selam", 8000, 12000),
    ("KULIT", "Kulit", "Kulit", 3000, 5000),
    ("ADAAN", "Adaan", "Adaan", 2500, 4000),
];

/// Identifiers of the seeded records.
#[derive(Debug, Clone)]
pub struct DemoCatalog {
    pub head_office: BranchId,
    pub products: Vec<(String, ProductId)>,
}

impl DemoCatalog {
    pub fn product(&self, sku: &str) -> Option<ProductId> {
        self.products.iter().find(|(s, _)| s == sku).map(|(_, id)| *id)
    }
}

pub fn seed_demo_catalog(store: &InMemoryCatalogStore) -> Result<DemoCatalog, StoreError> {
    let mut pusat = Branch::new("PST", "Pusat");
    pusat.address = Some("Jl. Contoh 123".to_string());
    let head_office = pusat.id;
    store.insert_branch(pusat)?;

    let now = Utc::now();
    let mut products = Vec::with_capacity(DEMO_PRODUCTS.len());
    for (sku, name, category, cost, price) in DEMO_PRODUCTS {
        let product = Product::new(*sku, *name).with_category(*category).with_unit("pcs");
        let product_id = product.id;
        store.insert_product(product)?;

        for branch_id in [None, Some(head_office)] {
            store.insert_price(Price {
                id: PriceId::new(),
                product_id,
                branch_id,
                price: Decimal::from(*price),
                cost: Some(Decimal::from(*cost)),
                effective_at: now,
            })?;
        }
        products.push((sku.to_string(), product_id));
    }

    tracing::info!(products = products.len(), "demo catalog seeded");
    Ok(DemoCatalog {
        head_office,
        products,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog_store::CatalogStore;
    use stockbook_catalog::resolve_price;

    #[tokio::test]
    async fn seeded_catalog_resolves_head_office_prices() {
        let store = InMemoryCatalogStore::new();
        let demo = seed_demo_catalog(&store).unwrap();

        assert_eq!(store.list_products().await.unwrap().len(), 5);
        let kapsel = demo.product("KAPSEL").unwrap();
        let rows = store.price_candidates(demo.head_office).await.unwrap();
        let resolved = resolve_price(&rows, kapsel, demo.head_office).unwrap();
        assert_eq!(resolved.price, Decimal::from(12000));
        assert_eq!(resolved.branch_id, Some(demo.head_office));
    }
}
