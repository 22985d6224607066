//! Service wiring: picks Postgres or in-memory stores from config.

use std::sync::Arc;

use stockbook_infra::StoreError;
use stockbook_infra::catalog_store::{
    CatalogStore, DemoCatalog, InMemoryCatalogStore, PostgresCatalogStore, seed_demo_catalog,
};
use stockbook_infra::config::AppConfig;
use stockbook_infra::db;
use stockbook_infra::ledger_store::{InMemoryLedgerStore, LedgerStore, PostgresLedgerStore};
use stockbook_infra::projections::StockSummaryProjector;
use stockbook_infra::services::{StockMutationService, TransferService};

pub type DynLedgerStore = Arc<dyn LedgerStore>;
pub type DynCatalogStore = Arc<dyn CatalogStore>;

/// Everything the handlers need, shared behind an `Arc`.
pub struct AppServices {
    pub mutations: StockMutationService<DynLedgerStore>,
    pub transfers: TransferService<DynLedgerStore>,
    pub summary: StockSummaryProjector<DynLedgerStore, DynCatalogStore>,
    pub catalog: DynCatalogStore,
}

impl AppServices {
    pub fn new(ledger: DynLedgerStore, catalog: DynCatalogStore) -> Self {
        Self {
            mutations: StockMutationService::new(ledger.clone()),
            transfers: TransferService::new(ledger.clone()),
            summary: StockSummaryProjector::new(ledger, catalog.clone()),
            catalog,
        }
    }

    /// Empty in-memory stores (dev/test).
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryLedgerStore::new()),
            Arc::new(InMemoryCatalogStore::new()),
        )
    }

    /// In-memory stores with the demo catalog loaded.
    pub fn in_memory_seeded() -> Result<(Self, DemoCatalog), StoreError> {
        let catalog = Arc::new(InMemoryCatalogStore::new());
        let demo = seed_demo_catalog(&catalog)?;
        Ok((Self::new(Arc::new(InMemoryLedgerStore::new()), catalog), demo))
    }
}

pub async fn build_services(config: &AppConfig) -> Result<AppServices, StoreError> {
    match &config.database_url {
        Some(url) => {
            let pool = db::connect(config, url).await?;
            let ledger = PostgresLedgerStore::new(pool.clone());
            ledger.migrate().await?;
            tracing::info!("using postgres stores");
            Ok(AppServices::new(
                Arc::new(ledger),
                Arc::new(PostgresCatalogStore::new(pool)),
            ))
        }
        None if config.seed_demo_data => {
            let (services, demo) = AppServices::in_memory_seeded()?;
            tracing::info!(head_office = %demo.head_office, "using in-memory stores with demo catalog");
            Ok(services)
        }
        None => {
            tracing::info!("using in-memory stores");
            Ok(AppServices::in_memory())
        }
    }
}
