use std::hint::black_box;
use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

use stockbook_catalog::Product;
use stockbook_core::{BranchId, ProductId};
use stockbook_infra::catalog_store::InMemoryCatalogStore;
use stockbook_infra::ledger_store::{InMemoryLedgerStore, LedgerStore};
use stockbook_infra::projections::StockSummaryProjector;
use stockbook_inventory::{LedgerEntryDraft, LedgerRef, Reason, aggregate_by_product};

const PRODUCTS: usize = 50;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("tokio runtime")
}

/// Ledger with `entries` mutations at one branch spread across the catalog.
fn populated(entries: usize) -> (Arc<InMemoryLedgerStore>, Arc<InMemoryCatalogStore>, BranchId) {
    let rt = runtime();
    let ledger = Arc::new(InMemoryLedgerStore::new());
    let catalog = Arc::new(InMemoryCatalogStore::new());
    let branch = BranchId::new();

    let products: Vec<ProductId> = (0..PRODUCTS)
        .map(|i| {
            let p = Product::new(format!("SKU-{i:03}"), format!("Product {i:03}"));
            let id = p.id;
            catalog.insert_product(p).expect("insert product");
            id
        })
        .collect();

    rt.block_on(async {
        for i in 0..entries {
            let (qty, reason) = if i % 3 == 0 { (-1, Reason::Penjualan) } else { (2, Reason::Produksi) };
            let draft = LedgerEntryDraft::new(
                branch,
                products[i % PRODUCTS],
                qty,
                reason,
                LedgerRef::Mutation,
                None,
            );
            ledger.append(draft).await.expect("append");
        }
    });

    (ledger, catalog, branch)
}

fn bench_summary_over_ledger_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("stock_summary");
    let rt = runtime();

    for entries in [1_000usize, 10_000, 100_000] {
        let (ledger, catalog, branch) = populated(entries);
        let projector = StockSummaryProjector::new(ledger, catalog);

        group.throughput(Throughput::Elements(entries as u64));
        group.bench_with_input(BenchmarkId::new("summarize", entries), &entries, |b, _| {
            b.iter(|| {
                let rows = rt.block_on(projector.summarize(black_box(branch))).expect("summarize");
                black_box(rows);
            });
        });
    }

    group.finish();
}

fn bench_pure_fold(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate_fold");
    let rt = runtime();

    for entries in [1_000usize, 100_000] {
        let (ledger, _catalog, branch) = populated(entries);
        let products: Vec<ProductId> = rt
            .block_on(ledger.aggregate_by_product(branch))
            .expect("aggregate")
            .into_keys()
            .collect();
        let rows: Vec<_> = rt.block_on(async {
            let mut all = Vec::with_capacity(entries);
            for p in &products {
                all.extend(
                    ledger
                        .list_by_branch_and_product(branch, *p, usize::MAX, Default::default())
                        .await
                        .expect("list"),
                );
            }
            all
        });

        group.throughput(Throughput::Elements(entries as u64));
        group.bench_with_input(BenchmarkId::new("aggregate_by_product", entries), &rows, |b, rows| {
            b.iter(|| black_box(aggregate_by_product(rows.iter())));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_summary_over_ledger_size, bench_pure_fold);
criterion_main!(benches);
