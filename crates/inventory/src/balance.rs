//! Derived balances: every figure here is a fold over ledger entries.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockbook_core::ProductId;

use crate::entry::LedgerEntry;

/// Default (and maximum) number of rows returned by a ledger listing.
pub const LEDGER_PAGE_SIZE: usize = 200;

/// Aggregate of all entries for one (branch, product) pair.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAggregate {
    /// Sum of signed quantities.
    pub saldo: i64,
    /// Latest `created_at`; `None` when nothing ever moved.
    pub last_mutation_at: Option<DateTime<Utc>>,
}

impl StockAggregate {
    /// Entries are bounded by `MAX_ENTRY_QTY`, so a plain sum cannot overflow
    /// for any realistic ledger length.
    pub fn apply(&mut self, qty: i64, created_at: DateTime<Utc>) {
        self.saldo += qty;
        self.last_mutation_at = Some(match self.last_mutation_at {
            Some(last) if last >= created_at => last,
            _ => created_at,
        });
    }

    pub fn fold<'a>(entries: impl IntoIterator<Item = &'a LedgerEntry>) -> Self {
        let mut agg = Self::default();
        for e in entries {
            agg.apply(e.qty, e.created_at);
        }
        agg
    }
}

/// Group entries of one branch by product.
pub fn aggregate_by_product<'a>(
    entries: impl IntoIterator<Item = &'a LedgerEntry>,
) -> HashMap<ProductId, StockAggregate> {
    let mut out: HashMap<ProductId, StockAggregate> = HashMap::new();
    for e in entries {
        out.entry(e.product_id).or_default().apply(e.qty, e.created_at);
    }
    out
}

/// Balance at instant `at`: sum of all entries with `created_at <= at`.
pub fn saldo_as_of<'a>(entries: impl IntoIterator<Item = &'a LedgerEntry>, at: DateTime<Utc>) -> i64 {
    entries
        .into_iter()
        .filter(|e| e.created_at <= at)
        .map(|e| e.qty)
        .sum()
}
