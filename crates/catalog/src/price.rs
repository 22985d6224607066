//! Price rows and the "most specific price wins" resolution rule.
//!
//! Candidate ordering is explicit and independent of storage order:
//!
//! 1. a row for the target branch beats a global (branch-less) row;
//! 2. then the most recent `effective_at` wins;
//! 3. then the greatest `id` wins (ids are UUIDv7, so the later-created row).

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockbook_core::{BranchId, PriceId, ProductId};

/// One price row. `branch_id == None` marks a global price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    pub id: PriceId,
    pub product_id: ProductId,
    pub branch_id: Option<BranchId>,
    pub price: Decimal,
    pub cost: Option<Decimal>,
    pub effective_at: DateTime<Utc>,
}

impl Price {
    /// Whether this row may apply at `branch_id`.
    pub fn applies_to(&self, branch_id: BranchId) -> bool {
        self.branch_id.is_none_or(|b| b == branch_id)
    }

    fn is_branch_specific(&self) -> bool {
        self.branch_id.is_some()
    }
}

/// Total order over applicable candidates; `Greater` means "preferred".
fn preference(a: &Price, b: &Price) -> Ordering {
    a.is_branch_specific()
        .cmp(&b.is_branch_specific())
        .then_with(|| a.effective_at.cmp(&b.effective_at))
        .then_with(|| a.id.cmp(&b.id))
}

/// Resolve the effective price of `product_id` at `branch_id`.
///
/// Rows for other products or other branches are ignored, so callers may pass
/// any superset of the candidates.
pub fn resolve_price<'a>(
    candidates: impl IntoIterator<Item = &'a Price>,
    product_id: ProductId,
    branch_id: BranchId,
) -> Option<&'a Price> {
    candidates
        .into_iter()
        .filter(|p| p.product_id == product_id && p.applies_to(branch_id))
        .max_by(|a, b| preference(a, b))
}

/// Resolve prices for every product that has at least one applicable row.
pub fn resolve_prices<'a>(
    candidates: impl IntoIterator<Item = &'a Price>,
    branch_id: BranchId,
) -> HashMap<ProductId, &'a Price> {
    let mut out: HashMap<ProductId, &'a Price> = HashMap::new();
    for p in candidates.into_iter().filter(|p| p.applies_to(branch_id)) {
        match out.get(&p.product_id) {
            Some(current) if preference(current, p) != Ordering::Less => {}
            _ => {
                out.insert(p.product_id, p);
            }
        }
    }
    out
}
