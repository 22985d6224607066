use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockbook_core::{BranchId, DomainError, DomainResult, ProductId, TransferId, UserId};

use crate::entry::{LedgerEntry, LedgerEntryDraft, LedgerRef, MAX_ENTRY_QTY};
use crate::reason::Reason;

/// Lifecycle status of a transfer. Only `Completed` is produced today.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransferStatus {
    Pending,
    Completed,
    Failed,
}

impl TransferStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferStatus::Pending => "PENDING",
            TransferStatus::Completed => "COMPLETED",
            TransferStatus::Failed => "FAILED",
        }
    }
}

impl core::str::FromStr for TransferStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(TransferStatus::Pending),
            "COMPLETED" => Ok(TransferStatus::Completed),
            "FAILED" => Ok(TransferStatus::Failed),
            other => Err(DomainError::validation(format!("unknown transfer status '{other}'"))),
        }
    }
}

/// One line of a transfer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferItem {
    pub product_id: ProductId,
    /// Positive quantity moved from source to destination.
    pub qty: i64,
}

/// Command: CreateTransfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTransfer {
    pub from_branch_id: BranchId,
    pub to_branch_id: BranchId,
    pub items: Vec<TransferItem>,
    pub actor_id: UserId,
}

/// Write-once record of an inter-branch movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub id: TransferId,
    pub from_branch_id: BranchId,
    pub to_branch_id: BranchId,
    pub created_by_id: UserId,
    pub status: TransferStatus,
    pub items: Vec<TransferItem>,
    pub created_at: DateTime<Utc>,
}

/// Transfer record plus the ledger drafts that must be committed with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferPlan {
    pub transfer: Transfer,
    pub entries: Vec<LedgerEntryDraft>,
}

impl CreateTransfer {
    /// Check every precondition that must hold before anything is written.
    pub fn validate(&self) -> DomainResult<()> {
        self.from_branch_id.require()?;
        self.to_branch_id.require()?;
        self.actor_id.require()?;

        if self.from_branch_id == self.to_branch_id {
            return Err(DomainError::validation(
                "fromBranchId and toBranchId must differ",
            ));
        }
        if self.items.is_empty() {
            return Err(DomainError::validation("transfer must have at least one item"));
        }
        for (idx, item) in self.items.iter().enumerate() {
            item.product_id.require()?;
            if item.qty <= 0 {
                return Err(DomainError::validation(format!(
                    "item {idx}: qty must be a positive integer"
                )));
            }
            if item.qty > MAX_ENTRY_QTY {
                return Err(DomainError::validation(format!(
                    "item {idx}: qty cannot exceed {MAX_ENTRY_QTY}"
                )));
            }
        }
        Ok(())
    }

    /// Decide the transfer record and its twin entries.
    ///
    /// Drafts are ordered: all `TRANSFER_OUT` entries (item order), then all
    /// `TRANSFER_IN` entries (item order).
    pub fn plan(&self, id: TransferId, created_at: DateTime<Utc>) -> DomainResult<TransferPlan> {
        self.validate()?;

        let transfer = Transfer {
            id,
            from_branch_id: self.from_branch_id,
            to_branch_id: self.to_branch_id,
            created_by_id: self.actor_id,
            status: TransferStatus::Completed,
            items: self.items.clone(),
            created_at,
        };

        let reference = LedgerRef::Transfer(id);
        let outs = self.items.iter().map(|item| {
            LedgerEntryDraft::new(
                self.from_branch_id,
                item.product_id,
                -item.qty,
                Reason::TransferOut,
                reference,
                None,
            )
        });
        let ins = self.items.iter().map(|item| {
            LedgerEntryDraft::new(
                self.to_branch_id,
                item.product_id,
                item.qty,
                Reason::TransferIn,
                reference,
                None,
            )
        });

        Ok(TransferPlan {
            transfer,
            entries: outs.chain(ins).collect(),
        })
    }
}

impl Transfer {
    /// Verify the twin-entry invariant for this transfer.
    ///
    /// Accepts drafts or stored entries through the `TwinSide` view. For N
    /// items there must be exactly 2N entries referencing the transfer: N
    /// negative `TRANSFER_OUT` at the source and N positive `TRANSFER_IN` at
    /// the destination, with per-product quantities matching the items.
    pub fn verify_twins<'a, E>(&self, entries: impl IntoIterator<Item = &'a E>) -> DomainResult<()>
    where
        E: TwinSide + 'a,
    {
        let mut expected: HashMap<ProductId, i64> = HashMap::new();
        for item in &self.items {
            add_qty(&mut expected, item.product_id, item.qty)?;
        }

        let mut outs: HashMap<ProductId, i64> = HashMap::new();
        let mut ins: HashMap<ProductId, i64> = HashMap::new();
        let (mut out_count, mut in_count) = (0usize, 0usize);

        for e in entries {
            if e.reference() != LedgerRef::Transfer(self.id) {
                return Err(DomainError::invariant("entry does not reference this transfer"));
            }
            match e.reason() {
                Reason::TransferOut if e.branch_id() == self.from_branch_id && e.qty() < 0 => {
                    add_qty(&mut outs, e.product_id(), e.qty().saturating_neg())?;
                    out_count += 1;
                }
                Reason::TransferIn if e.branch_id() == self.to_branch_id && e.qty() > 0 => {
                    add_qty(&mut ins, e.product_id(), e.qty())?;
                    in_count += 1;
                }
                _ => {
                    return Err(DomainError::invariant(format!(
                        "unexpected {} entry for transfer {}",
                        e.reason(),
                        self.id
                    )));
                }
            }
        }

        if out_count != self.items.len() || in_count != self.items.len() {
            return Err(DomainError::invariant(format!(
                "transfer {} has {} items but {} out / {} in entries",
                self.id,
                self.items.len(),
                out_count,
                in_count
            )));
        }
        if outs != expected || ins != expected {
            return Err(DomainError::invariant(format!(
                "transfer {} entry quantities do not match its items",
                self.id
            )));
        }
        Ok(())
    }
}

fn add_qty(totals: &mut HashMap<ProductId, i64>, product_id: ProductId, qty: i64) -> DomainResult<()> {
    let total = totals.entry(product_id).or_default();
    *total = total
        .checked_add(qty)
        .ok_or_else(|| DomainError::invariant(format!("quantity overflow for product {product_id}")))?;
    Ok(())
}

/// Read view shared by drafts and stored entries for invariant checks.
pub trait TwinSide {
    fn branch_id(&self) -> BranchId;
    fn product_id(&self) -> ProductId;
    fn qty(&self) -> i64;
    fn reason(&self) -> Reason;
    fn reference(&self) -> LedgerRef;
}

macro_rules! impl_twin_side {
    ($t:ty) => {
        impl TwinSide for $t {
            fn branch_id(&self) -> BranchId {
                self.branch_id
            }
            fn product_id(&self) -> ProductId {
                self.product_id
            }
            fn qty(&self) -> i64 {
                self.qty
            }
            fn reason(&self) -> Reason {
                self.reason
            }
            fn reference(&self) -> LedgerRef {
                self.reference
            }
        }
    };
}

impl_twin_side!(LedgerEntryDraft);
impl_twin_side!(LedgerEntry);

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn cmd(items: Vec<TransferItem>) -> CreateTransfer {
        CreateTransfer {
            from_branch_id: BranchId::new(),
            to_branch_id: BranchId::new(),
            items,
            actor_id: UserId::new(),
        }
    }

    fn item(qty: i64) -> TransferItem {
        TransferItem {
            product_id: ProductId::new(),
            qty,
        }
    }

    #[test]
    fn same_branch_transfer_is_rejected() {
        let mut c = cmd(vec![item(4)]);
        c.to_branch_id = c.from_branch_id;
        let err = c.plan(TransferId::new(), Utc::now()).unwrap_err();
        assert_eq!(
            err,
            DomainError::validation("fromBranchId and toBranchId must differ")
        );
    }

    #[test]
    fn empty_items_and_non_positive_qty_are_rejected() {
        assert!(matches!(cmd(vec![]).validate(), Err(DomainError::Validation(_))));
        assert!(matches!(cmd(vec![item(2), item(0)]).validate(), Err(DomainError::Validation(msg)) if msg.starts_with("item 1")));
        assert!(cmd(vec![item(-5)]).validate().is_err());
    }

    #[test]
    fn oversized_item_qty_is_rejected() {
        let err = cmd(vec![item(1), item(i64::MAX)]).validate().unwrap_err();
        assert!(matches!(err, DomainError::Validation(msg) if msg.starts_with("item 1")));
        assert!(cmd(vec![item(MAX_ENTRY_QTY)]).validate().is_ok());
    }

    #[test]
    fn verify_twins_reports_overflow_instead_of_panicking() {
        let p = ProductId::new();
        let transfer = Transfer {
            id: TransferId::new(),
            from_branch_id: BranchId::new(),
            to_branch_id: BranchId::new(),
            created_by_id: UserId::new(),
            status: TransferStatus::Completed,
            items: vec![
                TransferItem { product_id: p, qty: i64::MAX },
                TransferItem { product_id: p, qty: i64::MAX },
            ],
            created_at: Utc::now(),
        };
        let none: Vec<LedgerEntryDraft> = Vec::new();
        assert!(matches!(
            transfer.verify_twins(&none),
            Err(DomainError::InvariantViolation(msg)) if msg.contains("overflow")
        ));
    }

    #[test]
    fn missing_actor_is_rejected() {
        let mut c = cmd(vec![item(1)]);
        c.actor_id = UserId::from_uuid(uuid::Uuid::nil());
        assert!(matches!(c.validate(), Err(DomainError::InvalidId(_))));
    }

    #[test]
    fn plan_produces_completed_transfer_with_mirrored_entries() {
        let c = cmd(vec![item(4), item(7)]);
        let id = TransferId::new();
        let plan = c.plan(id, Utc::now()).unwrap();

        assert_eq!(plan.transfer.status, TransferStatus::Completed);
        assert_eq!(plan.transfer.created_by_id, c.actor_id);
        assert_eq!(plan.entries.len(), 4);

        let (outs, ins) = plan.entries.split_at(2);
        for (o, it) in outs.iter().zip(&c.items) {
            assert_eq!(o.branch_id, c.from_branch_id);
            assert_eq!(o.qty, -it.qty);
            assert_eq!(o.reason, Reason::TransferOut);
            assert_eq!(o.reference, LedgerRef::Transfer(id));
        }
        for (i, it) in ins.iter().zip(&c.items) {
            assert_eq!(i.branch_id, c.to_branch_id);
            assert_eq!(i.qty, it.qty);
            assert_eq!(i.reason, Reason::TransferIn);
        }
        plan.transfer.verify_twins(&plan.entries).unwrap();
    }

    #[test]
    fn verify_twins_detects_missing_side() {
        let plan = cmd(vec![item(3)]).plan(TransferId::new(), Utc::now()).unwrap();
        let only_out: Vec<_> = plan.entries.iter().take(1).cloned().collect();
        assert!(matches!(
            plan.transfer.verify_twins(&only_out),
            Err(DomainError::InvariantViolation(_))
        ));
    }

    #[test]
    fn verify_twins_detects_quantity_drift() {
        let plan = cmd(vec![item(3)]).plan(TransferId::new(), Utc::now()).unwrap();
        let mut entries = plan.entries.clone();
        entries[1].qty = 2;
        assert!(plan.transfer.verify_twins(&entries).is_err());
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 128,
            ..ProptestConfig::default()
        })]

        /// Property: any valid transfer plan has 2N entries and nets to zero per product.
        #[test]
        fn planned_entries_are_balanced_twins(
            qtys in prop::collection::vec(1i64..100_000i64, 1..12)
        ) {
            let products: Vec<ProductId> = (0..3).map(|_| ProductId::new()).collect();
            let items: Vec<TransferItem> = qtys
                .iter()
                .enumerate()
                .map(|(i, q)| TransferItem { product_id: products[i % products.len()], qty: *q })
                .collect();
            let c = cmd(items.clone());
            let plan = c.plan(TransferId::new(), Utc::now()).unwrap();

            prop_assert_eq!(plan.entries.len(), 2 * items.len());
            prop_assert!(plan.transfer.verify_twins(&plan.entries).is_ok());

            for p in &products {
                let at_from: i64 = plan.entries.iter()
                    .filter(|e| e.product_id == *p && e.branch_id == c.from_branch_id)
                    .map(|e| e.qty)
                    .sum();
                let at_to: i64 = plan.entries.iter()
                    .filter(|e| e.product_id == *p && e.branch_id == c.to_branch_id)
                    .map(|e| e.qty)
                    .sum();
                prop_assert_eq!(at_from, -at_to);
            }
        }
    }
}
