use serde::{Deserialize, Serialize};

use stockbook_core::{BranchId, DomainError, DomainResult, ProductId};

use crate::entry::{LedgerEntryDraft, LedgerRef, MAX_ENTRY_QTY};
use crate::reason::{Direction, Reason};

/// Command: RecordMutation (manual stock adjustment at one branch).
///
/// Negative resulting balances are allowed; operators are trusted to correct
/// them with a later mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMutation {
    pub branch_id: BranchId,
    pub product_id: ProductId,
    pub direction: Direction,
    /// Positive magnitude; the direction decides the sign.
    pub qty: i64,
    pub reason: Reason,
    pub note: Option<String>,
}

impl RecordMutation {
    pub fn signed_qty(&self) -> i64 {
        self.direction.sign(self.qty)
    }

    /// Decide the single ledger draft this mutation produces.
    pub fn to_draft(&self) -> DomainResult<LedgerEntryDraft> {
        if self.qty <= 0 {
            return Err(DomainError::validation("qty must be a positive integer"));
        }
        if self.qty > MAX_ENTRY_QTY {
            return Err(DomainError::validation(format!("qty cannot exceed {MAX_ENTRY_QTY}")));
        }

        let draft = LedgerEntryDraft::new(
            self.branch_id,
            self.product_id,
            self.signed_qty(),
            self.reason,
            LedgerRef::Mutation,
            self.note.clone(),
        );
        draft.validate()?;
        Ok(draft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmd(direction: Direction, qty: i64, reason: Reason) -> RecordMutation {
        RecordMutation {
            branch_id: BranchId::new(),
            product_id: ProductId::new(),
            direction,
            qty,
            reason,
            note: Some("opname".to_string()),
        }
    }

    #[test]
    fn in_and_out_produce_signed_drafts() {
        let d = cmd(Direction::In, 10, Reason::Produksi).to_draft().unwrap();
        assert_eq!(d.qty, 10);
        assert_eq!(d.reference, LedgerRef::Mutation);
        assert_eq!(d.note.as_deref(), Some("opname"));

        let d = cmd(Direction::Out, 3, Reason::Penjualan).to_draft().unwrap();
        assert_eq!(d.qty, -3);
        assert_eq!(d.reason, Reason::Penjualan);
    }

    #[test]
    fn non_positive_qty_is_rejected() {
        for qty in [0, -1, i64::MIN] {
            let err = cmd(Direction::In, qty, Reason::Retur).to_draft().unwrap_err();
            assert!(matches!(err, DomainError::Validation(_)));
        }
    }

    #[test]
    fn qty_above_the_entry_bound_is_rejected() {
        let err = cmd(Direction::In, i64::MAX, Reason::Produksi).to_draft().unwrap_err();
        assert!(matches!(err, DomainError::Validation(msg) if msg.contains("cannot exceed")));
        assert!(cmd(Direction::Out, MAX_ENTRY_QTY + 1, Reason::Penjualan).to_draft().is_err());
        assert_eq!(
            cmd(Direction::Out, MAX_ENTRY_QTY, Reason::Penjualan).to_draft().unwrap().qty,
            -MAX_ENTRY_QTY
        );
    }

    #[test]
    fn transfer_reasons_cannot_be_used_manually() {
        assert!(cmd(Direction::In, 1, Reason::TransferIn).to_draft().is_err());
        assert!(cmd(Direction::Out, 1, Reason::TransferOut).to_draft().is_err());
    }
}
