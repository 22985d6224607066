use stockbook_core::{DomainError, DomainResult};
use stockbook_inventory::{LedgerEntry, LedgerEntryDraft, LedgerRef, Transfer, TransferPlan};

/// A batch of transfer records and ledger drafts committed as one transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitOfWork {
    transfers: Vec<Transfer>,
    entries: Vec<LedgerEntryDraft>,
}

/// What a successful commit made visible, in unit order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommittedUnit {
    pub transfers: Vec<Transfer>,
    pub entries: Vec<LedgerEntry>,
}

impl UnitOfWork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(draft: LedgerEntryDraft) -> Self {
        Self {
            transfers: Vec::new(),
            entries: vec![draft],
        }
    }

    pub fn from_plan(plan: TransferPlan) -> Self {
        Self {
            transfers: vec![plan.transfer],
            entries: plan.entries,
        }
    }

    pub fn push_transfer(&mut self, transfer: Transfer) {
        self.transfers.push(transfer);
    }

    pub fn push_entry(&mut self, draft: LedgerEntryDraft) {
        self.entries.push(draft);
    }

    pub fn transfers(&self) -> &[Transfer] {
        &self.transfers
    }

    pub fn entries(&self) -> &[LedgerEntryDraft] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.transfers.is_empty() && self.entries.is_empty()
    }

    /// Check the whole unit before any row is written.
    ///
    /// - every draft passes `LedgerEntryDraft::validate`
    /// - every transfer-referencing draft belongs to a transfer in this unit
    /// - every transfer is well formed and carries exactly its twin entries
    pub fn validate(&self) -> DomainResult<()> {
        if self.is_empty() {
            return Err(DomainError::validation("unit of work is empty"));
        }

        for (idx, draft) in self.entries.iter().enumerate() {
            draft
                .validate()
                .map_err(|e| prefix_entry_error(idx, e))?;

            if let LedgerRef::Transfer(id) = draft.reference {
                if !self.transfers.iter().any(|t| t.id == id) {
                    return Err(DomainError::invariant(format!(
                        "entry {idx}: transfer {id} is not part of this unit"
                    )));
                }
            }
        }

        for transfer in &self.transfers {
            transfer.id.require()?;
            transfer.created_by_id.require()?;
            if transfer.from_branch_id == transfer.to_branch_id {
                return Err(DomainError::validation("fromBranchId and toBranchId must differ"));
            }
            if transfer.items.is_empty() {
                return Err(DomainError::validation("transfer must have at least one item"));
            }
            let twins = self
                .entries
                .iter()
                .filter(|d| d.reference == LedgerRef::Transfer(transfer.id));
            transfer.verify_twins(twins)?;
        }

        Ok(())
    }

    pub fn into_parts(self) -> (Vec<Transfer>, Vec<LedgerEntryDraft>) {
        (self.transfers, self.entries)
    }
}

fn prefix_entry_error(idx: usize, err: DomainError) -> DomainError {
    match err {
        DomainError::Validation(msg) => DomainError::Validation(format!("entry {idx}: {msg}")),
        DomainError::InvalidId(msg) => DomainError::InvalidId(format!("entry {idx}: {msg}")),
        other => other,
    }
}
