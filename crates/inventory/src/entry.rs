use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockbook_core::{BranchId, DomainError, DomainResult, LedgerEntryId, ProductId, TransferId};

use crate::reason::Reason;

/// Largest magnitude a single entry or transfer item may carry.
///
/// Keeps folds over the ledger far away from `i64` overflow.
pub const MAX_ENTRY_QTY: i64 = i32::MAX as i64;

/// Tag of the operation that produced a ledger entry.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RefType {
    Mutation,
    Transfer,
}

impl RefType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefType::Mutation => "Mutation",
            RefType::Transfer => "Transfer",
        }
    }
}

impl core::str::FromStr for RefType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Mutation" => Ok(RefType::Mutation),
            "Transfer" => Ok(RefType::Transfer),
            other => Err(DomainError::validation(format!("unknown ref type '{other}'"))),
        }
    }
}

/// Back-reference from an entry to its originating operation.
///
/// Manual mutations carry no id; transfer entries always point at their transfer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "refType", content = "refId")]
pub enum LedgerRef {
    Mutation,
    Transfer(TransferId),
}

impl LedgerRef {
    pub fn ref_type(&self) -> RefType {
        match self {
            LedgerRef::Mutation => RefType::Mutation,
            LedgerRef::Transfer(_) => RefType::Transfer,
        }
    }

    pub fn ref_id(&self) -> Option<TransferId> {
        match self {
            LedgerRef::Mutation => None,
            LedgerRef::Transfer(id) => Some(*id),
        }
    }

    /// Rebuild from the flat `(refType, refId)` storage columns.
    pub fn from_parts(ref_type: RefType, ref_id: Option<TransferId>) -> DomainResult<Self> {
        match (ref_type, ref_id) {
            (RefType::Mutation, None) => Ok(LedgerRef::Mutation),
            (RefType::Transfer, Some(id)) => Ok(LedgerRef::Transfer(id)),
            (RefType::Mutation, Some(_)) => {
                Err(DomainError::invariant("mutation entries cannot carry a refId"))
            }
            (RefType::Transfer, None) => {
                Err(DomainError::invariant("transfer entries require a refId"))
            }
        }
    }
}

/// An entry that has not been appended yet (no id, timestamp or sequence).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntryDraft {
    pub branch_id: BranchId,
    pub product_id: ProductId,
    /// Signed quantity: positive = inbound, negative = outbound.
    pub qty: i64,
    pub reason: Reason,
    pub reference: LedgerRef,
    pub note: Option<String>,
}

impl LedgerEntryDraft {
    pub fn new(
        branch_id: BranchId,
        product_id: ProductId,
        qty: i64,
        reason: Reason,
        reference: LedgerRef,
        note: Option<String>,
    ) -> Self {
        Self {
            branch_id,
            product_id,
            qty,
            reason,
            reference,
            note: normalize_note(note),
        }
    }

    /// Validate everything the ledger store enforces on append.
    pub fn validate(&self) -> DomainResult<()> {
        self.branch_id.require()?;
        self.product_id.require()?;

        if self.qty == 0 {
            return Err(DomainError::validation("qty cannot be zero"));
        }
        if self.qty.unsigned_abs() > MAX_ENTRY_QTY.unsigned_abs() {
            return Err(DomainError::validation(format!(
                "qty magnitude cannot exceed {MAX_ENTRY_QTY}"
            )));
        }

        match self.reference {
            LedgerRef::Mutation if self.reason.is_transfer() => {
                return Err(DomainError::validation(format!(
                    "reason {} is reserved for transfers",
                    self.reason
                )));
            }
            LedgerRef::Transfer(transfer_id) => {
                transfer_id.require()?;
                if !self.reason.is_transfer() {
                    return Err(DomainError::validation(format!(
                        "transfer entries must use TRANSFER_IN or TRANSFER_OUT (got {})",
                        self.reason
                    )));
                }
            }
            LedgerRef::Mutation => {}
        }

        match self.reason {
            Reason::TransferOut if self.qty > 0 => {
                Err(DomainError::validation("TRANSFER_OUT qty must be negative"))
            }
            Reason::TransferIn if self.qty < 0 => {
                Err(DomainError::validation("TRANSFER_IN qty must be positive"))
            }
            _ => Ok(()),
        }
    }

    /// Turn a validated draft into a stored fact.
    pub fn into_entry(
        self,
        id: LedgerEntryId,
        created_at: DateTime<Utc>,
        sequence: u64,
    ) -> LedgerEntry {
        LedgerEntry {
            id,
            branch_id: self.branch_id,
            product_id: self.product_id,
            qty: self.qty,
            reason: self.reason,
            reference: self.reference,
            note: self.note,
            created_at,
            sequence,
        }
    }
}

/// One immutable signed-quantity fact about inventory movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: LedgerEntryId,
    pub branch_id: BranchId,
    pub product_id: ProductId,
    pub qty: i64,
    pub reason: Reason,
    #[serde(flatten)]
    pub reference: LedgerRef,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Store-assigned position in the log; breaks `created_at` ties.
    pub sequence: u64,
}

impl LedgerEntry {
    pub fn ref_type(&self) -> RefType {
        self.reference.ref_type()
    }

    pub fn ref_id(&self) -> Option<TransferId> {
        self.reference.ref_id()
    }

    /// Sort key for "newest first" listings.
    pub fn recency_key(&self) -> (DateTime<Utc>, u64) {
        (self.created_at, self.sequence)
    }
}

fn normalize_note(note: Option<String>) -> Option<String> {
    note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())
}
