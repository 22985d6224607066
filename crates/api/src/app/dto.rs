//! Request/response DTOs. Wire field names are camelCase.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockbook_catalog::{Branch, Product};
use stockbook_core::{BranchId, LedgerEntryId, ProductId, TransferId, UserId};
use stockbook_infra::projections::StockSummaryRow;
use stockbook_infra::services::TransferDetail;
use stockbook_inventory::{
    Direction, LedgerEntry, Reason, RefType, Transfer, TransferItem, TransferStatus,
};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutateStockRequest {
    pub branch_id: BranchId,
    pub product_id: ProductId,
    pub direction: Direction,
    pub qty: i64,
    pub reason: Reason,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferItemRequest {
    pub product_id: ProductId,
    pub qty: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransferRequest {
    pub from_branch_id: BranchId,
    pub to_branch_id: BranchId,
    pub items: Vec<TransferItemRequest>,
}

/// Ids arrive as raw strings so that a missing or malformed id becomes a
/// `validation_error` body rather than an extractor rejection.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerQuery {
    pub branch_id: Option<String>,
    pub product_id: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryQuery {
    pub branch_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferListQuery {
    pub branch_id: Option<String>,
    pub limit: Option<String>,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntryResponse {
    pub id: LedgerEntryId,
    pub branch_id: BranchId,
    pub product_id: ProductId,
    pub qty: i64,
    pub reason: Reason,
    pub ref_type: RefType,
    pub ref_id: Option<TransferId>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub sequence: u64,
}

impl From<LedgerEntry> for LedgerEntryResponse {
    fn from(e: LedgerEntry) -> Self {
        Self {
            ref_type: e.ref_type(),
            ref_id: e.ref_id(),
            id: e.id,
            branch_id: e.branch_id,
            product_id: e.product_id,
            qty: e.qty,
            reason: e.reason,
            note: e.note,
            created_at: e.created_at,
            sequence: e.sequence,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferItemResponse {
    pub product_id: ProductId,
    pub qty: i64,
}

impl From<TransferItem> for TransferItemResponse {
    fn from(i: TransferItem) -> Self {
        Self {
            product_id: i.product_id,
            qty: i.qty,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferResponse {
    pub id: TransferId,
    pub from_branch_id: BranchId,
    pub to_branch_id: BranchId,
    pub created_by_id: UserId,
    pub status: TransferStatus,
    pub items: Vec<TransferItemResponse>,
    pub created_at: DateTime<Utc>,
}

impl From<Transfer> for TransferResponse {
    fn from(t: Transfer) -> Self {
        Self {
            id: t.id,
            from_branch_id: t.from_branch_id,
            to_branch_id: t.to_branch_id,
            created_by_id: t.created_by_id,
            status: t.status,
            items: t.items.into_iter().map(Into::into).collect(),
            created_at: t.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferDetailResponse {
    #[serde(flatten)]
    pub transfer: TransferResponse,
    pub entries: Vec<LedgerEntryResponse>,
}

impl From<TransferDetail> for TransferDetailResponse {
    fn from(d: TransferDetail) -> Self {
        Self {
            transfer: d.transfer.into(),
            entries: d.entries.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockSummaryResponse {
    pub product_id: ProductId,
    pub name: String,
    pub category: Option<String>,
    pub unit: Option<String>,
    pub price: Option<Decimal>,
    pub saldo: i64,
    pub last_mutation_at: Option<DateTime<Utc>>,
}

impl From<StockSummaryRow> for StockSummaryResponse {
    fn from(r: StockSummaryRow) -> Self {
        Self {
            product_id: r.product_id,
            name: r.name,
            category: r.category,
            unit: r.unit,
            price: r.price,
            saldo: r.saldo,
            last_mutation_at: r.last_mutation_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchResponse {
    pub id: BranchId,
    pub code: String,
    pub name: String,
    pub address: Option<String>,
    pub is_active: bool,
}

impl From<Branch> for BranchResponse {
    fn from(b: Branch) -> Self {
        Self {
            id: b.id,
            code: b.code,
            name: b.name,
            address: b.address,
            is_active: b.is_active,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: ProductId,
    pub sku: String,
    pub name: String,
    pub category: Option<String>,
    pub unit: Option<String>,
    pub is_active: bool,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            sku: p.sku,
            name: p.name,
            category: p.category,
            unit: p.unit,
            is_active: p.is_active,
        }
    }
}
