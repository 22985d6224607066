use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Extension, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use stockbook_auth::Permission;
use stockbook_core::{BranchId, ProductId};
use stockbook_inventory::RecordMutation;

use crate::app::routes::common::{self, CmdAuth};
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/mutate", post(record_mutation))
        .route("/ledger", get(list_ledger))
        .route("/summary", get(stock_summary))
}

pub async fn record_mutation(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    body: Result<Json<dto::MutateStockRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return common::json_rejection(rejection),
    };

    let cmd = CmdAuth::new(
        RecordMutation {
            branch_id: body.branch_id,
            product_id: body.product_id,
            direction: body.direction,
            qty: body.qty,
            reason: body.reason,
            note: body.note,
        },
        Permission::STOCK_MUTATE,
    );

    if let Err(e) = crate::authz::authorize_command(&principal, &cmd) {
        return errors::authz_error_to_response(e);
    }

    match services.mutations.record_mutation(cmd.inner).await {
        Ok(entry) => (
            StatusCode::CREATED,
            Json(dto::LedgerEntryResponse::from(entry)),
        )
            .into_response(),
        Err(e) => errors::stock_error_to_response(e),
    }
}

pub async fn list_ledger(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    query: Result<Query<dto::LedgerQuery>, QueryRejection>,
) -> axum::response::Response {
    let Query(query) = match query {
        Ok(q) => q,
        Err(rejection) => return common::query_rejection(rejection),
    };

    if let Err(e) = crate::authz::authorize_command(&principal, &CmdAuth::new((), Permission::STOCK_READ)) {
        return errors::authz_error_to_response(e);
    }

    if query.branch_id.is_none() || query.product_id.is_none() {
        return errors::validation_error("branchId and productId required");
    }
    let branch_id: BranchId = match common::parse_id(query.branch_id.as_deref(), "branchId") {
        Ok(id) => id,
        Err(res) => return res,
    };
    let product_id: ProductId = match common::parse_id(query.product_id.as_deref(), "productId") {
        Ok(id) => id,
        Err(res) => return res,
    };
    let limit = match common::parse_limit(query.limit.as_deref()) {
        Ok(l) => l,
        Err(res) => return res,
    };

    match services.mutations.list_ledger(branch_id, product_id, limit).await {
        Ok(entries) => Json(
            entries
                .into_iter()
                .map(dto::LedgerEntryResponse::from)
                .collect::<Vec<_>>(),
        )
        .into_response(),
        Err(e) => errors::stock_error_to_response(e),
    }
}

pub async fn stock_summary(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    query: Result<Query<dto::SummaryQuery>, QueryRejection>,
) -> axum::response::Response {
    let Query(query) = match query {
        Ok(q) => q,
        Err(rejection) => return common::query_rejection(rejection),
    };

    if let Err(e) = crate::authz::authorize_command(&principal, &CmdAuth::new((), Permission::STOCK_READ)) {
        return errors::authz_error_to_response(e);
    }

    let branch_id: BranchId = match common::parse_id(query.branch_id.as_deref(), "branchId") {
        Ok(id) => id,
        Err(res) => return res,
    };

    match services.summary.summarize(branch_id).await {
        Ok(rows) => Json(
            rows.into_iter()
                .map(dto::StockSummaryResponse::from)
                .collect::<Vec<_>>(),
        )
        .into_response(),
        Err(e) => errors::stock_error_to_response(e),
    }
}
