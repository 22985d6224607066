use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Extension, Path, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};

use stockbook_auth::Permission;
use stockbook_core::{BranchId, TransferId};
use stockbook_inventory::{CreateTransfer, TransferItem};

use crate::app::routes::common::{self, CmdAuth};
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

pub async fn create_transfer(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    body: Result<Json<dto::CreateTransferRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return common::json_rejection(rejection),
    };

    // The actor always comes from the verified token, never from the body.
    let cmd = CmdAuth::new(
        CreateTransfer {
            from_branch_id: body.from_branch_id,
            to_branch_id: body.to_branch_id,
            items: body
                .items
                .into_iter()
                .map(|i| TransferItem {
                    product_id: i.product_id,
                    qty: i.qty,
                })
                .collect(),
            actor_id: principal.user_id(),
        },
        Permission::STOCK_TRANSFER,
    );

    if let Err(e) = crate::authz::authorize_command(&principal, &cmd) {
        return errors::authz_error_to_response(e);
    }

    match services.transfers.create_transfer(cmd.inner).await {
        Ok(transfer) => (
            StatusCode::CREATED,
            Json(dto::TransferResponse::from(transfer)),
        )
            .into_response(),
        Err(e) => errors::stock_error_to_response(e),
    }
}

pub async fn list_transfers(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    query: Result<Query<dto::TransferListQuery>, QueryRejection>,
) -> axum::response::Response {
    let Query(query) = match query {
        Ok(q) => q,
        Err(rejection) => return common::query_rejection(rejection),
    };

    if let Err(e) = crate::authz::authorize_command(&principal, &CmdAuth::new((), Permission::STOCK_READ)) {
        return errors::authz_error_to_response(e);
    }

    let branch_id: Option<BranchId> =
        match common::parse_optional_id(query.branch_id.as_deref(), "branchId") {
            Ok(id) => id,
            Err(res) => return res,
        };
    let limit = match common::parse_limit(query.limit.as_deref()) {
        Ok(l) => l,
        Err(res) => return res,
    };

    match services.transfers.list_transfers(branch_id, limit).await {
        Ok(transfers) => Json(
            transfers
                .into_iter()
                .map(dto::TransferResponse::from)
                .collect::<Vec<_>>(),
        )
        .into_response(),
        Err(e) => errors::stock_error_to_response(e),
    }
}

pub async fn get_transfer(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::authorize_command(&principal, &CmdAuth::new((), Permission::STOCK_READ)) {
        return errors::authz_error_to_response(e);
    }

    let transfer_id: TransferId = match common::parse_id(Some(&id), "transfer id") {
        Ok(id) => id,
        Err(res) => return res,
    };

    match services.transfers.get_transfer(transfer_id).await {
        Ok(detail) => Json(dto::TransferDetailResponse::from(detail)).into_response(),
        Err(e) => errors::stock_error_to_response(e),
    }
}
