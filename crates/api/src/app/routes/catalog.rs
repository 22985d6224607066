use std::sync::Arc;

use axum::{Json, extract::Extension, response::IntoResponse};

use stockbook_auth::Permission;

use crate::app::routes::common::CmdAuth;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

pub async fn list_branches(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::authorize_command(&principal, &CmdAuth::new((), Permission::STOCK_READ)) {
        return errors::authz_error_to_response(e);
    }

    match services.catalog.list_branches().await {
        Ok(branches) => Json(
            branches
                .into_iter()
                .map(dto::BranchResponse::from)
                .collect::<Vec<_>>(),
        )
        .into_response(),
        Err(e) => errors::stock_error_to_response(e.into()),
    }
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::authorize_command(&principal, &CmdAuth::new((), Permission::CATALOG_READ)) {
        return errors::authz_error_to_response(e);
    }

    match services.catalog.list_products().await {
        Ok(products) => Json(
            products
                .into_iter()
                .map(dto::ProductResponse::from)
                .collect::<Vec<_>>(),
        )
        .into_response(),
        Err(e) => errors::stock_error_to_response(e.into()),
    }
}
