use axum::{
    Router,
    routing::{get, post},
};

pub mod catalog;
pub mod common;
pub mod stock;
pub mod system;
pub mod transfers;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route("/branches", get(catalog::list_branches))
        .route("/products", get(catalog::list_products))
        .nest("/stock", stock::router())
        .route(
            "/transfers",
            post(transfers::create_transfer).get(transfers::list_transfers),
        )
        .route("/transfers/:id", get(transfers::get_transfer))
}
