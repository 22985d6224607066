use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use stockbook_auth::AuthzError;
use stockbook_infra::StockError;

pub fn stock_error_to_response(err: StockError) -> axum::response::Response {
    match err {
        StockError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        StockError::NotFound(msg) => json_error(StatusCode::NOT_FOUND, "not_found", msg),
        StockError::TransactionFailure(msg) => {
            tracing::error!(error = %msg, "unit of work rolled back");
            json_error(StatusCode::SERVICE_UNAVAILABLE, "transaction_failure", msg)
        }
    }
}

pub fn authz_error_to_response(err: AuthzError) -> axum::response::Response {
    tracing::warn!(error = %err, "request forbidden");
    json_error(StatusCode::FORBIDDEN, "forbidden", err.to_string())
}

pub fn validation_error(message: impl Into<String>) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "validation_error", message)
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
