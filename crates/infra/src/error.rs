//! Infrastructure error model and its mapping onto the stock error taxonomy.

use thiserror::Error;

use stockbook_core::DomainError;

/// Error raised by a store implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The write was rejected by domain validation (nothing was persisted).
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// A referenced branch, product or transfer does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The storage transaction could not be completed and was rolled back.
    #[error("transaction failed: {0}")]
    Transaction(String),
}

/// Error surfaced by the stock services to callers.
///
/// - `Validation`: malformed input, raised before any write.
/// - `NotFound`: a referenced record is absent.
/// - `TransactionFailure`: the unit of work was rolled back; safe to retry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StockError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("transaction failure: {0}")]
    TransactionFailure(String),
}

impl From<DomainError> for StockError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => StockError::Validation(msg),
            DomainError::NotFound(msg) => StockError::NotFound(msg),
            DomainError::InvariantViolation(msg) => StockError::TransactionFailure(msg),
        }
    }
}

impl From<StoreError> for StockError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Domain(e) => e.into(),
            StoreError::NotFound(msg) => StockError::NotFound(msg),
            StoreError::Transaction(msg) => StockError::TransactionFailure(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_onto_the_stock_taxonomy() {
        assert_eq!(
            StockError::from(DomainError::validation("qty cannot be zero")),
            StockError::Validation("qty cannot be zero".to_string())
        );
        assert_eq!(
            StockError::from(DomainError::invalid_id("BranchId is required")),
            StockError::Validation("BranchId is required".to_string())
        );
        assert!(matches!(
            StockError::from(StoreError::Transaction("deadlock".into())),
            StockError::TransactionFailure(_)
        ));
        assert!(matches!(
            StockError::from(StoreError::NotFound("product".into())),
            StockError::NotFound(_)
        ));
    }
}
