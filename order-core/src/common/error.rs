//! Error types
//!
//! Two layers: [`StorageError`] wraps every redb/serialization fault behind
//! one type, and [`CoreError`] is the domain contract surfaced to callers.
//! The surrounding layer maps each `CoreError` kind to a stable transport
//! code; the core itself never retries anything.

use shared::order::OrderStatus;
use thiserror::Error;

/// Storage-level failures (redb and serialization)
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("data integrity: {0}")]
    Integrity(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Domain errors returned to the caller
#[derive(Debug, Error)]
pub enum CoreError {
    /// Referenced product, order, or stock row does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Malformed input: empty line list, non-positive quantity, negative
    /// stock target, out-of-range page size
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Reservation or adjustment would drive the quantity below zero
    #[error(
        "insufficient stock for product {product_id}: available {available}, requested {requested}"
    )]
    InsufficientStock {
        product_id: u64,
        available: i64,
        requested: i64,
    },

    /// Lifecycle rule violated; the order is already in a terminal state
    #[error("invalid state transition: order {order_id} is {current}")]
    InvalidStateTransition { order_id: u64, current: OrderStatus },

    /// Role check failed
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Lock-wait bound exceeded; safe to retry with backoff
    #[error("lock wait exceeded for product {0}")]
    Contention(u64),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl CoreError {
    /// Only contention is safe for the caller to retry blindly.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CoreError::Contention(_))
    }
}

pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_contention_is_retryable() {
        assert!(CoreError::Contention(7).is_retryable());
        assert!(!CoreError::NotFound("product 7".into()).is_retryable());
        assert!(
            !CoreError::InsufficientStock {
                product_id: 7,
                available: 1,
                requested: 2
            }
            .is_retryable()
        );
    }
}
