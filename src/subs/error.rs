use thiserror::Error;

use super::aggregation::InvalidRange;
use super::validation::ValidationError;

/// Failure reported by a storage backend. The message is for logs only.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum SubscriptionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("subscription {0} not found")]
    NotFound(i64),
    #[error(transparent)]
    InvalidRange(#[from] InvalidRange),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type SubscriptionResult<T> = Result<T, SubscriptionError>;
