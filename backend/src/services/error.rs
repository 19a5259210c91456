use thiserror::Error;

use crate::db::repository::RepositoryError;

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Business-rule outcomes that stop a hotel query.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// A required record (enrollment, ticket, hotel) does not exist.
    #[error("No result for this search!")]
    NotFound,

    /// The ticket does not entitle its holder to hotel data.
    #[error("{0}")]
    PaymentRequired(String),

    /// The storage backend failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ServiceError {
    pub fn payment_required(reason: impl Into<String>) -> Self {
        Self::PaymentRequired(reason.into())
    }
}
