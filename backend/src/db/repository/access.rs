//! Reads backing authentication and ticket eligibility.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{Enrollment, EnrollmentId, Session, TicketWithType, UserId};

/// Repository trait for sessions, enrollments and tickets.
///
/// All lookups return `Ok(None)` when the record does not exist; `Err` is
/// reserved for storage failures.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait AccessRepository: Send + Sync {
    /// Check if the storage backend is reachable.
    ///
    /// # Returns
    /// - `Ok(true)` if connection is healthy
    /// - `Ok(false)` if connection is unhealthy but no error occurred
    /// - `Err(RepositoryError)` if an error occurred during the check
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// Find the session a bearer token was issued for.
    async fn find_session_by_token(&self, token: &str) -> RepositoryResult<Option<Session>>;

    /// Find the enrollment owned by a user.
    async fn find_enrollment_by_user(&self, user_id: UserId)
        -> RepositoryResult<Option<Enrollment>>;

    /// Find the ticket tied to an enrollment, joined with its ticket type.
    async fn find_ticket_by_enrollment(
        &self,
        enrollment_id: EnrollmentId,
    ) -> RepositoryResult<Option<TicketWithType>>;
}
