//! Payment session repository port.
//!
//! Owns the PaymentSession lifecycle. The conditional completion
//! (`complete_pending`) is the single concurrency guard of reconciliation:
//! implementations must execute it as one atomic, per-row linearizable
//! "update where code = X and status = pending" so that of any number of
//! concurrent callers with the same code at most one observes a match.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, PaymentSessionId, Timestamp, UserId};
use crate::domain::payment::{PaymentCode, PaymentSession};

/// Whether the completion filter also requires the session to be unexpired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryPolicy {
    /// Only sessions with `expires_at > now` can complete.
    Enforce,
    /// Any Pending session can complete, however old.
    Ignore,
}

#[async_trait]
pub trait PaymentSessionRepository: Send + Sync {
    /// Persist a new session.
    ///
    /// # Errors
    ///
    /// - `DuplicatePaymentCode` if another session already carries the code
    /// - `DatabaseError` on persistence failure
    async fn insert(&self, session: &PaymentSession) -> Result<(), DomainError>;

    /// True if any session, in any status, carries this code.
    async fn code_exists(&self, code: &PaymentCode) -> Result<bool, DomainError>;

    async fn find_by_id(&self, id: &PaymentSessionId)
        -> Result<Option<PaymentSession>, DomainError>;

    async fn find_by_code(&self, code: &PaymentCode) -> Result<Option<PaymentSession>, DomainError>;

    /// All sessions of a user, newest first.
    async fn list_by_user(&self, user_id: &UserId) -> Result<Vec<PaymentSession>, DomainError>;

    /// Atomically moves the Pending session carrying `code` to Completed.
    ///
    /// Returns the updated session when exactly one row matched, `None`
    /// when no eligible session exists (unknown, already completed, or
    /// expired under [`ExpiryPolicy::Enforce`]). `None` is not an error.
    async fn complete_pending(
        &self,
        code: &str,
        now: Timestamp,
        policy: ExpiryPolicy,
    ) -> Result<Option<PaymentSession>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_session_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn PaymentSessionRepository) {}
    }
}
