//! Entitlement repository port.
//!
//! Exclusively owns the `owned`, `banned` and pending-code fields of a
//! user. User records themselves are created by the account service.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::payment::{Entitlement, PaymentCode};

#[async_trait]
pub trait EntitlementRepository: Send + Sync {
    /// Returns `None` if the user does not exist.
    async fn find(&self, user_id: &UserId) -> Result<Option<Entitlement>, DomainError>;

    /// Reverse lookup: the user whose outstanding code equals `code`.
    async fn find_by_pending_code(&self, code: &str) -> Result<Option<Entitlement>, DomainError>;

    /// Overwrites the user's single pending-code slot.
    ///
    /// # Errors
    ///
    /// - `UserNotFound` if the user does not exist
    async fn assign_pending_code(
        &self,
        user_id: &UserId,
        code: &PaymentCode,
    ) -> Result<(), DomainError>;

    /// Sets `owned` and clears the pending code. Granting twice is a no-op.
    ///
    /// # Errors
    ///
    /// - `UserNotFound` if the user does not exist
    async fn grant(&self, user_id: &UserId) -> Result<(), DomainError>;

    async fn is_owned(&self, user_id: &UserId) -> Result<bool, DomainError> {
        Ok(self.find(user_id).await?.map(|e| e.owned).unwrap_or(false))
    }

    async fn is_banned(&self, user_id: &UserId) -> Result<bool, DomainError> {
        Ok(self.find(user_id).await?.map(|e| e.banned).unwrap_or(false))
    }

    async fn pending_code_of(&self, user_id: &UserId) -> Result<Option<PaymentCode>, DomainError> {
        Ok(self.find(user_id).await?.and_then(|e| e.pending_code))
    }
}
