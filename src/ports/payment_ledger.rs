//! Payment ledger port - append-only audit trail.
//!
//! There is deliberately no update or delete: a record written for a
//! notification is final.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::payment::PaymentRecord;

#[async_trait]
pub trait PaymentLedger: Send + Sync {
    async fn append(&self, record: &PaymentRecord) -> Result<(), DomainError>;

    /// Records linked to a user, newest first.
    async fn list_by_user(&self, user_id: &UserId) -> Result<Vec<PaymentRecord>, DomainError>;

    /// Most recent records across all users, newest first.
    async fn list_recent(&self, limit: u32) -> Result<Vec<PaymentRecord>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_ledger_is_object_safe() {
        fn _accepts_dyn(_ledger: &dyn PaymentLedger) {}
    }
}
