//! CheckOwnershipHandler - Query handler for whether a user owns the product.

use std::sync::Arc;

use crate::domain::foundation::UserId;
use crate::domain::payment::PaymentError;
use crate::ports::EntitlementRepository;

#[derive(Debug, Clone)]
pub struct CheckOwnershipQuery {
    pub user_id: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOwnershipResult {
    pub owned: bool,
    pub banned: bool,
}

pub struct CheckOwnershipHandler {
    entitlements: Arc<dyn EntitlementRepository>,
}

impl CheckOwnershipHandler {
    pub fn new(entitlements: Arc<dyn EntitlementRepository>) -> Self {
        Self { entitlements }
    }

    pub async fn handle(
        &self,
        query: CheckOwnershipQuery,
    ) -> Result<CheckOwnershipResult, PaymentError> {
        let entitlement = self
            .entitlements
            .find(&query.user_id)
            .await?
            .ok_or(PaymentError::UserNotFound(query.user_id))?;

        Ok(CheckOwnershipResult {
            owned: entitlement.owned,
            banned: entitlement.banned,
        })
    }
}
