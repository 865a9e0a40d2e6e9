//! In-memory entitlement repository.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, UserId};
use crate::domain::payment::{Entitlement, PaymentCode};
use crate::ports::EntitlementRepository;

/// In-memory entitlement storage keyed by user.
///
/// Users are registered elsewhere; tests and the dev server seed them with
/// [`InMemoryEntitlementRepository::register`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryEntitlementRepository {
    entitlements: Arc<RwLock<HashMap<UserId, Entitlement>>>,
}

impl InMemoryEntitlementRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a user record.
    pub async fn register(&self, entitlement: Entitlement) {
        self.entitlements
            .write()
            .await
            .insert(entitlement.user_id.clone(), entitlement);
    }

    /// Sets the banned flag of an existing user.
    pub async fn set_banned(&self, user_id: &UserId, banned: bool) -> Result<(), DomainError> {
        let mut entitlements = self.entitlements.write().await;
        let entitlement = entitlements
            .get_mut(user_id)
            .ok_or_else(|| user_not_found(user_id))?;
        entitlement.banned = banned;
        entitlement.updated_at = Timestamp::now();
        Ok(())
    }
}

fn user_not_found(user_id: &UserId) -> DomainError {
    DomainError::new(ErrorCode::UserNotFound, format!("User not found: {}", user_id))
}

#[async_trait]
impl EntitlementRepository for InMemoryEntitlementRepository {
    async fn find(&self, user_id: &UserId) -> Result<Option<Entitlement>, DomainError> {
        Ok(self.entitlements.read().await.get(user_id).cloned())
    }

    async fn find_by_pending_code(&self, code: &str) -> Result<Option<Entitlement>, DomainError> {
        let entitlements = self.entitlements.read().await;
        Ok(entitlements
            .values()
            .find(|e| e.pending_code.as_ref().map(PaymentCode::as_str) == Some(code))
            .cloned())
    }

    async fn assign_pending_code(
        &self,
        user_id: &UserId,
        code: &PaymentCode,
    ) -> Result<(), DomainError> {
        let mut entitlements = self.entitlements.write().await;
        let entitlement = entitlements
            .get_mut(user_id)
            .ok_or_else(|| user_not_found(user_id))?;
        entitlement.assign_pending_code(code.clone(), Timestamp::now());
        Ok(())
    }

    async fn grant(&self, user_id: &UserId) -> Result<(), DomainError> {
        let mut entitlements = self.entitlements.write().await;
        let entitlement = entitlements
            .get_mut(user_id)
            .ok_or_else(|| user_not_found(user_id))?;
        entitlement.grant(Timestamp::now());
        Ok(())
    }
}
