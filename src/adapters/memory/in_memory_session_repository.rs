//! In-memory payment session repository.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, PaymentSessionId, Timestamp, UserId};
use crate::domain::payment::{PaymentCode, PaymentSession};
use crate::ports::{ExpiryPolicy, PaymentSessionRepository};

#[derive(Debug, Default)]
struct Sessions {
    by_id: HashMap<PaymentSessionId, PaymentSession>,
    /// code -> session id; mirrors the unique index on `payment_sessions.code`
    by_code: HashMap<String, PaymentSessionId>,
}

/// In-memory session storage.
///
/// `complete_pending` performs its lookup and update under one write lock,
/// which gives the same single-winner guarantee as the conditional UPDATE
/// in the Postgres adapter.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionRepository {
    inner: Arc<RwLock<Sessions>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.by_id.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl PaymentSessionRepository for InMemorySessionRepository {
    async fn insert(&self, session: &PaymentSession) -> Result<(), DomainError> {
        let mut sessions = self.inner.write().await;
        if sessions.by_code.contains_key(session.code.as_str()) {
            return Err(DomainError::new(
                ErrorCode::DuplicatePaymentCode,
                format!("Payment code {} is already in use", session.code),
            ));
        }
        sessions
            .by_code
            .insert(session.code.as_str().to_string(), session.id);
        sessions.by_id.insert(session.id, session.clone());
        Ok(())
    }

    async fn code_exists(&self, code: &PaymentCode) -> Result<bool, DomainError> {
        Ok(self.inner.read().await.by_code.contains_key(code.as_str()))
    }

    async fn find_by_id(
        &self,
        id: &PaymentSessionId,
    ) -> Result<Option<PaymentSession>, DomainError> {
        Ok(self.inner.read().await.by_id.get(id).cloned())
    }

    async fn find_by_code(&self, code: &PaymentCode) -> Result<Option<PaymentSession>, DomainError> {
        let sessions = self.inner.read().await;
        Ok(sessions
            .by_code
            .get(code.as_str())
            .and_then(|id| sessions.by_id.get(id))
            .cloned())
    }

    async fn list_by_user(&self, user_id: &UserId) -> Result<Vec<PaymentSession>, DomainError> {
        let sessions = self.inner.read().await;
        let mut found: Vec<PaymentSession> = sessions
            .by_id
            .values()
            .filter(|s| &s.user_id == user_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn complete_pending(
        &self,
        code: &str,
        now: Timestamp,
        policy: ExpiryPolicy,
    ) -> Result<Option<PaymentSession>, DomainError> {
        let mut sessions = self.inner.write().await;
        let Some(id) = sessions.by_code.get(code).copied() else {
            return Ok(None);
        };
        let Some(session) = sessions.by_id.get_mut(&id) else {
            return Ok(None);
        };
        if !session.is_completable_at(&now, policy == ExpiryPolicy::Enforce) {
            return Ok(None);
        }
        session.complete(now)?;
        Ok(Some(session.clone()))
    }
}
