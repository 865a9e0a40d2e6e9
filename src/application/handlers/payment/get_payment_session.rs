//! GetPaymentSessionHandler - Query handler for one of the caller's payment sessions.

use std::sync::Arc;

use crate::domain::foundation::{PaymentSessionId, Timestamp, UserId};
use crate::domain::payment::PaymentError;
use crate::ports::PaymentSessionRepository;

use super::PaymentSessionView;

/// Query for a single session, scoped to its owner.
#[derive(Debug, Clone)]
pub struct GetPaymentSessionQuery {
    pub session_id: PaymentSessionId,
    pub user_id: UserId,
}

pub struct GetPaymentSessionHandler {
    sessions: Arc<dyn PaymentSessionRepository>,
}

impl GetPaymentSessionHandler {
    pub fn new(sessions: Arc<dyn PaymentSessionRepository>) -> Self {
        Self { sessions }
    }

    /// Sessions belonging to someone else are reported as not found.
    pub async fn handle(
        &self,
        query: GetPaymentSessionQuery,
    ) -> Result<PaymentSessionView, PaymentError> {
        let session = self
            .sessions
            .find_by_id(&query.session_id)
            .await?
            .filter(|s| s.user_id == query.user_id)
            .ok_or(PaymentError::SessionNotFound(query.session_id))?;

        Ok(PaymentSessionView::at(&session, &Timestamp::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemorySessionRepository;
    use crate::domain::payment::{PaymentCode, PaymentSession, PaymentSessionStatus};

    async fn seeded() -> (InMemorySessionRepository, PaymentSession) {
        let repo = InMemorySessionRepository::new();
        let session = PaymentSession::open(
            UserId::new("owner").unwrap(),
            PaymentCode::parse("AB12CD34").unwrap(),
            5_000_000,
            String::new(),
            Timestamp::now(),
            15,
        );
        repo.insert(&session).await.unwrap();
        (repo, session)
    }

    #[tokio::test]
    async fn returns_owner_session() {
        let (repo, session) = seeded().await;
        let handler = GetPaymentSessionHandler::new(Arc::new(repo));

        let view = handler
            .handle(GetPaymentSessionQuery {
                session_id: session.id,
                user_id: UserId::new("owner").unwrap(),
            })
            .await
            .unwrap();

        assert_eq!(view.id, session.id);
        assert_eq!(view.status, PaymentSessionStatus::Pending);
    }

    #[tokio::test]
    async fn hides_other_users_session() {
        let (repo, session) = seeded().await;
        let handler = GetPaymentSessionHandler::new(Arc::new(repo));

        let result = handler
            .handle(GetPaymentSessionQuery {
                session_id: session.id,
                user_id: UserId::new("intruder").unwrap(),
            })
            .await;

        assert_eq!(result.unwrap_err(), PaymentError::SessionNotFound(session.id));
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let (repo, _) = seeded().await;
        let handler = GetPaymentSessionHandler::new(Arc::new(repo));

        let result = handler
            .handle(GetPaymentSessionQuery {
                session_id: PaymentSessionId::new(),
                user_id: UserId::new("owner").unwrap(),
            })
            .await;

        assert!(matches!(result, Err(PaymentError::SessionNotFound(_))));
    }
}
