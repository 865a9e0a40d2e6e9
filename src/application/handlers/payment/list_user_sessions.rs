//! ListUserSessionsHandler - Query handler for a user's payment history.

use std::sync::Arc;

use crate::domain::foundation::{Timestamp, UserId};
use crate::domain::payment::PaymentError;
use crate::ports::PaymentSessionRepository;

use super::PaymentSessionView;

#[derive(Debug, Clone)]
pub struct ListUserSessionsQuery {
    pub user_id: UserId,
}

pub struct ListUserSessionsHandler {
    sessions: Arc<dyn PaymentSessionRepository>,
}

impl ListUserSessionsHandler {
    pub fn new(sessions: Arc<dyn PaymentSessionRepository>) -> Self {
        Self { sessions }
    }

    /// Newest first, with effective statuses.
    pub async fn handle(
        &self,
        query: ListUserSessionsQuery,
    ) -> Result<Vec<PaymentSessionView>, PaymentError> {
        let now = Timestamp::now();
        let sessions = self.sessions.list_by_user(&query.user_id).await?;
        Ok(sessions
            .iter()
            .map(|s| PaymentSessionView::at(s, &now))
            .collect())
    }
}
