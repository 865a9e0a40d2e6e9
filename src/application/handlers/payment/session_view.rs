//! Read model for payment sessions.

use serde::Serialize;

use crate::domain::foundation::{PaymentSessionId, Timestamp};
use crate::domain::payment::{PaymentSession, PaymentSessionStatus};

/// A session as presented to its owner at a point in time.
///
/// `status` is the effective status: a Pending session past its expiry is
/// reported as Expired even though storage still says Pending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentSessionView {
    pub id: PaymentSessionId,
    pub payment_code: String,
    pub amount: i64,
    pub status: PaymentSessionStatus,
    pub qr_image_url: String,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
    pub completed_at: Option<Timestamp>,
}

impl PaymentSessionView {
    pub fn at(session: &PaymentSession, now: &Timestamp) -> Self {
        Self {
            id: session.id,
            payment_code: session.code.as_str().to_string(),
            amount: session.amount,
            status: session.effective_status(now),
            qr_image_url: session.qr_image_url.clone(),
            created_at: session.created_at,
            expires_at: session.expires_at,
            completed_at: session.completed_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::UserId;
    use crate::domain::payment::PaymentCode;

    #[test]
    fn stale_pending_session_reads_as_expired() {
        let created = Timestamp::now().minus_minutes(20);
        let session = PaymentSession::open(
            UserId::new("u1").unwrap(),
            PaymentCode::parse("AB12CD34").unwrap(),
            5_000_000,
            String::new(),
            created,
            15,
        );

        let view = PaymentSessionView::at(&session, &Timestamp::now());

        assert_eq!(view.status, PaymentSessionStatus::Expired);
        assert_eq!(session.status, PaymentSessionStatus::Pending);
        assert_eq!(view.payment_code, "AB12CD34");
    }
}
