//! PaymentSession aggregate.
//!
//! A session is a time-boxed invitation to pay a fixed amount, keyed by a
//! payment code the payer copies into the transfer description.
//!
//! # Invariants
//!
//! - `code` is unique among every session ever created, not only open ones
//! - `completed_at` is `Some` exactly when `status == Completed`
//! - `expires_at = created_at + ttl`

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    DomainError, ErrorCode, PaymentSessionId, StateMachine, Timestamp, UserId,
};

use super::{PaymentCode, PaymentSessionStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSession {
    pub id: PaymentSessionId,

    /// User who will be granted the product once this session is paid.
    pub user_id: UserId,

    pub code: PaymentCode,

    /// Required transfer amount in minor currency units.
    pub amount: i64,

    pub status: PaymentSessionStatus,

    /// VietQR image pre-filling account, amount and description.
    pub qr_image_url: String,

    pub created_at: Timestamp,

    pub expires_at: Timestamp,

    pub completed_at: Option<Timestamp>,
}

impl PaymentSession {
    /// Opens a new Pending session valid for `ttl_minutes` from `now`.
    pub fn open(
        user_id: UserId,
        code: PaymentCode,
        amount: i64,
        qr_image_url: String,
        now: Timestamp,
        ttl_minutes: i64,
    ) -> Self {
        Self {
            id: PaymentSessionId::new(),
            user_id,
            code,
            amount,
            status: PaymentSessionStatus::Pending,
            qr_image_url,
            created_at: now,
            expires_at: now.plus_minutes(ttl_minutes),
            completed_at: None,
        }
    }

    /// True once `now` has reached the end of the payment window.
    pub fn is_expired_at(&self, now: &Timestamp) -> bool {
        !now.is_before(&self.expires_at)
    }

    /// Status as it should be presented at `now`.
    ///
    /// A Pending session past its window reads as Expired; the stored
    /// status is left untouched.
    pub fn effective_status(&self, now: &Timestamp) -> PaymentSessionStatus {
        match self.status {
            PaymentSessionStatus::Pending if self.is_expired_at(now) => {
                PaymentSessionStatus::Expired
            }
            status => status,
        }
    }

    /// Whether the conditional completion filter would match this session.
    pub fn is_completable_at(&self, now: &Timestamp, enforce_expiry: bool) -> bool {
        self.status == PaymentSessionStatus::Pending && !(enforce_expiry && self.is_expired_at(now))
    }

    /// Marks the session paid.
    ///
    /// # Errors
    ///
    /// Returns `InvalidStateTransition` unless the session is Pending.
    pub fn complete(&mut self, now: Timestamp) -> Result<(), DomainError> {
        self.status = self
            .status
            .transition_to(PaymentSessionStatus::Completed)
            .map_err(|_| {
                DomainError::new(
                    ErrorCode::InvalidStateTransition,
                    format!("Cannot complete payment session in {} state", self.status),
                )
            })?;
        self.completed_at = Some(now);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_at(now: Timestamp) -> PaymentSession {
        PaymentSession::open(
            UserId::new("user-1").unwrap(),
            PaymentCode::parse("AB12CD34").unwrap(),
            5_000_000,
            "https://img.vietqr.io/image/test.jpg".to_string(),
            now,
            15,
        )
    }

    #[test]
    fn open_creates_pending_session_with_window() {
        let now = Timestamp::now();
        let session = session_at(now);

        assert_eq!(session.status, PaymentSessionStatus::Pending);
        assert_eq!(session.expires_at, now.plus_minutes(15));
        assert!(session.completed_at.is_none());
    }

    #[test]
    fn complete_sets_completion_time() {
        let now = Timestamp::now();
        let mut session = session_at(now);

        session.complete(now).unwrap();

        assert_eq!(session.status, PaymentSessionStatus::Completed);
        assert_eq!(session.completed_at, Some(now));
    }

    #[test]
    fn complete_twice_fails() {
        let now = Timestamp::now();
        let mut session = session_at(now);
        session.complete(now).unwrap();

        let err = session.complete(now).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidStateTransition);
    }

    #[test]
    fn effective_status_reads_expired_after_window() {
        let now = Timestamp::now();
        let session = session_at(now);

        assert_eq!(session.effective_status(&now), PaymentSessionStatus::Pending);
        assert_eq!(
            session.effective_status(&now.plus_minutes(15)),
            PaymentSessionStatus::Expired
        );
        assert_eq!(session.status, PaymentSessionStatus::Pending);
    }

    #[test]
    fn completed_session_never_reads_expired() {
        let now = Timestamp::now();
        let mut session = session_at(now);
        session.complete(now).unwrap();

        assert_eq!(
            session.effective_status(&now.plus_minutes(60)),
            PaymentSessionStatus::Completed
        );
    }

    #[test]
    fn completable_respects_expiry_flag() {
        let now = Timestamp::now();
        let session = session_at(now);
        let late = now.plus_minutes(16);

        assert!(session.is_completable_at(&now, true));
        assert!(!session.is_completable_at(&late, true));
        assert!(session.is_completable_at(&late, false));
    }
}
