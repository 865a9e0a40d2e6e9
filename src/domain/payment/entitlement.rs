//! Per-user product entitlement.
//!
//! Holds the subset of the user record the payment flow cares about: the
//! ownership flag, the banned flag and the single outstanding payment code.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Timestamp, UserId};

use super::{PaymentCode, PaymentError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entitlement {
    pub user_id: UserId,

    /// The user owns the product.
    pub owned: bool,

    pub banned: bool,

    /// At most one outstanding code per user; cleared on grant.
    pub pending_code: Option<PaymentCode>,

    pub updated_at: Timestamp,
}

impl Entitlement {
    /// A fresh, not-yet-paying user.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            owned: false,
            banned: false,
            pending_code: None,
            updated_at: Timestamp::now(),
        }
    }

    /// Checks the user may open a payment session.
    ///
    /// # Errors
    ///
    /// - `UserBanned` if the account is banned
    /// - `AlreadyOwned` if the product was already granted
    pub fn ensure_can_purchase(&self) -> Result<(), PaymentError> {
        if self.banned {
            return Err(PaymentError::UserBanned(self.user_id.clone()));
        }
        if self.owned {
            return Err(PaymentError::AlreadyOwned(self.user_id.clone()));
        }
        Ok(())
    }

    /// Replaces the outstanding code. Last pending code wins.
    pub fn assign_pending_code(&mut self, code: PaymentCode, now: Timestamp) {
        self.pending_code = Some(code);
        self.updated_at = now;
    }

    /// Grants the product and consumes the outstanding code.
    pub fn grant(&mut self, now: Timestamp) {
        self.owned = true;
        self.pending_code = None;
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> Entitlement {
        Entitlement::new(UserId::new("user-1").unwrap())
    }

    #[test]
    fn new_user_can_purchase() {
        assert!(user().ensure_can_purchase().is_ok());
    }

    #[test]
    fn banned_user_cannot_purchase() {
        let mut e = user();
        e.banned = true;
        assert!(matches!(e.ensure_can_purchase(), Err(PaymentError::UserBanned(_))));
    }

    #[test]
    fn owner_cannot_purchase_again() {
        let mut e = user();
        e.owned = true;
        assert!(matches!(e.ensure_can_purchase(), Err(PaymentError::AlreadyOwned(_))));
    }

    #[test]
    fn banned_takes_precedence_over_owned() {
        let mut e = user();
        e.owned = true;
        e.banned = true;
        assert!(matches!(e.ensure_can_purchase(), Err(PaymentError::UserBanned(_))));
    }

    #[test]
    fn assigning_a_code_overwrites_the_previous_one() {
        let mut e = user();
        let now = Timestamp::now();
        e.assign_pending_code(PaymentCode::parse("AAAAAAAA").unwrap(), now);
        e.assign_pending_code(PaymentCode::parse("BBBBBBBB").unwrap(), now);
        assert_eq!(e.pending_code.as_ref().map(|c| c.as_str()), Some("BBBBBBBB"));
    }

    #[test]
    fn grant_sets_owned_and_clears_code() {
        let mut e = user();
        let now = Timestamp::now();
        e.assign_pending_code(PaymentCode::parse("AB12CD34").unwrap(), now);

        e.grant(now);

        assert!(e.owned);
        assert!(e.pending_code.is_none());
    }
}
