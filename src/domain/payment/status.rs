//! Payment session status state machine.
//!
//! The only written transition is `Pending -> Completed`, performed by the
//! reconciler's conditional update. `Expired` is never stored; views derive
//! it at read time from `expires_at`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{StateMachine, ValidationError};

/// Lifecycle status of a payment session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentSessionStatus {
    /// Waiting for a matching bank transfer.
    Pending,

    /// A matching transfer was reconciled against this session.
    Completed,

    /// Past its payment window without a match.
    Expired,
}

impl PaymentSessionStatus {
    /// Storage/wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentSessionStatus::Pending => "pending",
            PaymentSessionStatus::Completed => "completed",
            PaymentSessionStatus::Expired => "expired",
        }
    }
}

impl fmt::Display for PaymentSessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentSessionStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(PaymentSessionStatus::Pending),
            "completed" => Ok(PaymentSessionStatus::Completed),
            "expired" => Ok(PaymentSessionStatus::Expired),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown payment session status '{}'", other),
            )),
        }
    }
}

impl StateMachine for PaymentSessionStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        matches!(
            (self, target),
            (PaymentSessionStatus::Pending, PaymentSessionStatus::Completed)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        match self {
            PaymentSessionStatus::Pending => vec![PaymentSessionStatus::Completed],
            PaymentSessionStatus::Completed | PaymentSessionStatus::Expired => vec![],
        }
    }
}
