//! Ledger entries - the append-only audit trail of inbound notifications.
//!
//! Every notification produces exactly one [`PaymentRecord`], whatever its
//! outcome. Records are never updated after they are written.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{PaymentRecordId, Timestamp, UserId, ValidationError};

use super::TransferNotification;

/// How a notification was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// Not a payment for us (wrong amount, no readable code).
    Ignored,

    /// Carried a code that could not be honoured.
    Failed,

    /// Matched a session and granted the product.
    Processed,
}

impl Resolution {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::Ignored => "ignored",
            Resolution::Failed => "failed",
            Resolution::Processed => "processed",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resolution {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ignored" => Ok(Resolution::Ignored),
            "failed" => Ok(Resolution::Failed),
            "processed" => Ok(Resolution::Processed),
            other => Err(ValidationError::invalid_format(
                "resolution",
                format!("unknown resolution '{}'", other),
            )),
        }
    }
}

/// One inbound notification and its resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub id: PaymentRecordId,

    /// The payload exactly as received.
    pub transfer: TransferNotification,

    pub resolution: Resolution,

    /// Rejection label and message for Ignored/Failed records.
    pub reason: Option<String>,

    /// Set once the code resolved to a user.
    pub user_id: Option<UserId>,

    pub processed_at: Timestamp,
}

impl PaymentRecord {
    pub fn new(
        transfer: TransferNotification,
        resolution: Resolution,
        reason: Option<String>,
        user_id: Option<UserId>,
        processed_at: Timestamp,
    ) -> Self {
        Self {
            id: PaymentRecordId::new(),
            transfer,
            resolution,
            reason,
            user_id,
            processed_at,
        }
    }
}
