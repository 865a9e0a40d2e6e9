//! Payment error types.
//!
//! Two families live here:
//!
//! - [`PaymentError`] - hard failures surfaced to the caller (session
//!   initiation refusals and persistence failures)
//! - [`ReconcileRejection`] - classification outcomes of a transfer
//!   notification; recorded in the ledger, never propagated to the sender
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | UserNotFound | 404 |
//! | SessionNotFound | 404 |
//! | UserBanned | 403 |
//! | AlreadyOwned | 409 |
//! | CodeSpaceExhausted | 503 |
//! | Infrastructure | 500 |

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, PaymentSessionId, UserId};

use super::{Resolution, CODE_LENGTH};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentError {
    #[error("User not found: {0}")]
    UserNotFound(UserId),

    #[error("User {0} is banned and cannot make payments")]
    UserBanned(UserId),

    #[error("User {0} already owns the product")]
    AlreadyOwned(UserId),

    #[error("Payment session not found: {0}")]
    SessionNotFound(PaymentSessionId),

    /// Every candidate code collided with an existing session.
    #[error("Could not allocate a unique payment code after {attempts} attempts")]
    CodeSpaceExhausted { attempts: u32 },

    /// Persistence failure.
    #[error("Error: {0}")]
    Infrastructure(String),
}

impl PaymentError {
    pub fn infrastructure(message: impl Into<String>) -> Self {
        PaymentError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            PaymentError::UserNotFound(_) => ErrorCode::UserNotFound,
            PaymentError::UserBanned(_) => ErrorCode::UserBanned,
            PaymentError::AlreadyOwned(_) => ErrorCode::AlreadyOwned,
            PaymentError::SessionNotFound(_) => ErrorCode::PaymentSessionNotFound,
            PaymentError::CodeSpaceExhausted { .. } => ErrorCode::CodeSpaceExhausted,
            PaymentError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    /// Returns true if the caller may retry the same request.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PaymentError::Infrastructure(_) | PaymentError::CodeSpaceExhausted { .. }
        )
    }
}

impl From<DomainError> for PaymentError {
    fn from(err: DomainError) -> Self {
        PaymentError::Infrastructure(err.to_string())
    }
}

impl From<PaymentError> for DomainError {
    fn from(err: PaymentError) -> Self {
        DomainError::new(err.code(), err.to_string())
    }
}

/// Why a transfer notification did not result in a grant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileRejection {
    #[error("Transfer amount {actual} does not match price {expected}")]
    InvalidAmount { expected: i64, actual: i64 },

    /// Outgoing or otherwise non-incoming transfer on the receiving account.
    #[error("Transfer type '{transfer_type}' is not an incoming transfer")]
    NotIncoming { transfer_type: String },

    #[error("Payment marker not found in transfer content")]
    MarkerNotFound,

    #[error("Fewer than {} characters follow the payment marker", CODE_LENGTH)]
    CodeTooShort,

    /// Unknown, already completed or expired code.
    #[error("No pending payment session for code {code}")]
    NoMatchingSession { code: String },

    #[error("No user holds pending code {code}")]
    UserNotFound { code: String },

    #[error("User {0} is banned")]
    UserBanned(UserId),
}

impl ReconcileRejection {
    /// Ledger resolution recorded for this rejection.
    ///
    /// Notifications that are not ours (wrong amount, no readable code) are
    /// Ignored; notifications that carry a code we cannot honour are Failed.
    pub fn resolution(&self) -> Resolution {
        match self {
            ReconcileRejection::InvalidAmount { .. }
            | ReconcileRejection::NotIncoming { .. }
            | ReconcileRejection::MarkerNotFound
            | ReconcileRejection::CodeTooShort => Resolution::Ignored,
            ReconcileRejection::NoMatchingSession { .. }
            | ReconcileRejection::UserNotFound { .. }
            | ReconcileRejection::UserBanned(_) => Resolution::Failed,
        }
    }

    /// Stable machine-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            ReconcileRejection::InvalidAmount { .. } => "invalid_amount",
            ReconcileRejection::NotIncoming { .. } => "not_incoming",
            ReconcileRejection::MarkerNotFound => "marker_not_found",
            ReconcileRejection::CodeTooShort => "code_too_short",
            ReconcileRejection::NoMatchingSession { .. } => "no_matching_session",
            ReconcileRejection::UserNotFound { .. } => "user_not_found",
            ReconcileRejection::UserBanned(_) => "user_banned",
        }
    }
}
