//! ReconcileTransferHandler - Command handler for inbound bank-transfer notifications.
//!
//! Turns one untrusted notification into exactly one ledger record and at
//! most one entitlement grant. Checks run in a fixed order and the first
//! failing check decides the outcome:
//!
//! 1. amount equals the product price and the transfer is incoming, else Ignored
//! 2. the memo carries the marker followed by a full-length code, else Ignored
//! 3. a Pending session with that code completes atomically, else Failed
//! 4. the code resolves to a user who is not banned, else Failed
//! 5. the user is granted the product, Processed
//!
//! A store failure part-way through is still recorded as Failed before the
//! error is returned; only a failed ledger write leaves no record.
//!
//! The conditional completion in step 3 is the only concurrency guard:
//! duplicate or concurrent deliveries of the same transfer see at most one
//! match, so the grant happens once.

use std::sync::Arc;

use crate::domain::foundation::{PaymentRecordId, Timestamp, UserId};
use crate::domain::payment::{
    PaymentError, PaymentRecord, ReconcileRejection, Resolution, TransferMemoParser,
    TransferNotification,
};
use crate::ports::{EntitlementRepository, ExpiryPolicy, PaymentLedger, PaymentSessionRepository};

/// Gateway `transferType` for money arriving in the receiving account.
const INCOMING: &str = "in";

/// Ledger reason label for notifications cut short by a store failure.
const PERSISTENCE_FAILURE: &str = "persistence_failure";

/// Command carrying one webhook delivery.
#[derive(Debug, Clone)]
pub struct ReconcileTransferCommand {
    pub notification: TransferNotification,
}

/// How a notification was resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// Ledger record written for this notification.
    pub record_id: PaymentRecordId,
    pub resolution: Resolution,
    pub user_id: Option<UserId>,
    /// Why the notification was Ignored or Failed.
    pub rejection: Option<ReconcileRejection>,
}

/// Handler for reconciling transfer notifications against payment sessions.
pub struct ReconcileTransferHandler {
    sessions: Arc<dyn PaymentSessionRepository>,
    entitlements: Arc<dyn EntitlementRepository>,
    ledger: Arc<dyn PaymentLedger>,
    parser: TransferMemoParser,
    price: i64,
    expiry_policy: ExpiryPolicy,
}

impl ReconcileTransferHandler {
    pub fn new(
        sessions: Arc<dyn PaymentSessionRepository>,
        entitlements: Arc<dyn EntitlementRepository>,
        ledger: Arc<dyn PaymentLedger>,
        parser: TransferMemoParser,
        price: i64,
        expiry_policy: ExpiryPolicy,
    ) -> Self {
        Self {
            sessions,
            entitlements,
            ledger,
            parser,
            price,
            expiry_policy,
        }
    }

    pub async fn handle(
        &self,
        cmd: ReconcileTransferCommand,
    ) -> Result<ReconcileOutcome, PaymentError> {
        let transfer = cmd.notification;
        let now = Timestamp::now();

        match self.settle(&transfer, now).await {
            Settlement::Granted(user_id) => {
                tracing::info!(
                    transfer_id = transfer.id,
                    user_id = %user_id,
                    amount = transfer.transfer_amount,
                    "Payment processed, product granted"
                );
                self.record(transfer, Resolution::Processed, None, Some(user_id), now)
                    .await
            }
            Settlement::Rejected(rejection) => {
                let user_id = match &rejection {
                    ReconcileRejection::UserBanned(user_id) => Some(user_id.clone()),
                    _ => None,
                };
                tracing::warn!(
                    transfer_id = transfer.id,
                    resolution = %rejection.resolution(),
                    reason = rejection.label(),
                    content = %transfer.content,
                    "{}",
                    rejection
                );
                self.record(
                    transfer,
                    rejection.resolution(),
                    Some(rejection),
                    user_id,
                    now,
                )
                .await
            }
            Settlement::Interrupted { error, user_id } => {
                let reason = format!("{}: {}", PERSISTENCE_FAILURE, error);
                let record =
                    PaymentRecord::new(transfer, Resolution::Failed, Some(reason), user_id, now);
                self.append(&record).await?;
                Err(error)
            }
        }
    }

    /// Runs the checks and side effects in order and reports where they stopped.
    async fn settle(&self, transfer: &TransferNotification, now: Timestamp) -> Settlement {
        if transfer.transfer_amount != self.price {
            return Settlement::Rejected(ReconcileRejection::InvalidAmount {
                expected: self.price,
                actual: transfer.transfer_amount,
            });
        }

        if !transfer.transfer_type.eq_ignore_ascii_case(INCOMING) {
            return Settlement::Rejected(ReconcileRejection::NotIncoming {
                transfer_type: transfer.transfer_type.clone(),
            });
        }

        let code = match self.parser.extract_code(&transfer.content) {
            Ok(code) => code,
            Err(rejection) => return Settlement::Rejected(rejection),
        };

        match self
            .sessions
            .complete_pending(&code, now, self.expiry_policy)
            .await
        {
            Ok(Some(_)) => {}
            Ok(None) => {
                return Settlement::Rejected(ReconcileRejection::NoMatchingSession { code })
            }
            Err(e) => {
                return Settlement::interrupted(
                    persistence_failure(transfer, "complete payment session", e),
                    None,
                )
            }
        }

        let entitlement = match self.entitlements.find_by_pending_code(&code).await {
            Ok(Some(entitlement)) => entitlement,
            Ok(None) => return Settlement::Rejected(ReconcileRejection::UserNotFound { code }),
            Err(e) => {
                return Settlement::interrupted(
                    persistence_failure(transfer, "resolve payment code", e),
                    None,
                )
            }
        };
        if entitlement.banned {
            return Settlement::Rejected(ReconcileRejection::UserBanned(entitlement.user_id));
        }

        if let Err(e) = self.entitlements.grant(&entitlement.user_id).await {
            return Settlement::interrupted(
                persistence_failure(transfer, "grant product", e),
                Some(entitlement.user_id),
            );
        }

        Settlement::Granted(entitlement.user_id)
    }

    async fn record(
        &self,
        transfer: TransferNotification,
        resolution: Resolution,
        rejection: Option<ReconcileRejection>,
        user_id: Option<UserId>,
        now: Timestamp,
    ) -> Result<ReconcileOutcome, PaymentError> {
        let reason = rejection
            .as_ref()
            .map(|r| format!("{}: {}", r.label(), r));
        let record = PaymentRecord::new(transfer, resolution, reason, user_id.clone(), now);
        self.append(&record).await?;

        Ok(ReconcileOutcome {
            record_id: record.id,
            resolution,
            user_id,
            rejection,
        })
    }

    async fn append(&self, record: &PaymentRecord) -> Result<(), PaymentError> {
        self.ledger
            .append(record)
            .await
            .map_err(|e| persistence_failure(&record.transfer, "write ledger record", e))
    }
}

/// Where a notification's reconciliation stopped.
enum Settlement {
    Granted(UserId),
    Rejected(ReconcileRejection),
    /// A store failed mid-way. Recorded as Failed, then surfaced.
    Interrupted {
        error: PaymentError,
        user_id: Option<UserId>,
    },
}

impl Settlement {
    fn interrupted(error: PaymentError, user_id: Option<UserId>) -> Self {
        Settlement::Interrupted { error, user_id }
    }
}

fn persistence_failure(
    transfer: &TransferNotification,
    step: &str,
    err: impl std::fmt::Display,
) -> PaymentError {
    tracing::error!(
        transfer_id = transfer.id,
        step,
        error = %err,
        "Payment reconciliation failed"
    );
    PaymentError::infrastructure(format!("failed to {}: {}", step, err))
}
