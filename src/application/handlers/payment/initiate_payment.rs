//! InitiatePaymentHandler - Command handler for opening a bank-transfer payment session.

use std::sync::Arc;

use crate::config::PaymentConfig;
use crate::domain::foundation::{ErrorCode, Timestamp, UserId};
use crate::domain::payment::{PaymentError, PaymentLink, PaymentSession};
use crate::ports::{EntitlementRepository, PaymentCodeGenerator, PaymentSessionRepository};

/// Command to open (or resume) a payment session for a user.
#[derive(Debug, Clone)]
pub struct InitiatePaymentCommand {
    pub user_id: UserId,
}

/// Result of a successful initiation.
#[derive(Debug, Clone)]
pub struct InitiatePaymentResult {
    pub session: PaymentSession,

    /// True when the user's still-live session was returned instead of a new one.
    pub resumed: bool,
}

/// Pricing and code-allocation parameters.
#[derive(Debug, Clone)]
pub struct InitiatePaymentSettings {
    pub price: i64,
    pub marker: String,
    pub session_ttl_minutes: i64,
    pub max_code_attempts: u32,
    pub payment_link: PaymentLink,
}

impl From<&PaymentConfig> for InitiatePaymentSettings {
    fn from(config: &PaymentConfig) -> Self {
        Self {
            price: config.price,
            marker: config.marker.clone(),
            session_ttl_minutes: config.session_ttl_minutes,
            max_code_attempts: config.max_code_attempts,
            payment_link: config.payment_link(),
        }
    }
}

/// Handler for opening payment sessions.
pub struct InitiatePaymentHandler {
    sessions: Arc<dyn PaymentSessionRepository>,
    entitlements: Arc<dyn EntitlementRepository>,
    code_generator: Arc<dyn PaymentCodeGenerator>,
    settings: InitiatePaymentSettings,
}

impl InitiatePaymentHandler {
    pub fn new(
        sessions: Arc<dyn PaymentSessionRepository>,
        entitlements: Arc<dyn EntitlementRepository>,
        code_generator: Arc<dyn PaymentCodeGenerator>,
        settings: InitiatePaymentSettings,
    ) -> Self {
        Self {
            sessions,
            entitlements,
            code_generator,
            settings,
        }
    }

    pub async fn handle(
        &self,
        cmd: InitiatePaymentCommand,
    ) -> Result<InitiatePaymentResult, PaymentError> {
        // 1. Check the user may buy
        let entitlement = self
            .entitlements
            .find(&cmd.user_id)
            .await?
            .ok_or_else(|| PaymentError::UserNotFound(cmd.user_id.clone()))?;
        entitlement.ensure_can_purchase()?;

        let now = Timestamp::now();

        // 2. Resume the outstanding session while it can still be paid
        if let Some(code) = &entitlement.pending_code {
            if let Some(session) = self.sessions.find_by_code(code).await? {
                if session.user_id == cmd.user_id && session.is_completable_at(&now, true) {
                    tracing::debug!(
                        user_id = %cmd.user_id,
                        session_id = %session.id,
                        "Resuming live payment session"
                    );
                    return Ok(InitiatePaymentResult {
                        session,
                        resumed: true,
                    });
                }
            }
        }

        // 3. Allocate a code no session has ever carried
        for attempt in 1..=self.settings.max_code_attempts {
            let code = self.code_generator.generate();
            if self.sessions.code_exists(&code).await? {
                tracing::debug!(attempt, "Payment code collision, drawing again");
                continue;
            }

            let memo = format!("{}{}", self.settings.marker, code);
            let qr_image_url = self
                .settings
                .payment_link
                .qr_image_url(self.settings.price, &memo)
                .map_err(|e| PaymentError::infrastructure(e.to_string()))?;

            let session = PaymentSession::open(
                cmd.user_id.clone(),
                code,
                self.settings.price,
                qr_image_url,
                now,
                self.settings.session_ttl_minutes,
            );

            // 4. Persist; a concurrent insert may have claimed the code since the check
            match self.sessions.insert(&session).await {
                Ok(()) => {}
                Err(e) if e.code == ErrorCode::DuplicatePaymentCode => {
                    tracing::debug!(attempt, "Payment code claimed concurrently, drawing again");
                    continue;
                }
                Err(e) => return Err(e.into()),
            }

            // 5. Point the user's pending slot at the new code
            self.entitlements
                .assign_pending_code(&cmd.user_id, &session.code)
                .await?;

            tracing::info!(
                user_id = %cmd.user_id,
                session_id = %session.id,
                payment_code = %session.code,
                amount = session.amount,
                "Payment session opened"
            );

            return Ok(InitiatePaymentResult {
                session,
                resumed: false,
            });
        }

        tracing::warn!(
            user_id = %cmd.user_id,
            attempts = self.settings.max_code_attempts,
            "Payment code space exhausted"
        );
        Err(PaymentError::CodeSpaceExhausted {
            attempts: self.settings.max_code_attempts,
        })
    }
}
