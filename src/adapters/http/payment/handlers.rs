//! HTTP handlers for payment endpoints.
//!
//! These handlers connect Axum routes to application layer command/query handlers.

use std::str::FromStr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Json, Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use secrecy::ExposeSecret;
use subtle::ConstantTimeEq;

use crate::application::handlers::payment::{
    CheckOwnershipHandler, CheckOwnershipQuery, GetPaymentSessionHandler, GetPaymentSessionQuery,
    InitiatePaymentCommand, InitiatePaymentHandler, InitiatePaymentSettings,
    ListUserSessionsHandler, ListUserSessionsQuery, ReconcileTransferCommand,
    ReconcileTransferHandler,
};
use crate::config::PaymentConfig;
use crate::domain::foundation::{DomainError, PaymentSessionId, UserId};
use crate::domain::payment::{PaymentError, Resolution, TransferNotification};
use crate::ports::{
    EntitlementRepository, PaymentCodeGenerator, PaymentLedger, PaymentSessionRepository,
};

use super::dto::{
    ErrorResponse, InitiatePaymentResponse, OwnershipResponse, PaymentSessionListResponse,
    PaymentSessionResponse, WebhookAck,
};

/// Shown in place of infrastructure error details.
const INTERNAL_ERROR_MESSAGE: &str = "An internal error occurred";

/// Authorization scheme the gateway uses for its API key.
const WEBHOOK_AUTH_SCHEME: &str = "apikey";

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared state for payment routes.
#[derive(Clone)]
pub struct PaymentAppState {
    pub sessions: Arc<dyn PaymentSessionRepository>,
    pub entitlements: Arc<dyn EntitlementRepository>,
    pub ledger: Arc<dyn PaymentLedger>,
    pub code_generator: Arc<dyn PaymentCodeGenerator>,
    pub config: Arc<PaymentConfig>,
}

impl PaymentAppState {
    pub fn initiate_payment_handler(&self) -> InitiatePaymentHandler {
        InitiatePaymentHandler::new(
            self.sessions.clone(),
            self.entitlements.clone(),
            self.code_generator.clone(),
            InitiatePaymentSettings::from(self.config.as_ref()),
        )
    }

    pub fn reconcile_transfer_handler(&self) -> ReconcileTransferHandler {
        ReconcileTransferHandler::new(
            self.sessions.clone(),
            self.entitlements.clone(),
            self.ledger.clone(),
            self.config.memo_parser(),
            self.config.price,
            self.config.expiry_policy(),
        )
    }

    pub fn get_session_handler(&self) -> GetPaymentSessionHandler {
        GetPaymentSessionHandler::new(self.sessions.clone())
    }

    pub fn list_sessions_handler(&self) -> ListUserSessionsHandler {
        ListUserSessionsHandler::new(self.sessions.clone())
    }

    pub fn check_ownership_handler(&self) -> CheckOwnershipHandler {
        CheckOwnershipHandler::new(self.entitlements.clone())
    }

    /// Checks `Authorization: Apikey <key>` against the configured key.
    fn webhook_authorized(&self, headers: &HeaderMap) -> bool {
        let Some(value) = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
        else {
            return false;
        };
        let Some((scheme, key)) = value.trim().split_once(' ') else {
            return false;
        };
        if !scheme.eq_ignore_ascii_case(WEBHOOK_AUTH_SCHEME) {
            return false;
        }
        let expected = self.config.webhook_api_key.expose_secret().as_bytes();
        expected.ct_eq(key.trim().as_bytes()).into()
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// User Context (would come from auth middleware in production)
// ════════════════════════════════════════════════════════════════════════════════

/// Authenticated user context extracted from request.
///
/// Identity is established upstream; the gateway forwards it as `X-User-Id`.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
}

/// Rejection type for AuthenticatedUser extraction.
pub struct AuthenticationRequired;

impl IntoResponse for AuthenticationRequired {
    fn into_response(self) -> axum::response::Response {
        let error = ErrorResponse::new("AUTHENTICATION_REQUIRED", "Authentication is required");
        (StatusCode::UNAUTHORIZED, Json(error)).into_response()
    }
}

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AuthenticationRequired;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get("X-User-Id")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| UserId::new(s).ok())
            .ok_or(AuthenticationRequired)?;

        Ok(AuthenticatedUser { user_id })
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Query Handlers (GET endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/payments/sessions - List the caller's payment sessions
pub async fn list_sessions(
    State(state): State<PaymentAppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, PaymentApiError> {
    let views = state
        .list_sessions_handler()
        .handle(ListUserSessionsQuery {
            user_id: user.user_id,
        })
        .await?;

    let response = PaymentSessionListResponse {
        sessions: views.into_iter().map(PaymentSessionResponse::from).collect(),
    };
    Ok(Json(response))
}

/// GET /api/payments/sessions/:id - Get one of the caller's sessions
pub async fn get_session(
    State(state): State<PaymentAppState>,
    user: AuthenticatedUser,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, PaymentApiError> {
    let session_id = PaymentSessionId::from_str(&session_id)
        .map_err(|_| PaymentApiError::InvalidSessionId(session_id))?;

    let view = state
        .get_session_handler()
        .handle(GetPaymentSessionQuery {
            session_id,
            user_id: user.user_id,
        })
        .await?;

    Ok(Json(PaymentSessionResponse::from(view)))
}

/// GET /api/payments/ownership - Check whether the caller owns the product
pub async fn check_ownership(
    State(state): State<PaymentAppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, PaymentApiError> {
    let result = state
        .check_ownership_handler()
        .handle(CheckOwnershipQuery {
            user_id: user.user_id,
        })
        .await?;

    Ok(Json(OwnershipResponse {
        owned: result.owned,
    }))
}

// ════════════════════════════════════════════════════════════════════════════════
// Command Handlers (POST endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/payments/initiate - Open or resume a payment session
///
/// 201 for a new session, 200 when the caller's live session is returned.
pub async fn initiate_payment(
    State(state): State<PaymentAppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, PaymentApiError> {
    let result = state
        .initiate_payment_handler()
        .handle(InitiatePaymentCommand {
            user_id: user.user_id,
        })
        .await?;

    let status = if result.resumed {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((status, Json(InitiatePaymentResponse::from(&result.session))))
}

/// POST /api/webhooks/sepay - Receive a bank-transfer notification
///
/// Every authenticated, well-formed notification is acknowledged with 200 so
/// the gateway does not redeliver; the outcome is in the body and the ledger.
pub async fn handle_sepay_webhook(
    State(state): State<PaymentAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, PaymentApiError> {
    if !state.webhook_authorized(&headers) {
        tracing::warn!("Rejected webhook with missing or invalid API key");
        return Err(PaymentApiError::Unauthorized);
    }

    let notification: TransferNotification = serde_json::from_slice(&body).map_err(|e| {
        tracing::warn!(error = %e, "Rejected malformed webhook payload");
        PaymentApiError::MalformedPayload(e.to_string())
    })?;

    let ack = match state
        .reconcile_transfer_handler()
        .handle(ReconcileTransferCommand { notification })
        .await
    {
        Ok(outcome) => match (outcome.resolution, outcome.rejection) {
            (Resolution::Processed, _) => WebhookAck::new("success", None),
            (Resolution::Ignored, rejection) => {
                WebhookAck::new("ignored", rejection.map(|r| r.to_string()))
            }
            (Resolution::Failed, rejection) => {
                WebhookAck::new("failed", rejection.map(|r| r.to_string()))
            }
        },
        Err(_) => WebhookAck::new("error", Some(INTERNAL_ERROR_MESSAGE.to_string())),
    };

    Ok((StatusCode::OK, Json(ack)))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts payment errors to HTTP responses.
#[derive(Debug)]
pub enum PaymentApiError {
    Payment(PaymentError),
    InvalidSessionId(String),
    Unauthorized,
    MalformedPayload(String),
}

impl From<PaymentError> for PaymentApiError {
    fn from(err: PaymentError) -> Self {
        Self::Payment(err)
    }
}

impl From<DomainError> for PaymentApiError {
    fn from(err: DomainError) -> Self {
        Self::Payment(PaymentError::from(err))
    }
}

impl IntoResponse for PaymentApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_code, message) = match self {
            PaymentApiError::Payment(err) => {
                let (status, code) = match &err {
                    PaymentError::UserNotFound(_) => (StatusCode::NOT_FOUND, "USER_NOT_FOUND"),
                    PaymentError::SessionNotFound(_) => {
                        (StatusCode::NOT_FOUND, "PAYMENT_SESSION_NOT_FOUND")
                    }
                    PaymentError::UserBanned(_) => (StatusCode::FORBIDDEN, "USER_BANNED"),
                    PaymentError::AlreadyOwned(_) => (StatusCode::CONFLICT, "ALREADY_OWNED"),
                    PaymentError::CodeSpaceExhausted { .. } => {
                        (StatusCode::SERVICE_UNAVAILABLE, "CODE_SPACE_EXHAUSTED")
                    }
                    PaymentError::Infrastructure(_) => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
                    }
                };
                let message = match &err {
                    PaymentError::Infrastructure(detail) => {
                        tracing::error!(error = %detail, "Payment request failed");
                        INTERNAL_ERROR_MESSAGE.to_string()
                    }
                    other => other.to_string(),
                };
                (status, code, message)
            }
            PaymentApiError::InvalidSessionId(raw) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_FAILED",
                format!("Invalid session id: {}", raw),
            ),
            PaymentApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Invalid webhook credentials".to_string(),
            ),
            PaymentApiError::MalformedPayload(detail) => (
                StatusCode::BAD_REQUEST,
                "INVALID_PAYLOAD",
                format!("Invalid JSON payload: {}", detail),
            ),
        };

        (status, Json(ErrorResponse::new(error_code, message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        InMemoryEntitlementRepository, InMemoryPaymentLedger, InMemorySessionRepository,
    };
    use crate::domain::payment::RandomCodeGenerator;
    use axum::http::HeaderValue;

    fn state() -> PaymentAppState {
        PaymentAppState {
            sessions: Arc::new(InMemorySessionRepository::new()),
            entitlements: Arc::new(InMemoryEntitlementRepository::new()),
            ledger: Arc::new(InMemoryPaymentLedger::new()),
            code_generator: Arc::new(RandomCodeGenerator::new()),
            config: Arc::new(PaymentConfig::new(
                "gateway-key",
                "28368866886",
                "NGUYEN HONG QUANG",
            )),
        }
    }

    fn headers_with(auth: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(auth).unwrap());
        headers
    }

    #[test]
    fn accepts_configured_api_key() {
        let state = state();
        assert!(state.webhook_authorized(&headers_with("Apikey gateway-key")));
        assert!(state.webhook_authorized(&headers_with("ApiKey gateway-key")));
    }

    #[test]
    fn rejects_wrong_or_missing_api_key() {
        let state = state();
        assert!(!state.webhook_authorized(&HeaderMap::new()));
        assert!(!state.webhook_authorized(&headers_with("Apikey other-key")));
        assert!(!state.webhook_authorized(&headers_with("Bearer gateway-key")));
        assert!(!state.webhook_authorized(&headers_with("gateway-key")));
    }

    #[test]
    fn maps_initiation_errors_to_distinct_statuses() {
        let user = UserId::new("u1").unwrap();
        let cases = [
            (PaymentError::UserNotFound(user.clone()), StatusCode::NOT_FOUND),
            (PaymentError::UserBanned(user.clone()), StatusCode::FORBIDDEN),
            (PaymentError::AlreadyOwned(user), StatusCode::CONFLICT),
            (
                PaymentError::CodeSpaceExhausted { attempts: 16 },
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                PaymentError::infrastructure("db down"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            let response = PaymentApiError::from(err).into_response();
            assert_eq!(response.status(), expected);
        }
    }
}
