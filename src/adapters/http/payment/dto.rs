//! Request/response bodies for payment endpoints.

use serde::{Deserialize, Serialize};

use crate::application::handlers::payment::PaymentSessionView;
use crate::domain::payment::{PaymentSession, PaymentSessionStatus};

/// Response for `POST /api/payments/initiate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitiatePaymentResponse {
    pub payment_code: String,
    pub amount: i64,
    pub qr_image_url: String,
    /// RFC 3339
    pub expires_at: String,
    pub message: String,
}

impl From<&PaymentSession> for InitiatePaymentResponse {
    fn from(session: &PaymentSession) -> Self {
        Self {
            payment_code: session.code.as_str().to_string(),
            amount: session.amount,
            qr_image_url: session.qr_image_url.clone(),
            expires_at: session.expires_at.to_rfc3339(),
            message: format!(
                "Please scan the QR code to complete payment. Payment code: {}",
                session.code
            ),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentSessionResponse {
    pub id: String,
    pub payment_code: String,
    pub amount: i64,
    pub status: PaymentSessionStatus,
    pub qr_image_url: String,
    pub created_at: String,
    pub expires_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
}

impl From<PaymentSessionView> for PaymentSessionResponse {
    fn from(view: PaymentSessionView) -> Self {
        Self {
            id: view.id.to_string(),
            payment_code: view.payment_code,
            amount: view.amount,
            status: view.status,
            qr_image_url: view.qr_image_url,
            created_at: view.created_at.to_rfc3339(),
            expires_at: view.expires_at.to_rfc3339(),
            completed_at: view.completed_at.map(|t| t.to_rfc3339()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentSessionListResponse {
    pub sessions: Vec<PaymentSessionResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnershipResponse {
    pub owned: bool,
}

/// Acknowledgement returned to the gateway for every well-formed notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookAck {
    /// `success`, `ignored`, `failed` or `error`
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl WebhookAck {
    pub fn new(status: &str, message: Option<String>) -> Self {
        Self {
            status: status.to_string(),
            message,
        }
    }
}

/// Standard error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub error_code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
        }
    }
}
