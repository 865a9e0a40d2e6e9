//! Axum router configuration for payment endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    check_ownership, get_session, handle_sepay_webhook, initiate_payment, list_sessions,
    PaymentAppState,
};

/// User-facing payment routes (require `X-User-Id`).
///
/// - `POST /initiate` - Open or resume a payment session
/// - `GET /sessions` - List the caller's sessions
/// - `GET /sessions/:id` - Get one of the caller's sessions
/// - `GET /ownership` - Check product ownership
pub fn payment_routes() -> Router<PaymentAppState> {
    Router::new()
        .route("/initiate", post(initiate_payment))
        .route("/sessions", get(list_sessions))
        .route("/sessions/:id", get(get_session))
        .route("/ownership", get(check_ownership))
}

/// Gateway webhook routes (API-key authenticated).
///
/// - `POST /sepay` - Bank-transfer notification
pub fn webhook_routes() -> Router<PaymentAppState> {
    Router::new().route("/sepay", post(handle_sepay_webhook))
}

/// Complete payment module router, mounted under `/api`.
///
/// ```ignore
/// let app = payment_router().with_state(state);
/// ```
pub fn payment_router() -> Router<PaymentAppState> {
    Router::new()
        .nest("/api/payments", payment_routes())
        .nest("/api/webhooks", webhook_routes())
}
