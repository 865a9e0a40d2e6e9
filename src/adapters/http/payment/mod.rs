//! HTTP adapter for payment endpoints.
//!
//! Exposes the payment flow via REST API:
//! - `POST /api/payments/initiate` - Open (or resume) a payment session
//! - `GET /api/payments/sessions` - List the caller's payment sessions
//! - `GET /api/payments/sessions/:id` - Get one of the caller's sessions
//! - `GET /api/payments/ownership` - Check whether the caller owns the product
//! - `POST /api/webhooks/sepay` - Receive bank-transfer notifications

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::{AuthenticatedUser, PaymentApiError, PaymentAppState};
pub use routes::payment_router;
