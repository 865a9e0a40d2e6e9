//! Payment handlers.
//!
//! ## Commands
//! - Initiating a bank-transfer payment session
//! - Reconciling an inbound transfer notification
//!
//! ## Queries
//! - Get one payment session
//! - List a user's payment sessions
//! - Check product ownership

mod check_ownership;
mod get_payment_session;
mod initiate_payment;
mod list_user_sessions;
mod reconcile_transfer;
mod session_view;

#[cfg(test)]
pub(crate) mod test_support;

// Commands
pub use initiate_payment::{
    InitiatePaymentCommand, InitiatePaymentHandler, InitiatePaymentResult, InitiatePaymentSettings,
};
pub use reconcile_transfer::{ReconcileOutcome, ReconcileTransferCommand, ReconcileTransferHandler};

// Queries
pub use check_ownership::{CheckOwnershipHandler, CheckOwnershipQuery, CheckOwnershipResult};
pub use get_payment_session::{GetPaymentSessionHandler, GetPaymentSessionQuery};
pub use list_user_sessions::{ListUserSessionsHandler, ListUserSessionsQuery};
pub use session_view::PaymentSessionView;
