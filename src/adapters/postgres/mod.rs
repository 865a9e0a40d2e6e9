//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresPaymentSessionRepository` - payment sessions and conditional completion
//! - `PostgresEntitlementRepository` - ownership/ban/pending-code columns of `users`
//! - `PostgresPaymentLedger` - append-only `payments` table
//!
//! Schema lives in `migrations/`.

mod entitlement_repository;
mod payment_ledger;
mod payment_session_repository;

pub use entitlement_repository::PostgresEntitlementRepository;
pub use payment_ledger::PostgresPaymentLedger;
pub use payment_session_repository::PostgresPaymentSessionRepository;
