//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `PaymentSessionRepository` - session persistence and conditional completion
//! - `EntitlementRepository` - ownership, ban flag and pending-code slot per user
//! - `PaymentLedger` - append-only record of every transfer notification
//! - `PaymentCodeGenerator` - candidate payment codes

mod entitlement_repository;
mod payment_code_generator;
mod payment_ledger;
mod payment_session_repository;

pub use entitlement_repository::EntitlementRepository;
pub use payment_code_generator::PaymentCodeGenerator;
pub use payment_ledger::PaymentLedger;
pub use payment_session_repository::{ExpiryPolicy, PaymentSessionRepository};
