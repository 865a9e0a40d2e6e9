//! In-memory adapters.
//!
//! `tokio::sync::RwLock`-backed implementations of the payment ports, used
//! by tests and local runs without a database.

mod in_memory_entitlement_repository;
mod in_memory_payment_ledger;
mod in_memory_session_repository;

pub use in_memory_entitlement_repository::InMemoryEntitlementRepository;
pub use in_memory_payment_ledger::InMemoryPaymentLedger;
pub use in_memory_session_repository::InMemorySessionRepository;
