//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors)
//! - `payment` - Payment sessions, entitlement, reconciliation vocabulary

pub mod foundation;
pub mod payment;
