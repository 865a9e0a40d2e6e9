//! ATMT payments - bank-transfer payment sessions and webhook reconciliation.
//!
//! A buyer opens a payment session and receives a short code to type into
//! the transfer description. The payment gateway later posts a webhook for
//! every incoming transfer; the reconciler matches the code against open
//! sessions, grants the product exactly once and records every notification
//! in an append-only ledger.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
