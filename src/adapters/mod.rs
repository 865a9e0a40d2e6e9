//! Adapters - Implementations of port interfaces.
//!
//! - `memory` - in-process stores for tests and local runs
//! - `postgres` - sqlx-backed stores
//! - `http` - axum routes

pub mod http;
pub mod memory;
pub mod postgres;
