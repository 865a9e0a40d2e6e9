//! Payment domain module.
//!
//! Bank-transfer payment sessions, the product entitlement they unlock and
//! the audit trail of every transfer notification received.
//!
//! # Module Structure
//!
//! - `code` - PaymentCode value object and the CSPRNG generator
//! - `status` - PaymentSessionStatus state machine
//! - `session` - PaymentSession aggregate
//! - `entitlement` - per-user ownership, ban and pending-code slot
//! - `notification` - inbound gateway payload
//! - `memo` - marker/code extraction from transfer descriptions
//! - `ledger` - append-only PaymentRecord entries
//! - `payment_link` - VietQR payment instructions
//! - `errors` - PaymentError and ReconcileRejection

mod code;
mod entitlement;
mod errors;
mod ledger;
mod memo;
mod notification;
mod payment_link;
mod session;
mod status;

pub use code::{PaymentCode, RandomCodeGenerator, CODE_ALPHABET, CODE_LENGTH};
pub use entitlement::Entitlement;
pub use errors::{PaymentError, ReconcileRejection};
pub use ledger::{PaymentRecord, Resolution};
pub use memo::{TransferMemoParser, DEFAULT_MARKER};
pub use notification::TransferNotification;
pub use payment_link::PaymentLink;
pub use session::PaymentSession;
pub use status::PaymentSessionStatus;
