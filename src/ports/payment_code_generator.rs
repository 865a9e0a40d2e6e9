//! Payment code generator port.

use crate::domain::payment::PaymentCode;

/// Source of candidate payment codes.
///
/// May return a code that was used before; callers check uniqueness.
pub trait PaymentCodeGenerator: Send + Sync {
    fn generate(&self) -> PaymentCode;
}
