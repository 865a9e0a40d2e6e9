//! Payment codes - the short token a payer copies into the transfer description.
//!
//! Codes are 8 symbols over `A-Z0-9`. Each symbol is drawn from the OS
//! CSPRNG with rejection sampling: bytes at or above 252 (the largest
//! multiple of 36 that fits in a byte) are discarded so `byte % 36` is uniform.
//!
//! The generator does not check uniqueness. Session creation retries until
//! it finds a code no session has ever carried.

use std::fmt;

use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::ValidationError;
use crate::ports::PaymentCodeGenerator;

/// Symbols a payment code is drawn from.
pub const CODE_ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Number of symbols in a payment code.
pub const CODE_LENGTH: usize = 8;

/// Bytes below this bound map uniformly onto the alphabet.
const ACCEPT_BELOW: u8 = (256 / CODE_ALPHABET.len() * CODE_ALPHABET.len()) as u8;

/// A well-formed payment code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PaymentCode(String);

impl PaymentCode {
    /// Validates and wraps a code.
    pub fn parse(raw: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = raw.into();
        if raw.len() != CODE_LENGTH {
            return Err(ValidationError::invalid_format(
                "payment_code",
                format!("expected {} characters, got {}", CODE_LENGTH, raw.len()),
            ));
        }
        if !raw.bytes().all(|b| CODE_ALPHABET.contains(&b)) {
            return Err(ValidationError::invalid_format(
                "payment_code",
                "only A-Z and 0-9 are allowed",
            ));
        }
        Ok(Self(raw))
    }

    /// Draws a fresh code from the given random source.
    pub fn random_from<R: RngCore + ?Sized>(rng: &mut R) -> Self {
        let mut code = String::with_capacity(CODE_LENGTH);
        let mut buf = [0u8; 16];
        while code.len() < CODE_LENGTH {
            rng.fill_bytes(&mut buf);
            for byte in buf.iter().copied().filter(|b| *b < ACCEPT_BELOW) {
                code.push(CODE_ALPHABET[usize::from(byte) % CODE_ALPHABET.len()] as char);
                if code.len() == CODE_LENGTH {
                    break;
                }
            }
        }
        Self(code)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PaymentCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PaymentCode {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<PaymentCode> for String {
    fn from(code: PaymentCode) -> Self {
        code.0
    }
}

/// Production code generator backed by the operating system's CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomCodeGenerator;

impl RandomCodeGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl PaymentCodeGenerator for RandomCodeGenerator {
    fn generate(&self) -> PaymentCode {
        PaymentCode::random_from(&mut OsRng)
    }
}
