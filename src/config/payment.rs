//! Payment configuration
//!
//! Product price, transfer memo marker, session lifetime and the receiving
//! bank account rendered into VietQR links.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::domain::payment::{PaymentLink, TransferMemoParser, DEFAULT_MARKER};
use crate::ports::ExpiryPolicy;

use super::error::ValidationError;

/// Payment configuration (bank transfer + payment gateway webhook)
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Product price in VND; webhooks must transfer exactly this amount
    #[serde(default = "default_price")]
    pub price: i64,

    /// Prefix that precedes the payment code in the transfer description
    #[serde(default = "default_marker")]
    pub marker: String,

    #[serde(default = "default_session_ttl")]
    pub session_ttl_minutes: i64,

    /// Upper bound on generate-and-check rounds when issuing a code
    #[serde(default = "default_max_code_attempts")]
    pub max_code_attempts: u32,

    /// Refuse to complete sessions past their expiry
    #[serde(default = "default_enforce_expiry")]
    pub enforce_session_expiry: bool,

    /// API key the gateway sends as `Authorization: Apikey <key>`
    pub webhook_api_key: SecretString,

    #[serde(default = "default_bank_code")]
    pub bank_code: String,

    pub account_number: String,

    pub account_name: String,

    #[serde(default = "default_qr_template")]
    pub qr_template: String,
}

impl PaymentConfig {
    /// Config with defaults for everything but the secret and the account.
    pub fn new(
        webhook_api_key: impl Into<String>,
        account_number: impl Into<String>,
        account_name: impl Into<String>,
    ) -> Self {
        Self {
            price: default_price(),
            marker: default_marker(),
            session_ttl_minutes: default_session_ttl(),
            max_code_attempts: default_max_code_attempts(),
            enforce_session_expiry: default_enforce_expiry(),
            webhook_api_key: SecretString::new(webhook_api_key.into()),
            bank_code: default_bank_code(),
            account_number: account_number.into(),
            account_name: account_name.into(),
            qr_template: default_qr_template(),
        }
    }

    pub fn expiry_policy(&self) -> ExpiryPolicy {
        if self.enforce_session_expiry {
            ExpiryPolicy::Enforce
        } else {
            ExpiryPolicy::Ignore
        }
    }

    pub fn memo_parser(&self) -> TransferMemoParser {
        TransferMemoParser::new(self.marker.clone())
    }

    pub fn payment_link(&self) -> PaymentLink {
        PaymentLink {
            bank_code: self.bank_code.clone(),
            account_number: self.account_number.clone(),
            account_name: self.account_name.clone(),
            template: self.qr_template.clone(),
        }
    }

    /// Validate payment configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.price <= 0 {
            return Err(ValidationError::InvalidPrice);
        }
        if !(1..=1440).contains(&self.session_ttl_minutes) {
            return Err(ValidationError::InvalidSessionTtl);
        }
        if !(1..=1000).contains(&self.max_code_attempts) {
            return Err(ValidationError::InvalidCodeAttempts);
        }
        if self.marker.is_empty()
            || !self
                .marker
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        {
            return Err(ValidationError::InvalidMarker);
        }
        if self.webhook_api_key.expose_secret().trim().is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT__WEBHOOK_API_KEY"));
        }
        if self.bank_code.trim().is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT__BANK_CODE"));
        }
        if self.account_number.trim().is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT__ACCOUNT_NUMBER"));
        }
        if self.account_name.trim().is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT__ACCOUNT_NAME"));
        }
        Ok(())
    }
}

fn default_price() -> i64 {
    5_000_000
}

fn default_marker() -> String {
    DEFAULT_MARKER.to_string()
}

fn default_session_ttl() -> i64 {
    15
}

fn default_max_code_attempts() -> u32 {
    16
}

fn default_enforce_expiry() -> bool {
    true
}

fn default_bank_code() -> String {
    "mbbank".to_string()
}

fn default_qr_template() -> String {
    "compact".to_string()
}
