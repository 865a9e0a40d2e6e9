//! VietQR payment instructions.
//!
//! Builds the image URL a banking app scans to pre-fill the receiving
//! account, the amount and the transfer description (`<marker><code>`).

use reqwest::Url;

use crate::domain::foundation::ValidationError;

const VIETQR_IMAGE_BASE: &str = "https://img.vietqr.io/image";

/// Receiving account details rendered into VietQR links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentLink {
    pub bank_code: String,
    pub account_number: String,
    pub account_name: String,
    /// VietQR image template (`compact`, `compact2`, `qr_only`, `print`).
    pub template: String,
}

impl PaymentLink {
    /// QR image URL for a transfer of `amount` described by `memo`.
    pub fn qr_image_url(&self, amount: i64, memo: &str) -> Result<String, ValidationError> {
        let base = format!(
            "{}/{}-{}-{}.jpg",
            VIETQR_IMAGE_BASE, self.bank_code, self.account_number, self.template
        );
        let url = Url::parse_with_params(
            &base,
            &[
                ("amount", amount.to_string()),
                ("addInfo", memo.to_string()),
                ("accountName", self.account_name.clone()),
            ],
        )
        .map_err(|e| ValidationError::invalid_format("qr_image_url", e.to_string()))?;
        Ok(url.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link() -> PaymentLink {
        PaymentLink {
            bank_code: "mbbank".to_string(),
            account_number: "28368866886".to_string(),
            account_name: "NGUYEN HONG QUANG".to_string(),
            template: "compact".to_string(),
        }
    }

    #[test]
    fn builds_vietqr_image_url() {
        let url = link().qr_image_url(5_000_000, "ATMTAB12CD34").unwrap();

        assert!(url.starts_with("https://img.vietqr.io/image/mbbank-28368866886-compact.jpg?"));
        assert!(url.contains("amount=5000000"));
        assert!(url.contains("addInfo=ATMTAB12CD34"));
        assert!(url.contains("accountName=NGUYEN+HONG+QUANG"));
    }

    #[test]
    fn escapes_reserved_characters_in_memo() {
        let url = link().qr_image_url(1, "A&B=C").unwrap();
        assert!(url.contains("addInfo=A%26B%3DC"));
    }
}
