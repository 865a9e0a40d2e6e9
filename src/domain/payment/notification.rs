//! Inbound bank-transfer notification as delivered by the SePay gateway.
//!
//! The payload is untrusted: every field is kept verbatim so the ledger can
//! show operators exactly what arrived. Absent fields decode to their
//! empty value, matching how the gateway omits optional data.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransferNotification {
    /// Gateway transaction id.
    pub id: i64,

    /// Bank brand name.
    pub gateway: String,

    /// Bank-side transaction time, free text.
    pub transaction_date: String,

    pub account_number: String,

    /// Payment code recognised by the gateway itself, if any.
    pub code: Option<String>,

    /// Transfer description typed by the payer.
    pub content: String,

    /// `in` for incoming money, `out` for outgoing.
    pub transfer_type: String,

    /// Amount in minor currency units.
    pub transfer_amount: i64,

    /// Running account balance.
    pub accumulated: i64,

    pub sub_account: Option<String>,

    pub reference_code: String,

    /// Full text of the bank SMS.
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_gateway_payload() {
        let json = r#"{
            "id": 92704,
            "gateway": "MBBank",
            "transactionDate": "2024-07-02 11:24:00",
            "accountNumber": "28368866886",
            "code": null,
            "content": "ATMTAB12CD34 chuyen tien mua san pham",
            "transferType": "in",
            "transferAmount": 5000000,
            "accumulated": 19077000,
            "subAccount": null,
            "referenceCode": "MBVCB.3278907687",
            "description": "BankAPINotify ATMTAB12CD34"
        }"#;

        let n: TransferNotification = serde_json::from_str(json).unwrap();

        assert_eq!(n.id, 92704);
        assert_eq!(n.transfer_amount, 5_000_000);
        assert!(n.code.is_none());
        assert!(n.sub_account.is_none());
        assert_eq!(n.content, "ATMTAB12CD34 chuyen tien mua san pham");
    }

    #[test]
    fn rejects_fractional_amounts() {
        let json = r#"{
            "id": 1, "gateway": "g", "transactionDate": "", "accountNumber": "",
            "code": null, "content": "", "transferType": "in",
            "transferAmount": 5000000.5, "accumulated": 0, "subAccount": null,
            "referenceCode": "", "description": ""
        }"#;
        assert!(serde_json::from_str::<TransferNotification>(json).is_err());
    }

    #[test]
    fn missing_fields_decode_empty() {
        let n: TransferNotification =
            serde_json::from_str(r#"{"id": 7, "transferAmount": 5000000}"#).unwrap();
        assert_eq!(n.id, 7);
        assert_eq!(n.content, "");
        assert!(n.code.is_none());
    }
}
