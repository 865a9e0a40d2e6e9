//! PostgreSQL implementation of PaymentLedger over the append-only `payments` table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, PaymentRecordId, Timestamp, UserId};
use crate::domain::payment::{PaymentRecord, Resolution, TransferNotification};
use crate::ports::PaymentLedger;

const RECORD_COLUMNS: &str = "id, sepay_id, gateway, transaction_date, account_number, code, \
     content, transfer_type, transfer_amount, accumulated, sub_account, reference_code, \
     description, resolution, reason, user_id, processed_at";

/// PostgreSQL implementation of the PaymentLedger port.
#[derive(Clone)]
pub struct PostgresPaymentLedger {
    pool: PgPool,
}

impl PostgresPaymentLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PaymentRecordRow {
    id: Uuid,
    sepay_id: i64,
    gateway: String,
    transaction_date: String,
    account_number: String,
    code: Option<String>,
    content: String,
    transfer_type: String,
    transfer_amount: i64,
    accumulated: i64,
    sub_account: Option<String>,
    reference_code: String,
    description: String,
    resolution: String,
    reason: Option<String>,
    user_id: Option<String>,
    processed_at: DateTime<Utc>,
}

impl TryFrom<PaymentRecordRow> for PaymentRecord {
    type Error = DomainError;

    fn try_from(row: PaymentRecordRow) -> Result<Self, Self::Error> {
        let resolution = row
            .resolution
            .parse::<Resolution>()
            .map_err(|e| DomainError::database(format!("Invalid resolution: {}", e)))?;
        let user_id = row
            .user_id
            .map(UserId::new)
            .transpose()
            .map_err(|e| DomainError::database(format!("Invalid user_id: {}", e)))?;

        Ok(PaymentRecord {
            id: PaymentRecordId::from_uuid(row.id),
            transfer: TransferNotification {
                id: row.sepay_id,
                gateway: row.gateway,
                transaction_date: row.transaction_date,
                account_number: row.account_number,
                code: row.code,
                content: row.content,
                transfer_type: row.transfer_type,
                transfer_amount: row.transfer_amount,
                accumulated: row.accumulated,
                sub_account: row.sub_account,
                reference_code: row.reference_code,
                description: row.description,
            },
            resolution,
            reason: row.reason,
            user_id,
            processed_at: Timestamp::from_datetime(row.processed_at),
        })
    }
}

#[async_trait]
impl PaymentLedger for PostgresPaymentLedger {
    async fn append(&self, record: &PaymentRecord) -> Result<(), DomainError> {
        let t = &record.transfer;
        sqlx::query(
            r#"
            INSERT INTO payments (
                id, sepay_id, gateway, transaction_date, account_number, code,
                content, transfer_type, transfer_amount, accumulated, sub_account,
                reference_code, description, resolution, reason, user_id, processed_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(t.id)
        .bind(&t.gateway)
        .bind(&t.transaction_date)
        .bind(&t.account_number)
        .bind(&t.code)
        .bind(&t.content)
        .bind(&t.transfer_type)
        .bind(t.transfer_amount)
        .bind(t.accumulated)
        .bind(&t.sub_account)
        .bind(&t.reference_code)
        .bind(&t.description)
        .bind(record.resolution.as_str())
        .bind(&record.reason)
        .bind(record.user_id.as_ref().map(UserId::as_str))
        .bind(record.processed_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to append payment record: {}", e)))?;

        Ok(())
    }

    async fn list_by_user(&self, user_id: &UserId) -> Result<Vec<PaymentRecord>, DomainError> {
        let sql = format!(
            "SELECT {} FROM payments WHERE user_id = $1 ORDER BY processed_at DESC",
            RECORD_COLUMNS
        );
        let rows: Vec<PaymentRecordRow> = sqlx::query_as(&sql)
            .bind(user_id.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::database(format!("Failed to list payments: {}", e)))?;

        rows.into_iter().map(PaymentRecord::try_from).collect()
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<PaymentRecord>, DomainError> {
        let sql = format!(
            "SELECT {} FROM payments ORDER BY processed_at DESC LIMIT $1",
            RECORD_COLUMNS
        );
        let rows: Vec<PaymentRecordRow> = sqlx::query_as(&sql)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::database(format!("Failed to list payments: {}", e)))?;

        rows.into_iter().map(PaymentRecord::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_failed_row_without_user() {
        let record = PaymentRecord::try_from(PaymentRecordRow {
            id: Uuid::new_v4(),
            sepay_id: 92704,
            gateway: "MBBank".to_string(),
            transaction_date: "2024-07-02 11:24:00".to_string(),
            account_number: "28368866886".to_string(),
            code: None,
            content: "ATMTZZZZZZZZ".to_string(),
            transfer_type: "in".to_string(),
            transfer_amount: 5_000_000,
            accumulated: 0,
            sub_account: None,
            reference_code: "MBVCB.1".to_string(),
            description: String::new(),
            resolution: "failed".to_string(),
            reason: Some("no_matching_session".to_string()),
            user_id: None,
            processed_at: Utc::now(),
        })
        .unwrap();

        assert_eq!(record.resolution, Resolution::Failed);
        assert_eq!(record.transfer.id, 92704);
        assert!(record.user_id.is_none());
    }
}
