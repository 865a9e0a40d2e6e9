//! PostgreSQL implementation of PaymentSessionRepository.
//!
//! `complete_pending` is a single `UPDATE ... WHERE status = 'pending'
//! RETURNING` statement; row presence is the match signal, so Postgres row
//! locking decides the one winner among concurrent deliveries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, ErrorCode, PaymentSessionId, Timestamp, UserId};
use crate::domain::payment::{PaymentCode, PaymentSession, PaymentSessionStatus};
use crate::ports::{ExpiryPolicy, PaymentSessionRepository};

const SESSION_COLUMNS: &str =
    "id, user_id, payment_code, amount, status, qr_image_url, created_at, expires_at, completed_at";

/// PostgreSQL implementation of the PaymentSessionRepository port.
#[derive(Clone)]
pub struct PostgresPaymentSessionRepository {
    pool: PgPool,
}

impl PostgresPaymentSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a payment session.
#[derive(Debug, sqlx::FromRow)]
struct PaymentSessionRow {
    id: Uuid,
    user_id: String,
    payment_code: String,
    amount: i64,
    status: String,
    qr_image_url: String,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl TryFrom<PaymentSessionRow> for PaymentSession {
    type Error = DomainError;

    fn try_from(row: PaymentSessionRow) -> Result<Self, Self::Error> {
        let corrupt = |field: &str, e: &dyn std::fmt::Display| {
            DomainError::database(format!("Invalid {} in payment_sessions row: {}", field, e))
        };

        Ok(PaymentSession {
            id: PaymentSessionId::from_uuid(row.id),
            user_id: UserId::new(row.user_id).map_err(|e| corrupt("user_id", &e))?,
            code: PaymentCode::parse(row.payment_code).map_err(|e| corrupt("payment_code", &e))?,
            amount: row.amount,
            status: row
                .status
                .parse::<PaymentSessionStatus>()
                .map_err(|e| corrupt("status", &e))?,
            qr_image_url: row.qr_image_url,
            created_at: Timestamp::from_datetime(row.created_at),
            expires_at: Timestamp::from_datetime(row.expires_at),
            completed_at: row.completed_at.map(Timestamp::from_datetime),
        })
    }
}

fn query_failed(action: &str, e: sqlx::Error) -> DomainError {
    DomainError::database(format!("Failed to {}: {}", action, e))
}

#[async_trait]
impl PaymentSessionRepository for PostgresPaymentSessionRepository {
    async fn insert(&self, session: &PaymentSession) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO payment_sessions (
                id, user_id, payment_code, amount, status, qr_image_url,
                created_at, expires_at, completed_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(session.id.as_uuid())
        .bind(session.user_id.as_str())
        .bind(session.code.as_str())
        .bind(session.amount)
        .bind(session.status.as_str())
        .bind(&session.qr_image_url)
        .bind(session.created_at.as_datetime())
        .bind(session.expires_at.as_datetime())
        .bind(session.completed_at.as_ref().map(|t| *t.as_datetime()))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.constraint() == Some("payment_sessions_payment_code_key") {
                    return DomainError::new(
                        ErrorCode::DuplicatePaymentCode,
                        format!("Payment code {} is already in use", session.code),
                    );
                }
            }
            query_failed("insert payment session", e)
        })?;

        Ok(())
    }

    async fn code_exists(&self, code: &PaymentCode) -> Result<bool, DomainError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM payment_sessions WHERE payment_code = $1)",
        )
        .bind(code.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| query_failed("check payment code", e))
    }

    async fn find_by_id(
        &self,
        id: &PaymentSessionId,
    ) -> Result<Option<PaymentSession>, DomainError> {
        let sql = format!("SELECT {} FROM payment_sessions WHERE id = $1", SESSION_COLUMNS);
        let row: Option<PaymentSessionRow> = sqlx::query_as(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| query_failed("load payment session", e))?;

        row.map(PaymentSession::try_from).transpose()
    }

    async fn find_by_code(&self, code: &PaymentCode) -> Result<Option<PaymentSession>, DomainError> {
        let sql = format!(
            "SELECT {} FROM payment_sessions WHERE payment_code = $1",
            SESSION_COLUMNS
        );
        let row: Option<PaymentSessionRow> = sqlx::query_as(&sql)
            .bind(code.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| query_failed("load payment session", e))?;

        row.map(PaymentSession::try_from).transpose()
    }

    async fn list_by_user(&self, user_id: &UserId) -> Result<Vec<PaymentSession>, DomainError> {
        let sql = format!(
            "SELECT {} FROM payment_sessions WHERE user_id = $1 ORDER BY created_at DESC",
            SESSION_COLUMNS
        );
        let rows: Vec<PaymentSessionRow> = sqlx::query_as(&sql)
            .bind(user_id.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| query_failed("list payment sessions", e))?;

        rows.into_iter().map(PaymentSession::try_from).collect()
    }

    async fn complete_pending(
        &self,
        code: &str,
        now: Timestamp,
        policy: ExpiryPolicy,
    ) -> Result<Option<PaymentSession>, DomainError> {
        let sql = format!(
            r#"
            UPDATE payment_sessions
            SET status = 'completed', completed_at = $2
            WHERE payment_code = $1
              AND status = 'pending'
              AND (NOT $3 OR expires_at > $2)
            RETURNING {}
            "#,
            SESSION_COLUMNS
        );
        let row: Option<PaymentSessionRow> = sqlx::query_as(&sql)
            .bind(code)
            .bind(now.as_datetime())
            .bind(policy == ExpiryPolicy::Enforce)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| query_failed("complete payment session", e))?;

        row.map(PaymentSession::try_from).transpose()
    }
}
